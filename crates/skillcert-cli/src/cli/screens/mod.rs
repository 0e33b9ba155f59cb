//! Interactive screens and the navigation loop that links them.

use anyhow::Result;
use skillcert_core::flow::{Route, guard};

use super::app::{App, NOT_SIGNED_IN};

pub mod certificate;
pub mod dashboard;
pub mod payment;
pub mod result;

/// Follows routes from `start` until a screen ends the journey.
pub async fn navigate(app: &mut App, start: Route) -> Result<()> {
    let mut requested = start;
    loop {
        let route = guard(requested, app.session.as_ref());
        if route != requested {
            tracing::debug!(%requested, %route, "redirected by guard");
        }

        let next = match route {
            Route::Login => anyhow::bail!(NOT_SIGNED_IN),
            Route::Dashboard => dashboard::show(app).await?,
            Route::Payment => payment::run(app).await?,
            Route::Test => test::run(app).await?,
            Route::Result { token } => result::show(app, token).await?,
            Route::Certificate => certificate::show(app).await?,
            Route::Admin => {
                super::commands::admin::analytics(app).await?;
                None
            }
        };

        match next {
            Some(route) => requested = route,
            None => return Ok(()),
        }
    }
}
