//! Entry points into the dashboard → payment → test → result → certificate journey.

use anyhow::Result;
use skillcert_core::api::Language;
use skillcert_core::flow::Route;
use skillcert_core::flow::route::dashboard_start;

use crate::cli::app::App;
use crate::cli::screens::{self, dashboard};

pub async fn start(app: &mut App) -> Result<()> {
    let next = match dashboard::summary(app).await? {
        Some(info) => dashboard_start(&info),
        // Payment re-reads the counters itself.
        None => Route::Payment,
    };
    screens::navigate(app, next).await
}

pub async fn pay(app: &mut App) -> Result<()> {
    screens::navigate(app, Route::Payment).await
}

pub async fn test(app: &mut App, language: Option<Language>) -> Result<()> {
    if let Some(language) = language {
        app.store.set_language(language)?;
    }
    screens::navigate(app, Route::Test).await
}

pub async fn certificate(app: &mut App) -> Result<()> {
    screens::navigate(app, Route::Certificate).await
}
