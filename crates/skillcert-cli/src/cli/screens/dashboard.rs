use anyhow::Result;
use skillcert_core::api::{AttemptInfo, MAX_ATTEMPTS};
use skillcert_core::flow::Route;

use crate::cli::app::App;

/// Prints the dashboard and ends the journey.
pub async fn show(app: &App) -> Result<Option<Route>> {
    summary(app).await?;
    Ok(None)
}

/// Prints the user card and attempt summary. Returns the attempt info when
/// it could be loaded.
pub async fn summary(app: &App) -> Result<Option<AttemptInfo>> {
    let session = app.session()?;
    let ui = &app.ui;

    ui.heading(format!("Welcome, {}", session.user.name));
    ui.field("Email", &session.user.email);
    ui.field("Profession", &session.user.role);
    if session.is_admin() {
        ui.field("Access", "admin");
    }

    match app.api.attempt_count().await {
        Ok(info) => {
            if info.has_passed {
                ui.success("Certified. Run `skillcert certificate show`.");
            } else {
                ui.field(
                    "Attempts",
                    format!(
                        "{} of {MAX_ATTEMPTS} used, {} remaining",
                        info.attempt_count.min(MAX_ATTEMPTS),
                        info.remaining_attempts
                    ),
                );
                ui.muted("Run `skillcert start` to continue.");
            }
            Ok(Some(info))
        }
        Err(err) => {
            tracing::warn!(error = %err, "attempt summary unavailable");
            ui.muted(format!("Attempt summary unavailable: {err}"));
            Ok(None)
        }
    }
}
