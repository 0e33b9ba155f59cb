use anyhow::{Context, Result};
use skillcert_core::api::PASS_MARK;
use skillcert_core::certificate::NOT_EARNED;
use skillcert_core::dates::display_date;
use skillcert_core::flow::Route;

use crate::cli::app::App;

pub async fn show(app: &App) -> Result<Option<Route>> {
    let session = app.session()?;
    let info = app
        .api
        .certificate(session.user.id)
        .await
        .context("load certificate")?;
    let ui = &app.ui;

    if !info.has_certificate {
        ui.error(NOT_EARNED);
        return Ok(None);
    }

    ui.heading("Certificate of Competency");
    ui.field(
        "Name",
        info.name.as_deref().unwrap_or(session.user.name.as_str()),
    );
    ui.field(
        "Profession",
        info.role.as_deref().unwrap_or(session.user.role.as_str()),
    );
    if let Some(score) = info.score {
        ui.field("Score", format!("{score}/10 (pass mark {PASS_MARK})"));
    }
    if let Some(date) = info.date.as_deref() {
        ui.field("Issued", display_date(date));
    }
    if let Some(attempt) = info.attempt_number {
        ui.field("Attempt", attempt);
    }
    ui.muted("Run `skillcert certificate download` to save the PDF.");
    Ok(None)
}
