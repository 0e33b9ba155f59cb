//! Account and progress summaries.

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use skillcert_core::api::MAX_ATTEMPTS;
use skillcert_core::dates::display_date;
use skillcert_core::session::mask_token;

use crate::cli::app::App;

pub fn whoami(app: &App) -> Result<()> {
    let session = app.session()?;
    let user = &session.user;

    println!("{} <{}>", user.name, user.email);
    app.ui.field("Profession", &user.role);
    app.ui
        .field("Access", if user.is_admin { "admin" } else { "user" });
    if let Some(created) = user.created_at.as_deref() {
        app.ui.field("Member since", display_date(created));
    }
    app.ui.field("Language", app.store.language().label());
    app.ui.field("Token", mask_token(&session.token));
    Ok(())
}

pub async fn status(app: &App) -> Result<()> {
    let session = app.session()?;
    let info = app
        .api
        .attempt_count()
        .await
        .context("load attempt count")?;
    let history = app.api.attempts().await.context("load attempt history")?;

    app.ui.heading(format!("{} · {}", session.user.name, session.user.role));
    if info.has_passed {
        app.ui.success("Certified");
    } else {
        app.ui.field(
            "Attempts on current payment",
            format!(
                "{} used, {} remaining (of {MAX_ATTEMPTS})",
                info.attempt_count.min(MAX_ATTEMPTS),
                info.remaining_attempts
            ),
        );
        if info.attempt_count >= MAX_ATTEMPTS {
            app.ui
                .muted("Payment is required before the next attempt. Run `skillcert pay`.");
        }
    }

    if history.is_empty() {
        app.ui.muted("No attempts yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Score", "Result", "Date"]);
    for attempt in &history {
        table.add_row(vec![
            attempt.attempt_number.to_string(),
            format!("{}/10", attempt.score),
            if attempt.passed {
                "passed".to_string()
            } else {
                "failed".to_string()
            },
            display_date(&attempt.timestamp),
        ]);
    }
    println!("{table}");
    Ok(())
}
