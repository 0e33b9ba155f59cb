//! Admin dashboard: analytics and user management.

use anyhow::{Context, Result};
use comfy_table::{CellAlignment, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use skillcert_core::admin::{category_bars, check_delete, validate_update};
use skillcert_core::api::UserUpdate;
use skillcert_core::dates::display_date;
use skillcert_core::flow::{Route, guard};
use skillcert_core::session::Session;

use crate::cli::app::{App, NOT_SIGNED_IN};

const ADMIN_REQUIRED: &str = "Admin access required";
const BAR_WIDTH: usize = 24;

fn require_admin(app: &App) -> Result<&Session> {
    match guard(Route::Admin, app.session.as_ref()) {
        Route::Admin => app.session(),
        Route::Login => anyhow::bail!(NOT_SIGNED_IN),
        _ => anyhow::bail!(ADMIN_REQUIRED),
    }
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub async fn analytics(app: &App) -> Result<()> {
    require_admin(app)?;
    let analytics = app
        .api
        .admin_analytics()
        .await
        .context("load analytics")?;
    let totals = &analytics.totals;
    let revenue = &analytics.revenue;

    app.ui.heading("Overview");
    app.ui.field("Users", totals.users);
    app.ui.field("Admins", totals.admins);
    app.ui.field("Tests taken", totals.tests_taken);
    app.ui.field("Passed", totals.tests_passed);
    app.ui.field("Failed", totals.tests_failed);

    app.ui.heading("Revenue");
    app.ui.field("Total", format!("Rs {}", revenue.total_amount));
    app.ui.field("Discounted payments", revenue.discounted_payments);
    app.ui.field("Regular payments", revenue.regular_payments);

    app.ui.heading("Passes by category");
    let bars = category_bars(&analytics);
    if bars.is_empty() {
        app.ui.muted("No passes recorded yet.");
    }
    let label_width = bars.iter().map(|b| b.category.len()).max().unwrap_or(0);
    for bar in &bars {
        println!(
            "  {:<label_width$}  {} {}",
            bar.category,
            app.ui.bar(bar.percent_of_max, BAR_WIDTH),
            bar.passes
        );
    }

    app.ui.heading("Recent payments");
    if analytics.recent_payments.is_empty() {
        app.ui.muted("No payments yet.");
        return Ok(());
    }
    let mut payments = table(vec!["User", "Amount", "Discounted", "Date"]);
    for payment in &analytics.recent_payments {
        payments.add_row(vec![
            payment.user.clone(),
            format!("Rs {}", payment.amount),
            if payment.discounted { "yes" } else { "no" }.to_string(),
            display_date(&payment.created_at),
        ]);
    }
    if let Some(column) = payments.column_mut(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    println!("{payments}");
    Ok(())
}

pub async fn users(app: &App) -> Result<()> {
    require_admin(app)?;
    let users = app.api.admin_users().await.context("load users")?;
    if users.is_empty() {
        app.ui.muted("No users.");
        return Ok(());
    }

    let mut listing = table(vec![
        "ID", "Name", "Email", "Profession", "Admin", "Tests", "Passed", "Paid", "Joined",
    ]);
    for user in &users {
        listing.add_row(vec![
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            user.role.clone(),
            if user.is_admin { "yes" } else { "" }.to_string(),
            user.attempts_total.to_string(),
            user.attempts_passed.to_string(),
            format!("Rs {}", user.payments_total_amount),
            user.created_at
                .as_deref()
                .map(display_date)
                .unwrap_or_default(),
        ]);
    }
    println!("{listing}");
    app.ui.muted(format!("{} user(s)", users.len()));
    Ok(())
}

pub async fn update(app: &App, user_id: i64, update: UserUpdate) -> Result<()> {
    require_admin(app)?;
    let update = validate_update(update)?;
    let response = app
        .api
        .admin_update_user(user_id, &update)
        .await
        .with_context(|| format!("update user {user_id}"))?;
    if response.message.is_empty() {
        app.ui.success(format!("Updated user {user_id}"));
    } else {
        app.ui.success(response.message);
    }
    Ok(())
}

pub async fn delete(app: &mut App, user_id: i64, yes: bool) -> Result<()> {
    check_delete(require_admin(app)?, user_id)?;
    if !yes
        && !app
            .prompt
            .confirm(&format!("Delete user {user_id} and all their records?"))
            .await?
    {
        println!("Delete cancelled.");
        return Ok(());
    }

    let response = app
        .api
        .admin_delete_user(user_id)
        .await
        .with_context(|| format!("delete user {user_id}"))?;
    if response.message.is_empty() {
        app.ui.success(format!("Deleted user {user_id}"));
    } else {
        app.ui.success(response.message);
    }
    Ok(())
}
