//! Auth command handlers.

use anyhow::Result;
use skillcert_core::session::{DEFAULT_ROLE, Session, SignupForm, mask_token};

use crate::cli::app::App;

/// Asks for a value unless it was given on the command line.
async fn value_or_ask(app: &mut App, given: Option<String>, label: &str) -> Result<String> {
    match given {
        Some(value) => Ok(value),
        None => app.prompt.ask_required(label).await,
    }
}

/// Asks before replacing an existing session. Returns false to cancel.
async fn confirm_replace(app: &mut App) -> Result<bool> {
    let Some(existing) = &app.session else {
        return Ok(true);
    };
    println!("Already signed in as {}.", existing.user.email);
    if app.prompt.confirm("Sign in as someone else?").await? {
        Ok(true)
    } else {
        println!("Login cancelled.");
        Ok(false)
    }
}

fn print_signed_in(app: &App, session: &Session) {
    app.ui
        .success(format!("Signed in as {} ({})", session.user.name, session.user.email));
    println!("  Token: {}", mask_token(&session.token));
    println!("  Session saved to: {}", app.store.path().display());
}

pub async fn signup(
    app: &mut App,
    name: Option<String>,
    email: Option<String>,
    role: Option<String>,
) -> Result<()> {
    if !confirm_replace(app).await? {
        return Ok(());
    }

    let name = value_or_ask(app, name, "Full name: ").await?;
    let email = value_or_ask(app, email, "Email: ").await?;
    let role = value_or_ask(app, role, "Profession (e.g. Electrician): ").await?;
    let password = app.prompt.ask_required("Password: ").await?;
    let confirm_password = app.prompt.ask_required("Confirm password: ").await?;

    let form = SignupForm {
        name,
        email,
        password,
        confirm_password,
        role,
    };
    let session = app.store.signup(&mut app.api, &form).await?;
    print_signed_in(app, &session);
    app.session = Some(session);
    Ok(())
}

pub async fn login(app: &mut App, email: Option<String>) -> Result<()> {
    if !confirm_replace(app).await? {
        return Ok(());
    }

    let email = value_or_ask(app, email, "Email: ").await?;
    let password = app.prompt.ask_required("Password: ").await?;
    let session = app.store.login(&mut app.api, &email, &password).await?;
    print_signed_in(app, &session);
    app.session = Some(session);
    Ok(())
}

pub async fn login_google(app: &mut App, email: Option<String>) -> Result<()> {
    if !confirm_replace(app).await? {
        return Ok(());
    }

    let email = value_or_ask(app, email, "Google account email: ").await?;
    let name = app.prompt.ask_required("Name on the account: ").await?;
    let role = app
        .prompt
        .ask(&format!("Profession [{DEFAULT_ROLE}]: "))
        .await?
        .unwrap_or_default();
    let session = app
        .store
        .google_login(&mut app.api, &email, &name, Some(&role))
        .await?;
    print_signed_in(app, &session);
    app.session = Some(session);
    Ok(())
}

pub fn logout(app: &mut App) -> Result<()> {
    let had_token = app.store.logout(&mut app.api)?;
    app.session = None;

    if had_token {
        app.ui.success("Signed out");
        println!("  Token removed from: {}", app.store.path().display());
    } else {
        println!("Not signed in (no stored session).");
    }
    Ok(())
}
