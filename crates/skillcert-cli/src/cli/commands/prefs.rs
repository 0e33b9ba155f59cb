//! Theme and language preferences.

use anyhow::{Context, Result};
use skillcert_core::api::Language;
use skillcert_core::config::{Config, paths};
use skillcert_core::session::SessionStore;
use skillcert_core::theme::Theme;

pub fn theme(config: &Config, value: Option<&str>) -> Result<()> {
    let current = config.ui.theme;
    let next = match value.map(str::trim) {
        None => {
            println!("Theme: {current}");
            return Ok(());
        }
        Some(v) if v.eq_ignore_ascii_case("toggle") => current.toggled(),
        Some(v) => v.parse::<Theme>().map_err(anyhow::Error::msg)?,
    };

    Config::save_theme(next).context("save theme")?;
    println!("Theme set to {next}");
    println!("  Saved to: {}", paths::config_path().display());
    Ok(())
}

pub fn language(value: Option<Language>) -> Result<()> {
    let mut store = SessionStore::open().context("open session store")?;
    match value {
        None => println!(
            "Language: {} ({})",
            store.language(),
            store.language().label()
        ),
        Some(language) => {
            store.set_language(language)?;
            println!("Language set to {} ({})", language, language.label());
        }
    }
    Ok(())
}
