//! Configuration management for skillcert.
//!
//! Loads configuration from ${SKILLCERT_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "SKILLCERT_API_URL";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments/sections from the template are always present,
/// user-customized values win.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for skillcert configuration and data directories.
    //!
    //! SKILLCERT_HOME resolution order:
    //! 1. SKILLCERT_HOME environment variable (if set)
    //! 2. ~/.config/skillcert (default)
    //! 3. ./.skillcert when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the skillcert home directory.
    pub fn skillcert_home() -> PathBuf {
        if let Ok(home) = std::env::var("SKILLCERT_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".skillcert"),
            |h| h.join(".config").join("skillcert"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        skillcert_home().join("config.toml")
    }

    /// Returns the path to the persisted session file (token + language).
    pub fn session_path() -> PathBuf {
        skillcert_home().join("session.json")
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> PathBuf {
        skillcert_home().join("logs")
    }
}

/// API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the portal API, including the `/api` prefix.
    pub base_url: String,
    /// Request timeout in seconds (0 disables)
    pub timeout_secs: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Config::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 0,
        }
    }
}

/// Terminal presentation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: Theme,
}

/// Where card submissions are verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// Checked in the client against `payment.facilitator_card`.
    #[default]
    Local,
    /// Relayed to `POST payment/authorize-card`.
    Remote,
}

/// A pre-registered facilitator card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredCard {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
}

/// Payment flow settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub gateway: GatewayKind,
    pub processing_delay_ms: u64,
    pub countdown_secs: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facilitator_card: Option<RegisteredCard>,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayKind::default(),
            processing_delay_ms: Config::DEFAULT_PROCESSING_DELAY_MS,
            countdown_secs: Config::DEFAULT_COUNTDOWN_SECS,
            facilitator_card: template_facilitator_card(),
        }
    }
}

/// The facilitator card shipped in `default_config.toml`.
fn template_facilitator_card() -> Option<RegisteredCard> {
    let template: toml::Table = default_config_template().parse().ok()?;
    template
        .get("payment")?
        .get("facilitator_card")?
        .clone()
        .try_into()
        .ok()
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Also write a daily rolling log file under `<home>/logs`.
    pub file: bool,
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub ui: UiConfig,
    pub payment: PaymentConfig,
    pub log: LogConfig,
}

impl Config {
    const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
    const DEFAULT_PROCESSING_DELAY_MS: u64 = 2500;
    const DEFAULT_COUNTDOWN_SECS: u32 = 3;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Saves only the `ui.theme` field to the config file.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, merged or written.
    pub fn save_theme(theme: Theme) -> Result<()> {
        Self::save_theme_to(&paths::config_path(), theme)
    }

    /// Saves only the `ui.theme` field to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    ///
    /// # Errors
    /// Returns an error if the config cannot be read, merged or written.
    pub fn save_theme_to(path: &Path, theme: Theme) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["ui"]["theme"] = value(theme.display_name());

        Self::write_config(path, &doc.to_string())
    }

    /// Resolves the API base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is not a valid absolute URL.
    pub fn api_base_url(&self) -> Result<String> {
        let env_url = std::env::var(API_URL_ENV).ok();
        resolve_base_url(env_url.as_deref(), &self.api.base_url)
    }

    pub fn api_timeout(&self) -> Option<Duration> {
        if self.api.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.api.timeout_secs)))
        }
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.payment.processing_delay_ms)
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Uses the embedded template for structure/comments and merges
    /// generated values from `Config::default()` into it.
    ///
    /// # Errors
    /// Returns an error if serialization or template parsing fails.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

fn resolve_base_url(env_url: Option<&str>, config_url: &str) -> Result<String> {
    let chosen = env_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .or_else(|| Some(config_url.trim()).filter(|url| !url.is_empty()))
        .unwrap_or(Config::DEFAULT_BASE_URL);

    url::Url::parse(chosen).with_context(|| format!("Invalid API base URL: {chosen}"))?;
    Ok(chosen.trim_end_matches('/').to_string())
}
