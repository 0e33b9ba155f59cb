//! Per-run application context.
//!
//! Everything a screen needs is carried here and passed down explicitly:
//! the API client, the persisted session, the signed-in user and the theme.

use anyhow::{Context, Result};
use skillcert_core::api::ApiClient;
use skillcert_core::config::Config;
use skillcert_core::flow::ResultCache;
use skillcert_core::session::{Session, SessionStore};

use super::prompt::Prompt;
use super::render::Ui;

pub const NOT_SIGNED_IN: &str = "Not signed in. Run `skillcert login`.";

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub store: SessionStore,
    pub session: Option<Session>,
    pub ui: Ui,
    pub results: ResultCache,
    pub prompt: Prompt,
}

impl App {
    /// Builds the client and restores any stored session.
    pub async fn open(config: Config) -> Result<Self> {
        let mut app = Self::offline(config)?;
        app.session = app.store.rehydrate(&mut app.api).await?;
        Ok(app)
    }

    /// Builds the client without contacting the server; no session is restored.
    pub fn offline(config: Config) -> Result<Self> {
        let api = ApiClient::from_config(&config)?;
        let store = SessionStore::open().context("open session store")?;
        let ui = Ui::new(config.ui.theme);
        Ok(Self {
            config,
            api,
            store,
            session: None,
            ui,
            results: ResultCache::default(),
            prompt: Prompt::stdin(),
        })
    }

    pub fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!(NOT_SIGNED_IN))
    }
}
