//! Certificate download.

use std::path::Path;

use anyhow::{Context, Result};
use skillcert_core::certificate::{self, NOT_EARNED};

use crate::cli::app::App;

pub async fn download(app: &App, dir: &Path, open_after: bool) -> Result<()> {
    let session = app.session()?;
    let info = app
        .api
        .certificate(session.user.id)
        .await
        .context("load certificate")?;
    if !info.has_certificate {
        anyhow::bail!(NOT_EARNED);
    }

    let bytes = app
        .api
        .download_certificate(session.user.id)
        .await
        .context("download certificate")?;
    let holder = info.name.as_deref().unwrap_or(&session.user.name);
    let path = certificate::save(dir, holder, &bytes)?;
    app.ui.success(format!("Saved {}", path.display()));

    if open_after && let Err(err) = open::that(&path) {
        tracing::warn!(error = %err, path = %path.display(), "could not open certificate");
        app.ui.muted("Could not open the file automatically.");
    }
    Ok(())
}
