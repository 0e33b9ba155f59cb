//! Certificate download helpers.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const NOT_EARNED: &str = "You need to pass the test first to receive your certificate.";

/// `certificate_<name>.pdf` with whitespace runs replaced by `_`.
pub fn file_name(holder: &str) -> String {
    let name = holder.split_whitespace().collect::<Vec<_>>().join("_");
    if name.is_empty() {
        "certificate.pdf".to_string()
    } else {
        format!("certificate_{name}.pdf")
    }
}

/// Writes the PDF into `dir` and returns the full path.
///
/// # Errors
/// Returns an error if the directory cannot be created or the file written.
pub fn save(dir: &Path, holder: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    let path = dir.join(file_name(holder));
    fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), size = bytes.len(), "certificate saved");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_file_name_collapses_whitespace() {
        assert_eq!(file_name("Amina  Khan"), "certificate_Amina_Khan.pdf");
        assert_eq!(file_name(" Bilal\tAhmed Raza "), "certificate_Bilal_Ahmed_Raza.pdf");
        assert_eq!(file_name("   "), "certificate.pdf");
    }

    #[test]
    fn test_save_writes_bytes() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("downloads");
        let path = save(&out, "Amina Khan", b"%PDF-1.4").unwrap();
        assert_eq!(path, out.join("certificate_Amina_Khan.pdf"));
        assert_eq!(fs::read(path).unwrap(), b"%PDF-1.4");
    }
}
