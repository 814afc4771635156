//! Plain-text export of composed prompts

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use eyre::{Context, Result};
use tracing::{debug, info};

use crate::form::FormError;

/// Write `text` as UTF-8 to `path`, adding `.txt` when the path has no extension
///
/// Returns the path actually written.
pub fn export_prompt(path: impl AsRef<Path>, text: &str) -> Result<PathBuf> {
    let path = path.as_ref();
    debug!(?path, text_len = text.len(), "export_prompt: called");
    if text.trim().is_empty() {
        return Err(FormError::InvalidSelection("Generate the prompt first.".to_string()).into());
    }

    let mut target = path.to_path_buf();
    if target.extension().is_none() {
        target.set_extension("txt");
    }
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(&target, text).context(format!("Failed to write {}", target.display()))?;

    info!("Exported prompt to: {}", target.display());
    Ok(target)
}

/// `{dir}/{form}-prompt-YYYYMMDD-HHMMSS.txt`
pub fn default_export_path(dir: &Path, form: &str, now: DateTime<Local>) -> PathBuf {
    dir.join(format!("{}-prompt-{}.txt", form, now.format("%Y%m%d-%H%M%S")))
}
