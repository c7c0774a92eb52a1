pub mod scan;
pub mod simulate;

use std::path::Path;

use anyhow::{Context, Result};
use swap_guard::GuardConfig;
use swap_guard::platform::headless::HeadlessDocument;

pub fn load_config(path: Option<&Path>) -> Result<GuardConfig> {
    match path {
        Some(path) => {
            let config = GuardConfig::load(path)
                .with_context(|| format!("Failed to load guard config {}", path.display()))?;
            log::debug!("loaded guard config from {}", path.display());
            Ok(config)
        }
        None => Ok(GuardConfig::default()),
    }
}

pub fn read_document(file: &Path) -> Result<HeadlessDocument> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let document = HeadlessDocument::parse_html(&html);
    log::debug!("{}: {} link(s)", file.display(), document.len());
    Ok(document)
}
