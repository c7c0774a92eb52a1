use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use swap_guard::platform::headless::{HeadlessDocument, HeadlessLink};
use swap_guard::{ConfirmationGuard, GuardConfig};

#[derive(Serialize)]
pub struct ScanReport {
    pub selector: String,
    pub prompt: String,
    /// Links in the whole document.
    #[serde(skip)]
    pub total: usize,
    pub guarded: Vec<HeadlessLink>,
}

pub fn scan(document: &HeadlessDocument, config: &GuardConfig) -> ScanReport {
    let guard = ConfirmationGuard::new(config.clone());
    ScanReport {
        selector: guard.matcher().css_selector(),
        prompt: config.prompt.clone(),
        total: document.len(),
        guarded: guard.select(document),
    }
}

pub fn render(report: &ScanReport, file: &Path) -> Vec<String> {
    if report.guarded.is_empty() {
        return vec![format!("No links match {}", report.selector)];
    }
    let mut lines = vec![format!(
        "{} of {} link(s) guarded in {}:",
        report.guarded.len(),
        report.total,
        file.display()
    )];
    for link in &report.guarded {
        lines.push(format!(
            "  [{}] {} {}",
            link.position,
            link.href.as_deref().unwrap_or_default(),
            link.text
        ));
    }
    lines
}

pub fn run(file: &Path, config: &GuardConfig, json: bool) -> Result<()> {
    let document = super::read_document(file)?;
    let report = scan(&document, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for line in render(&report, file) {
        println!("{line}");
    }
    Ok(())
}
