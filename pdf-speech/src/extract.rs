//! Page text extraction.
//!
//! PDFs go through poppler's `pdftotext`, which separates pages with form
//! feeds. Any other file is read as UTF-8 text using the same convention.

use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use std::process::Command;

/// Page separator in extracted text.
const PAGE_BREAK: char = '\x0c';

/// Extract text from a document as a list of pages.
///
/// Pages holding only whitespace are dropped.
pub fn read_pages(path: &Path) -> Result<Vec<String>> {
    info!("Extracting text from {} (this may take a while for large files)...", path.display());

    let text = if is_pdf(path) {
        pdftotext(path)?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    let pages = split_pages(&text);
    info!("Found {} non-empty pages of text.", pages.len());
    Ok(pages)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Run `pdftotext` and capture its output.
fn pdftotext(path: &Path) -> Result<String> {
    let output = Command::new("pdftotext")
        .args(["-enc", "UTF-8"])
        .arg(path)
        .arg("-")
        .output()
        .context("Failed to run pdftotext (install poppler-utils)")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("pdftotext failed: {}", stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Split text on form feeds, dropping blank pages.
pub fn split_pages(text: &str) -> Vec<String> {
    text.split(PAGE_BREAK)
        .filter(|p| !p.trim().is_empty())
        .map(str::to_string)
        .collect()
}
