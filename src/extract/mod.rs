//! Source → ordered paragraphs.
//!
//! The source kind is decided purely from the shape of the string: an
//! http(s) scheme selects the web extractor, otherwise the path suffix picks
//! the PDF or DOCX reader. Every extractor yields trimmed, non-empty units in
//! document order.

pub mod docx;
pub mod html;
pub mod pdf;

use crate::{config::Extract, error::ExtractError, util::looks_like_url};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Web,
    Pdf,
    Docx,
}

/// One extracted unit of source text. `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub index: usize,
    pub text: String,
}

pub fn detect(source: &str) -> Result<SourceKind, ExtractError> {
    if looks_like_url(source) {
        return Ok(SourceKind::Web);
    }
    let ext = Path::new(source)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => Ok(SourceKind::Pdf),
        Some("docx") => Ok(SourceKind::Docx),
        _ => Err(ExtractError::UnsupportedSourceKind(source.to_string())),
    }
}

pub fn extract(cfg: &Extract, source: &str) -> Result<Vec<String>, ExtractError> {
    let kind = detect(source)?;
    debug!(?kind, source, "extracting");

    let raw = match kind {
        SourceKind::Web => html::extract_url(cfg, source.trim())?,
        SourceKind::Pdf => pdf::extract_file(Path::new(source))?,
        SourceKind::Docx => docx::extract_file(Path::new(source))?,
    };

    let mut units = finish_units(cfg, raw);
    if cfg.max_paragraphs > 0 && units.len() > cfg.max_paragraphs {
        info!(
            "truncating {} paragraphs to max_paragraphs={}",
            units.len(),
            cfg.max_paragraphs
        );
        units.truncate(cfg.max_paragraphs);
    }

    info!("extracted {} paragraphs from {:?} source", units.len(), kind);
    Ok(units)
}

/// Same as [`extract`] but tagged with 1-based positions.
pub fn extract_paragraphs(cfg: &Extract, source: &str) -> Result<Vec<Paragraph>, ExtractError> {
    Ok(number(extract(cfg, source)?))
}

pub fn number(units: Vec<String>) -> Vec<Paragraph> {
    units
        .into_iter()
        .enumerate()
        .map(|(i, text)| Paragraph { index: i + 1, text })
        .collect()
}

fn finish_units(cfg: &Extract, raw: Vec<String>) -> Vec<String> {
    raw.into_iter()
        .map(|s| {
            if cfg.normalize_unicode {
                normalize_text(&s)
            } else {
                s
            }
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// NFKC plus removal of ASCII control characters other than tab and newline.
pub fn normalize_text(s: &str) -> String {
    s.nfkc()
        .filter(|&ch| ch == '\n' || ch == '\t' || !ch.is_ascii_control())
        .collect()
}
