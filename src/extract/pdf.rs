use crate::error::ExtractError;
use std::path::Path;
use tracing::debug;

/// Every non-blank physical line of every page, in page order.
///
/// A line is not a semantic paragraph: wrapped sentences come out split.
/// Downstream alignment assumes exactly this granularity, so it is kept.
pub fn extract_file(path: &Path) -> Result<Vec<String>, ExtractError> {
    let parse_err = |reason: String| ExtractError::Parse {
        kind: "pdf",
        path: path.display().to_string(),
        reason,
    };

    if !path.exists() {
        return Err(ExtractError::Io {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }

    let doc = lopdf::Document::load(path).map_err(|e| parse_err(e.to_string()))?;
    let pages = doc.get_pages();
    debug!(pages = pages.len(), path = %path.display(), "loaded pdf");

    let mut full_text = String::new();
    for page_no in pages.keys() {
        let text = doc
            .extract_text(&[*page_no])
            .map_err(|e| parse_err(format!("page {page_no}: {e}")))?;
        full_text.push_str(&text);
        full_text.push('\n');
    }

    Ok(split_lines(&full_text))
}

pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
