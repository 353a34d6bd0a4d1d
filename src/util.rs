use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use time::format_description::{BorrowedFormatItem, well_known::Rfc3339};
use time::macros::format_description;

const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("filename regex"));

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// `YYYY-MM-DD HH:MM:SS` in UTC, for human-facing headers.
pub fn now_display() -> String {
    time::OffsetDateTime::now_utc()
        .format(DISPLAY_FORMAT)
        .unwrap_or_else(|_| now_rfc3339())
}

pub fn today_ymd() -> String {
    time::OffsetDateTime::now_utc()
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| "1970-01-01".to_string())
}

pub fn looks_like_url(s: &str) -> bool {
    let s = s.trim_start().to_ascii_lowercase();
    s.starts_with("http://") || s.starts_with("https://")
}

/// Replaces characters that are not allowed in file names on common platforms.
pub fn sanitize_filename(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "_").into_owned()
}

/// `<stem> (Translated by LTUA <date>).docx`; URL sources get a fixed stem.
pub fn output_filename(source: &str, date: &str) -> String {
    let base = if looks_like_url(source) {
        "Document From Internet".to_string()
    } else {
        let stem = Path::new(source)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        sanitize_filename(stem)
    };
    format!("{base} (Translated by LTUA {date}).docx")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_for_file_and_url() {
        assert_eq!(
            output_filename("/tmp/in/My:File?.docx", "2025-02-21"),
            "My_File_ (Translated by LTUA 2025-02-21).docx"
        );
        assert_eq!(
            output_filename("https://example.org/page", "2025-02-21"),
            "Document From Internet (Translated by LTUA 2025-02-21).docx"
        );
    }

    #[test]
    fn display_timestamp_shape() {
        let d = today_ymd();
        assert_eq!(d.len(), 10);
        assert_eq!(&d[4..5], "-");
        let ts = now_display();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[10..11], " ");
    }
}
