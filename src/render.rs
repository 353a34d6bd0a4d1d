//! Minimal WordprocessingML writer for the comparison table.
//!
//! Landscape page, a title, a timestamp line and one 4-column table. Only the
//! parts Word needs to open the file are written.

use crate::reconcile::ComparisonTable;
use anyhow::{Context, Result};
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const TITLE: &str = "Документ створено за допомогою скрипта перекладу LegalTransUA";
const HEADER_FILL: &str = "D9EAF7";
const INDEX_FILL: &str = "E0E0E0";

// Twips. 10in table, first column 5%, rest split evenly.
const TABLE_WIDTH: u32 = 14400;
const INDEX_COL_WIDTH: u32 = TABLE_WIDTH / 20;
const TEXT_COL_WIDTH: u32 = (TABLE_WIDTH - INDEX_COL_WIDTH) / 3;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

pub fn column_headers(table: &ComparisonTable) -> [String; 4] {
    [
        "№".to_string(),
        "Оригінальний текст".to_string(),
        display_backend(&table.backend_a_name),
        display_backend(&table.backend_b_name),
    ]
}

fn display_backend(name: &str) -> String {
    match name {
        "google" => "Google Translate".into(),
        "openai" => "OpenAI GPT".into(),
        other => other.into(),
    }
}

pub fn write_docx(path: &Path, table: &ComparisonTable, timestamp: &str) -> Result<()> {
    let bytes = render_docx(table, timestamp)?;
    std::fs::write(path, bytes).with_context(|| format!("write docx: {}", path.display()))
}

pub fn render_docx(table: &ComparisonTable, timestamp: &str) -> Result<Vec<u8>> {
    let document = document_xml(table, timestamp);

    let mut zout = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/document.xml", document.as_str()),
    ] {
        let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zout.start_file(name, opts)
            .with_context(|| format!("start zip file: {name}"))?;
        zout.write_all(data.as_bytes())
            .with_context(|| format!("write zip file: {name}"))?;
    }
    let cursor = zout.finish().context("finish zip")?;
    Ok(cursor.into_inner())
}

fn document_xml(table: &ComparisonTable, timestamp: &str) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/><w:sz w:val="24"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(TITLE)
    ));
    body.push_str(&format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(&format!("Дата та час перекладу: {timestamp}"))
    ));

    body.push_str(r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="0" w:type="auto"/><w:tblBorders>"#);
    for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        body.push_str(&format!(
            r#"<w:{edge} w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#
        ));
    }
    body.push_str("</w:tblBorders></w:tblPr><w:tblGrid>");
    for w in column_widths() {
        body.push_str(&format!(r#"<w:gridCol w:w="{w}"/>"#));
    }
    body.push_str("</w:tblGrid>");

    body.push_str("<w:tr>");
    for (i, header) in column_headers(table).iter().enumerate() {
        body.push_str(&cell(header, column_widths()[i], Some(HEADER_FILL), "center", true));
    }
    body.push_str("</w:tr>");

    for row in &table.rows {
        body.push_str("<w:tr>");
        let index = row.index.to_string();
        let texts = [&index, &row.source, &row.backend_a, &row.backend_b];
        for (i, text) in texts.iter().enumerate() {
            let fill = if i == 0 { Some(INDEX_FILL) } else { None };
            body.push_str(&cell(text, column_widths()[i], fill, "both", false));
        }
        body.push_str("</w:tr>");
    }
    body.push_str("</w:tbl>");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:p/><w:sectPr><w:pgSz w:w="16838" w:h="11906" w:orient="landscape"/><w:pgMar w:top="720" w:right="720" w:bottom="720" w:left="720" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#
    )
}

fn column_widths() -> [u32; 4] {
    [INDEX_COL_WIDTH, TEXT_COL_WIDTH, TEXT_COL_WIDTH, TEXT_COL_WIDTH]
}

fn cell(text: &str, width: u32, fill: Option<&str>, align: &str, bold: bool) -> String {
    let shading = fill
        .map(|f| format!(r#"<w:shd w:val="clear" w:color="auto" w:fill="{f}"/>"#))
        .unwrap_or_default();
    let size = if bold { "" } else { r#"<w:sz w:val="18"/>"# };
    let b = if bold { "<w:b/>" } else { "" };

    let mut runs = String::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            runs.push_str("<w:br/>");
        }
        runs.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t>"#,
            escape(line)
        ));
    }

    format!(
        r#"<w:tc><w:tcPr><w:tcW w:w="{width}" w:type="dxa"/>{shading}</w:tcPr><w:p><w:pPr><w:jc w:val="{align}"/></w:pPr><w:r><w:rPr>{b}{size}</w:rPr>{runs}</w:r></w:p></w:tc>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ComparisonRow;
    use std::io::Read;

    #[test]
    fn docx_contains_escaped_rows() {
        let table = ComparisonTable {
            backend_a_name: "google".into(),
            backend_b_name: "openai".into(),
            rows: vec![ComparisonRow {
                index: 1,
                source: "Fish & <chips>".into(),
                backend_a: "Риба".into(),
                backend_b: "Риба\nз картоплею".into(),
            }],
        };
        let bytes = render_docx(&table, "2025-02-21 10:00:00").unwrap();
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        zip.by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert!(xml.contains("Fish &amp; &lt;chips&gt;"));
        assert!(xml.contains("Google Translate"));
        assert!(xml.contains("Риба</w:t><w:br/><w:t xml:space=\"preserve\">з картоплею"));
        assert!(xml.contains("w:orient=\"landscape\""));
    }
}
