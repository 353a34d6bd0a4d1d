use crate::error::ExtractError;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

pub fn extract_file(path: &Path) -> Result<Vec<String>, ExtractError> {
    let io_err = |source: std::io::Error| ExtractError::Io {
        path: path.display().to_string(),
        source,
    };
    let parse_err = |reason: String| ExtractError::Parse {
        kind: "docx",
        path: path.display().to_string(),
        reason,
    };

    let f = File::open(path).map_err(io_err)?;
    let mut zip = ZipArchive::new(f).map_err(|e| parse_err(format!("read zip: {e}")))?;
    let mut part = zip
        .by_name(DOCUMENT_PART)
        .map_err(|e| parse_err(format!("{DOCUMENT_PART}: {e}")))?;
    let mut xml = Vec::with_capacity(part.size() as usize);
    part.read_to_end(&mut xml).map_err(io_err)?;

    body_paragraphs(&xml).map_err(|e| parse_err(e.to_string()))
}

/// Text of each `w:p` that is a direct child of `w:body`. Runs nested in
/// hyperlinks, smart tags and the like are included; tables are not.
pub fn body_paragraphs(xml: &[u8]) -> quick_xml::Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut out = Vec::new();
    let mut buf = Vec::new();
    // Element stack by qualified name.
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut para: Option<(usize, String)> = None;
    let mut in_text = false;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(s) => {
                let name = s.name().as_ref().to_vec();
                if name == b"w:p"
                    && para.is_none()
                    && stack.last().map(|n| n.as_slice()) == Some(&b"w:body"[..])
                {
                    para = Some((stack.len(), String::new()));
                } else if name == b"w:t" && para.is_some() {
                    in_text = true;
                }
                stack.push(name);
            }
            Event::End(e) => {
                stack.pop();
                match e.name().as_ref() {
                    b"w:t" => in_text = false,
                    b"w:p" => {
                        if let Some((depth, text)) = para.take() {
                            if depth == stack.len() {
                                out.push(text);
                            } else {
                                para = Some((depth, text));
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(s) => {
                if let Some((_, text)) = para.as_mut() {
                    match s.name().as_ref() {
                        b"w:tab" | b"w:ptab" => text.push('\t'),
                        b"w:br" | b"w:cr" => text.push('\n'),
                        _ => {}
                    }
                }
            }
            Event::Text(t) => {
                if in_text {
                    if let Some((_, text)) = para.as_mut() {
                        text.push_str(&t.unescape()?);
                    }
                }
            }
            Event::CData(t) => {
                if in_text {
                    if let Some((_, text)) = para.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                    }
                }
            }
            _ => {}
        }
    }

    Ok(out)
}
