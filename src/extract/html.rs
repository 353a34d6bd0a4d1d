use crate::{config::Extract, error::ExtractError};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::time::Duration;
use tracing::debug;

pub fn extract_url(cfg: &Extract, url: &str) -> Result<Vec<String>, ExtractError> {
    let fetch_err = |reason: String| ExtractError::FetchError {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .timeout(Duration::from_secs(cfg.timeout_seconds))
        .build()
        .map_err(|e| fetch_err(e.to_string()))?;

    let resp = client.get(url).send().map_err(|e| fetch_err(e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(fetch_err(format!("HTTP status {status}")));
    }

    let body = resp.bytes().map_err(|e| fetch_err(e.to_string()))?;
    debug!(url, bytes = body.len(), "fetched page");
    paragraphs_from_html(&body).map_err(|e| ExtractError::Parse {
        kind: "html",
        path: url.to_string(),
        reason: e.to_string(),
    })
}

/// Text of every `<p>` element, in document order. Untrimmed; the caller
/// trims and drops empties.
pub fn paragraphs_from_html(data: &[u8]) -> std::io::Result<Vec<String>> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut &data[..])?;

    let mut out = Vec::new();
    collect_paragraphs(&dom.document, &mut out);
    Ok(out)
}

fn collect_paragraphs(node: &Handle, out: &mut Vec<String>) {
    if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == "p" {
            let mut text = String::new();
            collect_text(node, &mut text);
            out.push(text);
            return;
        }
    }
    for child in node.children.borrow().iter() {
        collect_paragraphs(child, out);
    }
}

fn collect_text(node: &Handle, buf: &mut String) {
    match node.data {
        NodeData::Text { ref contents } => buf.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, buf);
            }
        }
    }
}
