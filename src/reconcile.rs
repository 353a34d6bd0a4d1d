use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// 1-based display index.
    pub index: usize,
    pub source: String,
    pub backend_a: String,
    pub backend_b: String,
}

/// One row per paragraph, in extraction order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub backend_a_name: String,
    pub backend_b_name: String,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose backend-A cell equals `sentinel`.
    pub fn count_a(&self, sentinel: &str) -> usize {
        self.rows.iter().filter(|r| r.backend_a == sentinel).count()
    }

    pub fn count_b(&self, sentinels: &[&str]) -> usize {
        self.rows
            .iter()
            .filter(|r| sentinels.contains(&r.backend_b.as_str()))
            .count()
    }
}

/// Positional zip. Both result vectors must already be aligned to
/// `paragraphs`; a length mismatch is a bug upstream and is reported, never
/// truncated away.
pub fn reconcile(
    paragraphs: &[String],
    backend_a: Vec<String>,
    backend_b: Vec<String>,
    names: (&str, &str),
) -> Result<ComparisonTable> {
    if backend_a.len() != paragraphs.len() || backend_b.len() != paragraphs.len() {
        bail!(
            "misaligned results: {} paragraphs, {} from {}, {} from {}",
            paragraphs.len(),
            backend_a.len(),
            names.0,
            backend_b.len(),
            names.1
        );
    }

    let rows = paragraphs
        .iter()
        .zip(backend_a)
        .zip(backend_b)
        .enumerate()
        .map(|(i, ((source, a), b))| ComparisonRow {
            index: i + 1,
            source: source.clone(),
            backend_a: a,
            backend_b: b,
        })
        .collect();

    Ok(ComparisonTable {
        backend_a_name: names.0.to_string(),
        backend_b_name: names.1.to_string(),
        rows,
    })
}
