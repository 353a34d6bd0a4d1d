use crate::{batch::BatchStatus, extract::SourceKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub source: String,
    pub source_kind: SourceKind,
    pub started: String,
    pub finished: String,
    pub paragraph_count: usize,
    pub unit: BackendReport,
    pub batch: BatchReport,
    #[serde(default)]
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendReport {
    pub backend: String,
    pub concurrency: usize,
    pub max_attempts: u32,
    /// Paragraphs that ended up as the failure sentinel.
    pub failed_units: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub backend: String,
    pub batch_size: usize,
    pub batch_count: usize,
    pub failed_batches: usize,
    pub recovered_batches: usize,
    /// Cells holding either batch sentinel.
    pub failed_cells: usize,
    pub statuses: Vec<BatchStatus>,
}
