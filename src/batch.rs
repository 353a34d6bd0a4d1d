//! Batched prompt translation.
//!
//! A batch of paragraphs is serialized as one numbered list (`1) text`),
//! sent to a chat backend in a single call, and the free-form reply is parsed
//! back into exactly one translation per submitted paragraph. The parser is a
//! pure function so its recovery rules can be exercised without a network.

use crate::{
    backend::ChatBackend,
    batch_plan::{BatchPlan, BatchRange},
    pool,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Every cell of a batch whose backend call failed.
pub const BATCH_FAILURE_SENTINEL: &str = "Помилка перекладу (OpenAI)";
/// Cells the reply did not provide an entry for.
pub const PARSE_FAILURE_SENTINEL: &str = "Помилка: не вдалося розпарсити відповідь GPT";

pub const SYSTEM_PROMPT: &str = "You are a translator from English to Ukrainian.";
const USER_PREAMBLE: &str = "Translate the following list of paragraphs from English to Ukrainian. \
Keep the same numbering and order. Return only the numbered translations without any extra text.";

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\)\s*(.*)$").expect("numbered line regex"));

/// `1) first\n2) second...`, numbering 1-based within the batch.
pub fn serialize_batch(units: &[String]) -> String {
    units
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}) {}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_user_prompt(units: &[String]) -> String {
    format!("{USER_PREAMBLE}\n\n{}", serialize_batch(units))
}

/// How a reply had to be bent to fit the submitted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recovery {
    /// No numbered line at all; the whole reply became the first entry.
    Unnumbered,
    /// Numbered lines with no text; those slots got the sentinel.
    BlankEntries { count: usize },
    /// Fewer entries than submitted; the tail was padded.
    Padded { found: usize, expected: usize },
    /// More entries than submitted; the excess was dropped.
    Truncated { found: usize, expected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    /// Always exactly `expected` long.
    pub translations: Vec<String>,
    pub recovery: Option<Recovery>,
}

/// Splits a numbered-list reply into `expected` translations.
///
/// A line of the form `<digits>) rest` opens a new entry; any other non-blank
/// line continues the open entry, joined with a space. Text before the first
/// numbered line is dropped rather than read as entry 1, which would shift
/// every later translation down a slot. A numbered line that
/// never receives text keeps its position but holds
/// [`PARSE_FAILURE_SENTINEL`]. A reply with no numbered line but some text
/// becomes the first entry, its lines joined the same way. Missing entries
/// are padded with the sentinel, surplus ones truncated.
pub fn parse_numbered_response(raw: &str, expected: usize) -> ParsedReply {
    let mut entries: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = NUMBERED_LINE.captures(line) {
            if let Some(done) = current.take() {
                entries.push(done.trim().to_string());
            }
            current = Some(caps.get(2).map_or("", |m| m.as_str()).to_string());
        } else if let Some(cur) = current.as_mut() {
            cur.push(' ');
            cur.push_str(line);
        }
    }
    if let Some(done) = current.take() {
        entries.push(done.trim().to_string());
    }

    let mut recovery = None;
    let mut blank = 0;
    for entry in entries.iter_mut().filter(|e| e.is_empty()) {
        *entry = PARSE_FAILURE_SENTINEL.to_string();
        blank += 1;
    }
    if blank > 0 {
        recovery = Some(Recovery::BlankEntries { count: blank });
    }

    if entries.is_empty() {
        let joined = raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.is_empty() {
            entries.push(joined);
            recovery = Some(Recovery::Unnumbered);
        }
    }

    let found = entries.len();
    if found < expected {
        entries.resize(expected, PARSE_FAILURE_SENTINEL.to_string());
        if recovery != Some(Recovery::Unnumbered) {
            recovery = Some(Recovery::Padded { found, expected });
        }
    } else if found > expected {
        entries.truncate(expected);
        recovery = Some(Recovery::Truncated { found, expected });
    }

    ParsedReply {
        translations: entries,
        recovery,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Ok,
    Recovered(Recovery),
    Failed,
}

#[derive(Debug, Clone)]
pub struct BatchResult {
    pub translations: Vec<String>,
    pub status: BatchStatus,
}

impl Default for BatchResult {
    fn default() -> Self {
        Self {
            translations: Vec::new(),
            status: BatchStatus::Ok,
        }
    }
}

/// Outcome of translating a whole document in batches.
#[derive(Debug, Clone)]
pub struct BatchRun {
    /// One entry per paragraph, in paragraph order.
    pub translations: Vec<String>,
    pub plan: BatchPlan,
    pub statuses: Vec<BatchStatus>,
}

impl BatchRun {
    pub fn failed_batches(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| matches!(s, BatchStatus::Failed))
            .count()
    }

    pub fn recovered_batches(&self) -> usize {
        self.statuses
            .iter()
            .filter(|s| matches!(s, BatchStatus::Recovered(_)))
            .count()
    }
}

pub struct BatchTranslator<C: ChatBackend> {
    backend: C,
    batch_size: usize,
    parallelism: usize,
}

impl<C: ChatBackend> BatchTranslator<C> {
    pub fn new(backend: C, batch_size: usize, parallelism: usize) -> Self {
        Self {
            backend,
            batch_size: batch_size.max(1),
            parallelism: parallelism.max(1),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// One translation per unit, same order, same length. Never fails.
    pub fn translate_batch(&self, units: &[String]) -> Vec<String> {
        self.translate_batch_detailed(units).translations
    }

    pub fn translate_batch_detailed(&self, units: &[String]) -> BatchResult {
        if units.is_empty() {
            return BatchResult::default();
        }

        let user = build_user_prompt(units);
        debug!(backend = self.backend.name(), units = units.len(), "batch prompt:\n{user}");

        let raw = match self.backend.complete(SYSTEM_PROMPT, &user) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    units = units.len(),
                    "batch failed: {e}"
                );
                return BatchResult {
                    translations: vec![BATCH_FAILURE_SENTINEL.to_string(); units.len()],
                    status: BatchStatus::Failed,
                };
            }
        };

        let parsed = parse_numbered_response(&raw, units.len());
        let status = match parsed.recovery {
            None => BatchStatus::Ok,
            Some(r) => {
                warn!(
                    backend = self.backend.name(),
                    recovery = ?r,
                    "reply did not match the numbered format; recovered"
                );
                BatchStatus::Recovered(r)
            }
        };

        BatchResult {
            translations: parsed.translations,
            status,
        }
    }

    /// Translates all paragraphs batch by batch. Batch `i` owns output slots
    /// `[i*size, i*size + len)`, whatever order batches complete in.
    pub fn translate_all(
        &self,
        paragraphs: &[String],
        mut progress: impl FnMut(usize, usize),
    ) -> BatchRun {
        let plan = BatchPlan::new(paragraphs.len(), self.batch_size);
        let total = plan.len();

        let run_one = |b: &BatchRange| self.translate_batch_detailed(&paragraphs[b.slots()]);
        let report = |done: usize, total: usize| {
            info!(backend = self.backend.name(), "batch {done}/{total} done");
        };

        let results: Vec<BatchResult> = if self.parallelism > 1 {
            pool::run_indexed(
                &plan.batches,
                self.parallelism,
                |_, b| run_one(b),
                |done, total| {
                    report(done, total);
                    progress(done, total);
                },
            )
        } else {
            let mut out = Vec::with_capacity(total);
            for (i, b) in plan.batches.iter().enumerate() {
                out.push(run_one(b));
                report(i + 1, total);
                progress(i + 1, total);
            }
            out
        };

        let mut translations = vec![String::new(); paragraphs.len()];
        let mut statuses = Vec::with_capacity(total);
        for (b, res) in plan.batches.iter().zip(results) {
            for (slot, t) in b.slots().zip(res.translations) {
                translations[slot] = t;
            }
            statuses.push(res.status);
        }

        BatchRun {
            translations,
            plan,
            statuses,
        }
    }
}
