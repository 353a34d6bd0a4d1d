use crate::{
    backend::{ChatBackend, UnitBackend},
    batch::{BATCH_FAILURE_SENTINEL, BatchRun, BatchTranslator, PARSE_FAILURE_SENTINEL},
    config::Config,
    extract::{self, SourceKind},
    reconcile::{ComparisonTable, reconcile},
    report::{BackendReport, BatchReport, JobReport},
    retry::RetryPolicy,
    unit::{UNIT_FAILURE_SENTINEL, UnitTranslator},
    util::now_rfc3339,
};
use anyhow::{Context, Result, anyhow};
use std::time::Instant;
use tracing::{info, warn};

/// Completion callbacks, `(done, total)`. Never called from a pool worker:
/// `unit` fires on the thread collecting per-paragraph results, `batch` on the
/// thread that called [`Pipeline::translate`]. Each sequence is in order.
pub trait Progress: Sync {
    fn unit(&self, _done: usize, _total: usize) {}
    fn batch(&self, _done: usize, _total: usize) {}
}

pub struct NoProgress;
impl Progress for NoProgress {}

pub enum Outcome {
    /// Extraction produced no paragraphs.
    Empty,
    Done(JobOutput),
}

pub struct JobOutput {
    pub table: ComparisonTable,
    pub report: JobReport,
}

pub struct Pipeline<U: UnitBackend, C: ChatBackend> {
    cfg: Config,
    unit: UnitTranslator<U>,
    batch: BatchTranslator<C>,
}

impl<U: UnitBackend, C: ChatBackend> Pipeline<U, C> {
    pub fn new(cfg: &Config, unit_backend: U, chat_backend: C) -> Self {
        let t = &cfg.translation;
        Self {
            cfg: cfg.clone(),
            unit: UnitTranslator::new(
                unit_backend,
                RetryPolicy::from_config(t),
                t.concurrency,
            ),
            batch: BatchTranslator::new(chat_backend, t.batch_size, t.batch_parallelism),
        }
    }

    pub fn run_job(&self, source: &str, progress: &dyn Progress) -> Result<Outcome> {
        let started = now_rfc3339();
        let kind = extract::detect(source)?;
        let paragraphs = extract::extract(&self.cfg.extract, source)
            .with_context(|| format!("extracting {source}"))?;

        if paragraphs.is_empty() {
            warn!("no text found in {source}");
            return Ok(Outcome::Empty);
        }

        let (table, batch_run) = self.translate(&paragraphs, progress)?;
        let report = self.report(source, kind, started, &table, &batch_run);
        Ok(Outcome::Done(JobOutput { table, report }))
    }

    /// Runs both backends over `paragraphs` side by side and aligns the
    /// results into one table. Only a misalignment bug can fail here.
    pub fn translate(
        &self,
        paragraphs: &[String],
        progress: &dyn Progress,
    ) -> Result<(ComparisonTable, BatchRun)> {
        let t0 = Instant::now();
        info!(
            "translating {} paragraphs: {} x{} workers, {} in batches of {}",
            paragraphs.len(),
            self.unit.backend_name(),
            self.cfg.translation.concurrency,
            self.batch.backend_name(),
            self.batch.batch_size()
        );

        let (unit_results, batch_run) = std::thread::scope(|s| {
            let unit_handle = s.spawn(|| {
                self.unit
                    .translate_all(paragraphs, |done, total| progress.unit(done, total))
            });
            let batch_run = self
                .batch
                .translate_all(paragraphs, |done, total| progress.batch(done, total));
            let unit_results = unit_handle
                .join()
                .map_err(|_| anyhow!("per-paragraph translation thread panicked"));
            unit_results.map(|u| (u, batch_run))
        })?;

        let table = reconcile(
            paragraphs,
            unit_results,
            batch_run.translations.clone(),
            (self.unit.backend_name(), self.batch.backend_name()),
        )?;

        info!(
            "translation finished in {:.1}s ({} rows)",
            t0.elapsed().as_secs_f64(),
            table.len()
        );
        Ok((table, batch_run))
    }

    fn report(
        &self,
        source: &str,
        kind: SourceKind,
        started: String,
        table: &ComparisonTable,
        batch_run: &BatchRun,
    ) -> JobReport {
        let t = &self.cfg.translation;
        JobReport {
            source: source.to_string(),
            source_kind: kind,
            started,
            finished: now_rfc3339(),
            paragraph_count: table.len(),
            unit: BackendReport {
                backend: self.unit.backend_name().to_string(),
                concurrency: t.concurrency,
                max_attempts: t.max_attempts,
                failed_units: table.count_a(UNIT_FAILURE_SENTINEL),
            },
            batch: BatchReport {
                backend: self.batch.backend_name().to_string(),
                batch_size: batch_run.plan.batch_size,
                batch_count: batch_run.plan.len(),
                failed_batches: batch_run.failed_batches(),
                recovered_batches: batch_run.recovered_batches(),
                failed_cells: table.count_b(&[BATCH_FAILURE_SENTINEL, PARSE_FAILURE_SENTINEL]),
                statuses: batch_run.statuses.clone(),
            },
            output_file: None,
        }
    }
}
