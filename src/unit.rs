use crate::{backend::UnitBackend, pool, retry::RetryPolicy};
use tracing::{info, warn};

/// Cell value for a paragraph the per-paragraph backend could not translate.
pub const UNIT_FAILURE_SENTINEL: &str = "Помилка перекладу (Google)";

/// Per-paragraph translator: one backend call per paragraph, retried with
/// backoff, fanned out over a bounded worker pool.
pub struct UnitTranslator<B: UnitBackend> {
    backend: B,
    retry: RetryPolicy,
    concurrency: usize,
}

impl<B: UnitBackend> UnitTranslator<B> {
    pub fn new(backend: B, retry: RetryPolicy, concurrency: usize) -> Self {
        Self {
            backend,
            retry,
            concurrency: concurrency.max(1),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Never fails; exhausting the retries yields [`UNIT_FAILURE_SENTINEL`].
    pub fn translate_one(&self, text: &str) -> String {
        match self
            .retry
            .run(self.backend.name(), |_| self.backend.translate(text))
        {
            Ok(t) => t,
            Err(e) => {
                warn!(
                    backend = self.backend.name(),
                    "giving up after {} attempts: {e}", self.retry.max_attempts
                );
                UNIT_FAILURE_SENTINEL.to_string()
            }
        }
    }

    /// Translates every paragraph; result `i` belongs to `paragraphs[i]`.
    pub fn translate_all(
        &self,
        paragraphs: &[String],
        mut progress: impl FnMut(usize, usize),
    ) -> Vec<String> {
        pool::run_indexed(
            paragraphs,
            self.concurrency,
            |_, text| self.translate_one(text),
            |done, total| {
                info!(backend = self.backend.name(), "translated {done}/{total}");
                progress(done, total);
            },
        )
    }
}
