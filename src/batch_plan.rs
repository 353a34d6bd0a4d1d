use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPlan {
    pub paragraph_count: usize,
    pub batch_size: usize,
    pub batches: Vec<BatchRange>,
}

/// Contiguous run of paragraphs sent as one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRange {
    pub batch_index: usize,
    pub start: usize, // 0-based, inclusive
    pub len: usize,
}

impl BatchRange {
    /// Output slots this batch owns.
    pub fn slots(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

impl BatchPlan {
    /// Partitions `paragraph_count` items into runs of `batch_size`; only the
    /// last run may be shorter.
    pub fn new(paragraph_count: usize, batch_size: usize) -> BatchPlan {
        let size = batch_size.max(1);
        let batches = (0..paragraph_count)
            .step_by(size)
            .enumerate()
            .map(|(batch_index, start)| BatchRange {
                batch_index,
                start,
                len: size.min(paragraph_count - start),
            })
            .collect();

        BatchPlan {
            paragraph_count,
            batch_size: size,
            batches,
        }
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
