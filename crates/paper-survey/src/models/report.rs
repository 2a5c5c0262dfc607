//! Per-stage results carrying both successes and soft failures.

use serde::Serialize;

/// Output of a stage that tolerates per-item failures.
///
/// Expected failures (one source down, one PDF missing) land in `failures`
/// instead of aborting the stage; the caller decides whether an empty `items`
/// is fatal.
#[derive(Debug)]
pub struct StageReport<T, E = ItemFailure> {
    /// Successful outputs, in stage order.
    pub items: Vec<T>,
    /// Recorded soft failures.
    pub failures: Vec<E>,
}

impl<T, E> StageReport<T, E> {
    /// An empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new(), failures: Vec::new() }
    }

    /// Whether any item failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl<T, E> Default for StageReport<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A per-paper failure kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Paper that failed.
    pub paper_id: String,
    /// Human-readable cause.
    pub reason: String,
}

impl ItemFailure {
    /// Record a failure for a paper.
    #[must_use]
    pub fn new(paper_id: impl Into<String>, reason: impl ToString) -> Self {
        Self { paper_id: paper_id.into(), reason: reason.to_string() }
    }
}
