//! Reconstruction engine: replays a template's block sequence against
//! extracted PDF lines and drives the output document writer.
//!
//! The run is single-pass and order-sensitive. Each extracted page gets its
//! own pool of normalized lines; every template page is replayed against that
//! pool, and a line consumed for one cell is never offered to another.
//! Recoverable failures (impossible merges, rejected sizes, missing matches)
//! are absorbed with conservative fallbacks; only missing inputs abort a run.

use keyword_match::MatchError;
use thiserror::Error;

mod engine;
mod pool;

pub use engine::restore;
pub use pool::LinePool;

/// Tunables for one reconstruction run.
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    /// Similarity gate handed to the line normalizer.
    pub threshold: f32,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            threshold: keyword_match::DEFAULT_THRESHOLD,
        }
    }
}

/// Counters for one extracted page, with every template page replayed
/// against it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageReport {
    pub page_number: u32,
    /// Lines the page offered to the pool.
    pub lines_offered: usize,
    /// Lines consumed by cell matches; never exceeds `lines_offered`.
    pub lines_consumed: usize,
    pub paragraphs_written: usize,
    pub cells_written: usize,
    pub merges_applied: usize,
    pub merges_skipped: usize,
}

/// Whole-run summary, one entry per extracted page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub pages: Vec<PageReport>,
}

impl RestoreReport {
    pub fn total_lines_consumed(&self) -> usize {
        self.pages.iter().map(|p| p.lines_consumed).sum()
    }

    pub fn total_cells_written(&self) -> usize {
        self.pages.iter().map(|p| p.cells_written).sum()
    }
}

/// Errors that abort a reconstruction run.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("keyword matching failed: {0}")]
    Match(#[from] MatchError),
}
