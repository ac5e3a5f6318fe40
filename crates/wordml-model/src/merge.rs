use thiserror::Error;

use crate::row::{CellChange, TableRow};

/// Errors returned by [`TableRow::merge_cells`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("start index {start} must be smaller than end index {end}")]
    StartNotBeforeEnd { start: usize, end: usize },
    #[error("merge range {start}..={end} is outside the row's {len} cells")]
    OutOfBounds { start: usize, end: usize, len: usize },
}

impl TableRow {
    /// Merge the plain cells `start..=end` into the cell at `start`.
    ///
    /// The cells after `start` are removed and the surviving cell's `w:gridSpan` is set to
    /// the number of cells it now covers (`end - start + 1`), replacing any earlier span.
    /// The row is left untouched when the range is rejected.
    pub fn merge_cells(&mut self, start: usize, end: usize) -> Result<(), MergeError> {
        if start >= end {
            return Err(MergeError::StartNotBeforeEnd { start, end });
        }
        let len = self.cell_count();
        if end >= len {
            return Err(MergeError::OutOfBounds { start, end, len });
        }

        // Highest index first so the positions still to be removed do not shift.
        for pos in (start + 1..=end).rev() {
            self.apply(CellChange::Remove(pos));
        }

        let span = u32::try_from(end - start + 1).unwrap_or(u32::MAX);
        if let Some(mut survivor) = self.cell_mut(start) {
            survivor.tc_pr_or_insert().set_grid_span(span);
        }
        log::debug!(
            "merged cells {start}..={end} of row {:?} (span {span})",
            self.id()
        );
        Ok(())
    }
}
