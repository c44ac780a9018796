use ordergrid_engine::engine::{CellRef, index_to_letters, parse_range};

use crate::error::{OrderGridError, Result};

/// A selection as two corners, in the order the user made it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub start: CellRef,
    pub end: CellRef,
}

impl Selection {
    pub fn new(start: CellRef, end: CellRef) -> Selection {
        Selection { start, end }
    }

    pub fn single(cell: CellRef) -> Selection {
        Selection::new(cell, cell)
    }

    /// Parse `A1:C3` or a single cell `B2`.
    pub fn parse(text: &str) -> Result<Selection> {
        parse_range(text)
            .map(|(start, end)| Selection::new(start, end))
            .ok_or_else(|| OrderGridError::InvalidSelection(text.to_string()))
    }

    /// Every row from `start` to `end` across all `column_count` columns.
    pub fn whole_rows(start: usize, end: usize, column_count: usize) -> Selection {
        Selection::new(
            CellRef::new(0, start),
            CellRef::new(column_count.saturating_sub(1), end),
        )
    }

    pub fn range(&self) -> CellRange {
        CellRange {
            min_row: self.start.row.min(self.end.row),
            max_row: self.start.row.max(self.end.row),
            min_col: self.start.col.min(self.end.col),
            max_col: self.start.col.max(self.end.col),
        }
    }
}

/// A normalized rectangle, bounds inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub min_row: usize,
    pub max_row: usize,
    pub min_col: usize,
    pub max_col: usize,
}

impl CellRange {
    pub fn row_count(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn col_count(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    pub fn contains_row(&self, row: usize) -> bool {
        (self.min_row..=self.max_row).contains(&row)
    }

    pub fn contains_col(&self, col: usize) -> bool {
        (self.min_col..=self.max_col).contains(&col)
    }

    pub fn origin(&self) -> CellRef {
        CellRef::new(self.min_col, self.min_row)
    }

    /// Spans every column of a sheet with `column_count` columns.
    pub fn is_whole_row(&self, column_count: usize) -> bool {
        self.min_col == 0 && self.max_col + 1 == column_count
    }

    /// Column letters covered, left to right.
    pub fn column_letters(&self) -> impl Iterator<Item = (usize, String)> {
        (self.min_col..=self.max_col).map(|c| (c, index_to_letters(c)))
    }

    /// Clip the columns to a sheet width. `None` if nothing is left.
    pub fn clip_columns(&self, column_count: usize) -> Option<CellRange> {
        if self.min_col >= column_count {
            return None;
        }
        Some(CellRange {
            max_col: self.max_col.min(column_count - 1),
            ..*self
        })
    }
}

impl std::fmt::Display for CellRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            CellRef::new(self.min_col, self.min_row),
            CellRef::new(self.max_col, self.max_row)
        )
    }
}
