//! Sparse, structurally shared cell storage.
//!
//! A [`Grid`] maps `row index -> (column letters -> Cell)`. Rows are held
//! behind `Arc`s and the row table itself is an `Arc`, so cloning a grid is
//! O(1) and a mutation only copies the rows it touches (`Arc::make_mut`).
//! Snapshots for undo are therefore plain clones.
//!
//! Empty rows are never stored: removing the last cell of a row removes the
//! row, and blank cells are dropped on write.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::cell::{Cell, CellType};
use super::cell_ref::letters_to_index;

/// One row of cells keyed by column letters.
pub type Row = BTreeMap<String, Cell>;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Arc<BTreeMap<usize, Arc<Row>>>,
}

impl Grid {
    pub fn new() -> Grid {
        Grid::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of stored (non-empty) rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, row: usize, col: &str) -> Option<&Cell> {
        self.rows.get(&row)?.get(col)
    }

    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(&row).map(|r| r.as_ref())
    }

    /// Stored row indices in ascending order.
    pub fn row_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = (usize, &Row)> + '_ {
        self.rows.iter().map(|(idx, row)| (*idx, row.as_ref()))
    }

    pub fn max_row(&self) -> Option<usize> {
        self.rows.keys().next_back().copied()
    }

    /// Every stored cell with its row index and column index.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        self.rows.iter().flat_map(|(r, row)| {
            row.iter()
                .filter_map(move |(col, cell)| letters_to_index(col).map(|c| (*r, c, cell)))
        })
    }

    /// True when both grids share the same row allocation for `row`.
    pub fn shares_row_with(&self, other: &Grid, row: usize) -> bool {
        match (self.rows.get(&row), other.rows.get(&row)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Store a cell, replacing whatever was there. Blank cells are removed instead.
    pub fn set(&mut self, row: usize, col: &str, cell: Cell) {
        if cell.is_blank() {
            self.remove(row, col);
            return;
        }
        let rows = Arc::make_mut(&mut self.rows);
        let entry = rows.entry(row).or_default();
        Arc::make_mut(entry).insert(col.to_string(), cell);
    }

    /// Modify a cell in place, creating it if absent. The cell is dropped if
    /// the update leaves it blank.
    pub fn update<F>(&mut self, row: usize, col: &str, f: F)
    where
        F: FnOnce(&mut Cell),
    {
        let mut cell = self.get(row, col).cloned().unwrap_or_default();
        f(&mut cell);
        self.set(row, col, cell);
    }

    /// Replace only the contents of a cell, keeping style, spans and flags.
    pub fn set_contents(&mut self, row: usize, col: &str, contents: CellType) {
        self.update(row, col, |cell| cell.contents = contents);
    }

    /// Remove a cell. The row goes away with its last cell.
    pub fn remove(&mut self, row: usize, col: &str) -> Option<Cell> {
        if self.get(row, col).is_none() {
            return None;
        }
        let rows = Arc::make_mut(&mut self.rows);
        let entry = rows.get_mut(&row)?;
        let removed = Arc::make_mut(entry).remove(col);
        if entry.is_empty() {
            rows.remove(&row);
        }
        removed
    }

    /// Remove rows `start..=end` and move every later row up by the number
    /// removed. Moved rows keep their allocations.
    pub fn delete_rows(&mut self, start: usize, end: usize) {
        let count = end - start + 1;
        let shifted: BTreeMap<usize, Arc<Row>> = self
            .rows
            .iter()
            .filter_map(|(idx, row)| {
                if *idx < start {
                    Some((*idx, Arc::clone(row)))
                } else if *idx > end {
                    Some((*idx - count, Arc::clone(row)))
                } else {
                    None
                }
            })
            .collect();
        self.rows = Arc::new(shifted);
    }

    /// Drop rows that ended up empty (e.g. after deserializing foreign data).
    pub fn prune(&mut self) {
        if self.rows.values().all(|r| !r.is_empty() && r.values().all(|c| !c.is_blank())) {
            return;
        }
        let rows = Arc::make_mut(&mut self.rows);
        for row in rows.values_mut() {
            if row.values().any(Cell::is_blank) {
                Arc::make_mut(row).retain(|_, cell| !cell.is_blank());
            }
        }
        rows.retain(|_, row| !row.is_empty());
    }

    /// Restore the merge invariant: every hidden cell must directly follow its
    /// owner (or another hidden cell of the same run) in the same column, and
    /// the owner's `row_span` must equal 1 + the length of that run.
    ///
    /// Orphaned hidden cells are un-hidden and dropped if that leaves them blank.
    pub fn repair_spans(&mut self) {
        let mut columns: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, row) in self.rows.iter() {
            for col in row.keys() {
                columns.entry(col.clone()).or_default().push(*idx);
            }
        }

        let mut fixes: Vec<(usize, String, Cell)> = Vec::new();
        for (col, row_indices) in &columns {
            // (owner row, last row of its run, hidden count)
            let mut owner: Option<(usize, usize, usize)> = None;
            for &r in row_indices {
                let Some(cell) = self.get(r, col) else {
                    continue;
                };
                if cell.hidden {
                    match owner.as_mut() {
                        Some((_, last, hidden)) if *last + 1 == r => {
                            *last = r;
                            *hidden += 1;
                        }
                        _ => {
                            owner = None;
                            let mut fixed = cell.clone();
                            fixed.hidden = false;
                            fixes.push((r, col.clone(), fixed));
                        }
                    }
                } else {
                    if let Some(done) = owner.take() {
                        self.queue_span_fix(col, done, &mut fixes);
                    }
                    owner = Some((r, r, 0));
                }
            }
            if let Some(done) = owner.take() {
                self.queue_span_fix(col, done, &mut fixes);
            }
        }

        for (r, col, cell) in fixes {
            self.set(r, &col, cell);
        }
    }

    fn queue_span_fix(
        &self,
        col: &str,
        (owner_row, _, hidden): (usize, usize, usize),
        fixes: &mut Vec<(usize, String, Cell)>,
    ) {
        let Some(cell) = self.get(owner_row, col) else {
            return;
        };
        let want = if hidden > 0 { Some(hidden + 1) } else { None };
        let have = cell.row_span.filter(|span| *span > 1);
        if have != want {
            let mut fixed = cell.clone();
            fixed.row_span = want;
            fixes.push((owner_row, col.to_string(), fixed));
        }
    }
}
