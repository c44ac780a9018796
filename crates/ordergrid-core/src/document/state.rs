use ordergrid_engine::engine::{CellRef, CellStyle, FormulaEngine, Value};
use std::path::PathBuf;

use super::history::{History, Snapshot};
use super::import::{convert_to_trucking, import_order};
use super::ops;
use super::selection::{CellRange, Selection};
use super::sheet::{Sheet, SortSpec};
use super::view::{distinct_values, representative_value, visible_rows};
use crate::error::{OrderGridError, Result};
use crate::orders::OrderRecord;
use crate::storage::{JsonFileStore, SheetStore};

/// Date format used for the trucking pickup date.
pub const PICKUP_DATE_FORMAT: &str = "%Y/%m/%d";

/// Today's local date. An invalid chrono format falls back to [`PICKUP_DATE_FORMAT`].
fn format_today(format: &str) -> String {
    use std::fmt::Write;
    let now = chrono::Local::now();
    let mut out = String::new();
    if write!(out, "{}", now.format(format)).is_err() {
        tracing::warn!(format, "invalid date format");
        out = now.format(PICKUP_DATE_FORMAT).to_string();
    }
    out
}

/// Which sheet is being edited.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableMode {
    #[default]
    Main,
    Truck,
}

impl std::str::FromStr for TableMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" => Ok(TableMode::Main),
            "truck" | "trucking" => Ok(TableMode::Truck),
            other => Err(format!("Unknown mode: {}", other)),
        }
    }
}

impl std::fmt::Display for TableMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TableMode::Main => "main",
            TableMode::Truck => "truck",
        })
    }
}

/// UI-agnostic workbook state: both sheets plus everything needed to edit them.
pub struct Workbook {
    pub main: Sheet,
    pub truck: Sheet,
    pub mode: TableMode,
    pub selection: Option<Selection>,
    /// Evaluator for formulas
    pub engine: FormulaEngine,
    /// Undo stack
    pub history: History,
    /// chrono format string for import dates
    pub date_format: String,
    /// Current file path
    pub file_path: Option<PathBuf>,
    /// Whether the workbook has been modified
    pub modified: bool,
}

impl Workbook {
    /// Create an empty workbook.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Workbook {
            main: Sheet::main(),
            truck: Sheet::truck(),
            mode: TableMode::Main,
            selection: None,
            engine: FormulaEngine::new(),
            history: History::new(),
            date_format: PICKUP_DATE_FORMAT.to_string(),
            file_path: None,
            modified: false,
        }
    }

    /// Create a workbook and load a file if provided and present.
    pub fn with_file(path: Option<PathBuf>) -> Result<Self> {
        let mut book = Self::new();
        if let Some(p) = path {
            if p.exists() {
                book.load_file(&p)?;
            } else {
                book.file_path = Some(p);
            }
        }
        Ok(book)
    }

    pub fn sheet(&self, mode: TableMode) -> &Sheet {
        match mode {
            TableMode::Main => &self.main,
            TableMode::Truck => &self.truck,
        }
    }

    fn sheet_mut(&mut self, mode: TableMode) -> &mut Sheet {
        match mode {
            TableMode::Main => &mut self.main,
            TableMode::Truck => &mut self.truck,
        }
    }

    /// The sheet operations apply to.
    pub fn active(&self) -> &Sheet {
        self.sheet(self.mode)
    }

    pub fn set_mode(&mut self, mode: TableMode) {
        if self.mode != mode {
            self.mode = mode;
            self.selection = None;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            main: self.main.clone(),
            truck: self.truck.clone(),
        }
    }

    fn record(&mut self) {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
        self.modified = true;
    }

    /// Snapshot, then replace the active sheet with `op(active)`.
    fn apply<F>(&mut self, op: F)
    where
        F: FnOnce(&Sheet) -> Sheet,
    {
        self.record();
        let next = op(self.active());
        *self.sheet_mut(self.mode) = next;
    }

    pub fn select(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }

    pub fn selected_range(&self) -> Result<CellRange> {
        self.selection
            .map(|s| s.range())
            .ok_or(OrderGridError::NoSelection)
    }

    /// Set one cell of the active sheet from user input.
    pub fn set_cell(&mut self, cell: CellRef, input: &str) {
        self.apply(|sheet| ops::set_cell_input(sheet, cell, input));
    }

    pub fn delete_selection(&mut self) -> Result<()> {
        let range = self.selected_range()?;
        self.apply(|sheet| ops::delete_range(sheet, range));
        Ok(())
    }

    pub fn copy_selection(&self) -> Result<String> {
        let range = self.selected_range()?;
        Ok(ops::copy_range(self.active(), range))
    }

    /// Paste clipboard text at the top-left of the selection.
    pub fn paste(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(OrderGridError::EmptyClipboard);
        }
        let origin = self.selected_range()?.origin();
        self.apply(|sheet| ops::paste_text(sheet, origin, text));
        Ok(())
    }

    /// Fill `dest` from the current selection.
    pub fn autofill(&mut self, dest: Selection) -> Result<()> {
        let source = self.selected_range()?;
        self.apply(|sheet| ops::autofill(sheet, source, dest.range()));
        Ok(())
    }

    pub fn merge_style(&mut self, patch: &CellStyle) -> Result<()> {
        let range = self.selected_range()?;
        self.apply(|sheet| ops::merge_style(sheet, range, patch));
        Ok(())
    }

    pub fn set_raw_value(&mut self, value: &str) -> Result<()> {
        let range = self.selected_range()?;
        self.apply(|sheet| ops::set_raw_value(sheet, range, value));
        Ok(())
    }

    /// Remove every cell of the active sheet. View settings are kept.
    pub fn clear_sheet(&mut self) {
        self.apply(|sheet| sheet.with_grid(Default::default()));
    }

    /// Append an order to the main sheet, dated today, and switch to it.
    pub fn import_order(&mut self, record: &OrderRecord, rows: usize) {
        let today = format_today(&self.date_format);
        self.import_order_dated(record, rows, &today);
    }

    pub fn import_order_dated(&mut self, record: &OrderRecord, rows: usize, date: &str) {
        self.record();
        self.main = import_order(&self.main, record, rows, date);
        self.set_mode(TableMode::Main);
    }

    /// Populate the trucking sheet from the main sheet and switch to it.
    pub fn convert_to_trucking(&mut self) {
        let today = format_today(PICKUP_DATE_FORMAT);
        self.convert_to_trucking_dated(&today);
    }

    pub fn convert_to_trucking_dated(&mut self, pickup_date: &str) {
        self.record();
        self.truck = convert_to_trucking(&self.main, &self.truck, &self.engine, pickup_date);
        self.set_mode(TableMode::Truck);
    }

    /// Restore the state before the most recent mutation.
    pub fn undo(&mut self) -> Result<()> {
        let snapshot = self.history.pop().ok_or(OrderGridError::NothingToUndo)?;
        self.main = snapshot.main;
        self.truck = snapshot.truck;
        self.modified = true;
        tracing::debug!(remaining = self.history.len(), "undo");
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Accept only rows whose value in `col` is one of `values` (case-insensitive).
    /// An empty set removes the filter.
    pub fn set_filter<I, S>(&mut self, col: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: std::collections::BTreeSet<String> =
            values.into_iter().map(|v| v.as_ref().to_lowercase()).collect();
        let col = col.to_ascii_uppercase();
        let sheet = self.sheet_mut(self.mode);
        if set.is_empty() {
            sheet.filters.remove(&col);
        } else {
            sheet.filters.insert(col, set);
        }
    }

    pub fn clear_filters(&mut self) {
        self.sheet_mut(self.mode).filters.clear();
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sheet_mut(self.mode).sort = sort;
    }

    /// Override a column's export width in points. Widths are saved with the
    /// sheet but are not undoable.
    pub fn set_column_width(&mut self, col: &str, width: u32) {
        let col = col.to_ascii_uppercase();
        self.sheet_mut(self.mode).set_column_width(&col, width);
        self.modified = true;
    }

    /// Distinct lowercased values of a column of the active sheet.
    pub fn distinct_values(&self, col: &str) -> Vec<String> {
        distinct_values(self.active(), &self.engine, &col.to_ascii_uppercase())
    }

    /// Rows of the active sheet in display order.
    pub fn visible_rows(&self) -> Vec<usize> {
        visible_rows(self.active(), &self.engine)
    }

    /// Evaluated value of a cell of the active sheet, merge-resolved.
    pub fn value_at(&self, cell: CellRef) -> Value {
        representative_value(self.active(), &self.engine, cell.row, &cell.col_letters())
    }

    /// Replace both sheets with those in `store`. Missing sheets start empty.
    pub fn load_from(&mut self, store: &impl SheetStore) -> Result<()> {
        self.main = store.load("main")?.unwrap_or_else(Sheet::main);
        self.truck = store.load("truck")?.unwrap_or_else(Sheet::truck);
        self.history.clear();
        self.selection = None;
        self.modified = false;
        Ok(())
    }

    pub fn save_to(&mut self, store: &mut impl SheetStore) -> Result<()> {
        store.save(&self.main)?;
        store.save(&self.truck)?;
        self.modified = false;
        Ok(())
    }

    pub fn load_file(&mut self, path: &std::path::Path) -> Result<()> {
        self.load_from(&JsonFileStore::new(path))?;
        self.file_path = Some(path.to_path_buf());
        tracing::info!(path = %path.display(), rows = self.main.grid.row_count(), "loaded workbook");
        Ok(())
    }

    /// Save to the current file path.
    pub fn save_file(&mut self) -> Result<()> {
        let path = self.file_path.clone().ok_or(OrderGridError::NoFilePath)?;
        self.save_to(&mut JsonFileStore::new(&path))?;
        tracing::info!(path = %path.display(), "saved workbook");
        Ok(())
    }

    pub fn save_file_as(&mut self, path: PathBuf) -> Result<()> {
        self.file_path = Some(path);
        self.save_file()
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
