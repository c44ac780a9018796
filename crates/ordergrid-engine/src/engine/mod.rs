//! Spreadsheet engine API.
//!
//! This module provides the core computation engine for the spreadsheet:
//!
//! - [`index_to_letters`], [`letters_to_index`], [`CellRef`] - Addressing
//!   (A1 notation ↔ row/col indices)
//! - [`Cell`], [`CellType`], [`CellStyle`] - Cell contents and formatting
//! - [`Grid`] - Sparse, structurally shared cell storage
//! - [`FormulaEngine`] - Formula evaluation with cycle short-circuiting
//! - [`Value`], [`format_value`] - Evaluated values and their display form

mod cell;
mod cell_ref;
mod deps;
mod eval;
mod format;
mod grid;
mod preprocess;

pub use cell::{Cell, CellStyle, CellType, TextAlign};
pub use cell_ref::{CellRef, index_to_letters, letters_to_index, parse_range};
pub use eval::FormulaEngine;
pub use format::{ErrorKind, Value, format_number, format_value};
pub use grid::{Grid, Row};
pub use preprocess::{
    is_arithmetic, normalize_numeric_literals, offset_row_references, substitute_references,
};
