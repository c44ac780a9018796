//! ordergrid-core - UI-agnostic workbook model, range operations and storage.

pub mod document;
pub mod error;
pub mod layout;
pub mod orders;
pub mod storage;

pub use document::{CellRange, Selection, Sheet, SortDirection, SortSpec, TableMode, Workbook};
pub use error::{OrderGridError, Result};

pub use ordergrid_engine::engine::CellRef;
