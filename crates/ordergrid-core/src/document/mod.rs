//! Workbook state and logic (UI-agnostic).

mod history;
mod import;
pub mod ops;
mod selection;
mod sheet;
mod state;
pub mod view;

pub use history::{History, MAX_UNDO_STACK, Snapshot};
pub use import::{convert_to_trucking, import_order};
pub use selection::{CellRange, Selection};
pub use sheet::{Sheet, SortDirection, SortSpec};
pub use state::{PICKUP_DATE_FORMAT, TableMode, Workbook};
