//! ordergrid_engine - Spreadsheet engine: addressing, cell storage and formulas.

pub mod engine;
