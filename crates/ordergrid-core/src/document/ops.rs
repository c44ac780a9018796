//! Range operations over a sheet.
//!
//! Every operation takes the current sheet by reference and returns the new
//! sheet. Rows the operation does not touch stay shared with the input.

use ordergrid_engine::engine::{CellRef, CellStyle, CellType, index_to_letters};

use super::selection::CellRange;
use super::sheet::Sheet;
use crate::storage::clipboard::{parse_clipboard, to_clipboard};

/// Delete the selected cells.
///
/// A selection spanning every column removes the rows and shifts the rows
/// below it up. Any other selection clears the cells in place.
pub fn delete_range(sheet: &Sheet, range: CellRange) -> Sheet {
    let mut grid = sheet.grid.clone();
    if range.is_whole_row(sheet.column_count()) {
        tracing::debug!(start = range.min_row, end = range.max_row, "deleting rows");
        grid.delete_rows(range.min_row, range.max_row);
    } else {
        tracing::debug!(%range, "clearing cells");
        let targets: Vec<(usize, String)> = sheet
            .grid
            .cells()
            .filter(|(r, c, _)| range.contains_row(*r) && range.contains_col(*c))
            .map(|(r, c, _)| (r, index_to_letters(c)))
            .collect();
        for (r, col) in targets {
            grid.remove(r, &col);
        }
    }
    grid.repair_spans();
    sheet.with_grid(grid)
}

/// Copy the selected cells as clipboard text. Formulas are copied with their
/// leading `=`.
pub fn copy_range(sheet: &Sheet, range: CellRange) -> String {
    let rows: Vec<Vec<String>> = (range.min_row..=range.max_row)
        .map(|r| {
            range
                .column_letters()
                .map(|(_, col)| {
                    sheet
                        .cell(r, &col)
                        .map(|cell| cell.to_input_string())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();
    to_clipboard(&rows)
}

/// Paste clipboard text with its top-left field at `origin`.
///
/// Cell styles, spans and flags at the destination are kept. Fields past the
/// last column or the last addressable row are dropped.
pub fn paste_text(sheet: &Sheet, origin: CellRef, text: &str) -> Sheet {
    let matrix = parse_clipboard(text);
    let column_count = sheet.column_count();
    let mut grid = sheet.grid.clone();
    let mut dropped = 0usize;

    for (i, fields) in matrix.iter().enumerate() {
        let Some(row) = origin.row.checked_add(i) else {
            dropped += fields.len();
            continue;
        };
        for (j, field) in fields.iter().enumerate() {
            let Some(col) = origin.col.checked_add(j).filter(|&c| c < column_count) else {
                dropped += 1;
                continue;
            };
            grid.set_contents(row, &index_to_letters(col), CellType::from_input(field));
        }
    }
    if dropped > 0 {
        tracing::warn!(dropped, "pasted fields outside the sheet were dropped");
    }
    tracing::debug!(rows = matrix.len(), origin = %origin, "pasted");
    sheet.with_grid(grid)
}

/// Extend `source` into `dest`.
///
/// Each source column whose cells are all numeric literals continues as an
/// arithmetic progression (below the source from its last value, above it
/// backwards from its first). Other columns repeat the source cells
/// cyclically. Destination rows inside the source are left alone.
pub fn autofill(sheet: &Sheet, source: CellRange, dest: CellRange) -> Sheet {
    let mut grid = sheet.grid.clone();
    let source_rows = source.row_count() as isize;

    for (dest_col, col) in dest.column_letters() {
        if dest_col >= sheet.column_count() {
            break;
        }
        let offset = (dest_col as isize - dest.min_col as isize).rem_euclid(source.col_count() as isize);
        let source_col = index_to_letters(source.min_col + offset as usize);

        let numbers: Option<Vec<f64>> = (source.min_row..=source.max_row)
            .map(|r| match &sheet.grid.get(r, &source_col)?.contents {
                CellType::Number(n) => Some(*n),
                CellType::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
                CellType::Empty | CellType::Formula(_) => None,
            })
            .collect();

        for r in dest.min_row..=dest.max_row {
            if source.contains_row(r) {
                continue;
            }
            match &numbers {
                Some(values) => {
                    let first = values[0];
                    let last = values[values.len() - 1];
                    let step = if values.len() > 1 { values[1] - values[0] } else { 1.0 };
                    let n = if r > source.max_row {
                        last + step * (r - source.max_row) as f64
                    } else {
                        first - step * (source.min_row - r) as f64
                    };
                    grid.set_contents(r, &col, CellType::Number(n));
                }
                None => {
                    let k = (r as isize - source.min_row as isize).rem_euclid(source_rows);
                    let from = sheet.grid.get(source.min_row + k as usize, &source_col);
                    let contents = from.map(|c| c.contents.clone()).unwrap_or_default();
                    let style = from.and_then(|c| c.style.clone());
                    grid.update(r, &col, |cell| {
                        cell.contents = contents;
                        cell.style = style;
                    });
                }
            }
        }
    }
    tracing::debug!(%source, %dest, "autofilled");
    sheet.with_grid(grid)
}

/// Merge a partial style into every cell of the range, creating cells as needed.
pub fn merge_style(sheet: &Sheet, range: CellRange, patch: &CellStyle) -> Sheet {
    let Some(range) = range.clip_columns(sheet.column_count()) else {
        return sheet.clone();
    };
    let mut grid = sheet.grid.clone();
    for r in range.min_row..=range.max_row {
        for (_, col) in range.column_letters() {
            grid.update(r, &col, |cell| cell.merge_style(patch));
        }
    }
    sheet.with_grid(grid)
}

/// Store `value` verbatim as a literal in every cell of the range, replacing
/// any formula.
pub fn set_raw_value(sheet: &Sheet, range: CellRange, value: &str) -> Sheet {
    let Some(range) = range.clip_columns(sheet.column_count()) else {
        return sheet.clone();
    };
    let contents = if value.is_empty() {
        CellType::Empty
    } else {
        CellType::Text(value.to_string())
    };
    let mut grid = sheet.grid.clone();
    for r in range.min_row..=range.max_row {
        for (_, col) in range.column_letters() {
            grid.set_contents(r, &col, contents.clone());
        }
    }
    sheet.with_grid(grid)
}

/// Set one cell from user input: `=` starts a formula, blank clears.
pub fn set_cell_input(sheet: &Sheet, cell: CellRef, input: &str) -> Sheet {
    if cell.col >= sheet.column_count() {
        tracing::warn!(cell = %cell, "write outside the sheet dropped");
        return sheet.clone();
    }
    let mut grid = sheet.grid.clone();
    grid.set_contents(cell.row, &cell.col_letters(), CellType::from_input(input));
    sheet.with_grid(grid)
}
