//! Row visibility and ordering.
//!
//! Both are derived on demand from evaluated values; nothing is cached.

use ordergrid_engine::engine::{Cell, FormulaEngine, Value};

use super::sheet::{Sheet, SortDirection};

/// The cell that supplies the value at `(row, col)`: the cell itself, or for a
/// hidden merge cell the nearest non-hidden cell above it in the column.
pub fn resolve_owner<'a>(sheet: &'a Sheet, row: usize, col: &str) -> Option<(usize, &'a Cell)> {
    let mut r = row;
    loop {
        match sheet.cell(r, col) {
            Some(cell) if cell.hidden => {}
            Some(cell) => return Some((r, cell)),
            None if r == row => return None,
            None => {}
        }
        r = r.checked_sub(1)?;
    }
}

/// Evaluated value at `(row, col)` after hidden-cell resolution. The owner is
/// evaluated at its own row.
pub fn representative_value(
    sheet: &Sheet,
    engine: &FormulaEngine,
    row: usize,
    col: &str,
) -> Value {
    match resolve_owner(sheet, row, col) {
        Some((owner_row, cell)) => engine.evaluate(Some(cell), &sheet.grid, owner_row),
        None => Value::empty(),
    }
}

fn passes_filters(sheet: &Sheet, engine: &FormulaEngine, row: usize) -> bool {
    sheet.filters.iter().all(|(col, accepted)| {
        accepted.is_empty()
            || accepted.contains(
                &representative_value(sheet, engine, row, col)
                    .to_string()
                    .to_lowercase(),
            )
    })
}

/// Stored rows that pass every filter, in display order.
pub fn visible_rows(sheet: &Sheet, engine: &FormulaEngine) -> Vec<usize> {
    let mut rows: Vec<usize> = sheet
        .grid
        .row_indices()
        .filter(|&r| passes_filters(sheet, engine, r))
        .collect();

    if let Some(sort) = &sheet.sort {
        let mut keyed: Vec<(usize, Value)> = rows
            .into_iter()
            .map(|r| (r, representative_value(sheet, engine, r, &sort.column)))
            .collect();
        keyed.sort_by(|(_, a), (_, b)| match sort.direction {
            SortDirection::Asc => a.sort_cmp(b),
            SortDirection::Desc => b.sort_cmp(a),
        });
        rows = keyed.into_iter().map(|(r, _)| r).collect();
    }
    rows
}

/// Distinct lowercased values of a column over the stored rows, for offering
/// filter choices.
pub fn distinct_values(sheet: &Sheet, engine: &FormulaEngine, col: &str) -> Vec<String> {
    let mut values: Vec<String> = sheet
        .grid
        .row_indices()
        .map(|r| {
            representative_value(sheet, engine, r, col)
                .to_string()
                .to_lowercase()
        })
        .collect();
    values.sort();
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SortSpec;
    use crate::document::import::import_order;
    use crate::orders::OrderRecord;
    use std::collections::BTreeSet;

    fn sheet_with(cells: &[(usize, &str, &str)]) -> Sheet {
        let mut grid = Sheet::main().grid;
        for (row, col, input) in cells {
            grid.set(*row, col, Cell::from_input(input));
        }
        Sheet::main().with_grid(grid)
    }

    fn filter(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_lowercase()).collect()
    }

    #[test]
    fn test_hidden_cells_resolve_to_owner() {
        let mut sheet = sheet_with(&[(0, "K", "123"), (0, "Q", "=ROW()")]);
        let mut grid = sheet.grid.clone();
        for r in 1..3 {
            grid.set(r, "K", Cell { hidden: true, ..Cell::default() });
            grid.set(r, "Q", Cell { hidden: true, ..Cell::default() });
        }
        sheet = sheet.with_grid(grid);
        let engine = FormulaEngine::new();
        assert_eq!(representative_value(&sheet, &engine, 2, "K"), Value::Number(123.0));
        assert_eq!(representative_value(&sheet, &engine, 2, "Q"), Value::Number(1.0));
        assert_eq!(representative_value(&sheet, &engine, 2, "M"), Value::empty());
    }

    #[test]
    fn test_filter_keeps_matching_rows() {
        let mut sheet = sheet_with(&[
            (0, "K", "123"),
            (1, "K", "456"),
            (2, "K", "123"),
            (3, "A", "no order"),
        ]);
        let engine = FormulaEngine::new();
        sheet.filters.insert("K".into(), filter(&["123"]));
        assert_eq!(visible_rows(&sheet, &engine), vec![0, 2]);

        sheet.filters.insert("K".into(), BTreeSet::new());
        assert_eq!(visible_rows(&sheet, &engine), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_filter_keeps_every_row_of_merged_orders() {
        let order = |id: &str| OrderRecord { order_id: id.into(), ..OrderRecord::default() };
        let sheet = import_order(&Sheet::main(), &order("123"), 3, "d");
        let mut sheet = import_order(&sheet, &order("456"), 2, "d");
        assert!(sheet.cell(1, "K").unwrap().hidden);

        let engine = FormulaEngine::new();
        sheet.filters.insert("K".into(), filter(&["123"]));
        assert_eq!(visible_rows(&sheet, &engine), vec![0, 1, 2]);

        sheet.filters.insert("K".into(), filter(&["456"]));
        assert_eq!(visible_rows(&sheet, &engine), vec![3, 4]);
    }

    #[test]
    fn test_filter_is_case_insensitive_and_uses_evaluated_values() {
        let mut sheet = sheet_with(&[(0, "M", "Vanity"), (1, "M", "=2+3"), (2, "M", "sink")]);
        let engine = FormulaEngine::new();
        sheet.filters.insert("M".into(), filter(&["VANITY", "5"]));
        assert_eq!(visible_rows(&sheet, &engine), vec![0, 1]);
    }

    #[test]
    fn test_sort_is_stable_and_typed() {
        let mut sheet = sheet_with(&[
            (0, "P", "b"),
            (1, "P", "10"),
            (2, "P", "=1+1"),
            (3, "P", "a"),
            (4, "P", "10"),
            (5, "P", "=1+*"),
        ]);
        let engine = FormulaEngine::new();
        sheet.sort = Some(SortSpec { column: "P".into(), direction: SortDirection::Asc });
        assert_eq!(visible_rows(&sheet, &engine), vec![2, 1, 4, 3, 0, 5]);

        sheet.sort = Some(SortSpec { column: "P".into(), direction: SortDirection::Desc });
        assert_eq!(visible_rows(&sheet, &engine), vec![5, 0, 3, 1, 4, 2]);
    }

    #[test]
    fn test_distinct_values() {
        let sheet = sheet_with(&[(0, "K", "A1"), (1, "K", "a1"), (2, "K", "b")]);
        let engine = FormulaEngine::new();
        assert_eq!(distinct_values(&sheet, &engine, "K"), vec!["a1", "b"]);
    }
}
