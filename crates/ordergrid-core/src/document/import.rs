//! Bulk order import into the main sheet and conversion into the trucking sheet.
//!
//! An imported order occupies `rows` consecutive rows. In merged columns the
//! first row owns the value with `row_span = rows` and the others are hidden;
//! the remaining columns get one cell per row.

use ordergrid_engine::engine::{Cell, CellStyle, CellType, FormulaEngine, index_to_letters};

use super::sheet::Sheet;
use super::view::representative_value;
use crate::layout::{MAIN_COLUMNS, TRUCK_COLUMNS, is_merged_column};
use crate::orders::{OrderRecord, extract_address_details, extract_internal_model};

const TEXT_COLOR: &str = "#000000";

/// Per-row formula of a main-sheet column, `n` being the 1-based row number.
fn row_formula(col: &str, first_row: bool, n: usize) -> Option<String> {
    let formula = match col {
        "Q" => format!("O{n}*P{n}"),
        "AG" => format!("AE{n}*AF{n}"),
        "AL" if first_row => format!("AG{n}+AI{n}+AK{n}"),
        "AL" => format!("AG{n}"),
        "AQ" => format!("AN{n}/2.54"),
        "AR" => format!("AO{n}/2.54"),
        "AS" => format!("AP{n}/2.54"),
        "AT" => format!("AM{n}*2.2046226"),
        "AU" => format!("AQ{n}*AR{n}*AS{n}/6000"),
        "BD" => format!("Q{n}+AL{n}+BC{n}"),
        "BE" => format!("BG{n}*0.75-BH{n}+BI{n}"),
        "BF" => format!("BE{n}*7-BD{n}"),
        _ => return None,
    };
    Some(formula)
}

fn or_zero(value: &str) -> &str {
    if value.is_empty() { "0" } else { value }
}

/// Next serial number for column A: one past the largest numeric serial.
fn next_serial(sheet: &Sheet) -> f64 {
    sheet
        .grid
        .rows()
        .filter_map(|(_, row)| row.get("A")?.contents.as_number())
        .map(f64::trunc)
        .fold(0.0, f64::max)
        + 1.0
}

/// Literal value a main-sheet column receives on row `i` of an order.
fn order_value(
    col: &str,
    i: usize,
    rows: usize,
    record: &OrderRecord,
    serial: f64,
    import_date: &str,
) -> CellType {
    let first = i == 0;
    let last = i + 1 == rows;
    match col {
        "A" if first => CellType::Number(serial),
        "B" if first => CellType::Text(import_date.to_string()),
        "K" if first => CellType::literal(&record.order_id),
        "M" if first => CellType::literal(&record.product_name),
        "E" if first => CellType::literal(&record.inch_size),
        "BJ" if first => CellType::literal(&record.sku),
        "BG" | "P" if first => CellType::literal(or_zero(&record.sales_price)),
        "O" if first => CellType::Number(1.0),
        "AV" if first => CellType::literal(&record.full_address),
        "BK" if first => CellType::literal(&record.ship_date),
        "BL" if first => CellType::literal(&record.delivery_date),
        "AW" if last => CellType::literal(&record.shipping_method),
        "AX" if last => CellType::literal(&record.tracking_numbers.join(", ")),
        _ => CellType::Empty,
    }
}

/// Append one order to the end of the main sheet. An order that would run
/// past the last addressable row is not imported.
pub fn import_order(sheet: &Sheet, record: &OrderRecord, rows: usize, import_date: &str) -> Sheet {
    let rows = rows.max(1);
    let start = match sheet.grid.max_row() {
        Some(last) => last.checked_add(1),
        None => Some(0),
    };
    // The 1-based number of the last row, start + rows, must also fit.
    let Some(start) = start.filter(|s| s.checked_add(rows).is_some()) else {
        tracing::warn!(order_id = %record.order_id, rows, "no room for order after the last row");
        return sheet.clone();
    };
    let serial = next_serial(sheet);
    let mut grid = sheet.grid.clone();

    for i in 0..rows {
        let r = start + i;
        let n = r + 1;
        for idx in 0..MAIN_COLUMNS.len() {
            let col = index_to_letters(idx);
            let merged = is_merged_column(&col);
            if merged && i > 0 {
                grid.set(r, &col, Cell { hidden: true, ..Cell::default() });
                continue;
            }

            let contents = match row_formula(&col, i == 0, n) {
                Some(formula) => CellType::Formula(formula),
                None => order_value(&col, i, rows, record, serial, import_date),
            };
            let mut style = CellStyle {
                color: Some(TEXT_COLOR.to_string()),
                ..CellStyle::default()
            };
            if col == "AV" {
                style.wrap_text = Some(true);
            }
            let row_span = (merged && rows > 1).then_some(rows);
            grid.set(
                r,
                &col,
                Cell {
                    contents,
                    style: Some(style),
                    row_span,
                    ..Cell::default()
                },
            );
        }
    }

    tracing::info!(order_id = %record.order_id, start, rows, "imported order");
    sheet.with_grid(grid)
}

/// Fill the trucking sheet from the main sheet.
///
/// Every main row with a visible, non-empty order id in K becomes a trucking
/// row at the same index. Other trucking rows are left as they are.
pub fn convert_to_trucking(
    main: &Sheet,
    truck: &Sheet,
    engine: &FormulaEngine,
    pickup_date: &str,
) -> Sheet {
    let mut grid = truck.grid.clone();
    let mut converted = 0usize;

    for (r, row) in main.grid.rows() {
        let Some(order) = row.get("K") else {
            continue;
        };
        if order.hidden || order.contents.is_formula() || order.contents.is_empty() {
            continue;
        }

        let text = |col: &str| {
            row.get(col)
                .map(|cell| cell.contents.to_input_string())
                .unwrap_or_default()
        };
        let evaluated = |col: &str| representative_value(main, engine, r, col).to_string();

        let address = extract_address_details(&text("AV"));
        let internal_model = extract_internal_model(&text("M"));

        for (idx, def) in TRUCK_COLUMNS.iter().enumerate() {
            let value = match def.id {
                "pickup_date" => pickup_date.to_string(),
                "order_no" => internal_model.clone(),
                "ref" => text("X"),
                "receiver_contact" | "receiver_addr_name" => address.name.clone(),
                "receiver_phone" => address.phone.clone(),
                "receiver_zip" => address.zip.clone(),
                "receiver_city" => address.city.clone(),
                "receiver_state" => address.state.clone(),
                "receiver_line1" => address.street.clone(),
                "declared_val" => or_zero(&evaluated("BG")).to_string(),
                "length" => evaluated("AQ"),
                "width" => evaluated("AR"),
                "height" => evaluated("AS"),
                "weight" => evaluated("AT"),
                _ => def.default.unwrap_or_default().to_string(),
            };
            grid.set(r, &index_to_letters(idx), Cell::new(CellType::literal(&value)));
        }
        converted += 1;
    }

    tracing::info!(rows = converted, "converted orders to trucking");
    truck.with_grid(grid)
}
