//! Line-oriented command interpreter over a [`Workbook`].

use anyhow::{Context, Result, anyhow, bail};
use ordergrid_core::document::{SortDirection, SortSpec, TableMode, Workbook};
use ordergrid_core::orders::parse_order_text;
use ordergrid_core::storage::export_html;
use ordergrid_core::{CellRef, OrderGridError, Selection};
use ordergrid_engine::engine::{CellStyle, TextAlign};
use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  set CELL [INPUT]          Set a cell (empty input clears it)
  get CELL                  Print the evaluated value of a cell
  select RANGE              Select A1 or A1:C3
  select rows FIRST [LAST]  Select whole rows (1-based)
  delete                    Clear the selection, or remove whole rows
  copy                      Copy the selection to the clipboard
  paste [CELL]              Paste the clipboard at CELL or the selection
  fill RANGE                Autofill RANGE from the selection
  style KEY=VALUE...        bold, italic, underline, wrap, color, bg, align, size
  raw VALUE                 Store VALUE verbatim in every selected cell
  filter [COL [V1|V2...]]   Filter a column, clear it, or clear all filters
  sort [COL [asc|desc]]     Sort by a column, or clear the sort
  values COL                Print the distinct values of a column
  width COL POINTS          Set a column's export width
  undo                      Undo the last change
  mode [main|truck]         Print or switch the active sheet
  import FILE [ROWS]        Import an order from pasted page text
  truck                     Convert main sheet orders to the trucking sheet
  export FILE               Export the active sheet as an HTML worksheet
  show                      Print the visible rows of the active sheet
  clear                     Remove every cell of the active sheet
  w [FILE]                  Save the workbook
  e FILE                    Open a workbook";

/// Interpreter state: the workbook plus an internal clipboard.
pub struct Session {
    pub book: Workbook,
    clipboard: String,
    rows_per_order: usize,
}

fn parse_cell(text: &str) -> Result<CellRef> {
    CellRef::parse_a1(text).ok_or_else(|| OrderGridError::InvalidReference(text.to_string()).into())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => bail!("Invalid value for {}: {}", key, value),
    }
}

/// Parse `key=value` pairs into a partial style.
fn parse_style(args: &str) -> Result<CellStyle> {
    let mut style = CellStyle::default();
    for pair in args.split_whitespace() {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected KEY=VALUE, got {}", pair))?;
        match key {
            "bold" => style.bold = Some(parse_bool(key, value)?),
            "italic" => style.italic = Some(parse_bool(key, value)?),
            "underline" => style.underline = Some(parse_bool(key, value)?),
            "wrap" => style.wrap_text = Some(parse_bool(key, value)?),
            "color" => style.color = Some(value.to_string()),
            "bg" => style.background_color = Some(value.to_string()),
            "align" => style.text_align = Some(value.parse::<TextAlign>().map_err(|e| anyhow!(e))?),
            "size" => {
                style.font_size = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid font size: {}", value))?,
                )
            }
            _ => bail!("Unknown style key: {}", key),
        }
    }
    if style.is_empty() {
        bail!("Usage: style KEY=VALUE...");
    }
    Ok(style)
}

impl Session {
    pub fn new(book: Workbook, rows_per_order: usize) -> Self {
        Session {
            book,
            clipboard: String::new(),
            rows_per_order: rows_per_order.max(1),
        }
    }

    fn column(&self, col: &str) -> Result<String> {
        let col = col.to_ascii_uppercase();
        if !self.book.active().has_column(&col) {
            bail!("No column {} in the {} sheet", col, self.book.mode);
        }
        Ok(col)
    }

    /// Visible rows of the active sheet, tab separated, each prefixed with
    /// its 1-based row number. Hidden cells print empty.
    fn show(&self) -> String {
        let sheet = self.book.active();
        let letters: Vec<String> = sheet.column_letters().collect();
        let mut lines = Vec::new();
        for r in self.book.visible_rows() {
            let mut values: Vec<String> = letters
                .iter()
                .map(|col| match sheet.cell(r, col) {
                    Some(cell) if cell.hidden => String::new(),
                    cell => self.book.engine.evaluate(cell, &sheet.grid, r).to_string(),
                })
                .collect();
            while values.last().is_some_and(|v| v.is_empty()) {
                values.pop();
            }
            lines.push(format!("{}\t{}", r + 1, values.join("\t")));
        }
        lines.join("\n")
    }

    /// Run one command line. Returns text to print, if any.
    pub fn execute(&mut self, line: &str) -> Result<Option<String>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let parts: Vec<&str> = line.splitn(2, ' ').collect();
        let command = parts[0];
        let args = parts.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());

        match command {
            "set" => {
                let args = args.ok_or_else(|| anyhow!("Usage: set CELL [INPUT]"))?;
                let (cell, input) = args.split_once(' ').unwrap_or((args, ""));
                let cell = parse_cell(cell)?;
                self.book.set_cell(cell, input.trim_start());
            }
            "get" => {
                let cell = parse_cell(args.ok_or_else(|| anyhow!("Usage: get CELL"))?)?;
                return Ok(Some(self.book.value_at(cell).to_string()));
            }
            "select" => {
                let args = args.ok_or_else(|| anyhow!("Usage: select RANGE"))?;
                let words: Vec<&str> = args.split_whitespace().collect();
                let selection = match words.as_slice() {
                    ["rows", first, rest @ ..] if rest.len() <= 1 => {
                        let first: usize = first.parse().context("Invalid row number")?;
                        let last: usize = match rest.first() {
                            Some(last) => last.parse().context("Invalid row number")?,
                            None => first,
                        };
                        if first == 0 || last == 0 {
                            bail!("Row numbers start at 1");
                        }
                        Selection::whole_rows(first - 1, last - 1, self.book.active().column_count())
                    }
                    [range] => Selection::parse(range)?,
                    _ => bail!("Usage: select RANGE | select rows FIRST [LAST]"),
                };
                self.book.select(selection);
            }
            "delete" => self.book.delete_selection()?,
            "copy" => self.clipboard = self.book.copy_selection()?,
            "paste" => {
                if let Some(cell) = args {
                    self.book.select(Selection::single(parse_cell(cell)?));
                }
                self.book.paste(&self.clipboard)?;
            }
            "fill" => {
                let dest = Selection::parse(args.ok_or_else(|| anyhow!("Usage: fill RANGE"))?)?;
                self.book.autofill(dest)?;
            }
            "style" => {
                let style = parse_style(args.unwrap_or_default())?;
                self.book.merge_style(&style)?;
            }
            "raw" => self.book.set_raw_value(args.unwrap_or_default())?,
            "filter" => match args.map(|a| a.split_once(' ').unwrap_or((a, ""))) {
                None => self.book.clear_filters(),
                Some((col, values)) => {
                    let col = self.column(col)?;
                    let values: Vec<&str> = values
                        .split('|')
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .collect();
                    self.book.set_filter(&col, values);
                }
            },
            "sort" => match args {
                None => self.book.set_sort(None),
                Some(args) => {
                    let words: Vec<&str> = args.split_whitespace().collect();
                    let column = self.column(words[0])?;
                    let direction = match words.get(1) {
                        Some(d) => d.parse::<SortDirection>().map_err(|e| anyhow!(e))?,
                        None => SortDirection::Asc,
                    };
                    self.book.set_sort(Some(SortSpec { column, direction }));
                }
            },
            "values" => {
                let col = self.column(args.ok_or_else(|| anyhow!("Usage: values COL"))?)?;
                return Ok(Some(self.book.distinct_values(&col).join("\n")));
            }
            "width" => {
                let words: Vec<&str> = args.unwrap_or_default().split_whitespace().collect();
                let [col, points] = words.as_slice() else {
                    bail!("Usage: width COL POINTS");
                };
                let col = self.column(col)?;
                let points: u32 = points
                    .parse()
                    .with_context(|| format!("Invalid width: {}", points))?;
                self.book.set_column_width(&col, points);
            }
            "undo" | "u" => match self.book.undo() {
                Err(OrderGridError::NothingToUndo) => tracing::warn!("nothing to undo"),
                result => result?,
            },
            "mode" => match args {
                None => return Ok(Some(self.book.mode.to_string())),
                Some(mode) => {
                    let mode = mode.parse::<TableMode>().map_err(|e| anyhow!(e))?;
                    self.book.set_mode(mode);
                }
            },
            "import" => {
                let args = args.ok_or_else(|| anyhow!("Usage: import FILE [ROWS]"))?;
                let words: Vec<&str> = args.split_whitespace().collect();
                let rows = match words.get(1) {
                    Some(n) => n.parse::<usize>().context("Invalid row count")?.max(1),
                    None => self.rows_per_order,
                };
                let path = PathBuf::from(words[0]);
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let record = parse_order_text(&text);
                if record.order_id.is_empty() {
                    bail!("No order found in {}", path.display());
                }
                self.book.import_order(&record, rows);
            }
            "truck" => self.book.convert_to_trucking(),
            "export" => {
                let path = PathBuf::from(args.ok_or_else(|| anyhow!("Usage: export FILE"))?);
                export_html(&path, self.book.active(), &self.book.engine)?;
            }
            "show" => return Ok(Some(self.show())),
            "clear" => self.book.clear_sheet(),
            "w" | "save" => match args {
                Some(path) => self.book.save_file_as(PathBuf::from(path))?,
                None => self.book.save_file()?,
            },
            "e" | "open" => {
                let path = PathBuf::from(args.ok_or_else(|| anyhow!("Usage: e FILE"))?);
                self.book.load_file(&path)?;
            }
            "help" => return Ok(Some(HELP.to_string())),
            _ => bail!("Unknown command: {}", command),
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Workbook::new(), 1)
    }

    fn run(session: &mut Session, lines: &[&str]) {
        for line in lines {
            session.execute(line).unwrap();
        }
    }

    fn get(session: &mut Session, cell: &str) -> String {
        session.execute(&format!("get {}", cell)).unwrap().unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let mut s = session();
        run(&mut s, &["set O1 2", "set P1 49.5", "set Q1 =O1*P1", "set B1 hello world"]);
        assert_eq!(get(&mut s, "Q1"), "99");
        assert_eq!(get(&mut s, "B1"), "hello world");
        run(&mut s, &["set B1"]);
        assert_eq!(get(&mut s, "B1"), "");
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let mut s = session();
        assert_eq!(s.execute("").unwrap(), None);
        assert_eq!(s.execute("  # note").unwrap(), None);
        assert!(!s.book.can_undo());
    }

    #[test]
    fn test_errors() {
        let mut s = session();
        assert!(s.execute("frobnicate").is_err());
        assert!(s.execute("get 1A").is_err());
        assert!(s.execute("delete").is_err());
        assert_eq!(s.execute("undo").unwrap(), None);
        assert!(s.execute("select rows 0").is_err());
        assert!(s.execute("filter ZZ 1").is_err());
        run(&mut s, &["select A1"]);
        assert!(s.execute("paste").is_err());
        assert!(s.execute("style bold=maybe").is_err());
        assert!(s.execute("style").is_err());
    }

    #[test]
    fn test_delete_whole_rows_shifts_up() {
        let mut s = session();
        for r in 1..=7 {
            run(&mut s, &[&format!("set A{} {}", r, r * 10)]);
        }
        run(&mut s, &["select rows 3 5", "delete"]);
        assert_eq!(get(&mut s, "A2"), "20");
        assert_eq!(get(&mut s, "A3"), "60");
        assert_eq!(get(&mut s, "A4"), "70");
        assert_eq!(get(&mut s, "A5"), "");
    }

    #[test]
    fn test_copy_paste_fill() {
        let mut s = session();
        run(
            &mut s,
            &["set A1 1", "set B1 =A1+1", "select A1:B1", "copy", "paste A4"],
        );
        assert_eq!(get(&mut s, "A4"), "1");
        assert_eq!(get(&mut s, "B4"), "2");

        run(&mut s, &["set C1 1", "set C2 3", "select C1:C2", "fill C3:C5"]);
        assert_eq!(get(&mut s, "C5"), "9");
    }

    #[test]
    fn test_filter_and_sort_show() {
        let mut s = session();
        run(&mut s, &["set K1 123", "set K2 456", "set K3 123", "set A3 x"]);
        run(&mut s, &["filter k 123"]);
        let shown = s.execute("show").unwrap().unwrap();
        let rows: Vec<&str> = shown.lines().map(|l| l.split('\t').next().unwrap()).collect();
        assert_eq!(rows, vec!["1", "3"]);

        run(&mut s, &["filter", "sort K desc"]);
        let shown = s.execute("show").unwrap().unwrap();
        let rows: Vec<&str> = shown.lines().map(|l| l.split('\t').next().unwrap()).collect();
        assert_eq!(rows, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_values_and_width() {
        let mut s = session();
        run(&mut s, &["set M1 Sink", "set M2 vanity", "set M3 sink"]);
        assert_eq!(s.execute("values m").unwrap().as_deref(), Some("sink\nvanity"));
        assert!(s.execute("values ZZ").is_err());

        run(&mut s, &["width k 200"]);
        assert_eq!(s.book.active().column_width("K"), 200);
        assert!(s.execute("width K wide").is_err());
        assert!(s.execute("width K").is_err());
    }

    #[test]
    fn test_style_and_raw() {
        let mut s = session();
        run(&mut s, &["select A1:B2", "style bold=true align=center size=12", "raw =1+1"]);
        let cell = s.book.active().cell(1, "B").unwrap();
        let style = cell.style.clone().unwrap();
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.text_align, Some(TextAlign::Center));
        assert_eq!(style.font_size, Some(12.0));
        assert_eq!(get(&mut s, "B2"), "=1+1");
    }

    #[test]
    fn test_mode_switch_and_undo() {
        let mut s = session();
        assert_eq!(s.execute("mode").unwrap().as_deref(), Some("main"));
        run(&mut s, &["mode truck", "set A1 91733"]);
        assert_eq!(s.execute("mode").unwrap().as_deref(), Some("truck"));
        run(&mut s, &["undo"]);
        assert!(s.book.truck.grid.is_empty());
        assert!(s.execute("mode sideways").is_err());
    }

    #[test]
    fn test_import_truck_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("order.txt");
        std::fs::write(
            &page,
            "订单编号：# 114-7\n您的卖家订单编号：114-7\n配送地址\nJane Doe\n2 Elm St, Reno, NV 89501\n电话: 775 555 0100\n",
        )
        .unwrap();
        let book_path = dir.path().join("book.json");

        let mut s = Session::new(Workbook::new(), 2);
        run(&mut s, &[&format!("import {}", page.display())]);
        assert_eq!(get(&mut s, "K1"), "114-7");
        assert!(s.book.active().cell(1, "K").unwrap().hidden);

        run(&mut s, &["truck"]);
        assert_eq!(s.book.mode, TableMode::Truck);
        assert_eq!(s.book.truck.grid.row_count(), 1);

        run(&mut s, &[&format!("w {}", book_path.display()), "clear", &format!("e {}", book_path.display())]);
        assert_eq!(s.book.truck.grid.row_count(), 1);
        assert!(s.execute(&format!("import {}", book_path.display())).is_err());
    }

    #[test]
    fn test_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.xls");
        let mut s = session();
        run(&mut s, &["set A1 7", &format!("export {}", path.display())]);
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains(">7</td>"));
    }
}
