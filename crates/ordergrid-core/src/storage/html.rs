//! HTML worksheet export.
//!
//! Produces an HTML table in the Excel HTML namespace so spreadsheet
//! applications open it as a worksheet. The first table row is the column
//! header, so formula row numbers are shifted down by one.

use ordergrid_engine::engine::{
    CellStyle, CellType, FormulaEngine, Value, index_to_letters, offset_row_references,
};
use std::io::Write;
use std::path::Path;

use crate::document::Sheet;
use crate::error::Result;

const HEAD: &str = r#"<html xmlns:o="urn:schemas-microsoft-com:office:office" xmlns:x="urn:schemas-microsoft-com:office:excel" xmlns="http://www.w3.org/TR/REC-html40">
<head>
<meta http-equiv="Content-Type" content="text/html; charset=utf-8">
<style>
table { border-collapse: collapse; }
td { border: 0.5pt solid #cccccc; vertical-align: middle; padding: 4px; font-family: 'Segoe UI', Arial; font-size: 10pt; }
.header { background-color: #f3f4f6; font-weight: bold; text-align: center; border: 0.5pt solid #999999; }
</style>
</head>
<body>
<table>
"#;

/// Escape text for HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn css(style: Option<&CellStyle>) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(style) = style {
        if style.bold == Some(true) {
            parts.push("font-weight:bold".into());
        }
        if style.italic == Some(true) {
            parts.push("font-style:italic".into());
        }
        if style.underline == Some(true) {
            parts.push("text-decoration:underline".into());
        }
        if let Some(color) = &style.color {
            parts.push(format!("color:{}", color));
        }
        if let Some(bg) = &style.background_color {
            parts.push(format!("background-color:{}", bg));
        }
        if let Some(align) = style.text_align {
            parts.push(format!("text-align:{}", align.as_str()));
        }
        if let Some(size) = style.font_size {
            parts.push(format!("font-size:{}pt", size));
        }
    }
    let wrap = style.and_then(|s| s.wrap_text) == Some(true);
    parts.push(if wrap { "white-space:normal" } else { "white-space:nowrap" }.into());
    parts.join(";")
}

/// Write a sheet as an HTML worksheet.
pub fn write_html<W: Write>(out: &mut W, sheet: &Sheet, engine: &FormulaEngine) -> std::io::Result<()> {
    out.write_all(HEAD.as_bytes())?;

    write!(out, "<thead><tr>")?;
    for (idx, col) in sheet.columns().iter().enumerate() {
        write!(
            out,
            r#"<th class="header" style="width:{}pt">{}</th>"#,
            sheet.column_width(&index_to_letters(idx)),
            escape_html(col.label)
        )?;
    }
    writeln!(out, "</tr></thead>")?;

    writeln!(out, "<tbody>")?;
    let max_row = sheet.grid.max_row();
    for r in max_row.into_iter().flat_map(|max| 0..=max) {
        write!(out, "<tr>")?;
        for idx in 0..sheet.column_count() {
            let col = index_to_letters(idx);
            let cell = sheet.cell(r, &col);
            if cell.is_some_and(|c| c.hidden) {
                continue;
            }

            write!(out, "<td")?;
            if let Some(span) = cell.and_then(|c| c.row_span).filter(|s| *s > 1) {
                write!(out, r#" rowspan="{}""#, span)?;
            }
            if let Some(span) = cell.and_then(|c| c.col_span).filter(|s| *s > 1) {
                write!(out, r#" colspan="{}""#, span)?;
            }
            if let Some(formula) = cell.and_then(|c| match &c.contents {
                CellType::Formula(f) => Some(f),
                _ => None,
            }) {
                write!(out, r#" x:f="={}""#, escape_html(&offset_row_references(formula, 1)))?;
            }
            write!(out, r#" style="{}">"#, css(cell.and_then(|c| c.style.as_ref())))?;

            match engine.evaluate(cell, &sheet.grid, r) {
                Value::Text(text) if text.starts_with("data:image") => write!(
                    out,
                    r#"<img src="{}" width="80" height="80" style="display:block; margin:auto">"#,
                    escape_html(&text)
                )?,
                value => write!(out, "{}", escape_html(&value.to_string()))?,
            }
            write!(out, "</td>")?;
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</tbody></table></body></html>")?;
    Ok(())
}

/// Export a sheet to an `.xls`-compatible HTML file, with a UTF-8 BOM.
pub fn export_html(path: &Path, sheet: &Sheet, engine: &FormulaEngine) -> Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    file.write_all("\u{feff}".as_bytes())?;
    write_html(&mut file, sheet, engine)?;
    file.flush()?;
    tracing::info!(path = %path.display(), sheet = %sheet.id, "exported sheet");
    Ok(())
}
