//! Clipboard text: newline-separated rows of tab-separated fields.
//!
//! Fields that contain a tab, line break or quote are wrapped in `"` with
//! inner quotes doubled, the way spreadsheet applications copy them.

/// Parse clipboard text into a row-major matrix.
///
/// CRLF is accepted, a single trailing line break is ignored, and quoted
/// fields may span lines.
pub fn parse_clipboard(text: &str) -> Vec<Vec<String>> {
    let text = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }

    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut field_start = true;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                // Check for escaped quote
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
            continue;
        }
        match c {
            '"' if field_start => {
                in_quotes = true;
                field_start = false;
            }
            '\t' => {
                row.push(std::mem::take(&mut current));
                field_start = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut current));
                rows.push(std::mem::take(&mut row));
                field_start = true;
            }
            _ => {
                current.push(c);
                field_start = false;
            }
        }
    }
    row.push(current);
    rows.push(row);
    rows
}

fn needs_quotes(field: &str) -> bool {
    field.contains(['\t', '\n', '\r', '"'])
}

/// Serialize a matrix of fields as clipboard text.
///
/// A last row that would serialize to an empty line is written as `""`, since
/// a trailing line break is dropped on parse.
pub fn to_clipboard(rows: &[Vec<String>]) -> String {
    let mut lines: Vec<String> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|field| {
                    if needs_quotes(field) {
                        format!("\"{}\"", field.replace('"', "\"\""))
                    } else {
                        field.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join("\t")
        })
        .collect();
    if let Some(last) = lines.last_mut().filter(|line| line.is_empty()) {
        *last = "\"\"".to_string();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_simple() {
        assert_eq!(
            parse_clipboard("a\tb\n1\t2"),
            matrix(&[&["a", "b"], &["1", "2"]])
        );
    }

    #[test]
    fn test_parse_crlf_and_trailing_newline() {
        assert_eq!(
            parse_clipboard("a\tb\r\n1\t2\r\n"),
            matrix(&[&["a", "b"], &["1", "2"]])
        );
        assert!(parse_clipboard("\n").is_empty());
        assert!(parse_clipboard("").is_empty());
    }

    #[test]
    fn test_parse_keeps_empty_fields_and_lines() {
        assert_eq!(
            parse_clipboard("a\t\tc\n\nd"),
            matrix(&[&["a", "", "c"], &[""], &["d"]])
        );
    }

    #[test]
    fn test_parse_quoted_fields() {
        assert_eq!(
            parse_clipboard("\"line1\nline2\"\t\"say \"\"hi\"\"\""),
            matrix(&[&["line1\nline2", "say \"hi\""]])
        );
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        assert_eq!(parse_clipboard("5\" pipe"), matrix(&[&["5\" pipe"]]));
    }

    #[test]
    fn test_to_clipboard_quotes_when_needed() {
        let text = to_clipboard(&matrix(&[&["=O2*P2", "a\tb"], &["x\"y", ""]]));
        assert_eq!(text, "=O2*P2\t\"a\tb\"\n\"x\"\"y\"\t");
        assert_eq!(
            parse_clipboard(&text),
            matrix(&[&["=O2*P2", "a\tb"], &["x\"y", ""]])
        );
    }

    #[test]
    fn test_trailing_empty_row_survives() {
        let rows = matrix(&[&["x"], &[""]]);
        let text = to_clipboard(&rows);
        assert_eq!(text, "x\n\"\"");
        assert_eq!(parse_clipboard(&text), rows);

        let single = matrix(&[&[""]]);
        assert_eq!(parse_clipboard(&to_clipboard(&single)), single);
        // Inner empty rows need no quoting.
        assert_eq!(to_clipboard(&matrix(&[&[""], &["y"]])), "\ny");
    }
}
