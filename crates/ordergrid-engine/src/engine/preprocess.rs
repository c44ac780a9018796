//! Formula preprocessing and reference transformation.
//!
//! Before a formula reaches the arithmetic evaluator it is rewritten:
//!
//! - **Substitution**: every `A1`-style reference is replaced by a number
//! - **Literal normalization**: integer literals gain a fraction so the
//!   evaluator performs floating-point arithmetic (`10/3` is not `3`)
//!
//! It also provides reference offsetting, used when formulas are written to a
//! document whose rows are shifted (e.g. by a header row).

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::cell_ref::{CellRef, index_to_letters};
use super::deps::{reference_re, resolve_reference};
use super::format::format_number;

fn numeric_literal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+\.?[0-9]*|\.[0-9]+").expect("valid literal regex"))
}

fn arithmetic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9\s+\-*/().]+$").expect("valid arithmetic regex"))
}

fn any_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Za-z]+)([0-9]+)").expect("valid reference regex"))
}

/// Replace each reference in an uppercased expression with the number
/// returned by `resolve`. References that address no cell become `0`.
/// Negative numbers are parenthesised so `A1-B1` stays well formed.
pub fn substitute_references<F>(expr: &str, mut resolve: F) -> String
where
    F: FnMut(CellRef) -> f64,
{
    reference_re()
        .replace_all(expr, |caps: &Captures| {
            let n = resolve_reference(&caps[1], &caps[2]).map_or(0.0, &mut resolve);
            let text = format_number(n);
            if n < 0.0 { format!("({})", text) } else { text }
        })
        .into_owned()
}

/// True if the expression only contains digits, whitespace and `+ - * / ( ) .`.
pub fn is_arithmetic(expr: &str) -> bool {
    arithmetic_re().is_match(expr)
}

/// Rewrite numeric literals into float literals: `10` -> `10.0`, `.5` -> `0.5`,
/// `3.` -> `3.0`.
pub fn normalize_numeric_literals(expr: &str) -> String {
    numeric_literal_re()
        .replace_all(expr, |caps: &Captures| {
            let lit = &caps[0];
            if lit.starts_with('.') {
                format!("0{}", lit)
            } else if lit.ends_with('.') {
                format!("{}0", lit)
            } else if !lit.contains('.') {
                format!("{}.0", lit)
            } else {
                lit.to_string()
            }
        })
        .into_owned()
}

/// Offset the row number of every reference in a formula by `delta`.
///
/// Rules:
/// - `A1` offset by +1 becomes `A2`
/// - column letters are normalized to uppercase
/// - references that would land above row 1 become `#REF!`
pub fn offset_row_references(formula: &str, delta: isize) -> String {
    any_reference_re()
        .replace_all(formula, |caps: &Captures| {
            let Some(cell) = resolve_reference(&caps[1].to_ascii_uppercase(), &caps[2]) else {
                return caps[0].to_string();
            };
            match cell.row.checked_add_signed(delta) {
                Some(row) => format!("{}{}", index_to_letters(cell.col), row + 1),
                None => "#REF!".to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_references() {
        let out = substitute_references("A1+B2*2", |cell| (cell.col + cell.row) as f64 + 1.0);
        assert_eq!(out, "1+3*2");
    }

    #[test]
    fn test_substitute_references_parenthesises_negatives() {
        let out = substitute_references("A1-B1", |cell| if cell.col == 0 { 5.0 } else { -3.0 });
        assert_eq!(out, "5-(-3)");
    }

    #[test]
    fn test_substitute_references_row_zero_is_zero() {
        let out = substitute_references("A0+1", |_| 99.0);
        assert_eq!(out, "0+1");
    }

    #[test]
    fn test_is_arithmetic() {
        assert!(is_arithmetic("1 + 2 * (3 - 4) / 5.5"));
        assert!(!is_arithmetic("1 + X"));
        assert!(!is_arithmetic("ROW"));
        assert!(!is_arithmetic(""));
    }

    #[test]
    fn test_normalize_numeric_literals() {
        assert_eq!(normalize_numeric_literals("10/3"), "10.0/3.0");
        assert_eq!(normalize_numeric_literals(".5+3."), "0.5+3.0");
        assert_eq!(normalize_numeric_literals("2.25*4"), "2.25*4.0");
    }

    #[test]
    fn test_offset_row_references() {
        assert_eq!(offset_row_references("O2*P2", 1), "O3*P3");
        assert_eq!(offset_row_references("a1+1", 1), "A2+1");
        assert_eq!(offset_row_references("A1", -1), "#REF!");
    }
}
