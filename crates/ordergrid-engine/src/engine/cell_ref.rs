//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and zero-indexed column/row coordinates.
//!
//! Column letters are bijective base-26: every letter is a digit in 1..=26 and
//! there is no zero digit, so `A` is 0, `Z` is 25 and `AA` is 26.
//!
//! # Examples
//!
//! ```
//! use ordergrid_engine::engine::CellRef;
//!
//! let cell: CellRef = "B3".parse().unwrap();
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").expect("valid A1 regex")
    })
}

/// Convert a column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
pub fn index_to_letters(index: usize) -> String {
    let mut result = String::new();
    let mut n = index as u128 + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Convert spreadsheet-style letters back to a column index (A -> 0, AA -> 26).
///
/// Case-insensitive. Returns `None` for empty input, non-letters, or a column
/// that does not fit in `usize`.
pub fn letters_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut acc = 0usize;
    for c in letters.bytes() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() - b'A') as usize + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    acc.checked_sub(1)
}

/// A reference to a cell by column and row indices (0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference from spreadsheet notation (e.g., "A1", "b2", "AA10").
    /// Returns None if the input is invalid.
    pub fn parse_a1(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name.trim())?;
        let col = letters_to_index(&caps["letters"])?;
        let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;
        Some(CellRef::new(col, row))
    }

    /// Column letters of this reference.
    pub fn col_letters(&self) -> String {
        index_to_letters(self.col)
    }
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", index_to_letters(self.col), self.row + 1)
    }
}

/// Parse a range like "A1:C3" (or a single cell "B2") into its two corners.
/// The corners are returned as written; callers normalize them.
pub fn parse_range(range: &str) -> Option<(CellRef, CellRef)> {
    match range.split_once(':') {
        Some((start, end)) => Some((CellRef::parse_a1(start)?, CellRef::parse_a1(end)?)),
        None => {
            let cell = CellRef::parse_a1(range)?;
            Some((cell, cell))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_letter_columns() {
        assert_eq!(index_to_letters(0), "A");
        assert_eq!(index_to_letters(25), "Z");
        assert_eq!(letters_to_index("A"), Some(0));
        assert_eq!(letters_to_index("Z"), Some(25));
    }

    #[test]
    fn test_multi_letter_columns() {
        assert_eq!(index_to_letters(26), "AA");
        assert_eq!(index_to_letters(51), "AZ");
        assert_eq!(index_to_letters(52), "BA");
        assert_eq!(index_to_letters(71), "BT");
        assert_eq!(index_to_letters(701), "ZZ");
        assert_eq!(index_to_letters(702), "AAA");
        assert_eq!(letters_to_index("BT"), Some(71));
        assert_eq!(letters_to_index("aag"), Some(734));
    }

    #[test]
    fn test_letters_round_trip() {
        for n in 0..=1000 {
            assert_eq!(letters_to_index(&index_to_letters(n)), Some(n), "column {}", n);
        }
    }

    #[test]
    fn test_letters_to_index_rejects_garbage() {
        assert_eq!(letters_to_index(""), None);
        assert_eq!(letters_to_index("A1"), None);
        assert_eq!(letters_to_index("-"), None);
        assert_eq!(letters_to_index(&"Z".repeat(40)), None);
    }

    #[test]
    fn test_index_to_letters_handles_max_usize() {
        let letters = index_to_letters(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn test_parse_a1() {
        assert_eq!(CellRef::parse_a1("A1"), Some(CellRef::new(0, 0)));
        assert_eq!(CellRef::parse_a1("ag14"), Some(CellRef::new(32, 13)));
        assert_eq!(CellRef::parse_a1("A0"), None);
        assert_eq!(CellRef::parse_a1("1A"), None);
        assert_eq!(CellRef::parse_a1("A 1"), None);
        assert_eq!(CellRef::new(32, 13).to_string(), "AG14");
    }

    #[test]
    fn test_parse_range() {
        let (a, b) = parse_range("C3:A1").unwrap();
        assert_eq!(a, CellRef::new(2, 2));
        assert_eq!(b, CellRef::new(0, 0));
        assert_eq!(parse_range("B2"), Some((CellRef::new(1, 1), CellRef::new(1, 1))));
        assert!(parse_range("B2:").is_none());
    }
}
