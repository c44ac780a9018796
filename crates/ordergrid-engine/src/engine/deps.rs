//! Cell reference matching in formula strings.
//!
//! References are `<letters><digits>` with a 1-based row number. Matching is
//! case-insensitive because formulas are uppercased before evaluation.

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::{CellRef, letters_to_index};

/// Regex for a single cell reference in an uppercased formula.
pub(crate) fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z]+)([0-9]+)").expect("valid reference regex"))
}

/// Resolve the captured letters/digits of a reference. Row 0 and oversized
/// numbers do not address any cell.
pub(crate) fn resolve_reference(letters: &str, digits: &str) -> Option<CellRef> {
    let col = letters_to_index(letters)?;
    let row = digits.parse::<usize>().ok()?.checked_sub(1)?;
    Some(CellRef::new(col, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("AG", "14"), Some(CellRef::new(32, 13)));
        assert_eq!(resolve_reference("A", "0"), None);
        assert_eq!(resolve_reference("A", "99999999999999999999999"), None);
    }

    #[test]
    fn test_reference_re_finds_every_reference() {
        let found: Vec<&str> = reference_re()
            .find_iter("O2*P2 + AG14")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["O2", "P2", "AG14"]);
    }
}
