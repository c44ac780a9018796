//! Formula evaluation.
//!
//! Formulas are evaluated by recursive substitution: every cell reference is
//! replaced by the evaluated numeric value of the cell it points at, and the
//! resulting plain arithmetic is handed to an embedded Rhai engine.
//!
//! Cycles are not errors. One `visited` set is shared by the whole
//! evaluation of a cell: a reference that has already been followed anywhere
//! in that evaluation is substituted with `0` instead of being followed again.
//! This also applies to a cell referenced twice, so `=A1+A1` reads the second
//! `A1` as `0`.
//!
//! A formula that is exactly `ROW()` evaluates to the 1-based row number.
//! `ROW()` inside a larger expression is not recognised.

use rhai::{Dynamic, Engine};
use std::collections::HashSet;

use super::cell::{Cell, CellType};
use super::cell_ref::{CellRef, index_to_letters};
use super::format::{ErrorKind, Value};
use super::grid::Grid;
use super::preprocess::{is_arithmetic, normalize_numeric_literals, substitute_references};

/// Nesting limits for the arithmetic evaluator; formulas are short.
const MAX_EXPR_DEPTH: usize = 64;

/// Evaluates cells against a [`Grid`].
pub struct FormulaEngine {
    engine: Engine,
}

impl FormulaEngine {
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_expr_depths(MAX_EXPR_DEPTH, MAX_EXPR_DEPTH);
        FormulaEngine { engine }
    }

    /// Evaluate a cell found at `row_index`.
    /// Missing cells evaluate to empty text; literals evaluate to themselves.
    pub fn evaluate(&self, cell: Option<&Cell>, grid: &Grid, row_index: usize) -> Value {
        let mut visited = HashSet::new();
        self.evaluate_with_visited(cell, grid, row_index, &mut visited)
    }

    /// Evaluate the cell stored at a position.
    pub fn evaluate_at(&self, grid: &Grid, cell_ref: CellRef) -> Value {
        let col = index_to_letters(cell_ref.col);
        self.evaluate(grid.get(cell_ref.row, &col), grid, cell_ref.row)
    }

    fn evaluate_with_visited(
        &self,
        cell: Option<&Cell>,
        grid: &Grid,
        row_index: usize,
        visited: &mut HashSet<CellRef>,
    ) -> Value {
        let Some(cell) = cell else {
            return Value::empty();
        };
        match &cell.contents {
            CellType::Empty => Value::empty(),
            CellType::Text(s) => Value::Text(s.clone()),
            CellType::Number(n) => Value::Number(*n),
            CellType::Formula(formula) => {
                self.evaluate_formula(formula, grid, row_index, visited)
            }
        }
    }

    fn evaluate_formula(
        &self,
        formula: &str,
        grid: &Grid,
        row_index: usize,
        visited: &mut HashSet<CellRef>,
    ) -> Value {
        let expr = formula.to_ascii_uppercase();
        if expr == "ROW()" {
            return Value::Number(row_index as f64 + 1.0);
        }

        let substituted = substitute_references(&expr, |target| {
            let col = index_to_letters(target.col);
            let Some(target_cell) = grid.get(target.row, &col) else {
                return 0.0;
            };
            if !visited.insert(target) {
                return 0.0;
            }
            self.evaluate_with_visited(Some(target_cell), grid, target.row, visited)
                .to_number()
        });

        if !is_arithmetic(&substituted) {
            return Value::Error(ErrorKind::Value);
        }
        self.compute(&substituted)
    }

    /// Evaluate a plain arithmetic expression, rounding to 2 decimals.
    fn compute(&self, expr: &str) -> Value {
        let normalized = normalize_numeric_literals(expr);
        let result: Dynamic = match self.engine.eval_expression(&normalized) {
            Ok(result) => result,
            Err(_) => return Value::Error(ErrorKind::Compute),
        };
        let n = if let Ok(f) = result.as_float() {
            f
        } else if let Ok(i) = result.as_int() {
            i as f64
        } else {
            return Value::Error(ErrorKind::Compute);
        };
        if !n.is_finite() {
            return Value::Error(ErrorKind::Compute);
        }
        Value::Number(round2(n))
    }
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Round half up to two decimals.
fn round2(n: f64) -> f64 {
    (n * 100.0 + 0.5).floor() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(cells: &[(&str, &str)]) -> Grid {
        let mut grid = Grid::new();
        for (a1, input) in cells {
            let cell_ref = CellRef::parse_a1(a1).unwrap();
            grid.set(cell_ref.row, &cell_ref.col_letters(), Cell::from_input(input));
        }
        grid
    }

    fn eval(grid: &Grid, a1: &str) -> Value {
        FormulaEngine::new().evaluate_at(grid, CellRef::parse_a1(a1).unwrap())
    }

    #[test]
    fn test_literal_cells_evaluate_to_themselves() {
        let grid = grid_with(&[("A1", "hello"), ("B1", "42")]);
        assert_eq!(eval(&grid, "A1"), Value::Text("hello".into()));
        assert_eq!(eval(&grid, "B1"), Value::Number(42.0));
    }

    #[test]
    fn test_missing_cell_is_empty_text() {
        let grid = Grid::new();
        assert_eq!(eval(&grid, "C9"), Value::empty());
    }

    #[test]
    fn test_simple_addition() {
        let grid = grid_with(&[("A1", "2"), ("B1", "3"), ("C1", "=A1+B1")]);
        assert_eq!(eval(&grid, "C1"), Value::Number(5.0));
    }

    #[test]
    fn test_lowercase_references() {
        let grid = grid_with(&[("A1", "2"), ("B1", "3"), ("C1", "=a1*b1")]);
        assert_eq!(eval(&grid, "C1"), Value::Number(6.0));
    }

    #[test]
    fn test_division_rounds_to_two_decimals() {
        let grid = grid_with(&[("A1", "=10/3")]);
        assert_eq!(eval(&grid, "A1"), Value::Number(3.33));
        let grid = grid_with(&[("A1", "=2/3")]);
        assert_eq!(eval(&grid, "A1"), Value::Number(0.67));
    }

    #[test]
    fn test_mutual_cycle_evaluates_to_zero() {
        let grid = grid_with(&[("A1", "=B1"), ("B1", "=A1")]);
        assert_eq!(eval(&grid, "A1"), Value::Number(0.0));
        assert_eq!(eval(&grid, "B1"), Value::Number(0.0));
    }

    #[test]
    fn test_self_reference_terminates() {
        let grid = grid_with(&[("A1", "=A1+1")]);
        assert_eq!(eval(&grid, "A1"), Value::Number(2.0));
    }

    #[test]
    fn test_repeated_reference_reads_zero() {
        let grid = grid_with(&[("A1", "2"), ("B1", "=A1+A1")]);
        assert_eq!(eval(&grid, "B1"), Value::Number(2.0));
    }

    #[test]
    fn test_visited_set_spans_sibling_references() {
        // C1 already followed A1, so the second A1 in D1 reads 0.
        let grid = grid_with(&[("A1", "5"), ("C1", "=A1"), ("D1", "=C1+A1")]);
        assert_eq!(eval(&grid, "D1"), Value::Number(5.0));
        assert_eq!(eval(&grid, "C1"), Value::Number(5.0));
    }

    #[test]
    fn test_chained_references() {
        let grid = grid_with(&[("A1", "1.5"), ("A2", "=A1*2"), ("A3", "=A2+1")]);
        assert_eq!(eval(&grid, "A3"), Value::Number(4.0));
    }

    #[test]
    fn test_text_references_coerce() {
        let grid = grid_with(&[("A1", "abc"), ("B1", "01234"), ("C1", "=A1+B1")]);
        assert_eq!(eval(&grid, "C1"), Value::Number(1234.0));
    }

    #[test]
    fn test_missing_references_are_zero() {
        let grid = grid_with(&[("A1", "=Z99+1")]);
        assert_eq!(eval(&grid, "A1"), Value::Number(1.0));
    }

    #[test]
    fn test_negative_reference_subtraction() {
        let grid = grid_with(&[("A1", "5"), ("B1", "-3"), ("C1", "=A1-B1")]);
        assert_eq!(eval(&grid, "C1"), Value::Number(8.0));
    }

    #[test]
    fn test_row_function() {
        let grid = grid_with(&[("A7", "=ROW()"), ("B1", "=row()")]);
        assert_eq!(eval(&grid, "A7"), Value::Number(7.0));
        assert_eq!(eval(&grid, "B1"), Value::Number(1.0));
    }

    #[test]
    fn test_row_function_only_as_whole_formula() {
        let grid = grid_with(&[("A3", "=ROW()*2"), ("B3", "=1+ROW()")]);
        assert_eq!(eval(&grid, "A3"), Value::Error(ErrorKind::Value));
        assert_eq!(eval(&grid, "B3"), Value::Error(ErrorKind::Value));
    }

    #[test]
    fn test_disallowed_characters_are_value_errors() {
        let grid = grid_with(&[("A1", "=SUM(B1)"), ("A2", "=\"x\"")]);
        assert_eq!(eval(&grid, "A1"), Value::Error(ErrorKind::Value));
        assert_eq!(eval(&grid, "A2"), Value::Error(ErrorKind::Value));
    }

    #[test]
    fn test_malformed_arithmetic_is_compute_error() {
        let grid = grid_with(&[("A1", "=1+*2"), ("A2", "=()"), ("A3", "=1/0")]);
        assert_eq!(eval(&grid, "A1"), Value::Error(ErrorKind::Compute));
        assert_eq!(eval(&grid, "A2"), Value::Error(ErrorKind::Compute));
        assert_eq!(eval(&grid, "A3"), Value::Error(ErrorKind::Compute));
    }

    #[test]
    fn test_error_references_coerce_to_zero() {
        let grid = grid_with(&[("A1", "=1+*2"), ("B1", "=A1+4")]);
        assert_eq!(eval(&grid, "B1"), Value::Number(4.0));
    }

    #[test]
    fn test_rounding_is_half_up() {
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.12);
    }
}
