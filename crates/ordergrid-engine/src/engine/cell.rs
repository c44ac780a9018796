//! Cell data structures for the spreadsheet grid.
//!
//! This module provides the core data types for representing cells:
//! - [`CellType`] - The content of a cell (empty, text, number, or formula)
//! - [`CellStyle`] - Optional formatting, also used as a partial style patch
//! - [`Cell`] - Contents plus style, merge spans, hidden flag and comment

use serde::{Deserialize, Serialize};

/// The content stored in a cell.
///
/// Formulas are stored without their leading `=`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellType {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Formula(String),
}

impl CellType {
    /// Parse user input into cell contents.
    /// - Blank input -> Empty
    /// - Starts with '=' -> Formula (without the '=')
    /// - Canonical rendering of a finite number -> Number
    /// - Otherwise -> Text, kept verbatim
    ///
    /// Numbers are only recognised when printing them back reproduces the
    /// input, so zip codes like "01234" and long tracking numbers stay text.
    pub fn from_input(input: &str) -> CellType {
        if input.trim().is_empty() {
            return CellType::Empty;
        }
        if let Some(formula) = input.strip_prefix('=') {
            return CellType::Formula(formula.to_string());
        }
        CellType::literal(input)
    }

    /// Like [`CellType::from_input`] but never produces a formula.
    pub fn literal(input: &str) -> CellType {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return CellType::Empty;
        }
        if let Ok(n) = trimmed.parse::<f64>()
            && n.is_finite()
            && n.to_string() == trimmed
        {
            return CellType::Number(n);
        }
        CellType::Text(input.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellType::Empty)
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellType::Formula(_))
    }

    /// Numeric value of a literal, if it has one. Formulas never do.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellType::Number(n) => Some(*n),
            CellType::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellType::Empty | CellType::Formula(_) => None,
        }
    }

    /// Text for editing and copying: formulas with their '=', literals as written.
    pub fn to_input_string(&self) -> String {
        match self {
            CellType::Empty => String::new(),
            CellType::Text(s) => s.clone(),
            CellType::Number(n) => super::format_number(*n),
            CellType::Formula(s) => format!("={}", s),
        }
    }
}

/// Horizontal alignment of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

impl std::str::FromStr for TextAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(TextAlign::Left),
            "center" => Ok(TextAlign::Center),
            "right" => Ok(TextAlign::Right),
            other => Err(format!("Unknown alignment: {}", other)),
        }
    }
}

/// Cell formatting. Every field is optional so the same type doubles as a
/// partial patch for [`CellStyle::merge`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_text: Option<bool>,
}

impl CellStyle {
    /// Shallow merge: every field set in `patch` overwrites the field here.
    pub fn merge(&mut self, patch: &CellStyle) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if let Some(v) = src {
                *dst = Some(v.clone());
            }
        }
        take(&mut self.bold, &patch.bold);
        take(&mut self.italic, &patch.italic);
        take(&mut self.underline, &patch.underline);
        take(&mut self.color, &patch.color);
        take(&mut self.background_color, &patch.background_color);
        take(&mut self.text_align, &patch.text_align);
        take(&mut self.font_size, &patch.font_size);
        take(&mut self.wrap_text, &patch.wrap_text);
    }

    pub fn is_empty(&self) -> bool {
        *self == CellStyle::default()
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cell {
    pub contents: CellType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_span: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_span: Option<usize>,
    #[serde(skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Cell {
    pub fn new(contents: CellType) -> Cell {
        Cell {
            contents,
            ..Cell::default()
        }
    }

    pub fn new_text(text: &str) -> Cell {
        Cell::new(CellType::Text(text.to_string()))
    }

    pub fn new_number(n: f64) -> Cell {
        Cell::new(CellType::Number(n))
    }

    /// Create a formula cell; a leading '=' is accepted and stripped.
    pub fn new_formula(formula: &str) -> Cell {
        let formula = formula.strip_prefix('=').unwrap_or(formula);
        Cell::new(CellType::Formula(formula.to_string()))
    }

    pub fn from_input(input: &str) -> Cell {
        Cell::new(CellType::from_input(input))
    }

    /// Merge a partial style into this cell's style.
    pub fn merge_style(&mut self, patch: &CellStyle) {
        let style = self.style.get_or_insert_with(CellStyle::default);
        style.merge(patch);
        if style.is_empty() {
            self.style = None;
        }
    }

    /// A blank cell carries nothing worth storing and is dropped by the grid.
    pub fn is_blank(&self) -> bool {
        self.contents.is_empty()
            && self.style.as_ref().is_none_or(CellStyle::is_empty)
            && self.row_span.is_none()
            && self.col_span.is_none()
            && !self.hidden
            && self.comment.is_none()
    }

    pub fn to_input_string(&self) -> String {
        self.contents.to_input_string()
    }
}
