use ordergrid_engine::engine::{Cell, Grid, index_to_letters};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::layout::{ColumnDef, Layout};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("Unknown sort direction: {}", other)),
        }
    }
}

/// Single-column sort applied after filtering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// One sheet of a workbook: a layout, its cells and its view settings.
///
/// Cloning is cheap; the grid is structurally shared.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub id: String,
    pub name: String,
    pub layout: Layout,
    #[serde(rename = "rows")]
    pub grid: Grid,
    /// Width overrides keyed by column letters.
    #[serde(default)]
    pub column_widths: BTreeMap<String, u32>,
    /// Accepted lowercased values per column letters.
    #[serde(default)]
    pub filters: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

impl Sheet {
    pub fn new(id: &str, name: &str, layout: Layout) -> Sheet {
        Sheet {
            id: id.to_string(),
            name: name.to_string(),
            layout,
            grid: Grid::new(),
            column_widths: BTreeMap::new(),
            filters: BTreeMap::new(),
            sort: None,
        }
    }

    /// The order-accounting sheet.
    pub fn main() -> Sheet {
        Sheet::new("main", "订单核算", Layout::Main)
    }

    /// The trucking upload sheet.
    pub fn truck() -> Sheet {
        Sheet::new("truck", "卡派", Layout::Truck)
    }

    pub fn column_count(&self) -> usize {
        self.layout.column_count()
    }

    pub fn columns(&self) -> &'static [ColumnDef] {
        self.layout.columns()
    }

    /// Column letters of every column, in order.
    pub fn column_letters(&self) -> impl Iterator<Item = String> {
        (0..self.column_count()).map(index_to_letters)
    }

    pub fn has_column(&self, col: &str) -> bool {
        self.layout.column(col).is_some()
    }

    pub fn cell(&self, row: usize, col: &str) -> Option<&Cell> {
        self.grid.get(row, col)
    }

    /// Same sheet with a different grid.
    pub fn with_grid(&self, grid: Grid) -> Sheet {
        Sheet {
            grid,
            ..self.clone()
        }
    }

    pub fn column_width(&self, col: &str) -> u32 {
        self.column_widths
            .get(col)
            .copied()
            .or_else(|| self.layout.column(col).map(|c| c.width))
            .unwrap_or(100)
    }

    pub fn set_column_width(&mut self, col: &str, width: u32) {
        self.column_widths.insert(col.to_string(), width);
    }
}
