//! Sheet persistence.
//!
//! A workbook file is a JSON object holding every saved sheet by id:
//!
//! ```json
//! { "version": 1, "sheets": { "main": { ... }, "truck": { ... } } }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::document::Sheet;
use crate::error::Result;

const FORMAT_VERSION: u32 = 1;

/// Load/save port over whole sheets.
pub trait SheetStore {
    /// Load the sheet with the given id, if the store has one.
    fn load(&self, id: &str) -> Result<Option<Sheet>>;
    /// Store a sheet under its id, replacing any previous version.
    fn save(&mut self, sheet: &Sheet) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkbookFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    sheets: BTreeMap<String, Sheet>,
}

/// Sheets in a single JSON file on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<WorkbookFile>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let file: WorkbookFile = serde_json::from_str(&content)?;
        if file.version > FORMAT_VERSION {
            tracing::warn!(
                path = %self.path.display(),
                version = file.version,
                "workbook written by a newer version"
            );
        }
        Ok(Some(file))
    }
}

impl SheetStore for JsonFileStore {
    fn load(&self, id: &str) -> Result<Option<Sheet>> {
        let Some(mut file) = self.read()? else {
            return Ok(None);
        };
        Ok(file.sheets.remove(id).map(|mut sheet| {
            sheet.grid.prune();
            sheet.grid.repair_spans();
            sheet
        }))
    }

    fn save(&mut self, sheet: &Sheet) -> Result<()> {
        let mut file = self.read()?.unwrap_or_default();
        file.version = FORMAT_VERSION;
        file.sheets.insert(sheet.id.clone(), sheet.clone());
        let content = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), sheet = %sheet.id, "saved sheet");
        Ok(())
    }
}

/// Sheets kept in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    sheets: HashMap<String, Sheet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl SheetStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Option<Sheet>> {
        Ok(self.sheets.get(id).cloned())
    }

    fn save(&mut self, sheet: &Sheet) -> Result<()> {
        self.sheets.insert(sheet.id.clone(), sheet.clone());
        Ok(())
    }
}
