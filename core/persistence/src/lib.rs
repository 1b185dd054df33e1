//! FILENAME: core/persistence/src/lib.rs
//! Cotiza Persistence Module
//!
//! Moves quotation sheets between XLSX files and engine `Grid` snapshots.
//! Each loaded sheet carries both snapshots the engine needs: the values
//! the spreadsheet last computed, and the formula text of every formula
//! cell. Workspace state that is not sheet data (the catalog batch cursor,
//! the last issued folio) lives in a hidden metadata sheet.

mod error;
mod xlsx_reader;
mod xlsx_writer;

pub use error::PersistenceError;
pub use xlsx_reader::load_xlsx;
pub use xlsx_writer::save_xlsx;

use std::collections::BTreeMap;

use cotiza_engine::grid::Grid;
use serde::{Deserialize, Serialize};

// ============================================================================
// METADATA SHEET NAME (used for persisting Cotiza-specific data in XLSX)
// ============================================================================

/// Hidden metadata sheet name for storing Cotiza-specific data in XLSX files.
/// This sheet is filtered out during load and written during save.
pub const META_SHEET_NAME: &str = "_cotiza_meta";

/// Current metadata layout.
pub const META_VERSION: u32 = 1;

// ============================================================================
// WORKBOOK
// ============================================================================

/// A set of named sheets plus the workspace metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    pub meta: CotizaMeta,
}

impl Workbook {
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            meta: CotizaMeta::default(),
        }
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet, PersistenceError> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| PersistenceError::SheetNotFound(name.to_string()))
    }

    /// The grid of the named sheet.
    pub fn grid(&self, name: &str) -> Result<&Grid, PersistenceError> {
        self.sheet(name).map(|s| &s.grid)
    }

    pub fn grid_mut(&mut self, name: &str) -> Result<&mut Grid, PersistenceError> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .map(|s| &mut s.grid)
            .ok_or_else(|| PersistenceError::SheetNotFound(name.to_string()))
    }

    /// Replaces the sheet with the same name, or appends a new one.
    pub fn put_sheet(&mut self, sheet: Sheet) {
        match self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SHEET
// ============================================================================

/// Represents a single worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
}

impl Sheet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            grid: Grid::new(),
        }
    }

    pub fn from_grid(name: &str, grid: Grid) -> Self {
        Self {
            name: name.to_string(),
            grid,
        }
    }
}

// ============================================================================
// WORKSPACE METADATA
// ============================================================================

/// Cotiza metadata stored as JSON in cell A1 of the hidden metadata sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CotizaMeta {
    pub version: u32,
    /// Last catalog row processed by an interrupted batch (1-based).
    #[serde(default)]
    pub progress: Option<u32>,
    /// Last folio handed out.
    #[serde(default)]
    pub last_folio: Option<u64>,
    /// Cells per sheet whose text carried the apostrophe marker. The file
    /// stores them with the quote-prefix format, which the reader cannot
    /// see, so the marker is restored from here on load.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub literal_cells: BTreeMap<String, Vec<(u32, u32)>>,
}

impl Default for CotizaMeta {
    fn default() -> Self {
        Self {
            version: META_VERSION,
            progress: None,
            last_folio: None,
            literal_cells: BTreeMap::new(),
        }
    }
}

impl CotizaMeta {
    pub fn is_empty(&self) -> bool {
        self.progress.is_none() && self.last_folio.is_none()
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }
}
