//! FILENAME: core/engine/src/grid.rs
//! PURPOSE: A rectangular point-in-time snapshot of a sheet range.
//! CONTEXT: This file defines the `Grid` struct which every component reads
//! from. Storage is sparse (HashMap) because the generator sheets are
//! mostly empty, but the dimensions are explicit: a snapshot of
//! "A1:L200" has 200 rows even when the last ones are blank. `origin`
//! remembers where grid cell (0, 0) sat on the sheet so formulas that
//! mention sheet coordinates can be matched back to grid rows.

use std::collections::HashMap;

use crate::cell::{Cell, CellValue};
use crate::coord::{coord_to_a1, CellCoord};

static EMPTY: CellValue = CellValue::Empty;

/// An inclusive run of grid rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub start: u32,
    pub end: u32,
}

impl RowSpan {
    /// `end` is clamped so the span is never inverted.
    pub fn new(start: u32, end: u32) -> Self {
        RowSpan {
            start,
            end: end.max(start),
        }
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }

    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn contains(&self, row: u32) -> bool {
        row >= self.start && row <= self.end
    }
}

/// Row and Col are 0-based indices relative to `origin`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    /// Sparse storage: keys are (row, col), values are Cell instances.
    pub cells: HashMap<(u32, u32), Cell>,

    /// Number of rows in the snapshot.
    pub rows: u32,

    /// Number of columns in the snapshot.
    pub cols: u32,

    /// 0-based sheet coordinate of grid cell (0, 0).
    pub origin: CellCoord,
}

impl Grid {
    /// Creates a new, empty Grid anchored at A1.
    pub fn new() -> Self {
        Grid {
            cells: HashMap::new(),
            rows: 0,
            cols: 0,
            origin: (0, 0),
        }
    }

    /// Creates an empty grid of fixed size.
    pub fn with_dimensions(rows: u32, cols: u32) -> Self {
        Grid {
            rows,
            cols,
            ..Grid::new()
        }
    }

    pub fn with_origin(mut self, origin: CellCoord) -> Self {
        self.origin = origin;
        self
    }

    /// Builds a values-only snapshot from row vectors. Ragged rows are
    /// padded: the widest row sets the column count.
    pub fn from_rows<V: Into<CellValue>>(rows: Vec<Vec<V>>) -> Self {
        let mut grid = Grid::new();
        grid.rows = rows.len() as u32;
        for (r, row) in rows.into_iter().enumerate() {
            grid.cols = grid.cols.max(row.len() as u32);
            for (c, value) in row.into_iter().enumerate() {
                let value = value.into();
                if value != CellValue::Empty {
                    grid.cells.insert((r as u32, c as u32), Cell { formula: None, value });
                }
            }
        }
        grid
    }

    /// Sets a cell at the specified coordinates, growing the dimensions
    /// when needed.
    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        self.rows = self.rows.max(row + 1);
        self.cols = self.cols.max(col + 1);
        self.cells.insert((row, col), cell);
    }

    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) {
        let formula = self.cells.get(&(row, col)).and_then(|c| c.formula.clone());
        self.set_cell(
            row,
            col,
            Cell {
                formula,
                value: value.into(),
            },
        );
    }

    /// Attaches formula text to a cell, keeping its computed value.
    pub fn set_formula(&mut self, row: u32, col: u32, formula: impl Into<String>) {
        let value = self.value(row, col).clone();
        self.set_cell(
            row,
            col,
            Cell {
                formula: Some(formula.into()),
                value,
            },
        );
    }

    /// Retrieves a reference to a cell at the specified coordinates.
    /// Returns None if the cell is empty (not stored).
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// The computed value at (row, col); `Empty` outside the snapshot.
    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        self.cells.get(&(row, col)).map(|c| &c.value).unwrap_or(&EMPTY)
    }

    /// The formula text at (row, col), if the source cell held one.
    pub fn formula(&self, row: u32, col: u32) -> Option<&str> {
        self.cells
            .get(&(row, col))
            .and_then(|c| c.formula.as_deref())
            .filter(|f| !f.is_empty())
    }

    /// Trimmed display text at (row, col).
    pub fn text(&self, row: u32, col: u32) -> String {
        self.value(row, col).trimmed()
    }

    pub fn row_count(&self) -> u32 {
        self.rows
    }

    pub fn col_count(&self) -> u32 {
        self.cols
    }

    pub fn contains_row(&self, row: u32) -> bool {
        row < self.rows
    }

    /// Values of one row, padded to the column count.
    pub fn row_values(&self, row: u32) -> Vec<CellValue> {
        (0..self.cols).map(|c| self.value(row, c).clone()).collect()
    }

    /// 1-based row number on the originating sheet.
    pub fn sheet_row_number(&self, row: u32) -> u32 {
        self.origin.0 + row + 1
    }

    /// A1 reference on the originating sheet for a grid position.
    pub fn sheet_reference(&self, row: u32, col: u32) -> String {
        coord_to_a1((self.origin.0 + row, self.origin.1 + col))
    }

    /// Index of the last row holding any non-blank value, if any.
    pub fn last_used_row(&self) -> Option<u32> {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.value.is_blank() || cell.formula.is_some())
            .map(|(&(row, _), _)| row)
            .max()
    }
}
