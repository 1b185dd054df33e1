//! FILENAME: core/engine/src/segmenter.rs
//! PURPOSE: Splits a grid into product records.
//! CONTEXT: Walks the grid from a start row looking for marker rows. For
//! every marker found it reads the layout's fields, then scans forward for
//! the end of the block. Records are yielded lazily by `Segments`, a small
//! state machine:
//!
//!   ScanningForStart -> ReadingFixedFields -> ScanningForEnd
//!     -> RecordEmitted -> ScanningForStart
//!
//! The machine stops when the grid runs out while scanning for a start.
//! A sheet without markers simply yields nothing.
//!
//! Block end: starting `end_scan_offset` rows below the marker, the first
//! row that either carries any marker text in its marker column, or has
//! blank marker, secondary and description columns, closes the block on
//! the row before it.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::cell::CellValue;
use crate::grid::Grid;
use crate::layout::{FieldKind, FieldSpec, FieldValue, Locator, RecordKind, RecordLayout, SegmenterConfig};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SegmentError {
    /// The configuration reads outside the grid or has nothing to read.
    #[error("malformed mapping: {0}")]
    MalformedMapping(String),
}

/// One product block. `start_row..=end_row` are grid rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub kind: RecordKind,
    pub start_row: u32,
    pub end_row: u32,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text of a field, or "" when absent or not textual.
    pub fn text(&self, name: &str) -> &str {
        self.field(name).and_then(FieldValue::as_text).unwrap_or("")
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(FieldValue::as_number)
    }

    pub fn row_span(&self) -> u32 {
        self.end_row - self.start_row + 1
    }
}

/// Validates `config` against `grid` and returns the lazy record sequence
/// starting at `start_row`.
pub fn segment<'a>(
    grid: &'a Grid,
    start_row: u32,
    config: &'a SegmenterConfig,
) -> Result<Segments<'a>, SegmentError> {
    validate(grid, config)?;
    Ok(Segments {
        grid,
        config,
        cursor: start_row,
        state: ScanState::ScanningForStart,
    })
}

fn validate(grid: &Grid, config: &SegmenterConfig) -> Result<(), SegmentError> {
    if config.layouts.is_empty() {
        return Err(SegmentError::MalformedMapping(
            "no record layouts configured".to_string(),
        ));
    }

    let col_count = grid.col_count();
    let mut referenced = vec![
        ("secondary column".to_string(), config.secondary_column),
        ("description column".to_string(), config.description_column),
    ];
    for layout in &config.layouts {
        referenced.extend(layout.referenced_columns());
    }

    for (what, column) in referenced {
        if column >= col_count {
            return Err(SegmentError::MalformedMapping(format!(
                "{} reads column {} but the grid has {} columns",
                what, column, col_count
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum ScanState {
    ScanningForStart,
    ReadingFixedFields {
        start: u32,
        layout: usize,
    },
    ScanningForEnd {
        start: u32,
        layout: usize,
        fields: BTreeMap<String, FieldValue>,
    },
    RecordEmitted {
        end: u32,
    },
    Exhausted,
}

/// Lazy, finite sequence of records. Cloning it restarts nothing: the clone
/// continues from the same position.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    grid: &'a Grid,
    config: &'a SegmenterConfig,
    cursor: u32,
    state: ScanState,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            match std::mem::replace(&mut self.state, ScanState::Exhausted) {
                ScanState::ScanningForStart => match self.find_start() {
                    Some((start, layout)) => {
                        self.state = ScanState::ReadingFixedFields { start, layout };
                    }
                    None => return None,
                },

                ScanState::ReadingFixedFields { start, layout } => {
                    let fields = read_fields(self.grid, &self.config.layouts[layout], start);
                    self.state = ScanState::ScanningForEnd {
                        start,
                        layout,
                        fields,
                    };
                }

                ScanState::ScanningForEnd {
                    start,
                    layout,
                    fields,
                } => {
                    let end = self.find_end(start, &self.config.layouts[layout]);
                    let kind = self.config.layouts[layout].marker.kind;
                    debug!(
                        target: "SEGMENT",
                        "{} record at rows {}..={}",
                        kind,
                        start,
                        end
                    );
                    self.state = ScanState::RecordEmitted { end };
                    return Some(Record {
                        kind,
                        start_row: start,
                        end_row: end,
                        fields,
                    });
                }

                ScanState::RecordEmitted { end } => {
                    self.cursor = end + 1;
                    self.state = ScanState::ScanningForStart;
                }

                ScanState::Exhausted => return None,
            }
        }
    }
}

impl<'a> Segments<'a> {
    /// First row at or after the cursor that starts a record, with the
    /// index of its layout. Leaves the cursor on that row.
    fn find_start(&mut self) -> Option<(u32, usize)> {
        while self.cursor < self.grid.row_count() {
            let row = self.cursor;
            if let Some(idx) = self
                .config
                .layouts
                .iter()
                .position(|layout| starts_record(self.grid, layout, row))
            {
                return Some((row, idx));
            }
            self.cursor += 1;
        }
        None
    }

    fn find_end(&self, start: u32, layout: &RecordLayout) -> u32 {
        let grid = self.grid;
        let rows = grid.row_count();
        let marker_column = layout.marker.column;
        let mut row = start.saturating_add(self.config.end_scan_offset);

        while row < rows {
            if self.is_any_marker(row) {
                trace!(target: "SEGMENT", "block at {} closed by marker on row {}", start, row);
                break;
            }
            if grid.value(row, marker_column).is_blank_trimmed()
                && grid.value(row, self.config.secondary_column).is_blank()
                && grid.value(row, self.config.description_column).is_blank_trimmed()
            {
                trace!(target: "SEGMENT", "block at {} closed by blank row {}", start, row);
                break;
            }
            row += 1;
        }

        // The row before the closing one, kept inside the grid and never
        // before the start.
        let last_row = rows.saturating_sub(1);
        row.saturating_sub(1).min(last_row).max(start)
    }

    /// Marker text in the marker column, without the confirm check.
    fn is_any_marker(&self, row: u32) -> bool {
        self.config
            .layouts
            .iter()
            .any(|layout| self.grid.text(row, layout.marker.column) == layout.marker.text)
    }
}

fn starts_record(grid: &Grid, layout: &RecordLayout, row: u32) -> bool {
    let marker = &layout.marker;
    if grid.text(row, marker.column) != marker.text {
        return false;
    }
    match &marker.confirm {
        Some(confirm) => grid
            .text(row, confirm.column)
            .to_lowercase()
            .contains(&confirm.contains.to_lowercase()),
        None => true,
    }
}

fn read_fields(grid: &Grid, layout: &RecordLayout, start: u32) -> BTreeMap<String, FieldValue> {
    let mut fields = BTreeMap::new();
    for spec in &layout.fields {
        let value = read_field(grid, spec, start).or_else(|| spec.default.clone());
        if let Some(value) = value {
            fields.insert(spec.name.clone(), value);
        }
    }
    fields
}

/// Reads one field. None means "not found", which lets the default apply.
fn read_field(grid: &Grid, spec: &FieldSpec, start: u32) -> Option<FieldValue> {
    let (row, column) = match &spec.locator {
        Locator::Constant { value } => return Some(FieldValue::Text(value.clone())),

        Locator::Fixed { row_offset, column } => (start.checked_add(*row_offset)?, *column),

        Locator::BelowLabel {
            label_column,
            label,
            window,
            value_column,
        } => {
            let below = find_label(grid, start, *window, *label_column, label)
                .map(|r| r + 1)
                .filter(|r| grid.contains_row(*r));
            (below.unwrap_or(start), *value_column)
        }

        Locator::BesideLabel {
            label_column,
            label,
            window,
            value_column,
        } => (
            find_label(grid, start, *window, *label_column, label)?,
            *value_column,
        ),
    };

    if !grid.contains_row(row) {
        return None;
    }
    interpret(grid, row, column, spec)
}

fn find_label(
    grid: &Grid,
    start: u32,
    window: u32,
    column: u32,
    label: &crate::layout::LabelMatch,
) -> Option<u32> {
    let end = start.saturating_add(window).min(grid.row_count());
    (start..end).find(|&row| label.matches(&grid.text(row, column)))
}

fn interpret(grid: &Grid, row: u32, column: u32, spec: &FieldSpec) -> Option<FieldValue> {
    let value = grid.value(row, column);
    match spec.kind {
        FieldKind::Text => {
            let text = value.trimmed();
            let text = if spec.collapse_whitespace {
                text.split_whitespace().collect::<Vec<_>>().join(" ")
            } else {
                text
            };
            Some(FieldValue::Text(text))
        }

        FieldKind::Number => value.currency_amount().map(FieldValue::Number),

        FieldKind::FormulaOrNumber => {
            if let Some(formula) = grid.formula(row, column) {
                return Some(FieldValue::Formula(formula.to_string()));
            }
            Some(match value {
                CellValue::Number(n) => FieldValue::Number(*n),
                v if v.is_blank_trimmed() => FieldValue::Empty,
                v => FieldValue::Text(v.trimmed()),
            })
        }
    }
}
