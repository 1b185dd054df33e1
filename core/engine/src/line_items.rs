//! FILENAME: core/engine/src/line_items.rs
//! PURPOSE: Reads the material rows of one product block on the
//! generators sheet.
//! CONTEXT: A generator block looks like this:
//!
//!   | A        | B      | C            | D     |   H (marker) |
//!   | caption  |        |              |       |   X          |
//!   | Largo    | Alto   |              |       |              |
//!   | 1.20     | 2.10   | Fijo         |       |              |
//!   | Cantidad | Unidad | Descripción  | P.U.  |              |
//!   | =A3*2    | pza    | Jaladera     | 35    |              |
//!
//! The block runs until the next non-blank marker cell. Quantities are
//! formulas over the measurement cells and the waste cell; they are
//! translated to variable names and evaluated against the block's own
//! measurements.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::dimensions::{find_dimension_groups, DimensionConfig, DimensionGroups};
use crate::grid::{Grid, RowSpan};
use crate::rewriter::{self, CoordinateMap};
use crate::variables::VariableContext;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItemConfig {
    pub dimensions: DimensionConfig,
    pub quantity_label: String,
    pub unit_label: String,
    pub quantity_column: u32,
    pub unit_column: u32,
    pub material_column: u32,
    pub price_column: u32,
    /// Column whose next non-blank cell starts the following block.
    pub marker_column: u32,
    /// The sheet cell holding the waste multiplier.
    pub waste_reference: String,
    pub waste_variable: String,
}

impl Default for LineItemConfig {
    fn default() -> Self {
        LineItemConfig {
            dimensions: DimensionConfig::default(),
            quantity_label: "cantidad".to_string(),
            unit_label: "unidad".to_string(),
            quantity_column: 0,
            unit_column: 1,
            material_column: 2,
            price_column: 3,
            marker_column: 7,
            waste_reference: "B2".to_string(),
            waste_variable: "Desp".to_string(),
        }
    }
}

impl LineItemConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// One material row, with its quantity evaluated when possible.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedLineItem {
    /// The evaluated quantity, or the unevaluated original value.
    pub quantity: CellValue,
    pub unit: String,
    pub material: String,
    /// The quantity formula with coordinates replaced by variable names.
    pub raw_formula: Option<String>,
    pub listed_price: CellValue,
}

impl ComputedLineItem {
    /// What goes into a cell meant for display: the translated formula
    /// marked as text, or the plain quantity.
    pub fn stored_quantity(&self) -> CellValue {
        match &self.raw_formula {
            Some(f) => CellValue::Text(rewriter::mark_as_text(f)),
            None => self.quantity.clone(),
        }
    }

    pub fn evaluated(&self) -> Option<f64> {
        self.quantity.as_number()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItemSheet {
    pub span: RowSpan,
    pub header_row: u32,
    pub dimensions: DimensionGroups,
    pub coordinates: CoordinateMap,
    pub items: Vec<ComputedLineItem>,
}

/// The rows of the block starting at `start_row`: up to the row before the
/// next non-blank cell in `marker_column`, or to the last grid row.
pub fn block_span(grid: &Grid, start_row: u32, marker_column: u32) -> RowSpan {
    let last = grid.row_count().saturating_sub(1);
    let end = (start_row + 1..grid.row_count())
        .find(|&r| !grid.value(r, marker_column).is_blank())
        .map(|r| r - 1)
        .unwrap_or(last);
    RowSpan::new(start_row, end)
}

/// The block caption: bottom-up, the first row with text in A and nothing
/// in B, C and D.
pub fn block_caption(grid: &Grid, span: RowSpan) -> Option<String> {
    span.rows()
        .rev()
        .filter(|r| grid.contains_row(*r))
        .find(|&r| {
            !grid.value(r, 0).is_blank()
                && (1..=3).all(|c| grid.value(r, c).is_blank())
        })
        .map(|r| grid.text(r, 0))
}

/// Reads the measurement pairs and material rows of a block. None when the
/// block has no "Cantidad / Unidad" header.
pub fn extract_line_items(
    grid: &Grid,
    span: RowSpan,
    config: &LineItemConfig,
    base_context: &VariableContext,
) -> Option<LineItemSheet> {
    let header_row = span.rows().filter(|r| grid.contains_row(*r)).find(|&r| {
        grid.text(r, config.quantity_column).to_lowercase() == config.quantity_label.to_lowercase()
            && grid.text(r, config.unit_column).to_lowercase() == config.unit_label.to_lowercase()
    });
    let Some(header_row) = header_row else {
        debug!(target: "SEGMENT", "no material header in rows {}..={}", span.start, span.end);
        return None;
    };

    // Measurements only count above the material header.
    let dimensions = find_dimension_groups(
        grid,
        RowSpan::new(span.start, header_row),
        &config.dimensions,
    );

    let mut coordinates = CoordinateMap::new().with(&config.waste_reference, &config.waste_variable);
    for (reference, variable) in dimensions.coordinates.iter() {
        coordinates.insert(reference, variable);
    }

    let mut context = base_context.clone();
    context.overlay(&dimensions.context);

    let mut items = Vec::new();
    for row in header_row + 1..=span.end {
        if !grid.contains_row(row) {
            break;
        }
        if grid.value(row, config.unit_column).is_blank() {
            continue;
        }

        let (quantity, raw_formula) = match grid.formula(row, config.quantity_column) {
            Some(formula) => {
                let translated = rewriter::translate_references(formula, &coordinates);
                let quantity = rewriter::evaluate(&CellValue::text(formula), &coordinates, &context);
                (quantity, Some(translated))
            }
            None => (grid.value(row, config.quantity_column).clone(), None),
        };

        items.push(ComputedLineItem {
            quantity,
            unit: grid.text(row, config.unit_column),
            material: grid.text(row, config.material_column),
            raw_formula,
            listed_price: grid.value(row, config.price_column).clone(),
        });
    }

    debug!(
        target: "SEGMENT",
        "block {}..={}: {} measurement groups, {} line items",
        span.start,
        span.end,
        dimensions.len(),
        items.len()
    );

    Some(LineItemSheet {
        span,
        header_row,
        dimensions,
        coordinates,
        items,
    })
}
