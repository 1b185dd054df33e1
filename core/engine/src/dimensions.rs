//! FILENAME: core/engine/src/dimensions.rs
//! PURPOSE: Finds the "Largo / Alto" measurement pairs of a product block.
//! CONTEXT: A generator block lists up to six measurement rows under a
//! header row ("largo" in A, "alto" in B). Each valid row j becomes the
//! variables `Largo{j}` / `Alto{j}`, and its sheet coordinates are mapped
//! to those names so the block's quantity formulas (`=A11*2`) can be
//! rewritten. The search stops at the first row that is not a pair of
//! numbers; gaps are never skipped.

use serde::{Deserialize, Serialize};

use crate::grid::{Grid, RowSpan};
use crate::rewriter::CoordinateMap;
use crate::variables::VariableContext;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionConfig {
    pub length_label: String,
    pub height_label: String,
    pub length_column: u32,
    pub height_column: u32,
    /// Optional free-text label next to each pair.
    pub label_column: u32,
    pub max_groups: u32,
    pub length_prefix: String,
    pub height_prefix: String,
}

impl Default for DimensionConfig {
    fn default() -> Self {
        DimensionConfig {
            length_label: "largo".to_string(),
            height_label: "alto".to_string(),
            length_column: 0,
            height_column: 1,
            label_column: 2,
            max_groups: 6,
            length_prefix: "Largo".to_string(),
            height_prefix: "Alto".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimensionGroup {
    /// 1-based group number.
    pub index: u32,
    pub row: u32,
    pub length: f64,
    pub height: f64,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionGroups {
    pub header_row: Option<u32>,
    pub groups: Vec<DimensionGroup>,
    pub coordinates: CoordinateMap,
    pub context: VariableContext,
}

impl DimensionGroups {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The pair labels joined with newlines, in discovery order.
    pub fn summary(&self) -> String {
        self.labels().join("\n")
    }

    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().filter_map(|g| g.label.as_deref()).collect()
    }
}

/// Scans `rows` for the first measurement header and reads the pairs
/// below it.
pub fn find_dimension_groups(grid: &Grid, rows: RowSpan, config: &DimensionConfig) -> DimensionGroups {
    let mut result = DimensionGroups::default();

    let header = rows.rows().filter(|r| grid.contains_row(*r)).find(|&r| {
        grid.text(r, config.length_column).to_lowercase() == config.length_label.to_lowercase()
            && grid.text(r, config.height_column).to_lowercase() == config.height_label.to_lowercase()
    });
    let Some(header) = header else {
        return result;
    };
    result.header_row = Some(header);

    for j in 1..=config.max_groups {
        let row = header + j;
        if !rows.contains(row) || !grid.contains_row(row) {
            break;
        }
        let length = grid.value(row, config.length_column).leading_number();
        let height = grid.value(row, config.height_column).leading_number();
        let (Some(length), Some(height)) = (length, height) else {
            break;
        };

        let length_name = format!("{}{}", config.length_prefix, j);
        let height_name = format!("{}{}", config.height_prefix, j);
        result
            .coordinates
            .insert(&grid.sheet_reference(row, config.length_column), &length_name);
        result
            .coordinates
            .insert(&grid.sheet_reference(row, config.height_column), &height_name);
        result.context.set(&length_name, length);
        result.context.set(&height_name, height);

        let label = grid.text(row, config.label_column);
        result.groups.push(DimensionGroup {
            index: j,
            row,
            length,
            height,
            label: if label.is_empty() { None } else { Some(label) },
        });
    }

    result
}
