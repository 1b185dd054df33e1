//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the quotation engine.
//! CONTEXT: Re-exports public types and modules for use by other crates.
//! Everything here is a pure function over a `Grid` snapshot: the engine
//! never reads or writes workbooks itself.

pub mod cell;
pub mod coord;
pub mod dimensions;
pub mod evaluator;
pub mod grid;
pub mod layout;
pub mod line_items;
pub mod rewriter;
pub mod segmenter;
pub mod variables;

// Re-export commonly used types at the crate root
pub use cell::{leading_number, Cell, CellValue};
pub use coord::{col_to_index, coord_to_a1, index_to_col, normalize_a1, parse_a1, CellCoord};
pub use dimensions::{find_dimension_groups, DimensionConfig, DimensionGroup, DimensionGroups};
pub use evaluator::{evaluate_expression, EvalError, EvalResult};
pub use grid::{Grid, RowSpan};
pub use layout::{
    FieldKind, FieldSpec, FieldValue, LabelMatch, Locator, MarkerConfirm, MarkerRule, MatchMode,
    RecordKind, RecordLayout, SegmenterConfig,
};
pub use line_items::{
    block_caption, block_span, extract_line_items, ComputedLineItem, LineItemConfig, LineItemSheet,
};
pub use rewriter::{
    evaluate, evaluate_formula, mark_as_text, round_cents, strip_text_marker, translate_references,
    CoordinateMap, RewriteError,
};
pub use segmenter::{segment, Record, SegmentError, Segments};
pub use variables::{standard_fallbacks, Fallback, FallbackRule, VariableContext};
