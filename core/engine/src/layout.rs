//! FILENAME: core/engine/src/layout.rs
//! PURPOSE: Configuration describing how product records sit in a grid.
//! CONTEXT: A quotation sheet is a stack of product blocks. Each block
//! starts at a marker row ("Datos de la Pieza", "Medidas") and its fields
//! live at fixed offsets or next to labels a few rows below the marker.
//! None of that is hard-coded in the segmenter: it reads a `SegmenterConfig`
//! made of one `RecordLayout` per marker. `SegmenterConfig::default()`
//! reproduces the layout of the "Generador" sheet; integrations with other
//! sheets load their own with `from_json`.

use serde::{Deserialize, Serialize};

/// Column indices used by the default layouts.
pub mod columns {
    pub const A: u32 = 0;
    pub const B: u32 = 1;
    pub const D: u32 = 3;
    pub const K: u32 = 10;
    pub const L: u32 = 11;
}

use columns::{A, B, D, K, L};

/// The closed set of record variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Doors, windows and other assembled pieces.
    Piece,
    /// Glass cut to measure.
    Measurement,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Piece => write!(f, "PIEZA"),
            RecordKind::Measurement => write!(f, "MEDIDAS"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Equals,
    EqualsIgnoreCase,
    ContainsIgnoreCase,
}

/// A label test over trimmed cell text. Any alternative may match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMatch {
    pub mode: MatchMode,
    pub alternatives: Vec<String>,
}

impl LabelMatch {
    pub fn equals(text: &str) -> Self {
        Self::one(MatchMode::Equals, text)
    }

    pub fn equals_ignore_case(text: &str) -> Self {
        Self::one(MatchMode::EqualsIgnoreCase, text)
    }

    pub fn contains_ignore_case(alternatives: &[&str]) -> Self {
        LabelMatch {
            mode: MatchMode::ContainsIgnoreCase,
            alternatives: alternatives.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn one(mode: MatchMode, text: &str) -> Self {
        LabelMatch {
            mode,
            alternatives: vec![text.to_string()],
        }
    }

    /// `text` is expected to be trimmed already.
    pub fn matches(&self, text: &str) -> bool {
        match self.mode {
            MatchMode::Equals => self.alternatives.iter().any(|a| a == text),
            MatchMode::EqualsIgnoreCase => {
                let lower = text.to_lowercase();
                self.alternatives.iter().any(|a| a.to_lowercase() == lower)
            }
            MatchMode::ContainsIgnoreCase => {
                let lower = text.to_lowercase();
                self.alternatives
                    .iter()
                    .any(|a| lower.contains(&a.to_lowercase()))
            }
        }
    }
}

/// Where a field value is read, relative to the record's start row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Locator {
    /// Always `start + row_offset`, in `column`.
    Fixed { row_offset: u32, column: u32 },

    /// The row after the first label match in `[start, start + window)`.
    /// Falls back to the start row when the label is not found.
    BelowLabel {
        label_column: u32,
        label: LabelMatch,
        window: u32,
        value_column: u32,
    },

    /// The label row itself. Absent when the label is not found.
    BesideLabel {
        label_column: u32,
        label: LabelMatch,
        window: u32,
        value_column: u32,
    },

    /// A value that does not come from the grid.
    Constant { value: String },
}

impl Locator {
    /// Every grid column this locator reads.
    pub fn columns(&self) -> Vec<u32> {
        match self {
            Locator::Fixed { column, .. } => vec![*column],
            Locator::BelowLabel {
                label_column,
                value_column,
                ..
            }
            | Locator::BesideLabel {
                label_column,
                value_column,
                ..
            } => vec![*label_column, *value_column],
            Locator::Constant { .. } => Vec::new(),
        }
    }
}

/// How a located cell is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Trimmed display text.
    Text,
    /// The cell's formula text when it carries one, otherwise its value.
    FormulaOrNumber,
    /// A number, with currency symbols and thousands separators ignored.
    /// Unparsable cells count as absent.
    Number,
}

/// The value a record holds for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Formula(String),
    Empty,
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Formula(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub locator: Locator,
    pub kind: FieldKind,
    /// Collapse internal whitespace runs to one space (text only).
    #[serde(default)]
    pub collapse_whitespace: bool,
    /// Used when the locator finds nothing.
    #[serde(default)]
    pub default: Option<FieldValue>,
}

impl FieldSpec {
    pub fn new(name: &str, locator: Locator, kind: FieldKind) -> Self {
        FieldSpec {
            name: name.to_string(),
            locator,
            kind,
            collapse_whitespace: false,
            default: None,
        }
    }

    pub fn collapsed(mut self) -> Self {
        self.collapse_whitespace = true;
        self
    }

    pub fn or_default(mut self, value: FieldValue) -> Self {
        self.default = Some(value);
        self
    }
}

/// A second cell that must agree before a marker row counts as a start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerConfirm {
    pub column: u32,
    /// Case-insensitive substring.
    pub contains: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRule {
    pub kind: RecordKind,
    pub column: u32,
    /// Compared against the trimmed cell text, exactly.
    pub text: String,
    #[serde(default)]
    pub confirm: Option<MarkerConfirm>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordLayout {
    pub marker: MarkerRule,
    pub fields: Vec<FieldSpec>,
}

impl RecordLayout {
    /// Every column the marker rule and the field locators read.
    pub fn referenced_columns(&self) -> Vec<(String, u32)> {
        let mut out = vec![(format!("marker '{}'", self.marker.text), self.marker.column)];
        if let Some(confirm) = &self.marker.confirm {
            out.push((format!("marker '{}' confirm", self.marker.text), confirm.column));
        }
        for field in &self.fields {
            for column in field.locator.columns() {
                out.push((format!("field '{}'", field.name), column));
            }
        }
        out
    }
}

/// Everything the segmenter needs to know about a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    pub layouts: Vec<RecordLayout>,
    /// Rows after the start where end detection begins.
    pub end_scan_offset: u32,
    /// Column that must be strictly blank on a closing row.
    pub secondary_column: u32,
    /// Column that must be blank (trimmed) on a closing row.
    pub description_column: u32,
}

pub const DESCRIPTION_LABEL: &str = "descripción del modelo";
pub const DESCRIPTION_WINDOW: u32 = 10;
pub const PRICE_WINDOW: u32 = 15;
pub const PIECES_WINDOW: u32 = 25;

fn description_field() -> FieldSpec {
    FieldSpec::new(
        "descripcion",
        Locator::BelowLabel {
            label_column: D,
            label: LabelMatch::contains_ignore_case(&[DESCRIPTION_LABEL]),
            window: DESCRIPTION_WINDOW,
            value_column: D,
        },
        FieldKind::Text,
    )
    .collapsed()
}

/// Pieces, sale price and amount sit in the same place for every kind.
fn pricing_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new(
            "piezas",
            Locator::BesideLabel {
                label_column: A,
                label: LabelMatch::equals_ignore_case("piezas"),
                window: PIECES_WINDOW,
                value_column: B,
            },
            FieldKind::Number,
        )
        .or_default(FieldValue::Number(1.0)),
        FieldSpec::new(
            "precio_venta",
            Locator::BesideLabel {
                label_column: K,
                label: LabelMatch::contains_ignore_case(&["pecio de venta", "precio de venta"]),
                window: PRICE_WINDOW,
                value_column: L,
            },
            FieldKind::Number,
        ),
        FieldSpec::new(
            "importe",
            Locator::BesideLabel {
                label_column: K,
                label: LabelMatch::equals("Importe"),
                window: PRICE_WINDOW,
                value_column: L,
            },
            FieldKind::Number,
        ),
    ]
}

fn fixed_text(name: &str, row_offset: u32, column: u32) -> FieldSpec {
    FieldSpec::new(name, Locator::Fixed { row_offset, column }, FieldKind::Text)
}

fn constant_text(name: &str, value: &str) -> FieldSpec {
    FieldSpec::new(
        name,
        Locator::Constant {
            value: value.to_string(),
        },
        FieldKind::Text,
    )
}

impl RecordLayout {
    /// "Datos de la Pieza" blocks: category, model and key on the three
    /// rows below the marker, column B.
    pub fn piece() -> Self {
        let mut fields = vec![
            fixed_text("categoria", 1, B),
            description_field(),
            fixed_text("modelo", 2, B),
            fixed_text("clave", 3, B),
        ];
        fields.extend(pricing_fields());
        RecordLayout {
            marker: MarkerRule {
                kind: RecordKind::Piece,
                column: A,
                text: "Datos de la Pieza".to_string(),
                confirm: None,
            },
            fields,
        }
    }

    /// "Medidas" blocks (glass). Only a start when column D carries the
    /// model description label on the same row.
    pub fn measurement() -> Self {
        let mut fields = vec![
            description_field(),
            constant_text("categoria", "CRISTAL"),
            constant_text("clave", ""),
        ];
        fields.extend(pricing_fields());
        RecordLayout {
            marker: MarkerRule {
                kind: RecordKind::Measurement,
                column: A,
                text: "Medidas".to_string(),
                confirm: Some(MarkerConfirm {
                    column: D,
                    contains: DESCRIPTION_LABEL.to_string(),
                }),
            },
            fields,
        }
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        SegmenterConfig {
            layouts: vec![RecordLayout::piece(), RecordLayout::measurement()],
            end_scan_offset: 4,
            secondary_column: B,
            description_column: D,
        }
    }
}

impl SegmenterConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
