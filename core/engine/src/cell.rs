//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Defines the data structures for a single cell of a sheet snapshot.
//! CONTEXT: This file contains the `Cell` struct and `CellValue` enum.
//! It separates the formula text (from the formulas snapshot) from the
//! value the host spreadsheet had already computed (the values snapshot).
//! The text/number coercions here mirror how the quotation sheets were
//! read historically: `String(x).trim()` for labels and a `parseFloat`
//! style prefix parse for numbers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Longest numeric prefix, parseFloat style.
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("static pattern")
});

/// Represents a value within a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Returns the display value of the cell as a String.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        }
    }

    /// Display value with surrounding whitespace removed.
    pub fn trimmed(&self) -> String {
        match self {
            CellValue::Text(s) => s.trim().to_string(),
            other => other.display_value(),
        }
    }

    /// True for an empty cell or the exact empty string. Whitespace is not blank.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// True when the trimmed display text is empty.
    pub fn is_blank_trimmed(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric reading with parseFloat semantics: numbers pass through,
    /// text yields its longest leading numeric prefix.
    pub fn leading_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => leading_number(s),
            CellValue::Boolean(_) | CellValue::Empty => None,
        }
    }

    /// Like `leading_number`, but drops currency symbols and thousands
    /// separators first ("$1,250.00" -> 1250).
    pub fn currency_amount(&self) -> Option<f64> {
        match self {
            CellValue::Text(s) => {
                let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
                leading_number(&cleaned)
            }
            other => other.leading_number(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s)
        }
    }
}

/// Parses the longest numeric prefix of `s` after leading whitespace.
pub fn leading_number(s: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(s.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// One cell of a snapshot: the computed value plus, when the source cell
/// held a live formula, its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cell {
    pub formula: Option<String>,
    pub value: CellValue,
}

impl Cell {
    pub fn new() -> Self {
        Cell {
            formula: None,
            value: CellValue::Empty,
        }
    }

    pub fn new_number(num: f64) -> Self {
        Cell {
            formula: None,
            value: CellValue::Number(num),
        }
    }

    pub fn new_text(text: impl Into<String>) -> Self {
        Cell {
            formula: None,
            value: CellValue::Text(text.into()),
        }
    }

    /// A formula cell together with the value the host computed for it.
    pub fn new_formula(formula: impl Into<String>, value: CellValue) -> Self {
        Cell {
            formula: Some(formula.into()),
            value,
        }
    }

    pub fn has_formula(&self) -> bool {
        self.formula.as_deref().is_some_and(|f| !f.is_empty())
    }
}
