//! FILENAME: core/engine/src/rewriter.rs
//! PURPOSE: Turns a spreadsheet-style quantity formula into a number.
//! CONTEXT: Generator rows store quantities as formulas such as
//! `=(A11*2+B11*2)*$B$2`. Before evaluation the formula goes through two
//! substitution passes:
//!   1. cell coordinates -> variable names (`A11` -> `Largo1`), driven by a
//!      caller-supplied `CoordinateMap`;
//!   2. variable names -> numbers, driven by a `VariableContext`.
//! The result must be plain arithmetic, which `cotiza_parser` parses and
//! `evaluator` folds. Anything else fails and the caller gets the original
//! value back.
//!
//! Results are rounded to cents (half away from zero).

use std::collections::BTreeMap;

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::cell::CellValue;
use crate::coord::normalize_a1;
use crate::evaluator::{evaluate_expression, EvalError};
use crate::variables::VariableContext;

/// A1 references with optional `$` anchors, as whole tokens.
static CELL_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\b[A-Za-z]{1,3}\$?[0-9]+\b").expect("static pattern"));

/// Whole identifiers.
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("static pattern"));

/// Why a formula could not be evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RewriteError {
    #[error("formula is empty")]
    Empty,

    #[error("{0}")]
    Parse(#[from] cotiza_parser::ParseError),

    #[error("evaluation failed: {0}")]
    Eval(#[from] EvalError),
}

/// Maps sheet coordinates to variable names. Keys are normalized ("B2",
/// never "$b$2"), so anchored and relative spellings hit the same entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMap {
    entries: BTreeMap<String, String>,
}

impl CoordinateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mapping. Returns false (and ignores it) when `reference` is
    /// not a cell reference.
    pub fn insert(&mut self, reference: &str, variable: &str) -> bool {
        match normalize_a1(reference) {
            Some(k) => {
                self.entries.insert(k, variable.to_string());
                true
            }
            None => false,
        }
    }

    pub fn with(mut self, reference: &str, variable: &str) -> Self {
        self.insert(reference, variable);
        self
    }

    pub fn get(&self, reference: &str) -> Option<&str> {
        normalize_a1(reference).and_then(|k| self.entries.get(&k).map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Replaces mapped cell coordinates with their variable names. Unmapped
/// references and everything else are left as written, including the
/// leading '='. This is the text callers store for later display.
pub fn translate_references(formula: &str, coordinates: &CoordinateMap) -> String {
    if coordinates.is_empty() {
        return formula.to_string();
    }
    CELL_REFERENCE
        .replace_all(formula, |caps: &Captures| {
            let reference = &caps[0];
            match coordinates.get(reference) {
                Some(variable) => variable.to_string(),
                None => reference.to_string(),
            }
        })
        .into_owned()
}

/// Replaces every identifier that resolves in `context` by its value.
/// Identifiers are matched whole, so a rule for `Largo` never touches
/// `Largo1`. Negative values are parenthesized.
pub fn substitute_variables(expression: &str, context: &VariableContext) -> String {
    let table = context.resolved();
    if table.is_empty() {
        return expression.to_string();
    }
    IDENTIFIER
        .replace_all(expression, |caps: &Captures| {
            let name = &caps[0];
            match table.get(&name.to_ascii_lowercase()) {
                Some(v) => decimal_text(*v),
                None => name.to_string(),
            }
        })
        .into_owned()
}

/// Plain decimal rendering (never exponent notation).
fn decimal_text(v: f64) -> String {
    if v < 0.0 {
        format!("({})", v)
    } else {
        format!("{}", v)
    }
}

/// `round(x * 100) / 100`, half away from zero.
pub fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Runs both substitution passes and returns the arithmetic text that is
/// handed to the parser (one leading '=' removed).
pub fn rewrite(formula: &str, coordinates: &CoordinateMap, context: &VariableContext) -> String {
    let body = formula.trim();
    let body = body.strip_prefix('=').unwrap_or(body);
    let named = translate_references(body, coordinates);
    substitute_variables(&named, context)
}

/// Evaluates a formula string, reporting why it failed.
pub fn evaluate_formula(
    formula: &str,
    coordinates: &CoordinateMap,
    context: &VariableContext,
) -> Result<f64, RewriteError> {
    if formula.trim().is_empty() {
        return Err(RewriteError::Empty);
    }
    let arithmetic = rewrite(formula, coordinates, context);
    // The indicator is already gone, so a second '=' must not parse.
    let expr = cotiza_parser::parse_arithmetic(&arithmetic)?;
    let value = evaluate_expression(&expr)?;
    Ok(round_cents(value))
}

/// Evaluates a raw cell value. Non-text and blank values come back
/// unchanged, as does any formula that fails to evaluate.
pub fn evaluate(raw: &CellValue, coordinates: &CoordinateMap, context: &VariableContext) -> CellValue {
    let formula = match raw {
        CellValue::Text(s) if !s.trim().is_empty() => s,
        other => return other.clone(),
    };

    match evaluate_formula(formula, coordinates, context) {
        Ok(v) => CellValue::Number(v),
        Err(e) => {
            debug!(target: "REWRITE", "left unevaluated: {} ({})", formula, e);
            raw.clone()
        }
    }
}

/// Prefixes a formula with an apostrophe so the host stores it as literal
/// text. Values that do not start with '=' are returned as-is.
pub fn mark_as_text(formula: &str) -> String {
    if formula.starts_with('=') {
        format!("'{}", formula)
    } else {
        formula.to_string()
    }
}

/// Removes a leading apostrophe added by `mark_as_text`.
pub fn strip_text_marker(stored: &str) -> &str {
    stored.strip_prefix('\'').unwrap_or(stored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> VariableContext {
        VariableContext::with_standard_fallbacks()
    }

    fn text(s: &str) -> CellValue {
        CellValue::text(s)
    }

    #[test]
    fn coordinates_map_to_variables_then_numbers() {
        let coords = CoordinateMap::new().with("A11", "Largo1").with("B11", "Alto1");
        let context = VariableContext::new().with("Largo1", 2.0).with("Alto1", 3.0);
        assert_eq!(evaluate(&text("=A11+B11"), &coords, &context), CellValue::Number(5.0));
    }

    #[test]
    fn fallback_rules_fill_missing_dimensions() {
        let context = ctx().with("Largo1", 4.0);
        assert_eq!(
            evaluate(&text("=Largo2*2"), &CoordinateMap::new(), &context),
            CellValue::Number(8.0)
        );
    }

    #[test]
    fn results_round_to_cents() {
        let empty = VariableContext::new();
        let coords = CoordinateMap::new();
        assert_eq!(evaluate(&text("=10/3"), &coords, &empty), CellValue::Number(3.33));
        assert_eq!(evaluate(&text("=2/3"), &coords, &empty), CellValue::Number(0.67));
        assert_eq!(evaluate(&text("=-0.125"), &coords, &empty), CellValue::Number(-0.13));
    }

    #[test]
    fn non_formula_values_pass_through() {
        let coords = CoordinateMap::new();
        let context = ctx();
        assert_eq!(evaluate(&CellValue::Number(4.0), &coords, &context), CellValue::Number(4.0));
        assert_eq!(evaluate(&text(""), &coords, &context), text(""));
        assert_eq!(evaluate(&CellValue::Empty, &coords, &context), CellValue::Empty);
    }

    #[test]
    fn malformed_formulas_come_back_unchanged() {
        let coords = CoordinateMap::new().with("A11", "Largo1");
        let context = ctx().with("Largo1", 1.0);
        assert_eq!(evaluate(&text("=A11+"), &coords, &context), text("=A11+"));
        assert_eq!(evaluate(&text("=Largo9*2"), &coords, &context), text("=Largo9*2"));
        assert_eq!(evaluate(&text("=1/0"), &coords, &context), text("=1/0"));
        assert_eq!(evaluate(&text("perfil"), &coords, &context), text("perfil"));
    }

    #[test]
    fn doubled_formula_indicator_is_malformed() {
        let coords = CoordinateMap::new();
        let context = ctx();
        assert_eq!(evaluate(&text("==5"), &coords, &context), text("==5"));
        assert!(matches!(
            evaluate_formula("==5", &coords, &context),
            Err(RewriteError::Parse(_))
        ));
        assert_eq!(evaluate(&text("=5"), &coords, &context), CellValue::Number(5.0));
    }

    #[test]
    fn runaway_nesting_comes_back_unchanged() {
        let coords = CoordinateMap::new();
        let context = ctx();

        let signs = text(&format!("={}5", "-".repeat(50_000)));
        assert_eq!(evaluate(&signs, &coords, &context), signs);

        let parens = text(&format!("={}1{}", "(".repeat(20_000), ")".repeat(20_000)));
        assert_eq!(evaluate(&parens, &coords, &context), parens);

        let sum = text(&format!("=1{}", "+Largo1".repeat(20_000)));
        assert_eq!(evaluate(&sum, &coords, &context.with("Largo1", 1.0)), sum);
    }

    #[test]
    fn evaluate_formula_reports_the_failure() {
        let err = evaluate_formula("=A11+", &CoordinateMap::new(), &VariableContext::new());
        assert!(matches!(err, Err(RewriteError::Parse(_))));
        let err = evaluate_formula("=1/0", &CoordinateMap::new(), &VariableContext::new());
        assert_eq!(err, Err(RewriteError::Eval(EvalError::DivisionByZero)));
        let err = evaluate_formula("  ", &CoordinateMap::new(), &VariableContext::new());
        assert_eq!(err, Err(RewriteError::Empty));
    }

    #[test]
    fn no_partial_identifier_matches() {
        let context = VariableContext::new().with("Largo", 100.0).with("Largo1", 2.0);
        assert_eq!(substitute_variables("Largo1*Largo", &context), "2*100");
        assert_eq!(substitute_variables("XLargo1", &context), "XLargo1");
    }

    #[test]
    fn substitution_is_case_insensitive() {
        let context = VariableContext::new().with("Alto1", 1.5);
        assert_eq!(substitute_variables("ALTO1+alto1", &context), "1.5+1.5");
    }

    #[test]
    fn negative_values_are_parenthesized() {
        let context = VariableContext::new().with("Largo1", -3.0);
        assert_eq!(substitute_variables("2-Largo1", &context), "2-(-3)");
        assert_eq!(
            evaluate_formula("=2-Largo1", &CoordinateMap::new(), &context),
            Ok(5.0)
        );
    }

    #[test]
    fn anchored_references_use_the_same_entry() {
        let coords = CoordinateMap::new().with("B2", "Desp").with("A11", "Largo1");
        assert_eq!(translate_references("=A11*$B$2", &coords), "=Largo1*Desp");
        assert_eq!(translate_references("=a11*B$2", &coords), "=Largo1*Desp");
    }

    #[test]
    fn translation_respects_token_boundaries() {
        let coords = CoordinateMap::new().with("A1", "Largo1");
        assert_eq!(translate_references("=A1+A11+AA1", &coords), "=Largo1+A11+AA1");
        assert_eq!(translate_references("=Largo1*A1", &coords), "=Largo1*Largo1");
    }

    #[test]
    fn coordinate_pass_runs_before_named_pass() {
        let coords = CoordinateMap::new().with("A12", "Largo2");
        let context = ctx().with("Largo1", 1.25);
        assert_eq!(rewrite("=A12*4", &coords, &context), "1.25*4");
    }

    #[test]
    fn unmapped_references_fail_evaluation() {
        let coords = CoordinateMap::new().with("A11", "Largo1");
        let context = ctx().with("Largo1", 2.0);
        assert_eq!(evaluate(&text("=A11+C5"), &coords, &context), text("=A11+C5"));
    }

    #[test]
    fn text_marker_convention() {
        assert_eq!(mark_as_text("=Largo1*2"), "'=Largo1*2");
        assert_eq!(mark_as_text("4"), "4");
        assert_eq!(strip_text_marker("'=Largo1*2"), "=Largo1*2");
        assert_eq!(strip_text_marker("=x"), "=x");
    }

    #[test]
    fn invalid_references_are_not_mapped() {
        let mut coords = CoordinateMap::new();
        assert!(!coords.insert("Largo1", "x"));
        assert!(coords.is_empty());
    }
}
