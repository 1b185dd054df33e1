//! FILENAME: core/engine/src/variables.rs
//! PURPOSE: Named numeric values available to quantity formulas.
//! CONTEXT: Generator formulas speak in product dimensions (Largo1, Alto1,
//! Largo2, Alto2, ...) and the waste multiplier (Desp). A context holds the
//! values the caller knows plus an ordered list of fallback rules for the
//! ones it might not know, e.g. a second height that defaults to the first.
//! Resolution goes through `resolve`, never through ad hoc defaults at call
//! sites.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where a missing variable takes its value from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Use another variable's effective value (which may itself fall back).
    Variable(String),
    Constant(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackRule {
    pub variable: String,
    pub fallback: Fallback,
}

impl FallbackRule {
    pub fn to_variable(variable: &str, source: &str) -> Self {
        FallbackRule {
            variable: variable.to_string(),
            fallback: Fallback::Variable(source.to_string()),
        }
    }

    pub fn to_constant(variable: &str, value: f64) -> Self {
        FallbackRule {
            variable: variable.to_string(),
            fallback: Fallback::Constant(value),
        }
    }
}

/// The rules the quoting sheet has always used: missing first dimensions
/// are 0, second dimensions repeat the first, waste defaults to 1.
pub fn standard_fallbacks() -> Vec<FallbackRule> {
    vec![
        FallbackRule::to_constant("Largo1", 0.0),
        FallbackRule::to_constant("Alto1", 0.0),
        FallbackRule::to_variable("Largo2", "Largo1"),
        FallbackRule::to_variable("Alto2", "Alto1"),
        FallbackRule::to_constant("Desp", 1.0),
    ]
}

/// A set of named values plus fallback rules. Names are case-insensitive;
/// the spelling used first is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableContext {
    values: BTreeMap<String, (String, f64)>,
    fallbacks: Vec<FallbackRule>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl VariableContext {
    /// An empty context without fallbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty context carrying `standard_fallbacks()`.
    pub fn with_standard_fallbacks() -> Self {
        Self::new().with_fallbacks(standard_fallbacks())
    }

    pub fn with_fallbacks(mut self, rules: Vec<FallbackRule>) -> Self {
        self.fallbacks = rules;
        self
    }

    /// Builder-style `set`.
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: f64) {
        let entry = self
            .values
            .entry(key(name))
            .or_insert_with(|| (name.to_string(), value));
        entry.1 = value;
    }

    /// The explicitly supplied value, ignoring fallbacks.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(&key(name)).map(|(_, v)| *v)
    }

    pub fn fallbacks(&self) -> &[FallbackRule] {
        &self.fallbacks
    }

    /// Copies every value of `other` over this context. Fallback rules of
    /// `self` are kept.
    pub fn overlay(&mut self, other: &VariableContext) {
        for (display, value) in other.values.values() {
            self.set(display, *value);
        }
    }

    /// The effective value of `name`: the supplied value, or the first
    /// matching fallback rule followed to its end. Cycles resolve to None.
    pub fn resolve(&self, name: &str) -> Option<f64> {
        self.resolve_guarded(name, &mut Vec::new())
    }

    fn resolve_guarded(&self, name: &str, visiting: &mut Vec<String>) -> Option<f64> {
        let k = key(name);
        if let Some((_, v)) = self.values.get(&k) {
            return Some(*v);
        }
        if visiting.contains(&k) {
            return None;
        }
        visiting.push(k.clone());

        let rule = self.fallbacks.iter().find(|r| key(&r.variable) == k)?;
        match &rule.fallback {
            Fallback::Constant(v) => Some(*v),
            Fallback::Variable(source) => self.resolve_guarded(source, visiting),
        }
    }

    /// Every resolvable name with its effective value, keyed by lowercase
    /// name. This is the substitution table used by the rewriter.
    pub fn resolved(&self) -> BTreeMap<String, f64> {
        let mut table: BTreeMap<String, f64> = self
            .values
            .iter()
            .map(|(k, (_, v))| (k.clone(), *v))
            .collect();
        for rule in &self.fallbacks {
            let k = key(&rule.variable);
            if table.contains_key(&k) {
                continue;
            }
            if let Some(v) = self.resolve(&rule.variable) {
                table.insert(k, v);
            }
        }
        table
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
