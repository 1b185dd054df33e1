//! FILENAME: core/pricing/src/catalog.rs
//! PURPOSE: Price lookups over the Aluminum, Glass, Hardware and Others sheets.
//! CONTEXT: A `PriceBook` is built once from grid snapshots and indexed by
//! key. A price that cannot be found is not an error: the quote line shows
//! a short marker instead ("NE", "Elegir Vidrio", ...), exactly like the
//! sheet always did, and the person quoting fixes the catalog.

use cotiza_engine::{CellValue, Grid};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

/// Profile keys are the first 4 or 5 digit whole number of the material.
static PROFILE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4,5}\b").expect("static pattern"));

pub const NO_PROFILE_KEY: &str = "N/A - Sin clave";
pub const NOT_LISTED: &str = "NE";
pub const GLASS_NOT_CHOSEN: &str = "Elegir Vidrio";
pub const GLASS_NOT_LISTED: &str = "NE - Vidrio";

// Column layout shared by the catalog sheets.
const KEY_COLUMN: u32 = 2;
const DESCRIPTION_COLUMN: u32 = 3;
const PRICE_COLUMN: u32 = 5;

/// The outcome of a lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Price {
    /// The catalog cell, as listed.
    Listed(CellValue),
    /// Why no price could be given.
    Missing(&'static str),
}

impl Price {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Price::Listed(value) => value.currency_amount(),
            Price::Missing(_) => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Price::Missing(_))
    }

    /// The value written to the quote line's cost cell.
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            Price::Listed(value) => value.clone(),
            Price::Missing(marker) => CellValue::text(*marker),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Listed(value) => write!(f, "{}", value.display_value()),
            Price::Missing(marker) => write!(f, "{}", marker),
        }
    }
}

/// Extracts the profile key of an aluminum material description.
pub fn profile_key(material: &str) -> Option<&str> {
    PROFILE_KEY.find(material).map(|m| m.as_str())
}

/// The universal lookup key: the first whitespace-separated word.
pub fn lookup_key(material: &str) -> &str {
    material.split_whitespace().next().unwrap_or("")
}

#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    finishes: Vec<String>,
    /// Profile key with its full row, first occurrence wins.
    profiles: Vec<(String, Vec<CellValue>)>,
    glass_by_description: Vec<(String, CellValue)>,
    glass_by_key: Vec<(String, CellValue)>,
    hardware: Vec<(String, CellValue)>,
    others: HashMap<String, CellValue>,
}

/// (key, price) pairs from `first_row` on, keys trimmed.
fn keyed_rows(grid: &Grid, first_row: u32, key_column: u32) -> Vec<(String, CellValue)> {
    (first_row..grid.row_count())
        .map(|r| (grid.text(r, key_column), grid.value(r, PRICE_COLUMN).clone()))
        .collect()
}

impl PriceBook {
    /// Indexes the four catalog sheets. Every sheet has one header row.
    pub fn from_grids(aluminum: &Grid, glass: &Grid, hardware: &Grid, others: &Grid) -> Self {
        let finishes = (0..aluminum.col_count()).map(|c| aluminum.text(0, c)).collect();
        let profiles = (1..aluminum.row_count())
            .map(|r| (aluminum.text(r, DESCRIPTION_COLUMN), aluminum.row_values(r)))
            .collect();

        // Later rows overwrite earlier ones in the Others map.
        let others = keyed_rows(others, 1, KEY_COLUMN)
            .into_iter()
            .filter(|(key, _)| !key.is_empty())
            .collect();

        PriceBook {
            finishes,
            profiles,
            glass_by_description: keyed_rows(glass, 1, DESCRIPTION_COLUMN),
            glass_by_key: keyed_rows(glass, 1, KEY_COLUMN),
            hardware: keyed_rows(hardware, 1, KEY_COLUMN),
            others,
        }
    }

    /// Finish names as listed in the aluminum header, blanks skipped.
    pub fn finishes(&self) -> Vec<&str> {
        self.finishes
            .iter()
            .map(String::as_str)
            .filter(|f| !f.is_empty())
            .collect()
    }

    /// Column of the aluminum sheet holding prices for `finish`.
    pub fn finish_column(&self, finish: &str) -> Option<u32> {
        let finish = finish.trim();
        if finish.is_empty() {
            return None;
        }
        self.finishes.iter().position(|f| f == finish).map(|c| c as u32)
    }

    pub fn aluminum_price(&self, material: &str, finish_column: u32) -> Price {
        let Some(key) = profile_key(material) else {
            return Price::Missing(NO_PROFILE_KEY);
        };
        self.profiles
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, row)| {
                let cell = row.get(finish_column as usize).cloned().unwrap_or_default();
                Price::Listed(cell)
            })
            .unwrap_or(Price::Missing(NOT_LISTED))
    }

    pub fn glass_price(&self, description: &str) -> Price {
        let description = description.trim();
        if description.is_empty() {
            return Price::Missing(GLASS_NOT_CHOSEN);
        }
        find(&self.glass_by_description, description).unwrap_or(Price::Missing(GLASS_NOT_LISTED))
    }

    /// Hardware first, then glass keys, then the Others map.
    pub fn universal_price(&self, material: &str) -> Price {
        let key = lookup_key(material);
        if key.is_empty() {
            return Price::Missing(NOT_LISTED);
        }
        find(&self.hardware, key)
            .or_else(|| find(&self.glass_by_key, key))
            .or_else(|| self.others.get(key).map(|v| Price::Listed(v.clone())))
            .unwrap_or(Price::Missing(NOT_LISTED))
    }
}

fn find(rows: &[(String, CellValue)], key: &str) -> Option<Price> {
    rows.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| Price::Listed(v.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> PriceBook {
        let aluminum = Grid::from_rows(vec![
            vec!["", "", "", "Clave", " Natural ", "Blanco"],
            vec!["", "", "", "1234", "85.5", "92"],
            vec!["", "", "", "56789", "120", "130"],
        ]);
        let glass = Grid::from_rows(vec![
            vec!["", "", "Clave", "Descripción", "", "Precio"],
            vec!["", "", "FILTRASOL", "Filtrasol 6mm", "", "410"],
            vec!["", "", "CLARO", "Claro 6mm", "", "350"],
        ]);
        let hardware = Grid::from_rows(vec![
            vec!["", "", "Clave", "", "", "Precio"],
            vec!["", "", "Jaladera", "", "", "35"],
        ]);
        let others = Grid::from_rows(vec![
            vec!["", "", "Clave", "", "", "Precio"],
            vec!["", "", "Silicón", "", "", "60"],
            vec!["", "", "Silicón", "", "", "65"],
        ]);
        PriceBook::from_grids(&aluminum, &glass, &hardware, &others)
    }

    #[test]
    fn finishes_are_trimmed() {
        let book = book();
        assert_eq!(book.finish_column("Natural"), Some(4));
        assert_eq!(book.finish_column("Blanco"), Some(5));
        assert_eq!(book.finish_column("Negro"), None);
        assert_eq!(book.finish_column(""), None);
        assert_eq!(book.finishes(), vec!["Clave", "Natural", "Blanco"]);
    }

    #[test]
    fn aluminum_prices_follow_the_profile_key() {
        let book = book();
        assert_eq!(book.aluminum_price("Riel 1234 natural", 4), Price::Listed(CellValue::text("85.5")));
        assert_eq!(book.aluminum_price("Jamba 56789", 5).amount(), Some(130.0));
        assert_eq!(book.aluminum_price("Jamba 4321", 4), Price::Missing(NOT_LISTED));
        assert_eq!(book.aluminum_price("Riel sin clave", 4), Price::Missing(NO_PROFILE_KEY));
        // Three or six digits are not profile keys.
        assert_eq!(profile_key("Tornillo 123 x 123456"), None);
    }

    #[test]
    fn glass_needs_a_choice() {
        let book = book();
        assert_eq!(book.glass_price("  "), Price::Missing(GLASS_NOT_CHOSEN));
        assert_eq!(book.glass_price("Claro 6mm").amount(), Some(350.0));
        assert_eq!(book.glass_price("Tintex"), Price::Missing(GLASS_NOT_LISTED));
    }

    #[test]
    fn universal_lookup_order() {
        let book = book();
        assert_eq!(book.universal_price("Jaladera cromo").amount(), Some(35.0));
        assert_eq!(book.universal_price("CLARO templado").amount(), Some(350.0));
        assert_eq!(book.universal_price("Silicón transparente").amount(), Some(65.0));
        assert_eq!(book.universal_price("Felpa"), Price::Missing(NOT_LISTED));
        assert_eq!(book.universal_price("").to_string(), "NE");
    }
}
