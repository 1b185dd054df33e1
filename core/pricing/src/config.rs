//! FILENAME: core/pricing/src/config.rs
//! PURPOSE: Settings for quoting and for the catalog batch.
//! CONTEXT: Defaults reproduce the shop's workbook: sheet names, where the
//! quoting sheet keeps its inputs, the 16% IVA, the closed-price discount
//! and the first folio. Hosts with a different workbook load their own
//! values with `from_json`; missing keys keep the defaults.

use cotiza_engine::line_items::LineItemConfig;
use cotiza_engine::variables::{standard_fallbacks, FallbackRule};
use serde::{Deserialize, Serialize};

/// A quoting-sheet cell that feeds one formula variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextCell {
    pub reference: String,
    pub variable: String,
}

impl ContextCell {
    pub fn new(reference: &str, variable: &str) -> Self {
        ContextCell {
            reference: reference.to_string(),
            variable: variable.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub quote: String,
    pub generators: String,
    pub generator_summary: String,
    pub aluminum: String,
    pub glass: String,
    pub hardware: String,
    pub others: String,
    pub products: String,
    pub catalog: String,
    pub quotations: String,
    pub sales_orders: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        SheetNames {
            quote: "Cotizador".to_string(),
            generators: "Generadores".to_string(),
            generator_summary: "Generador".to_string(),
            aluminum: "Aluminio".to_string(),
            glass: "Cristales".to_string(),
            hardware: "Herrajes".to_string(),
            others: "Otros".to_string(),
            products: "Productos".to_string(),
            catalog: "CATALOGO DE PRODUCTOS".to_string(),
            quotations: "Cotizaciones".to_string(),
            sales_orders: "NotasVenta".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub sheets: SheetNames,
    /// IVA as a fraction.
    pub tax_rate: f64,
    /// Percentage taken off every product in closed-price mode.
    pub closed_price_discount_pct: f64,
    /// Folio used when nothing has been registered yet.
    pub first_folio: u64,
    /// Quoting-sheet inputs.
    pub product_code_cell: String,
    pub finish_cell: String,
    pub glass_cell: String,
    pub context_cells: Vec<ContextCell>,
    pub fallbacks: Vec<FallbackRule>,
    pub default_special_description: String,
    pub aluminum_unit: String,
    pub glass_unit: String,
    /// First grid row scanned on the generator summary sheet.
    pub summary_start_row: u32,
    /// Row and column of the project name on the generator summary sheet.
    pub project_cell: (u32, u32),
    pub material_total_cell: (u32, u32),
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            sheets: SheetNames::default(),
            tax_rate: 0.16,
            closed_price_discount_pct: 13.79,
            first_folio: 7116,
            product_code_cell: "B3".to_string(),
            finish_cell: "B5".to_string(),
            glass_cell: "B6".to_string(),
            context_cells: vec![
                ContextCell::new("A9", "Largo1"),
                ContextCell::new("B9", "Alto1"),
                ContextCell::new("A10", "Largo2"),
                ContextCell::new("B10", "Alto2"),
                ContextCell::new("B15", "Desp"),
            ],
            fallbacks: standard_fallbacks(),
            default_special_description: "Medidas regulares".to_string(),
            aluminum_unit: "perfil por ml".to_string(),
            glass_unit: "m2".to_string(),
            summary_start_row: 3,
            project_cell: (1, 4),
            material_total_cell: (1, 11),
        }
    }
}

impl PricingConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Column layout of the product catalog and of the batch output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub registered_marker: String,
    /// Entries handled per run; None processes everything pending.
    pub item_budget: Option<usize>,
    pub code_column: u32,
    pub generator_row_column: u32,
    pub caption_column: u32,
    pub measurement_summary_column: u32,
    pub status_column: u32,
    /// Leading cells of the block's first row copied into every product row.
    pub feature_count: u32,
    pub line_items: LineItemConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            registered_marker: "Registrado".to_string(),
            item_budget: None,
            code_column: 1,
            generator_row_column: 2,
            caption_column: 10,
            measurement_summary_column: 11,
            status_column: 12,
            feature_count: 6,
            line_items: LineItemConfig::default(),
        }
    }
}

impl BatchConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_workbook() {
        let config = PricingConfig::default();
        assert_eq!(config.tax_rate, 0.16);
        assert_eq!(config.first_folio, 7116);
        assert_eq!(config.context_cells.len(), 5);
        assert_eq!(config.sheets.catalog, "CATALOGO DE PRODUCTOS");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PricingConfig::from_json(r#"{ "tax_rate": 0.08 }"#).unwrap();
        assert_eq!(config.tax_rate, 0.08);
        assert_eq!(config.closed_price_discount_pct, 13.79);

        let batch = BatchConfig::from_json(r#"{ "item_budget": 5 }"#).unwrap();
        assert_eq!(batch.item_budget, Some(5));
        assert_eq!(batch.registered_marker, "Registrado");
        assert_eq!(batch.line_items.marker_column, 7);
    }
}
