//! FILENAME: core/pricing/src/quote.rs
//! PURPOSE: Builds the priced material lines of one product.
//! CONTEXT: The quoting sheet names a product code, an aluminum finish,
//! an optional glass and the opening measurements. Every generators row
//! (code A, quantity formula B, unit C, material D) carrying that code
//! becomes one quote line: the formula is evaluated against the
//! measurements and the material is priced from the matching catalog.

use cotiza_engine::{evaluate, mark_as_text, parse_a1, CellValue, CoordinateMap, Grid, VariableContext};
use log::{debug, info, warn};

use crate::catalog::{Price, PriceBook};
use crate::config::PricingConfig;

// Generators sheet columns.
const CODE_COLUMN: u32 = 0;
const FORMULA_COLUMN: u32 = 1;
const UNIT_COLUMN: u32 = 2;
const MATERIAL_COLUMN: u32 = 3;

// Products sheet columns for the special description.
const PRODUCT_CODE_COLUMN: u32 = 1;
const SPECIAL_DESCRIPTION_COLUMN: u32 = 11;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("no product code given")]
    EmptyProductCode,
    #[error("finish '{finish}' not found; available: {}", .available.join(", "))]
    FinishNotFound { finish: String, available: Vec<String> },
    #[error("this product needs a glass selection")]
    GlassRequired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub product_code: String,
    pub finish: String,
    pub glass: String,
    pub context: VariableContext,
}

impl QuoteRequest {
    pub fn new(product_code: &str, finish: &str, glass: &str, context: VariableContext) -> Self {
        QuoteRequest {
            product_code: product_code.trim().to_string(),
            finish: finish.trim().to_string(),
            glass: glass.trim().to_string(),
            context,
        }
    }

    /// Reads the request from the quoting sheet.
    pub fn from_quote_sheet(grid: &Grid, config: &PricingConfig) -> Self {
        let text = |reference: &str| cell_at(grid, reference).map(|v| v.trimmed()).unwrap_or_default();
        QuoteRequest::new(
            &text(&config.product_code_cell),
            &text(&config.finish_cell),
            &text(&config.glass_cell),
            quote_context(grid, config),
        )
    }
}

fn cell_at<'a>(grid: &'a Grid, reference: &str) -> Option<&'a CellValue> {
    let (row, col) = parse_a1(reference)?;
    let row = row.checked_sub(grid.origin.0)?;
    let col = col.checked_sub(grid.origin.1)?;
    Some(grid.value(row, col))
}

/// The measurement variables of the quoting sheet. Blank and zero cells
/// are left out so the fallback rules decide their value.
pub fn quote_context(grid: &Grid, config: &PricingConfig) -> VariableContext {
    let mut context = VariableContext::new().with_fallbacks(config.fallbacks.clone());
    for cell in &config.context_cells {
        let value = cell_at(grid, &cell.reference).and_then(CellValue::currency_amount);
        match value {
            Some(v) if v != 0.0 && v.is_finite() => context.set(&cell.variable, v),
            _ => debug!(target: "PRICING", "{} ({}) left to fallback", cell.variable, cell.reference),
        }
    }
    context
}

/// Which catalog a line is priced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSource {
    Aluminum,
    Glass,
    Universal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteLine {
    /// Grid row of the generators sheet.
    pub row: u32,
    pub quantity: CellValue,
    pub unit: String,
    pub material: String,
    pub price: Price,
    pub source: LineSource,
    /// The original formula, marked as literal text.
    pub stored_formula: String,
}

impl QuoteLine {
    /// Quantity times unit price, when both are numbers.
    pub fn cost(&self) -> Option<f64> {
        Some(self.quantity.as_number()? * self.price.amount()?)
    }

    /// The five cells written back to the quoting sheet.
    pub fn cells(&self) -> Vec<CellValue> {
        vec![
            self.quantity.clone(),
            CellValue::text(self.unit.clone()),
            CellValue::text(self.material.clone()),
            self.price.to_cell_value(),
            CellValue::from(self.stored_formula.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub product_code: String,
    pub finish: String,
    pub glass: String,
    pub lines: Vec<QuoteLine>,
}

impl Quote {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines whose price could not be found.
    pub fn missing_prices(&self) -> impl Iterator<Item = &QuoteLine> {
        self.lines.iter().filter(|l| l.price.is_missing())
    }

    /// Sum of every computable line cost.
    pub fn material_cost(&self) -> f64 {
        self.lines.iter().filter_map(QuoteLine::cost).sum()
    }
}

/// Prices every generators row of the requested product.
pub fn build_quote(
    generators: &Grid,
    book: &PriceBook,
    request: &QuoteRequest,
    config: &PricingConfig,
) -> Result<Quote, QuoteError> {
    if request.product_code.is_empty() {
        return Err(QuoteError::EmptyProductCode);
    }
    let finish_column = book.finish_column(&request.finish).ok_or_else(|| QuoteError::FinishNotFound {
        finish: request.finish.clone(),
        available: book.finishes().into_iter().map(str::to_string).collect(),
    })?;

    let aluminum_unit = config.aluminum_unit.to_lowercase();
    let glass_unit = config.glass_unit.to_lowercase();

    let rows: Vec<u32> = (1..generators.row_count())
        .filter(|&r| generators.text(r, CODE_COLUMN) == request.product_code)
        .collect();

    let needs_glass = rows
        .iter()
        .any(|&r| generators.text(r, UNIT_COLUMN).to_lowercase() == glass_unit);
    if needs_glass && request.glass.is_empty() {
        return Err(QuoteError::GlassRequired);
    }

    // Quoting formulas use variable names directly, no coordinates.
    let coordinates = CoordinateMap::new();
    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        let raw = generators.value(row, FORMULA_COLUMN);
        let unit = generators.text(row, UNIT_COLUMN).to_lowercase();
        let material = generators.text(row, MATERIAL_COLUMN);

        let (material, price, source) = if unit == aluminum_unit {
            let price = book.aluminum_price(&material, finish_column);
            (material, price, LineSource::Aluminum)
        } else if unit == glass_unit {
            (request.glass.clone(), book.glass_price(&request.glass), LineSource::Glass)
        } else {
            let price = book.universal_price(&material);
            (material, price, LineSource::Universal)
        };

        if let Price::Missing(marker) = &price {
            warn!(target: "PRICING", "{}: '{}' not priced ({})", request.product_code, material, marker);
        }

        lines.push(QuoteLine {
            row,
            quantity: evaluate(raw, &coordinates, &request.context),
            unit,
            material,
            price,
            source,
            stored_formula: mark_as_text(&raw.display_value()),
        });
    }

    info!(
        target: "PRICING",
        "quoted {} ({}): {} lines",
        request.product_code,
        request.finish,
        lines.len()
    );

    Ok(Quote {
        product_code: request.product_code.clone(),
        finish: request.finish.clone(),
        glass: request.glass.clone(),
        lines,
    })
}

/// The special-measurements note of a product, or the configured default.
/// Only the first products row carrying the code is consulted.
pub fn special_description(products: &Grid, code: &str, config: &PricingConfig) -> String {
    let code = code.trim();
    (1..products.row_count())
        .find(|&r| products.text(r, PRODUCT_CODE_COLUMN) == code)
        .map(|r| products.text(r, SPECIAL_DESCRIPTION_COLUMN))
        .filter(|note| !note.is_empty())
        .unwrap_or_else(|| config.default_special_description.clone())
}
