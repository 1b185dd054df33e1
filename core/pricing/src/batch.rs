//! FILENAME: core/pricing/src/batch.rs
//! PURPOSE: The resumable catalog batch.
//! CONTEXT: Walks the product catalog, and for every product not yet
//! registered reads its block on the generators sheet: shared features,
//! measurement pairs and material rows. The result is a set of rows for
//! the products sheet plus the catalog cells to update.
//!
//! A run may stop early (`item_budget`). It then returns a `ProgressToken`
//! naming the last catalog row handled; the next run resumes after it.
//! When the catalog is exhausted the token is None and the next run starts
//! over from the top.

use cotiza_engine::{
    block_caption, block_span, extract_line_items, parse_a1, CellValue, ComputedLineItem, Grid,
    VariableContext,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::BatchConfig;

/// Header row of the products sheet.
pub const PRODUCT_SHEET_HEADERS: [&str; 11] = [
    "Código Buscado",
    "Característica 1",
    "Característica 2",
    "Característica 3",
    "Característica 4",
    "Característica 5",
    "Característica 6",
    "Cantidad (Fórmula General)",
    "Unidad",
    "Descripción",
    "P.U.",
];

/// Last catalog sheet row (1-based) handled by an interrupted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressToken(pub u32);

impl ProgressToken {
    /// Sheet rows up to and including this one are skipped. Row 1 is the
    /// catalog header, so a token below 1 counts as 1.
    pub fn resume_after(self) -> u32 {
        self.0.max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Grid row on the catalog sheet.
    pub catalog_row: u32,
    /// 1-based row on the catalog sheet.
    pub sheet_row: u32,
    pub code: String,
    /// 1-based row on the generators sheet where the product block starts.
    pub generator_row: u32,
}

/// Catalog rows after the token with a code, a generators row and no
/// registered status.
pub fn pending_entries(catalog: &Grid, token: Option<ProgressToken>, config: &BatchConfig) -> Vec<CatalogEntry> {
    let after = token.map(ProgressToken::resume_after).unwrap_or(1);
    let marker = config.registered_marker.trim();

    (0..catalog.row_count())
        .filter(|&r| catalog.sheet_row_number(r) > after)
        .filter_map(|r| {
            let code = catalog.text(r, config.code_column);
            if code.is_empty() || catalog.text(r, config.status_column) == marker {
                return None;
            }
            let generator_row = catalog
                .value(r, config.generator_row_column)
                .as_number()
                .filter(|n| n.is_finite() && *n >= 1.0)?;
            Some(CatalogEntry {
                catalog_row: r,
                sheet_row: catalog.sheet_row_number(r),
                code,
                generator_row: generator_row.trunc() as u32,
            })
        })
        .collect()
}

/// A catalog cell to overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub row: u32,
    pub col: u32,
    pub value: CellValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedProduct {
    pub entry: CatalogEntry,
    /// Leading cells of the block's first row.
    pub features: Vec<CellValue>,
    pub items: Vec<ComputedLineItem>,
    pub caption: Option<String>,
    /// Measurement labels, one per line.
    pub measurement_summary: String,
}

impl ProcessedProduct {
    /// One products-sheet row per material line, laid out as
    /// `PRODUCT_SHEET_HEADERS`.
    pub fn rows(&self) -> Vec<Vec<CellValue>> {
        self.items
            .iter()
            .map(|item| {
                let mut row = Vec::with_capacity(PRODUCT_SHEET_HEADERS.len());
                row.push(CellValue::text(self.entry.code.clone()));
                row.extend(self.features.iter().cloned());
                row.push(item.stored_quantity());
                row.push(CellValue::from(item.unit.clone()));
                row.push(CellValue::from(item.material.clone()));
                row.push(item.listed_price.clone());
                row
            })
            .collect()
    }

    /// Caption, measurement summary and registered status for the catalog.
    pub fn catalog_updates(&self, config: &BatchConfig) -> Vec<CellUpdate> {
        let row = self.entry.catalog_row;
        let mut updates = Vec::new();
        if !self.measurement_summary.is_empty() {
            updates.push(CellUpdate {
                row,
                col: config.measurement_summary_column,
                value: CellValue::text(self.measurement_summary.clone()),
            });
        }
        if let Some(caption) = &self.caption {
            updates.push(CellUpdate {
                row,
                col: config.caption_column,
                value: CellValue::text(caption.clone()),
            });
        }
        updates.push(CellUpdate {
            row,
            col: config.status_column,
            value: CellValue::text(config.registered_marker.clone()),
        });
        updates
    }
}

/// The waste multiplier as written on the generators sheet, over the
/// standard fallbacks.
fn base_context(generators: &Grid, config: &BatchConfig) -> VariableContext {
    let mut context = VariableContext::with_standard_fallbacks();
    let waste = parse_a1(&config.line_items.waste_reference)
        .and_then(|(r, c)| Some((r.checked_sub(generators.origin.0)?, c.checked_sub(generators.origin.1)?)))
        .and_then(|(r, c)| generators.value(r, c).currency_amount())
        .filter(|v| *v != 0.0 && v.is_finite());
    if let Some(waste) = waste {
        context.set(&config.line_items.waste_variable, waste);
    }
    context
}

/// Reads one product block. None when the block is missing, has no
/// material header or has no material rows.
pub fn process_entry(entry: &CatalogEntry, generators: &Grid, config: &BatchConfig) -> Option<ProcessedProduct> {
    // Catalog rows are 1-based; zero names no row at all.
    let start = entry
        .generator_row
        .checked_sub(1)
        .and_then(|r| r.checked_sub(generators.origin.0))
        .filter(|&r| generators.contains_row(r));
    let start = match start {
        Some(r) => r,
        None => {
            warn!(target: "BATCH", "{}: generators row {} is outside the sheet", entry.code, entry.generator_row);
            return None;
        }
    };

    let span = block_span(generators, start, config.line_items.marker_column);
    let context = base_context(generators, config);
    let sheet = extract_line_items(generators, span, &config.line_items, &context)?;
    if sheet.items.is_empty() {
        debug!(target: "BATCH", "{}: block has no material rows", entry.code);
        return None;
    }

    let features = (0..config.feature_count)
        .map(|c| generators.value(start, c).clone())
        .collect();

    Some(ProcessedProduct {
        entry: entry.clone(),
        features,
        caption: block_caption(generators, span),
        measurement_summary: sheet.dimensions.summary(),
        items: sheet.items,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub processed: Vec<ProcessedProduct>,
    /// Codes whose block could not be read.
    pub failed: Vec<String>,
    /// Where the next run resumes; None once the catalog is exhausted.
    pub token: Option<ProgressToken>,
}

impl BatchReport {
    pub fn is_exhausted(&self) -> bool {
        self.token.is_none()
    }

    pub fn row_count(&self) -> usize {
        self.processed.iter().map(|p| p.items.len()).sum()
    }

    /// Writes the catalog updates and appends the product rows, adding the
    /// header to an empty products sheet.
    pub fn apply(&self, catalog: &mut Grid, products: &mut Grid, config: &BatchConfig) {
        for product in &self.processed {
            for update in product.catalog_updates(config) {
                catalog.set_value(update.row, update.col, update.value);
            }
        }

        let mut next_row = match products.last_used_row() {
            Some(last) => last + 1,
            None => {
                for (c, header) in PRODUCT_SHEET_HEADERS.iter().enumerate() {
                    products.set_value(0, c as u32, *header);
                }
                1
            }
        };
        for row in self.processed.iter().flat_map(ProcessedProduct::rows) {
            for (c, value) in row.into_iter().enumerate() {
                products.set_value(next_row, c as u32, value);
            }
            next_row += 1;
        }
    }
}

/// Processes pending catalog entries, at most `item_budget` of them.
///
/// The token advances over every handled entry, failed ones included, so
/// a product that cannot be read never stalls the batch; its code is
/// reported in `failed` instead.
pub fn run_batch(
    catalog: &Grid,
    generators: &Grid,
    token: Option<ProgressToken>,
    config: &BatchConfig,
) -> BatchReport {
    let pending = pending_entries(catalog, token, config);
    if pending.is_empty() {
        info!(target: "BATCH", "nothing pending; cursor reset");
        return BatchReport {
            processed: Vec::new(),
            failed: Vec::new(),
            token: None,
        };
    }

    let budget = config.item_budget.unwrap_or(usize::MAX);
    let mut report = BatchReport {
        processed: Vec::new(),
        failed: Vec::new(),
        token,
    };

    for entry in pending.iter().take(budget) {
        match process_entry(entry, generators, config) {
            Some(product) => {
                debug!(target: "BATCH", "{}: {} rows", entry.code, product.items.len());
                report.processed.push(product);
            }
            None => {
                warn!(target: "BATCH", "{}: skipped", entry.code);
                report.failed.push(entry.code.clone());
            }
        }
        report.token = Some(ProgressToken(entry.sheet_row));
    }

    if pending.len() <= budget {
        report.token = None;
    }

    info!(
        target: "BATCH",
        "processed {}, failed {}, {} pending",
        report.processed.len(),
        report.failed.len(),
        pending.len().saturating_sub(budget)
    );
    report
}
