//! FILENAME: core/pricing/src/product.rs
//! PURPOSE: Summarizes the priced products of the "Generador" sheet.
//! CONTEXT: The sheet header carries the project name and the material
//! total; the product blocks below it are found by the segmenter. This is
//! what the quotation document lists, one entry per block.

use cotiza_engine::{segment, CellValue, Grid, Record, RecordKind, SegmentError, SegmenterConfig};
use log::info;

use crate::config::PricingConfig;

/// The closed-price discount recorded on a product by `compute_totals`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discount {
    pub percent: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuotedProduct {
    pub kind: RecordKind,
    pub start_row: u32,
    pub end_row: u32,
    pub category: String,
    pub description: String,
    pub model: String,
    pub key: String,
    pub pieces: f64,
    pub sale_price: Option<f64>,
    pub amount: Option<f64>,
    pub discount: Option<Discount>,
}

impl QuotedProduct {
    pub fn from_record(record: &Record) -> Self {
        QuotedProduct {
            kind: record.kind,
            start_row: record.start_row,
            end_row: record.end_row,
            category: record.text("categoria").to_string(),
            description: record.text("descripcion").to_string(),
            model: record.text("modelo").to_string(),
            key: record.text("clave").to_string(),
            pieces: record.number("piezas").unwrap_or(1.0),
            sale_price: record.number("precio_venta"),
            amount: record.number("importe"),
            discount: None,
        }
    }

    /// Pieces as used for division: anything below one counts as one.
    pub fn piece_count(&self) -> f64 {
        if self.pieces > 0.0 {
            self.pieces
        } else {
            1.0
        }
    }

    /// Amount per piece.
    pub fn unit_price(&self) -> Option<f64> {
        self.amount.map(|a| a / self.piece_count())
    }

    /// The amount after any recorded discount.
    pub fn final_amount(&self) -> f64 {
        let amount = self.amount.unwrap_or(0.0);
        match self.discount {
            Some(d) => amount - d.amount,
            None => amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSummary {
    pub project: String,
    pub material_total: CellValue,
    pub products: Vec<QuotedProduct>,
}

impl GeneratorSummary {
    pub fn from_grid(
        grid: &Grid,
        segmenter: &SegmenterConfig,
        config: &PricingConfig,
    ) -> Result<Self, SegmentError> {
        let (project_row, project_col) = config.project_cell;
        let (total_row, total_col) = config.material_total_cell;

        let products: Vec<QuotedProduct> = segment(grid, config.summary_start_row, segmenter)?
            .map(|record| QuotedProduct::from_record(&record))
            .collect();

        let summary = GeneratorSummary {
            project: grid.text(project_row, project_col),
            material_total: grid.value(total_row, total_col).clone(),
            products,
        };
        info!(
            target: "PRICING",
            "generator summary '{}': {} products",
            summary.project,
            summary.products.len()
        );
        Ok(summary)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
