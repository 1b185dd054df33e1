//! FILENAME: core/pricing/src/folio.rs
//! PURPOSE: Folio sequencing and the registration summary line.
//! CONTEXT: Quotations are numbered 7116, 7117, ...; sales orders carry
//! their own sequence, NV-0001, NV-0002, ... Both continue from the last
//! row of their register sheet.

use cotiza_engine::{CellValue, Grid};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::PricingConfig;

const FOLIO_COLUMN: u32 = 0;

pub const SALES_ORDER_PREFIX: &str = "NV-";

/// The numeric part of a sales-order folio, anywhere in the cell.
static SALES_ORDER_FOLIO: Lazy<Regex> = Lazy::new(|| Regex::new(r"NV-(\d+)").expect("static pattern"));

/// The folio in column A of the last registered quotation. The header
/// row does not count, and neither does a zero or non-numeric cell.
pub fn last_folio_in(quotations: &Grid) -> Option<f64> {
    let last = quotations.last_used_row()?;
    if last == 0 {
        return None;
    }
    quotations
        .value(last, FOLIO_COLUMN)
        .leading_number()
        .filter(|n| *n != 0.0 && n.is_finite())
}

/// The folio for the next quotation: one past the last registered one,
/// or the configured first folio.
pub fn next_folio(last_registered: Option<f64>, config: &PricingConfig) -> u64 {
    match last_registered {
        Some(last) if last >= 1.0 => last.trunc() as u64 + 1,
        _ => config.first_folio,
    }
}

/// The number of the last registered sales order. Zero when the register
/// is empty, or when its last folio is not text of the `NV-<digits>` form.
pub fn last_sales_order_number(sales_orders: &Grid) -> u64 {
    let last = match sales_orders.last_used_row() {
        Some(row) if row > 0 => row,
        _ => return 0,
    };
    let folio = match sales_orders.value(last, FOLIO_COLUMN) {
        CellValue::Text(s) => s,
        other => {
            debug!(target: "PRICING", "last sales-order folio is not text: {:?}", other);
            return 0;
        }
    };
    let digits = match SALES_ORDER_FOLIO.captures(folio) {
        Some(caps) => caps[1].to_string(),
        None => return 0,
    };
    match digits.parse::<u64>() {
        Ok(n) => n,
        Err(e) => {
            warn!(target: "PRICING", "sales-order folio '{}' out of range: {}", folio, e);
            0
        }
    }
}

/// Formats a sales-order number, zero-padded to four digits.
pub fn sales_order_folio(number: u64) -> String {
    format!("{}{:04}", SALES_ORDER_PREFIX, number)
}

/// The folio for the next sales order.
pub fn next_sales_order_folio(sales_orders: &Grid) -> String {
    sales_order_folio(last_sales_order_number(sales_orders).saturating_add(1))
}

/// "Cotización correspondiente al proyecto "X", instalado en Y."
pub fn registration_summary(project: &str, address: &str) -> String {
    let mut summary = String::from("Cotización correspondiente");
    let project = project.trim();
    if !project.is_empty() {
        summary.push_str(&format!(" al proyecto \"{}\"", project));
    }
    let address = address.trim();
    if !address.is_empty() {
        summary.push_str(&format!(", instalado en {}", address));
    }
    summary.push('.');
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_folio_when_nothing_registered() {
        let config = PricingConfig::default();
        assert_eq!(next_folio(None, &config), 7116);

        let header_only = Grid::from_rows(vec![vec!["Folio", "Cliente"]]);
        assert_eq!(last_folio_in(&header_only), None);
        assert_eq!(last_folio_in(&Grid::new()), None);
    }

    #[test]
    fn folio_follows_last_row() {
        let config = PricingConfig::default();
        let mut sheet = Grid::from_rows(vec![vec!["Folio", "Cliente"]]);
        sheet.set_value(1, 0, 7116.0);
        sheet.set_value(2, 0, 7117.0);
        sheet.set_value(2, 1, "Constructora del Norte");
        assert_eq!(next_folio(last_folio_in(&sheet), &config), 7118);

        sheet.set_value(3, 1, "sin folio");
        assert_eq!(last_folio_in(&sheet), None);
        assert_eq!(next_folio(last_folio_in(&sheet), &config), 7116);
    }

    #[test]
    fn sales_orders_start_at_one() {
        assert_eq!(next_sales_order_folio(&Grid::new()), "NV-0001");
        let header_only = Grid::from_rows(vec![vec!["Folio NV", "Fecha"]]);
        assert_eq!(next_sales_order_folio(&header_only), "NV-0001");
    }

    #[test]
    fn sales_order_folio_follows_last_row() {
        let mut register = Grid::from_rows(vec![vec!["Folio NV", "Fecha"]]);
        register.set_value(1, 0, "NV-0008");
        register.set_value(2, 0, "NV-0009");
        assert_eq!(last_sales_order_number(&register), 9);
        assert_eq!(next_sales_order_folio(&register), "NV-0010");

        register.set_value(3, 0, "NV-12345");
        assert_eq!(next_sales_order_folio(&register), "NV-12346");
    }

    #[test]
    fn unrecognized_sales_order_folio_restarts() {
        let mut register = Grid::from_rows(vec![vec!["Folio NV"]]);
        register.set_value(1, 0, "NV-0004");
        register.set_value(2, 0, "pendiente");
        assert_eq!(next_sales_order_folio(&register), "NV-0001");

        // Numbers are not sales-order folios.
        register.set_value(2, 0, 7.0);
        assert_eq!(next_sales_order_folio(&register), "NV-0001");

        register.set_value(2, 0, "NV-99999999999999999999999");
        assert_eq!(last_sales_order_number(&register), 0);
    }

    #[test]
    fn summary_mentions_what_is_known() {
        assert_eq!(registration_summary("", ""), "Cotización correspondiente.");
        assert_eq!(
            registration_summary("Torre Sur", " "),
            "Cotización correspondiente al proyecto \"Torre Sur\"."
        );
        assert_eq!(
            registration_summary("Torre Sur", "Monterrey"),
            "Cotización correspondiente al proyecto \"Torre Sur\", instalado en Monterrey."
        );
    }
}
