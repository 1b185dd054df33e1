//! FILENAME: core/pricing/src/totals.rs
//! PURPOSE: Quotation totals and the amount written out in Spanish words.

use cotiza_engine::round_cents;
use log::debug;

use crate::config::PricingConfig;
use crate::product::{Discount, QuotedProduct};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub closed_price: bool,
}

/// Adds up the product amounts. In closed-price mode every product gets
/// the configured discount recorded on it first. Discounts are always
/// taken from the listed amount, so running this twice does not compound.
pub fn compute_totals(products: &mut [QuotedProduct], closed_price: bool, config: &PricingConfig) -> Totals {
    for product in products.iter_mut() {
        product.discount = if closed_price {
            let amount = product.amount.unwrap_or(0.0);
            Some(Discount {
                percent: config.closed_price_discount_pct,
                amount: amount * config.closed_price_discount_pct / 100.0,
            })
        } else {
            None
        };
    }

    let subtotal: f64 = products.iter().map(QuotedProduct::final_amount).sum();
    let tax = subtotal * config.tax_rate;
    let totals = Totals {
        subtotal,
        tax,
        total: subtotal + tax,
        closed_price,
    };
    debug!(
        target: "PRICING",
        "totals: subtotal {:.2}, tax {:.2}, total {:.2}",
        totals.subtotal,
        totals.tax,
        totals.total
    );
    totals
}

// ============================================================================
// AMOUNT IN WORDS
// ============================================================================

const UNITS: [&str; 10] = [
    "", "UNO", "DOS", "TRES", "CUATRO", "CINCO", "SEIS", "SIETE", "OCHO", "NUEVE",
];
const TENS: [&str; 10] = [
    "", "DIEZ", "VEINTE", "TREINTA", "CUARENTA", "CINCUENTA", "SESENTA", "SETENTA", "OCHENTA",
    "NOVENTA",
];
const TEENS: [&str; 10] = [
    "DIEZ", "ONCE", "DOCE", "TRECE", "CATORCE", "QUINCE", "DIECISÉIS", "DIECISIETE", "DIECIOCHO",
    "DIECINUEVE",
];
const HUNDREDS: [&str; 10] = [
    "",
    "CIENTO",
    "DOSCIENTOS",
    "TRESCIENTOS",
    "CUATROCIENTOS",
    "QUINIENTOS",
    "SEISCIENTOS",
    "SETECIENTOS",
    "OCHOCIENTOS",
    "NOVECIENTOS",
];

/// Words for 0..=999; empty for zero.
fn group_words(n: u64) -> String {
    if n == 100 {
        return "CIEN".to_string();
    }
    let hundreds = (n / 100) as usize;
    let rest = n % 100;

    let tail = match rest {
        0 => String::new(),
        1..=9 => UNITS[rest as usize].to_string(),
        10..=19 => TEENS[(rest - 10) as usize].to_string(),
        20 => TENS[2].to_string(),
        21..=29 => format!("VEINTI{}", UNITS[(rest - 20) as usize]),
        _ => {
            let (t, u) = ((rest / 10) as usize, (rest % 10) as usize);
            if u == 0 {
                TENS[t].to_string()
            } else {
                format!("{} Y {}", TENS[t], UNITS[u])
            }
        }
    };

    match (HUNDREDS[hundreds], tail.is_empty()) {
        ("", _) => tail,
        (h, true) => h.to_string(),
        (h, false) => format!("{} {}", h, tail),
    }
}

fn integer_words(n: u64) -> String {
    if n == 0 {
        return "CERO".to_string();
    }
    let millions = n / 1_000_000;
    let thousands = (n / 1_000) % 1_000;
    let rest = n % 1_000;

    let mut parts = Vec::new();
    match millions {
        0 => {}
        1 => parts.push("UN MILLÓN".to_string()),
        m => parts.push(format!("{} MILLONES", integer_words(m))),
    }
    match thousands {
        0 => {}
        1 => parts.push("MIL".to_string()),
        t => parts.push(format!("{} MIL", group_words(t))),
    }
    if rest > 0 {
        parts.push(group_words(rest));
    }
    parts.join(" ")
}

/// Writes a peso amount in words: "MIL DOSCIENTOS PESOS 50/100 MXN".
/// Cents are only spelled out when non-zero.
pub fn amount_in_words(amount: f64) -> String {
    if !amount.is_finite() {
        return String::new();
    }
    let cents_total = (round_cents(amount.abs()) * 100.0).round() as u64;
    let (pesos, cents) = (cents_total / 100, cents_total % 100);

    let mut words = format!("{} PESOS", integer_words(pesos));
    if amount < 0.0 && cents_total > 0 {
        words = format!("MENOS {}", words);
    }
    if cents > 0 {
        words.push_str(&format!(" {:02}/100 MXN", cents));
    }
    words
}
