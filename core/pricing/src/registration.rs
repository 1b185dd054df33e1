//! FILENAME: core/pricing/src/registration.rs
//! PURPOSE: Rows appended to the quotation and sales-order registers.
//! CONTEXT: Every issued document leaves one row in its register sheet
//! ("Cotizaciones" or "NotasVenta"). Products, client and quotation data
//! are stored as compact JSON in their own cells so a sales order can be
//! raised later from the quotation row alone. JSON keys keep the names
//! the shop's sheets already use.

use chrono::NaiveDateTime;
use cotiza_engine::{CellValue, Grid};
use log::info;
use serde::{Deserialize, Serialize};

use crate::folio::registration_summary;
use crate::product::QuotedProduct;
use crate::totals::Totals;

pub const QUOTATION_HEADERS: [&str; 15] = [
    "Folio",
    "Fecha",
    "Cliente",
    "Proyecto",
    "Vendedor",
    "Subtotal",
    "IVA",
    "Total",
    "Link PDF Interno",
    "Link PDF Cliente",
    "Productos (JSON)",
    "Datos Cliente (JSON)",
    "Datos Cotización (JSON)",
    "Descripción Resumida",
    "Modo Precio Cerrado",
];

pub const SALES_ORDER_HEADERS: [&str; 14] = [
    "Folio NV",
    "Fecha",
    "Folio Cotización",
    "Cliente",
    "Proyecto",
    "Vendedor",
    "Modo Productos",
    "Método Pago",
    "Condiciones Pago",
    "Subtotal",
    "IVA",
    "Total",
    "Link PDF",
    "Productos (JSON)",
];

const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

// ============================================================================
// JSON PAYLOADS
// ============================================================================

/// One product as stored in a register row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredProduct {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "cantidad")]
    pub quantity: f64,
    #[serde(rename = "precioUnitario")]
    pub unit_price: f64,
    #[serde(rename = "descuentoPorcentaje", default)]
    pub discount_percent: f64,
    #[serde(rename = "descuentoPesos", default)]
    pub discount_amount: f64,
    #[serde(rename = "importe")]
    pub amount: f64,
}

impl From<&QuotedProduct> for RegisteredProduct {
    fn from(product: &QuotedProduct) -> Self {
        let (discount_percent, discount_amount) = product
            .discount
            .map(|d| (d.percent, d.amount))
            .unwrap_or((0.0, 0.0));
        RegisteredProduct {
            code: product.key.clone(),
            description: product.description.clone(),
            quantity: product.piece_count(),
            unit_price: product.unit_price().or(product.sale_price).unwrap_or(0.0),
            discount_percent,
            discount_amount,
            amount: product.final_amount(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "razonSocial", skip_serializing_if = "String::is_empty")]
    pub legal_name: String,
    #[serde(rename = "rfc", skip_serializing_if = "String::is_empty")]
    pub tax_id: String,
    #[serde(rename = "telefono", skip_serializing_if = "String::is_empty")]
    pub phone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(rename = "domicilioFiscal", skip_serializing_if = "String::is_empty")]
    pub fiscal_address: String,
    #[serde(rename = "domicilioEntrega", skip_serializing_if = "String::is_empty")]
    pub delivery_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotationInfo {
    #[serde(rename = "idObra", alias = "proyecto")]
    pub project: String,
    #[serde(rename = "vendedor")]
    pub seller: String,
    #[serde(rename = "vigencia", skip_serializing_if = "String::is_empty")]
    pub validity: String,
    #[serde(rename = "tiempoEntrega", skip_serializing_if = "String::is_empty")]
    pub delivery_time: String,
    #[serde(rename = "modoPrecioCerrado")]
    pub closed_price: bool,
}

/// Where the rendered documents of a quotation live. The client copy only
/// exists in closed-price mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentLinks {
    pub internal: String,
    pub client: Option<String>,
}

/// The sales-order specifics that are not part of the quotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesOrder {
    pub folio: String,
    pub quotation_folio: u64,
    pub products_mode: String,
    pub payment_method: String,
    pub payment_terms: String,
    pub document_link: String,
}

fn products_json(products: &[QuotedProduct]) -> Result<String, serde_json::Error> {
    let registered: Vec<RegisteredProduct> = products.iter().map(RegisteredProduct::from).collect();
    serde_json::to_string(&registered)
}

/// Reads the products cell of a register row. A blank cell holds none.
pub fn registered_products(cell: &CellValue) -> Result<Vec<RegisteredProduct>, serde_json::Error> {
    match cell.as_str().map(str::trim) {
        Some(json) if !json.is_empty() => serde_json::from_str(json),
        _ => Ok(Vec::new()),
    }
}

// ============================================================================
// ROWS
// ============================================================================

/// The register row of an issued quotation. The closed-price flag comes
/// from the totals, which is what the amounts were computed with.
pub fn quotation_row(
    folio: u64,
    issued_at: NaiveDateTime,
    client: &ClientInfo,
    quotation: &QuotationInfo,
    products: &[QuotedProduct],
    totals: &Totals,
    links: &DocumentLinks,
) -> Result<Vec<CellValue>, serde_json::Error> {
    let quotation = QuotationInfo {
        closed_price: totals.closed_price,
        ..quotation.clone()
    };
    Ok(vec![
        CellValue::Number(folio as f64),
        CellValue::text(issued_at.format(TIMESTAMP_FORMAT).to_string()),
        CellValue::from(client.name.clone()),
        CellValue::from(quotation.project.clone()),
        CellValue::from(quotation.seller.clone()),
        CellValue::Number(totals.subtotal),
        CellValue::Number(totals.tax),
        CellValue::Number(totals.total),
        CellValue::from(links.internal.clone()),
        CellValue::from(links.client.clone().unwrap_or_default()),
        CellValue::text(products_json(products)?),
        CellValue::text(serde_json::to_string(client)?),
        CellValue::text(serde_json::to_string(&quotation)?),
        CellValue::text(registration_summary(&quotation.project, &client.delivery_address)),
        CellValue::text(if totals.closed_price { "SÍ" } else { "NO" }),
    ])
}

/// The register row of a sales order raised from a quotation.
pub fn sales_order_row(
    order: &SalesOrder,
    issued_at: NaiveDateTime,
    client: &ClientInfo,
    quotation: &QuotationInfo,
    products: &[QuotedProduct],
    totals: &Totals,
) -> Result<Vec<CellValue>, serde_json::Error> {
    Ok(vec![
        CellValue::from(order.folio.clone()),
        CellValue::text(issued_at.format(TIMESTAMP_FORMAT).to_string()),
        CellValue::Number(order.quotation_folio as f64),
        CellValue::from(client.name.clone()),
        CellValue::from(quotation.project.clone()),
        CellValue::from(quotation.seller.clone()),
        CellValue::from(order.products_mode.clone()),
        CellValue::from(order.payment_method.clone()),
        CellValue::from(order.payment_terms.clone()),
        CellValue::Number(totals.subtotal),
        CellValue::Number(totals.tax),
        CellValue::Number(totals.total),
        CellValue::from(order.document_link.clone()),
        CellValue::text(products_json(products)?),
    ])
}

/// Appends a row below the last used one. An empty register gets its
/// header row first. Returns the grid row written.
pub fn append_registration(register: &mut Grid, headers: &[&str], row: Vec<CellValue>) -> u32 {
    let target = match register.last_used_row() {
        Some(last) => last + 1,
        None => {
            for (c, header) in headers.iter().enumerate() {
                register.set_value(0, c as u32, *header);
            }
            1
        }
    };
    for (c, value) in row.into_iter().enumerate() {
        register.set_value(target, c as u32, value);
    }
    info!(target: "PRICING", "registered {} in row {}", register.text(target, 0), target + 1);
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Discount;
    use chrono::NaiveDate;
    use cotiza_engine::RecordKind;

    fn issued_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn window(discount: Option<Discount>) -> QuotedProduct {
        QuotedProduct {
            kind: RecordKind::Piece,
            start_row: 3,
            end_row: 7,
            category: "VENTANAS".into(),
            description: "Ventana corrediza 2 hojas".into(),
            model: "Corrediza".into(),
            key: "VC-01".into(),
            pieces: 2.0,
            sale_price: Some(1200.0),
            amount: Some(2400.0),
            discount,
        }
    }

    fn client() -> ClientInfo {
        ClientInfo {
            name: "Constructora del Norte".into(),
            delivery_address: "Monterrey".into(),
            ..ClientInfo::default()
        }
    }

    fn quotation() -> QuotationInfo {
        QuotationInfo {
            project: "Torre Sur".into(),
            seller: "ventas@taller.mx".into(),
            ..QuotationInfo::default()
        }
    }

    #[test]
    fn registered_product_carries_the_discount() {
        let open = RegisteredProduct::from(&window(None));
        assert_eq!(open.quantity, 2.0);
        assert_eq!(open.unit_price, 1200.0);
        assert_eq!((open.discount_percent, open.discount_amount), (0.0, 0.0));
        assert_eq!(open.amount, 2400.0);

        let closed = RegisteredProduct::from(&window(Some(Discount {
            percent: 13.79,
            amount: 330.96,
        })));
        assert_eq!(closed.discount_percent, 13.79);
        assert!((closed.amount - 2069.04).abs() < 1e-9);
    }

    #[test]
    fn products_json_uses_sheet_keys() {
        let json = products_json(&[window(None)]).unwrap();
        assert!(json.starts_with(r#"[{"codigo":"VC-01","descripcion":"Ventana corrediza 2 hojas""#));
        assert!(json.contains(r#""precioUnitario":1200.0"#));

        let back = registered_products(&CellValue::text(json)).unwrap();
        assert_eq!(back[0].code, "VC-01");
        assert!(registered_products(&CellValue::Empty).unwrap().is_empty());
        assert!(registered_products(&CellValue::text("{oops")).is_err());
    }

    #[test]
    fn quotation_row_layout() {
        let totals = Totals {
            subtotal: 2400.0,
            tax: 384.0,
            total: 2784.0,
            closed_price: false,
        };
        let links = DocumentLinks {
            internal: "https://docs/7116".into(),
            client: None,
        };
        let row = quotation_row(7116, issued_at(), &client(), &quotation(), &[window(None)], &totals, &links).unwrap();

        assert_eq!(row.len(), QUOTATION_HEADERS.len());
        assert_eq!(row[0], CellValue::Number(7116.0));
        assert_eq!(row[1], CellValue::text("14/03/2025 09:30:00"));
        assert_eq!(row[2], CellValue::text("Constructora del Norte"));
        assert_eq!(row[3], CellValue::text("Torre Sur"));
        assert_eq!(row[7], CellValue::Number(2784.0));
        assert_eq!(row[9], CellValue::Empty);
        assert_eq!(
            row[11],
            CellValue::text(r#"{"nombre":"Constructora del Norte","domicilioEntrega":"Monterrey"}"#)
        );
        assert_eq!(
            row[13],
            CellValue::text("Cotización correspondiente al proyecto \"Torre Sur\", instalado en Monterrey.")
        );
        assert_eq!(row[14], CellValue::text("NO"));
    }

    #[test]
    fn closed_price_flag_follows_the_totals() {
        let totals = Totals {
            subtotal: 2069.04,
            tax: 331.05,
            total: 2400.09,
            closed_price: true,
        };
        let links = DocumentLinks {
            internal: "interno".into(),
            client: Some("cliente".into()),
        };
        let row = quotation_row(7117, issued_at(), &client(), &quotation(), &[], &totals, &links).unwrap();
        assert_eq!(row[9], CellValue::text("cliente"));
        assert_eq!(row[10], CellValue::text("[]"));
        assert_eq!(row[14], CellValue::text("SÍ"));

        let stored: QuotationInfo = serde_json::from_str(row[12].as_str().unwrap()).unwrap();
        assert!(stored.closed_price);
        assert_eq!(stored.project, "Torre Sur");
    }

    #[test]
    fn quotation_info_accepts_either_project_key() {
        let info: QuotationInfo = serde_json::from_str(r#"{"proyecto":"Torre Sur"}"#).unwrap();
        assert_eq!(info.project, "Torre Sur");
        assert_eq!(info.seller, "");
    }

    #[test]
    fn sales_order_row_layout() {
        let order = SalesOrder {
            folio: "NV-0010".into(),
            quotation_folio: 7116,
            products_mode: "detallado".into(),
            payment_method: "Transferencia".into(),
            payment_terms: "50% anticipo".into(),
            document_link: "https://docs/NV-0010".into(),
        };
        let totals = Totals {
            subtotal: 2400.0,
            tax: 384.0,
            total: 2784.0,
            closed_price: false,
        };
        let row = sales_order_row(&order, issued_at(), &client(), &quotation(), &[window(None)], &totals).unwrap();

        assert_eq!(row.len(), SALES_ORDER_HEADERS.len());
        assert_eq!(row[0], CellValue::text("NV-0010"));
        assert_eq!(row[2], CellValue::Number(7116.0));
        assert_eq!(row[5], CellValue::text("ventas@taller.mx"));
        assert_eq!(row[8], CellValue::text("50% anticipo"));
        assert_eq!(registered_products(&row[13]).unwrap().len(), 1);
    }

    #[test]
    fn append_writes_headers_once() {
        let mut register = Grid::new();
        let first = append_registration(&mut register, &SALES_ORDER_HEADERS, vec![CellValue::text("NV-0001")]);
        let second = append_registration(&mut register, &SALES_ORDER_HEADERS, vec![CellValue::text("NV-0002")]);
        assert_eq!((first, second), (1, 2));
        assert_eq!(register.text(0, 0), "Folio NV");
        assert_eq!(register.text(0, 13), "Productos (JSON)");
        assert_eq!(register.text(2, 0), "NV-0002");
    }
}
