//! FILENAME: core/pricing/src/lib.rs
//! PURPOSE: Pricing glue on top of the engine.
//! CONTEXT: Catalog lookups, quote lines for one product, the generator
//! summary with its totals, folio numbering, register rows and the
//! catalog batch. Like the engine, everything works on grid snapshots;
//! loading and saving workbooks is left to the persistence crate.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod folio;
pub mod product;
pub mod quote;
pub mod registration;
pub mod totals;

pub use batch::{
    pending_entries, process_entry, run_batch, BatchReport, CatalogEntry, CellUpdate, ProcessedProduct,
    ProgressToken, PRODUCT_SHEET_HEADERS,
};
pub use catalog::{lookup_key, profile_key, Price, PriceBook};
pub use config::{BatchConfig, ContextCell, PricingConfig, SheetNames};
pub use folio::{
    last_folio_in, last_sales_order_number, next_folio, next_sales_order_folio, registration_summary,
    sales_order_folio, SALES_ORDER_PREFIX,
};
pub use product::{Discount, GeneratorSummary, QuotedProduct};
pub use quote::{
    build_quote, quote_context, special_description, LineSource, Quote, QuoteError, QuoteLine,
    QuoteRequest,
};
pub use registration::{
    append_registration, quotation_row, registered_products, sales_order_row, ClientInfo, DocumentLinks,
    QuotationInfo, RegisteredProduct, SalesOrder, QUOTATION_HEADERS, SALES_ORDER_HEADERS,
};
pub use totals::{amount_in_words, compute_totals, Totals};
