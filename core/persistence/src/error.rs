//! FILENAME: core/persistence/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XLSX write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("XLSX read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    /// The hidden metadata sheet holds JSON that does not parse.
    #[error("Workspace metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    /// A quotation operation asked for a sheet the workbook does not have
    /// ("Generador", "CATALOGO DE PRODUCTOS", ...).
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}
