//! FILENAME: core/persistence/src/xlsx_writer.rs

use crate::{PersistenceError, Workbook, META_SHEET_NAME};
use cotiza_engine::cell::{Cell, CellValue};
use log::info;
use rust_xlsxwriter::{Format, Formula, Workbook as XlsxWorkbook, Worksheet};
use std::path::Path;

/// Writes every sheet, then the hidden metadata sheet.
///
/// Text that starts with an apostrophe is stored without it, using the
/// quote-prefix cell format, so the spreadsheet shows it as literal text
/// instead of evaluating it. Those cells are listed in the metadata so a
/// later load gives the apostrophe back. Formula cells are written with their cached
/// value so readers that do not recalculate still see numbers.
pub fn save_xlsx(workbook: &Workbook, path: &Path) -> Result<(), PersistenceError> {
    if workbook.sheets.is_empty() {
        return Err(PersistenceError::InvalidFormat(
            "Workbook contains no sheets".to_string(),
        ));
    }

    let mut xlsx = XlsxWorkbook::new();
    let literal = Format::new().set_quote_prefix();
    let mut meta = workbook.meta.clone();
    meta.literal_cells.clear();

    for sheet in &workbook.sheets {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        let mut literal_cells = Vec::new();
        for ((row, col), cell) in &sheet.grid.cells {
            let column = u16::try_from(*col).map_err(|_| {
                PersistenceError::InvalidFormat(format!(
                    "Sheet '{}': column {} is beyond the XLSX limit",
                    sheet.name, col
                ))
            })?;
            if write_cell(worksheet, *row, column, cell, &literal)? {
                literal_cells.push((*row, *col));
            }
        }
        info!(target: "XLSX", "wrote sheet '{}' ({} cells)", sheet.name, sheet.grid.cells.len());

        if !literal_cells.is_empty() {
            literal_cells.sort_unstable();
            meta.literal_cells.insert(sheet.name.clone(), literal_cells);
        }
    }

    let meta_sheet = xlsx.add_worksheet();
    meta_sheet.set_name(META_SHEET_NAME)?;
    meta_sheet.write_string(0, 0, meta.to_json()?)?;
    meta_sheet.set_hidden(true);

    xlsx.save(path)?;
    Ok(())
}

/// Writes one cell. Returns true when it was stored as literal text.
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    literal: &Format,
) -> Result<bool, PersistenceError> {
    if let Some(formula) = cell.formula.as_deref().filter(|f| !f.is_empty()) {
        let clean_formula = formula.strip_prefix('=').unwrap_or(formula);
        let formula = Formula::new(clean_formula).set_result(cell.value.display_value());
        worksheet.write_formula(row, col, formula)?;
        return Ok(false);
    }

    match &cell.value {
        CellValue::Empty => {}
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Text(s) => match s.strip_prefix('\'') {
            Some(shown) => {
                worksheet.write_string_with_format(row, col, shown, literal)?;
                return Ok(true);
            }
            None => {
                worksheet.write_string(row, col, s)?;
            }
        },
        CellValue::Boolean(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(false)
}
