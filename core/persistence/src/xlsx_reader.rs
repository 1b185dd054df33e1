// FILENAME: core\persistence\src\xlsx_reader.rs

use crate::{CotizaMeta, PersistenceError, Sheet, Workbook, META_SHEET_NAME};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use cotiza_engine::cell::{Cell, CellValue};
use cotiza_engine::grid::Grid;
use log::{info, warn};
use std::path::Path;

/// Loads every sheet of an XLSX file into a grid anchored at A1. Formula
/// cells keep both their cached value and their formula text ("=..." form).
pub fn load_xlsx(path: &Path) -> Result<Workbook, PersistenceError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    if sheet_names.is_empty() {
        return Err(PersistenceError::InvalidFormat(
            "Workbook contains no sheets".to_string(),
        ));
    }

    let mut result = Workbook::new();

    for sheet_name in &sheet_names {
        let range = workbook.worksheet_range(sheet_name)?;

        if sheet_name == META_SHEET_NAME {
            result.meta = read_meta(&range)?;
            continue;
        }

        let mut grid = Grid::new();
        if let Some((end_row, end_col)) = range.end() {
            grid = Grid::with_dimensions(end_row + 1, end_col + 1);
        }

        let (row0, col0) = range.start().unwrap_or((0, 0));
        for (r, c, data) in range.cells() {
            let value = match data {
                Data::Empty => continue,
                Data::String(s) => CellValue::Text(s.clone()),
                Data::Float(f) => CellValue::Number(*f),
                Data::Int(i) => CellValue::Number(*i as f64),
                Data::Bool(b) => CellValue::Boolean(*b),
                Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
                Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
                Data::DateTimeIso(s) => CellValue::Text(s.clone()),
                Data::DurationIso(s) => CellValue::Text(s.clone()),
            };
            grid.set_cell(row0 + r as u32, col0 + c as u32, Cell { formula: None, value });
        }

        // The formulas snapshot. Not every reader state supports it, so a
        // failure here only loses the formula text.
        match workbook.worksheet_formula(sheet_name) {
            Ok(formulas) => {
                let (frow0, fcol0) = formulas.start().unwrap_or((0, 0));
                for (r, c, formula) in formulas.cells() {
                    if formula.is_empty() {
                        continue;
                    }
                    grid.set_formula(frow0 + r as u32, fcol0 + c as u32, format!("={}", formula));
                }
            }
            Err(e) => warn!(target: "XLSX", "no formulas for sheet '{}': {}", sheet_name, e),
        }

        info!(
            target: "XLSX",
            "loaded sheet '{}' ({} x {})",
            sheet_name,
            grid.row_count(),
            grid.col_count()
        );
        result.sheets.push(Sheet::from_grid(sheet_name, grid));
    }

    restore_literal_markers(&mut result);
    Ok(result)
}

/// Puts the apostrophe back on text the writer stored with a quote prefix.
/// Cells that no longer hold text (edited outside Cotiza) are left alone.
fn restore_literal_markers(workbook: &mut Workbook) {
    let literal_cells = std::mem::take(&mut workbook.meta.literal_cells);
    for (sheet_name, cells) in literal_cells {
        let grid = match workbook.grid_mut(&sheet_name) {
            Ok(grid) => grid,
            Err(_) => {
                warn!(target: "XLSX", "literal cells listed for missing sheet '{}'", sheet_name);
                continue;
            }
        };
        for (row, col) in cells {
            let marked = match grid.value(row, col) {
                CellValue::Text(s) if !s.starts_with('\'') => format!("'{}", s),
                _ => continue,
            };
            grid.set_value(row, col, CellValue::Text(marked));
        }
    }
}

fn read_meta(range: &Range<Data>) -> Result<CotizaMeta, PersistenceError> {
    match range.get_value((0, 0)) {
        Some(Data::String(json)) => CotizaMeta::from_json(json),
        _ => Ok(CotizaMeta::default()),
    }
}
