//! FILENAME: tests/test_workbook.rs
//! End to end: load the shop workbook from XLSX, quote, run the batch,
//! save the results and the batch cursor, and load them again.

mod common;

use common::ShopFixture;
use cotiza_engine::strip_text_marker;
use cotiza_persistence::{load_xlsx, save_xlsx, Sheet};
use cotiza_pricing::{
    build_quote, last_folio_in, next_folio, run_batch, BatchConfig, PriceBook, ProgressToken,
    QuoteRequest,
};

#[test]
fn test_quote_from_a_saved_workbook() {
    let fx = ShopFixture::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cotizador.xlsx");
    save_xlsx(&fx.workbook(), &path).unwrap();

    let wb = load_xlsx(&path).unwrap();
    let names = &fx.config.sheets;
    let book = PriceBook::from_grids(
        wb.grid(&names.aluminum).unwrap(),
        wb.grid(&names.glass).unwrap(),
        wb.grid(&names.hardware).unwrap(),
        wb.grid(&names.others).unwrap(),
    );
    let request = QuoteRequest::from_quote_sheet(wb.grid(&names.quote).unwrap(), &fx.config);
    let quote = build_quote(wb.grid(&names.generators).unwrap(), &book, &request, &fx.config).unwrap();

    assert_eq!(quote.lines.len(), 4);
    assert_eq!(quote.lines[0].price.amount(), Some(85.5));

    let folio = next_folio(last_folio_in(wb.grid(&names.quotations).unwrap()), &fx.config);
    assert_eq!(folio, 7118);
}

#[test]
fn test_batch_progress_survives_save() {
    let fx = ShopFixture::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalogo.xlsx");
    let config = BatchConfig {
        item_budget: Some(1),
        ..BatchConfig::default()
    };
    let catalog_name = fx.config.sheets.catalog.clone();
    let products_name = fx.config.sheets.products.clone();

    let mut wb = fx.workbook();
    wb.put_sheet(Sheet::new(&products_name));

    let report = run_batch(
        wb.grid(&catalog_name).unwrap(),
        wb.grid("GENERADORES").unwrap(),
        None,
        &config,
    );
    let mut catalog = wb.grid(&catalog_name).unwrap().clone();
    let mut products = wb.grid(&products_name).unwrap().clone();
    report.apply(&mut catalog, &mut products, &config);
    wb.put_sheet(Sheet::from_grid(&catalog_name, catalog));
    wb.put_sheet(Sheet::from_grid(&products_name, products));
    wb.meta.progress = report.token.map(|t| t.0);
    save_xlsx(&wb, &path).unwrap();

    let reloaded = load_xlsx(&path).unwrap();
    assert_eq!(reloaded.meta.progress, Some(2));

    let products = reloaded.grid(&products_name).unwrap();
    assert_eq!(products.text(1, 0), "VC-01");
    // The stored formula keeps its literal-text marker.
    assert_eq!(products.text(1, 7), "'=(Largo1*2+Alto1*2)*Desp");
    assert_eq!(strip_text_marker(&products.text(1, 7)), "=(Largo1*2+Alto1*2)*Desp");
    assert_eq!(products.formula(1, 7), None);

    let token = reloaded.meta.progress.map(ProgressToken);
    let next = run_batch(
        reloaded.grid(&catalog_name).unwrap(),
        reloaded.grid("GENERADORES").unwrap(),
        token,
        &config,
    );
    assert_eq!(next.failed, vec!["PL-01".to_string()]);
}
