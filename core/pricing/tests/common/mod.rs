//! FILENAME: tests/common/mod.rs
//! Fixtures for the pricing integration tests: a small shop workbook with
//! every sheet the quoting, summary and batch flows read.

#![allow(dead_code)]

use cotiza_engine::{CellValue, Grid};
use cotiza_persistence::{Sheet, Workbook};
use cotiza_pricing::{PriceBook, PricingConfig};

pub fn t(s: &str) -> CellValue {
    CellValue::from(s)
}

pub fn n(v: f64) -> CellValue {
    CellValue::Number(v)
}

/// Every sheet of the fixture workbook, as grids.
pub struct ShopFixture {
    pub config: PricingConfig,
    pub quote: Grid,
    pub generators: Grid,
    pub block_generators: Grid,
    pub summary: Grid,
    pub aluminum: Grid,
    pub glass: Grid,
    pub hardware: Grid,
    pub others: Grid,
    pub products: Grid,
    pub catalog: Grid,
    pub quotations: Grid,
}

impl ShopFixture {
    pub fn new() -> Self {
        ShopFixture {
            config: PricingConfig::default(),
            quote: quote_sheet(),
            generators: quoting_generators(),
            block_generators: block_generators(),
            summary: generator_summary(),
            aluminum: aluminum(),
            glass: glass(),
            hardware: hardware(),
            others: others(),
            products: Grid::new(),
            catalog: catalog(),
            quotations: quotations(),
        }
    }

    pub fn price_book(&self) -> PriceBook {
        PriceBook::from_grids(&self.aluminum, &self.glass, &self.hardware, &self.others)
    }

    /// The fixture as a workbook, named the way the shop names its sheets.
    /// The block generators sheet is stored as "GENERADORES".
    pub fn workbook(&self) -> Workbook {
        let names = &self.config.sheets;
        let mut wb = Workbook::new();
        wb.put_sheet(Sheet::from_grid(&names.quote, self.quote.clone()));
        wb.put_sheet(Sheet::from_grid(&names.generators, self.generators.clone()));
        wb.put_sheet(Sheet::from_grid("GENERADORES", self.block_generators.clone()));
        wb.put_sheet(Sheet::from_grid(&names.generator_summary, self.summary.clone()));
        wb.put_sheet(Sheet::from_grid(&names.aluminum, self.aluminum.clone()));
        wb.put_sheet(Sheet::from_grid(&names.glass, self.glass.clone()));
        wb.put_sheet(Sheet::from_grid(&names.hardware, self.hardware.clone()));
        wb.put_sheet(Sheet::from_grid(&names.others, self.others.clone()));
        wb.put_sheet(Sheet::from_grid(&names.catalog, self.catalog.clone()));
        wb.put_sheet(Sheet::from_grid(&names.quotations, self.quotations.clone()));
        wb
    }
}

// ============================================================================
// QUOTING
// ============================================================================

/// Code VC-01, Natural finish, clear glass, 1.5 x 1.2 with 10% waste.
fn quote_sheet() -> Grid {
    let mut g = Grid::with_dimensions(15, 2);
    g.set_value(2, 0, "Producto");
    g.set_value(2, 1, "VC-01");
    g.set_value(4, 0, "Acabado");
    g.set_value(4, 1, "Natural");
    g.set_value(5, 0, "Vidrio");
    g.set_value(5, 1, "Claro 6mm");
    g.set_value(7, 0, "Largo");
    g.set_value(7, 1, "Alto");
    g.set_value(8, 0, 1.5);
    g.set_value(8, 1, 1.2);
    g.set_value(14, 0, "Desperdicio");
    g.set_value(14, 1, 1.1);
    g
}

fn quoting_generators() -> Grid {
    Grid::from_rows(vec![
        vec![t("Código"), t("Fórmula"), t("Unidad"), t("Material")],
        vec![t("VC-01"), t("=(Largo1*2+Alto1*2)*Desp"), t("Perfil por ML"), t("Riel 1234 natural")],
        vec![t("VC-01"), t("=Largo1*Alto1"), t("m2"), t("Vidrio")],
        vec![t("VC-01"), n(4.0), t("pza"), t("Jaladera cromo")],
        vec![t("VC-01"), t("=Largo2"), t("ml"), t("Felpa gris")],
        vec![t("VC-02"), t("=2"), t("pza"), t("Jaladera")],
        vec![t("PF-01"), t("=Alto1*2"), t("perfil por ml"), t("Marco 9999")],
    ])
}

// ============================================================================
// CATALOGS
// ============================================================================

fn aluminum() -> Grid {
    Grid::from_rows(vec![
        vec![t(""), t(""), t(""), t("Clave"), t(" Natural "), t("Blanco")],
        vec![t(""), t(""), t(""), t("1234"), n(85.5), n(92.0)],
        vec![t(""), t(""), t(""), t("56789"), n(120.0), n(130.0)],
    ])
}

fn glass() -> Grid {
    Grid::from_rows(vec![
        vec![t(""), t(""), t("Clave"), t("Descripción"), t(""), t("Precio")],
        vec![t(""), t(""), t("CLARO"), t("Claro 6mm"), t(""), n(350.0)],
        vec![t(""), t(""), t("FILTRASOL"), t("Filtrasol 6mm"), t(""), n(410.0)],
    ])
}

fn hardware() -> Grid {
    Grid::from_rows(vec![
        vec![t(""), t(""), t("Clave"), t(""), t(""), t("Precio")],
        vec![t(""), t(""), t("Jaladera"), t(""), t(""), n(35.0)],
        vec![t(""), t(""), t("Bisagra"), t(""), t(""), n(20.0)],
    ])
}

fn others() -> Grid {
    Grid::from_rows(vec![
        vec![t(""), t(""), t("Clave"), t(""), t(""), t("Precio")],
        vec![t(""), t(""), t("Silicón"), t(""), t(""), n(60.0)],
    ])
}

// ============================================================================
// GENERATOR SUMMARY
// ============================================================================

/// A piece block (rows 3..=7) and a glass measurement block (9..=13).
fn generator_summary() -> Grid {
    let mut g = Grid::with_dimensions(16, 12);
    g.set_value(1, 4, "Torre Sur");
    g.set_value(1, 11, 3300.0);

    g.set_value(3, 0, "Datos de la Pieza");
    g.set_value(4, 1, "VENTANAS");
    g.set_value(4, 3, "Descripción del modelo");
    g.set_value(5, 1, "Corrediza");
    g.set_value(5, 3, "Ventana   corrediza  2 hojas");
    g.set_value(6, 1, "VC-01");
    g.set_value(6, 10, "Precio de venta");
    g.set_value(6, 11, "$1,200.00");
    g.set_value(7, 0, "Piezas");
    g.set_value(7, 1, 2.0);
    g.set_value(7, 10, "Importe");
    g.set_value(7, 11, 2400.0);

    g.set_value(9, 0, "Medidas");
    g.set_value(9, 3, "Descripción del modelo");
    g.set_value(10, 0, "Fijo");
    g.set_value(10, 3, "Cristal claro 6mm");
    g.set_value(11, 0, "Piezas");
    g.set_value(11, 1, 3.0);
    g.set_value(12, 0, "1.2 x 0.8");
    g.set_value(12, 10, "Importe");
    g.set_value(12, 11, 900.0);
    g.set_value(13, 0, "1.0 x 0.5");
    g
}

// ============================================================================
// CATALOG BATCH
// ============================================================================

/// Three blocks marked in column H: VC-01 at sheet row 3, a block without
/// material header at row 10 and PF-01 at row 12. B2 holds the waste.
fn block_generators() -> Grid {
    let mut g = Grid::with_dimensions(15, 8);
    g.set_value(1, 0, "Desperdicio");
    g.set_value(1, 1, 1.1);

    g.set_value(2, 7, "X");
    for (c, feature) in ["Ventana", "Corrediza", "Aluminio", "2 hojas", "Natural", "Línea 2"]
        .iter()
        .enumerate()
    {
        g.set_value(2, c as u32, *feature);
    }
    g.set_value(3, 0, "Largo");
    g.set_value(3, 1, "Alto");
    g.set_value(4, 0, 1.5);
    g.set_value(4, 1, 1.2);
    g.set_value(4, 2, "Hoja fija");
    g.set_value(5, 0, 0.5);
    g.set_value(5, 1, 1.2);
    g.set_value(5, 2, "Hoja móvil");
    g.set_value(6, 0, "Cantidad");
    g.set_value(6, 1, "Unidad");
    g.set_value(6, 2, "Descripción");
    g.set_value(6, 3, "P.U.");
    g.set_value(7, 0, 5.94);
    g.set_formula(7, 0, "=(A5*2+B5*2)*$B$2");
    g.set_value(7, 1, "perfil por ml");
    g.set_value(7, 2, "Riel 1234 natural");
    g.set_value(7, 3, 85.5);
    g.set_value(8, 0, 4.0);
    g.set_value(8, 1, "pza");
    g.set_value(8, 2, "Jaladera");
    g.set_value(8, 3, 35.0);
    g.set_value(9, 0, "Ventana corrediza 2 hojas");

    g.set_value(10, 7, "X");
    g.set_value(10, 0, "Puerta");
    g.set_value(10, 1, "Abatible");

    g.set_value(11, 7, "X");
    g.set_value(11, 0, "Puerta");
    g.set_value(11, 1, "Plegadiza");
    g.set_value(12, 0, "Cantidad");
    g.set_value(12, 1, "Unidad");
    g.set_value(13, 0, 6.0);
    g.set_value(13, 1, "pza");
    g.set_value(13, 2, "Bisagra");
    g.set_value(13, 3, 20.0);
    g
}

/// Catalog rows: VC-01 (sheet row 2), PF-00 registered (3), PL-01 whose
/// block has no materials (4), PF-01 (5).
fn catalog() -> Grid {
    let mut g = Grid::with_dimensions(5, 13);
    g.set_value(0, 1, "Código");
    g.set_value(0, 2, "Fila generador");
    g.set_value(0, 12, "Estado");

    g.set_value(1, 1, "VC-01");
    g.set_value(1, 2, 3.0);

    g.set_value(2, 1, "PF-00");
    g.set_value(2, 2, 3.0);
    g.set_value(2, 12, "Registrado");

    g.set_value(3, 1, "PL-01");
    g.set_value(3, 2, 11.0);

    g.set_value(4, 1, "PF-01");
    g.set_value(4, 2, 12.0);
    g
}

fn quotations() -> Grid {
    let mut g = Grid::from_rows(vec![vec!["Folio", "Cliente", "Total"]]);
    g.set_value(1, 0, 7116.0);
    g.set_value(1, 1, "Constructora del Norte");
    g.set_value(2, 0, 7117.0);
    g.set_value(2, 1, "Inmobiliaria Sur");
    g
}
