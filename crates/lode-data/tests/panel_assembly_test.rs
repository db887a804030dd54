//! Integration tests for loading every source and assembling the panel.

use lode_data::{
    Mineral, Panel, ProductionLayout, Sheet, YearMonth, load_macro_series, load_prices,
    load_production,
};

const PRODUCTION: &str = "\
H01,H04,H05,MO112019,MO122019,MO012020,MO022020
P2041,Physical volume of mining production,Gold,9.5,9.8,10.1,10.4
P2041,Physical volume of mining production,Iron ore,6000,6100,,6300
P2041,Mineral sales,Gold,1,1,1,1
";

const PRICES: &str = "\
,GOLD,IRON_ORE,ZINC
Gold,Iron ore,Zinc,
$/oz,$/dmtu,$/mt,
LBMA,Vale,LME,
MO122019,1479.1,92.0,2270
MO012020,1560.7,95.8,2354
MO032020,1591.9,88.9,1903
";

const MACRO: &str = "\
observation_date,CPI
2019-10-31,99.0
2019-11-30,99.4
2020-01-31,100.2
";

fn sheet(name: &str, text: &str) -> Sheet {
    Sheet::from_csv_reader(name, text.as_bytes()).unwrap()
}

fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

#[test]
fn test_full_panel_from_all_sources() {
    let production = load_production(
        &sheet("production", PRODUCTION),
        &ProductionLayout::default(),
    )
    .unwrap();
    let prices = load_prices(&sheet("prices", PRICES)).unwrap();
    let cpi = load_macro_series(&sheet("cpi", MACRO), "cpi").unwrap();

    let panel = Panel::assemble(vec![production, prices, cpi]).unwrap();

    // Union of coverage: 2019-10 (macro) through 2020-03 (prices)
    assert_eq!(
        panel.months().unwrap(),
        vec![
            ym(2019, 10),
            ym(2019, 11),
            ym(2019, 12),
            ym(2020, 1),
            ym(2020, 2),
            ym(2020, 3)
        ]
    );
    assert_eq!(
        panel.column_names(),
        vec![
            "prod_gold",
            "prod_iron_ore",
            "price_gold",
            "price_iron_ore",
            "cpi"
        ]
    );

    let gold = panel.series(&Mineral::Gold.production_column()).unwrap();
    assert_eq!(
        gold,
        vec![None, Some(9.5), Some(9.8), Some(10.1), Some(10.4), None]
    );

    let iron = panel.series(&Mineral::IronOre.production_column()).unwrap();
    assert_eq!(iron[3], None);

    let gold_price = panel.series(&Mineral::Gold.price_column()).unwrap();
    assert_eq!(gold_price[4], None);
    assert_eq!(gold_price[5], Some(1591.9));

    let cpi = panel.series("cpi").unwrap();
    assert_eq!(cpi, vec![Some(99.0), Some(99.4), None, Some(100.2), None, None]);

    assert!(!panel.has_column("price_coal"));
    assert!(!panel.has_column("date"));
}
