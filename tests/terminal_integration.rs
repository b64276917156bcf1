//! Integration tests for terminal file loading and the essay tables

use std::fs;
use std::path::PathBuf;

use mc_welfare::core::error::AnalysisError;
use mc_welfare::core::BimodalityConfig;
use mc_welfare::data::TerminalTable;
use mc_welfare::overview::{ModalityReport, ScenarioOverview};

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("mc_welfare_{}_{}.csv", name, std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_quoted_headers_and_mixed_separators() {
    let path = scratch_file(
        "quoted",
        "\u{feff}\"Seed\";\"Unemployment\";\"MarketWage\";\"PriceLevel\";\"TotalAdoption\"\r\n\
         1;0,05;4,2e3;1.10;0,5\r\n\
         2;-0,0;4200;1,1;0,6\r\n",
    );
    let table = TerminalTable::load(&path).unwrap();

    assert_eq!(table.len(), 2);
    assert!(table.has_column("PriceLevel"));
    assert_eq!(table.column("MarketWage").unwrap(), vec![4200.0, 4200.0]);
    assert_eq!(table.column("PriceLevel").unwrap(), vec![1.10, 1.1]);

    let seeds = table.seed_records().unwrap();
    assert_eq!(seeds[1].unemployment_rate, 0.0);
    assert_eq!(seeds[0].total_adoption, 0.5);

    let _ = fs::remove_file(&path);
}

#[test]
fn test_bad_number_names_column_and_row() {
    let path = scratch_file(
        "badnum",
        "Unemployment;MarketWage;PriceLevel;TotalAdoption\n0,05;4000;1,1;0,5\n0,05;n/a;1,1;0,5\n",
    );
    let table = TerminalTable::load(&path).unwrap();
    let err = table.seed_records().unwrap_err();
    match err {
        AnalysisError::InvalidNumber { column, row, value } => {
            assert_eq!(column, "MarketWage");
            assert_eq!(row, 1);
            assert_eq!(value, "n/a");
        }
        other => panic!("unexpected error: {}", other),
    }

    let _ = fs::remove_file(&path);
}

#[test]
fn test_overview_and_modality_from_file() {
    let mut text = String::from("Seed;TotalAdoption;Inflation;Unemployment;MarketWage;NPL;Manuf_Auto\n");
    for i in 0..60 {
        let adoption = if i % 2 == 0 {
            0.28 + (i % 7) as f64 * 0.01
        } else {
            0.70 + (i % 5) as f64 * 0.01
        };
        text.push_str(&format!(
            "{};{};0,025;0,06;4100;0,03;0,4\n",
            i,
            adoption.to_string().replace('.', ",")
        ));
    }
    let path = scratch_file("modality", &text);
    let table = TerminalTable::load(&path).unwrap();

    let overview = ScenarioOverview::from_table("BDP=2000", &table).unwrap();
    assert_eq!(overview.n_seeds, 60);
    assert!((overview.metric("NPL Ratio").unwrap().mean - 3.0).abs() < 1e-9);
    assert!((overview.metric("Manufacturing").unwrap().mean - 40.0).abs() < 1e-9);
    assert!(overview.metric("Gov Debt (mld)").is_none());

    let config = BimodalityConfig {
        max_components: 3,
        n_init: 3,
        ..BimodalityConfig::default()
    };
    let report = ModalityReport::from_table("BDP=2000", &table, &config).unwrap();
    assert_eq!(report.split.high.count, 30);
    assert_eq!(report.split.low.count, 30);
    let one_component = report.selection.bics[0].1;
    assert!(report.selection.best_k() >= 2);
    assert!(report.selection.best.bic() < one_component);

    let _ = fs::remove_file(&path);
}
