//! Batch reconciliation of a CSV inventory against canned wiki pages

use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use diecast::audit::{CsvAuditLog, AUDIT_HEADER};
use diecast::catalog::{BatchRunner, BatchSummary, MemoryWriteBack};
use diecast::config::Config;
use diecast::error::{DiecastError, Result};
use diecast::fetch::PageSource;
use diecast::inventory::Inventory;

const TWIN_MILL: &str = r#"
<table class="wikitable">
  <tr><th>Year</th><th>Series</th><th>Color</th><th>Toy #</th></tr>
  <tr><td rowspan="2">2020</td><td rowspan="2">HW Art Cars</td><td>Red</td><td>GJT68</td></tr>
  <tr><td>Blue</td><td>GJT68</td></tr>
  <tr><td>2022</td><td>HW Dream Garage</td><td>Gold</td><td>HCT01</td></tr>
</table>"#;

const MUSTANG: &str = r#"
<table class="wikitable">
  <tr><th>Year</th><th>Colour</th><th>Toy #</th></tr>
  <tr><td>2019</td><td>White</td><td>FYC12</td></tr>
</table>"#;

const SHEET: &str = "Box #,Toy #,Quantity,Model Name,Brand\n\
                     1,GJT68,2,Twin Mill,Hot Wheels\n\
                     1,ZZZ99,1,Twin Mill,\n\
                     2,FYC12,1,Mustang,Matchbox\n\
                     2,,1,Bone Shaker,\n\
                     3,AAA00,1,Bone Shaker,\n";

/// Serves pages from memory, 404 for everything else
struct CannedWiki(HashMap<&'static str, &'static str>);

impl CannedWiki {
    fn new() -> Self {
        Self(HashMap::from([
            ("https://hotwheels.fandom.com/wiki/Twin_Mill", TWIN_MILL),
            ("https://matchbox.fandom.com/wiki/Mustang", MUSTANG),
        ]))
    }
}

impl PageSource for CannedWiki {
    fn fetch(&self, url: &str) -> Result<String> {
        self.0
            .get(url)
            .map(|html| html.to_string())
            .ok_or(DiecastError::HttpError(ureq::Error::StatusCode(404)))
    }
}

fn setup() -> (tempfile::TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("inventory.csv"), SHEET).unwrap();
    (dir, Config::default())
}

#[test]
fn test_batch_updates_inventory_and_audits_every_row() {
    let (dir, config) = setup();
    let inventory_path = dir.path().join("inventory.csv");
    let log_path = dir.path().join("wiki_scraper_log.csv");

    let mut inventory = Inventory::load(&inventory_path)
        .unwrap()
        .with_protected_columns(&config.constant_columns);
    let queries = inventory.queries(&config.default_brand);
    assert_eq!(queries.len(), 4);

    let wiki = CannedWiki::new();
    let runner = BatchRunner::new(&config, &wiki).with_delay(Duration::ZERO);
    let mut audit = CsvAuditLog::create(&log_path).unwrap();

    let summary = runner
        .run(&queries, &mut audit, &mut inventory, |_| {})
        .unwrap();
    assert_eq!(summary, BatchSummary { processed: 4, updated: 2, no_data: 2 });
    inventory.save().unwrap();

    // Reload from disk to check what was persisted
    let saved = Inventory::load(&inventory_path).unwrap();
    assert_eq!(saved.headers(), &["Box #", "Toy #", "Quantity", "Model Name", "Brand", "Year", "Series", "Color"]);
    assert_eq!(saved.value(2, "Year"), Some("2020"));
    assert_eq!(saved.value(2, "Series"), Some("HW Art Cars"));
    assert_eq!(saved.value(2, "Color"), Some("Blue; Red"));
    assert_eq!(saved.value(2, "Quantity"), Some("2"));
    assert_eq!(saved.value(3, "Color"), Some(""));
    assert_eq!(saved.value(4, "Year"), Some("2019"));
    assert_eq!(saved.value(4, "Color"), Some("White"));
    assert_eq!(saved.value(4, "Toy #"), Some("FYC12"));

    let log = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines[0], AUDIT_HEADER.join(","));
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], "2,Twin Mill,GJT68,Updated,https://hotwheels.fandom.com/wiki/Twin_Mill");
    assert_eq!(lines[2], "3,Twin Mill,ZZZ99,No Data,https://hotwheels.fandom.com/wiki/Twin_Mill");
    assert_eq!(lines[3], "4,Mustang,FYC12,Updated,https://matchbox.fandom.com/wiki/Mustang");
    assert_eq!(lines[4], "6,Bone Shaker,AAA00,No Data,https://hotwheels.fandom.com/wiki/Bone_Shaker");
}

#[test]
fn test_dry_run_leaves_inventory_untouched() {
    let (dir, config) = setup();
    let inventory_path = dir.path().join("inventory.csv");

    let inventory = Inventory::load(&inventory_path).unwrap();
    let queries = inventory.queries(&config.default_brand);

    let wiki = CannedWiki::new();
    let runner = BatchRunner::new(&config, &wiki).with_delay(Duration::ZERO);
    let mut audit = CsvAuditLog::create(&dir.path().join("log.csv")).unwrap();
    let mut preview = MemoryWriteBack::default();

    let summary = runner.run(&queries, &mut audit, &mut preview, |_| {}).unwrap();
    assert_eq!(summary.updated, 2);

    let rows: Vec<usize> = preview.entries.iter().map(|(row, _)| *row).collect();
    assert_eq!(rows, vec![2, 4]);
    assert_eq!(preview.entries[1].1.record.get("Color"), Some("White"));
    assert_eq!(fs::read_to_string(&inventory_path).unwrap(), SHEET);
}

#[test]
fn test_batch_pauses_between_lookups() {
    let (dir, config) = setup();
    let inventory = Inventory::load(&dir.path().join("inventory.csv")).unwrap();
    let queries = inventory.queries(&config.default_brand);

    let wiki = CannedWiki::new();
    let runner = BatchRunner::new(&config, &wiki).with_delay(Duration::from_millis(20));
    let mut audit = CsvAuditLog::create(&dir.path().join("log.csv")).unwrap();
    let mut preview = MemoryWriteBack::default();

    let start = std::time::Instant::now();
    runner.run(&queries, &mut audit, &mut preview, |_| {}).unwrap();
    // Four lookups, three pauses
    assert!(start.elapsed() >= Duration::from_millis(60));
}
