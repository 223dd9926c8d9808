//! End-to-end tests for table extraction and variant reconciliation

use diecast::aggregate::aggregate;
use diecast::canonical::{canonicalize, CanonicalSchema, DEFAULT_CUTOFF};
use diecast::catalog::{matching_rows, reconcile_document};
use diecast::config::Config;
use diecast::extract::{extract, FlatRow};
use diecast::matcher::{matches, MatchMarkers};
use diecast::table::{parse_tables, qualifying_tables, Cell, RawTable};

// ============================================================================
// Sample pages
// ============================================================================

/// Casting page with an infobox, a version table and an unrelated gallery
const TWIN_MILL_HTML: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Twin Mill | Hot Wheels Wiki | Fandom</title></head>
<body>
  <table class="infobox">
    <tr><th>Designer</th><td>Ira Gilford</td></tr>
    <tr><th>Debut</th><td>1969</td></tr>
  </table>

  <h2>Versions</h2>
  <table class="wikitable">
    <tr>
      <th>Col #</th><th>Year</th><th>Series</th><th>Colour</th>
      <th>Tampo</th><th>Base Color / Type</th><th>Wheel Type</th>
      <th>Country</th><th>Toy #</th><th>Photo</th>
    </tr>
    <tr>
      <td rowspan="3">142/250</td><td rowspan="3">2020</td><td rowspan="3">HW Art Cars</td>
      <td>Red</td><td>Flames</td><td>Black / Metal</td><td>5SP</td>
      <td rowspan="2">Malaysia</td><td>GHD21</td><td><a href="/a.jpg">img</a></td>
    </tr>
    <tr>
      <td>Blue</td><td>Flames</td><td>Black / Metal</td><td>5SP</td>
      <td>GHD21</td><td></td>
    </tr>
    <tr>
      <td>Red</td><td>Flames</td><td>Black / Plastic</td><td>PR5</td>
      <td>Thailand</td><td>GHD21</td><td></td>
    </tr>
    <tr>
      <td>55/250</td><td>2021</td><td>HW Dream Garage</td><td>Gold</td>
      <td>None</td><td>Black / Metal</td><td>MC5</td><td>Malaysia</td>
      <td>GRX99</td><td></td>
    </tr>
  </table>

  <h2>Multipacks</h2>
  <table class="wikitable">
    <tr><th>Pack</th><th>Year</th><th>Color</th><th>Toy #</th></tr>
    <tr><td>5-Pack</td><td>2022</td><td>Green</td><td>GHD21-5</td></tr>
  </table>

  <h2>Gallery</h2>
  <table class="gallery">
    <tr><th>Caption</th><th>Code</th></tr>
    <tr><td>Box art</td><td>GHD21</td></tr>
  </table>
</body>
</html>
"#;

fn default_schema() -> CanonicalSchema {
    Config::default().schema
}

fn schema(fields: &[&str]) -> CanonicalSchema {
    CanonicalSchema::new(fields.iter().copied()).unwrap()
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Full pipeline
// ============================================================================

#[test]
fn test_round_trip_merges_rowspan_variants() {
    let table = RawTable::new(
        headers(&["Toy #", "Color"]),
        vec![
            vec![Cell::spanning("GJT68", 2), Cell::new("Red")],
            vec![Cell::new(""), Cell::new("Blue")],
        ],
    );
    let rows: Vec<FlatRow> = extract(&table)
        .into_iter()
        .filter(|r| matches(r, "GJT68", &MatchMarkers::default()))
        .collect();
    assert_eq!(rows.len(), 2);

    let record = aggregate(&rows, &schema(&["Toy #", "Color"]), DEFAULT_CUTOFF).unwrap();
    let fields: Vec<(&str, &str)> = record.iter().collect();
    assert_eq!(fields, vec![("Toy #", "GJT68"), ("Color", "Blue; Red")]);
}

#[test]
fn test_round_trip_from_html() {
    let html = r#"<table>
        <tr><th>Toy #</th><th>Color</th></tr>
        <tr><td rowspan="2">GJT68</td><td>Red</td></tr>
        <tr><td>Blue</td></tr>
    </table>"#;
    let config = Config {
        schema: schema(&["Toy #", "Color"]),
        ..Config::default()
    };
    let record = reconcile_document(html, "GJT68", &config).unwrap().unwrap();
    assert_eq!(record.get("Toy #"), Some("GJT68"));
    assert_eq!(record.get("Color"), Some("Blue; Red"));
    assert_eq!(record.len(), 2);
}

#[test]
fn test_twin_mill_page() {
    let config = Config::default();
    let record = reconcile_document(TWIN_MILL_HTML, "GHD21", &config).unwrap().unwrap();

    // "GHD21" also over-matches the multipack's "GHD21-5"
    assert_eq!(record.get("Year"), Some("2020; 2022"));
    assert_eq!(record.get("Toy #"), Some("GHD21; GHD21-5"));
    assert_eq!(record.get("Col #"), Some("142/250"));
    assert_eq!(record.get("Series"), Some("HW Art Cars"));
    assert_eq!(record.get("Color"), Some("Blue; Green; Red"));
    assert_eq!(record.get("Base Color/Type"), Some("Black / Metal; Black / Plastic"));
    assert_eq!(record.get("Wheel Type"), Some("5SP; PR5"));
    assert_eq!(record.get("Country"), Some("Malaysia; Thailand"));
    assert_eq!(record.get("Tampo"), Some("Flames"));
    // Pack and Photo have no schema counterpart
    assert_eq!(record.len(), 9);
}

#[test]
fn test_collector_number_lookup() {
    let config = Config::default();
    let record = reconcile_document(TWIN_MILL_HTML, "55/250", &config).unwrap().unwrap();
    assert_eq!(record.get("Toy #"), Some("GRX99"));
    assert_eq!(record.get("Color"), Some("Gold"));
    assert_eq!(record.get("Series"), Some("HW Dream Garage"));
}

#[test]
fn test_unknown_identifier_is_no_data() {
    let config = Config::default();
    assert_eq!(reconcile_document(TWIN_MILL_HTML, "ZZZ00", &config).unwrap(), None);
}

#[test]
fn test_page_without_tables_is_no_data() {
    let config = Config::default();
    let html = "<html><body><p>There is currently no text in this page.</p></body></html>";
    assert_eq!(reconcile_document(html, "GHD21", &config).unwrap(), None);
}

// ============================================================================
// Table selection
// ============================================================================

#[test]
fn test_tables_without_markers_are_skipped() {
    let config = Config::default();
    let tables = parse_tables(TWIN_MILL_HTML, &config.table_selector).unwrap();
    assert_eq!(tables.len(), 4);

    let kept = qualifying_tables(tables, &config.table_markers);
    assert_eq!(kept.len(), 2);
    assert!(kept.iter().all(|t| t.headers.iter().any(|h| h == "Toy #")));

    // The gallery lists GHD21 too, but contributes nothing
    let rows = matching_rows(TWIN_MILL_HTML, "GHD21", &config).unwrap();
    assert!(rows.iter().all(|r| r.get("Caption").is_none()));
}

#[test]
fn test_table_selector_narrows_tables() {
    let config = Config {
        table_selector: "table.wikitable".into(),
        ..Config::default()
    };
    let tables = parse_tables(TWIN_MILL_HTML, &config.table_selector).unwrap();
    assert_eq!(tables.len(), 2);
}

#[test]
fn test_malformed_rowspan_does_not_propagate() {
    let html = r#"<table>
        <tr><th>Color</th><th>Toy #</th></tr>
        <tr><td>Red</td><td rowspan="lots">AB12</td></tr>
        <tr><td>Blue</td></tr>
    </table>"#;
    let config = Config::default();
    let rows = matching_rows(html, "AB12", &config).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("Color"), Some("Red"));
}

#[test]
fn test_header_only_table_yields_nothing() {
    let tables = parse_tables("<table><tr><th>Toy #</th><th>Color</th></tr></table>", "table").unwrap();
    assert_eq!(tables.len(), 1);
    assert!(extract(&tables[0]).is_empty());
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_rowspan_reaches_exactly_its_rows() {
    for span in 2..6 {
        let mut rows = vec![vec![Cell::new("c0"), Cell::spanning("V", span)]];
        for i in 1..8 {
            rows.push(vec![Cell::new(format!("c{}", i))]);
        }
        let table = RawTable::new(headers(&["Color", "Series"]), rows);
        let flat = extract(&table);
        for (i, row) in flat.iter().enumerate() {
            let expected = if i < span { Some("V") } else { None };
            assert_eq!(row.get("Series"), expected, "span {} row {}", span, i);
        }
    }
}

#[test]
fn test_explicit_cell_wins_over_span() {
    let table = RawTable::new(
        headers(&["Color", "Series"]),
        vec![
            vec![Cell::new("c0"), Cell::spanning("V", 5)],
            vec![Cell::new("c1")],
            vec![Cell::new("c2"), Cell::new("W")],
            vec![Cell::new("c3")],
        ],
    );
    let series: Vec<_> = extract(&table).iter().map(|r| r.get("Series").map(String::from)).collect();
    assert_eq!(
        series,
        vec![Some("V".into()), Some("V".into()), Some("W".into()), None]
    );
}

#[test]
fn test_canonicalize_idempotent_over_page_headers() {
    let schema = default_schema();
    let tables = parse_tables(TWIN_MILL_HTML, "table").unwrap();
    for header in tables.iter().flat_map(|t| t.headers.iter()) {
        let once = canonicalize(header, &schema, DEFAULT_CUTOFF);
        assert_eq!(canonicalize(&once, &schema, DEFAULT_CUTOFF), once, "header {:?}", header);
    }
}

#[test]
fn test_aggregate_order_independent_on_page_rows() {
    let config = Config::default();
    let rows = matching_rows(TWIN_MILL_HTML, "GHD21", &config).unwrap();
    assert!(rows.len() >= 3);
    let expected = aggregate(&rows, &config.schema, config.cutoff);

    for shift in 1..rows.len() {
        let mut rotated = rows.clone();
        rotated.rotate_left(shift);
        assert_eq!(aggregate(&rotated, &config.schema, config.cutoff), expected);
    }
    let mut reversed = rows.clone();
    reversed.reverse();
    assert_eq!(aggregate(&reversed, &config.schema, config.cutoff), expected);
}

#[test]
fn test_aggregate_empty_is_no_data() {
    assert_eq!(aggregate(&[], &default_schema(), DEFAULT_CUTOFF), None);
}

#[test]
fn test_prefix_identifier_over_matches() {
    let row: FlatRow = vec![("Toy #", "GJT68")].into_iter().collect();
    assert!(matches(&row, "GJT6", &MatchMarkers::default()));
}

#[test]
fn test_low_similarity_header_is_dropped() {
    let s = schema(&["Toy #", "Color"]);
    assert_eq!(canonicalize("Col#", &s, DEFAULT_CUTOFF), "Col#");

    let row: FlatRow = vec![("Toy #", "A1"), ("Col#", "9/250")].into_iter().collect();
    let record = aggregate(&[row], &s, DEFAULT_CUTOFF).unwrap();
    assert_eq!(record.iter().count(), 1);
    assert_eq!(record.get("Toy #"), Some("A1"));
}
