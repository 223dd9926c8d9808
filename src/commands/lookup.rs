//! Single-identifier commands: lookup, parse, url

use colored::Colorize;
use std::path::Path;

use diecast::catalog::{self, Lookup, Query};
use diecast::audit::LookupStatus;
use diecast::config::Config;
use diecast::error::Result;
use diecast::extract::FlatRow;
use diecast::fetch::{self, HttpSource, PageOutcome};

use crate::utils::{read_input, truncate_str};

/// Fetch a model's wiki page and reconcile one identifier
pub fn cmd_lookup(
    config: &Config,
    identifier: &str,
    model: &str,
    brand: Option<String>,
    json: bool,
    show_rows: bool,
) -> Result<()> {
    let query = Query {
        row: 0,
        identifier: identifier.to_string(),
        model_name: model.to_string(),
        brand: brand.unwrap_or_else(|| config.default_brand.clone()),
    };
    let source = HttpSource::from_config(config);

    if !json {
        println!("\n{} {}", "Fetching".cyan().bold(), fetch::build_page_url(model, config.source_for(&query.brand)));
    }

    match fetch::resolve(&query.model_name, &query.brand, config, &source) {
        PageOutcome::Fetched { url, html } => {
            let rows = if show_rows {
                catalog::matching_rows(&html, identifier, config)?
            } else {
                Vec::new()
            };
            let result = catalog::lookup_document(&query, url, &html, config);
            report(&result, &rows, json)
        }
        PageOutcome::Unavailable { url, reason } => {
            let result = Lookup {
                query,
                url,
                status: LookupStatus::NoData,
                record: None,
                reason: Some(format!("page unavailable: {}", reason)),
            };
            report(&result, &[], json)
        }
    }
}

/// Reconcile an identifier against a saved HTML page
pub fn cmd_parse(config: &Config, file: &Path, identifier: &str, json: bool, show_rows: bool) -> Result<()> {
    let html = read_input(file)?;
    let query = Query {
        row: 0,
        identifier: identifier.to_string(),
        model_name: String::new(),
        brand: config.default_brand.clone(),
    };

    let rows = if show_rows {
        catalog::matching_rows(&html, identifier, config)?
    } else {
        Vec::new()
    };
    let result = catalog::lookup_document(&query, file.display().to_string(), &html, config);
    report(&result, &rows, json)
}

/// Print the URL a model resolves to
pub fn cmd_url(config: &Config, model: &str, brand: Option<String>) -> Result<()> {
    let brand = brand.unwrap_or_else(|| config.default_brand.clone());
    println!("{}", fetch::build_page_url(model, config.source_for(&brand)));
    Ok(())
}

fn report(result: &Lookup, rows: &[FlatRow], json: bool) -> Result<()> {
    if json {
        let mut output = serde_json::to_value(result)?;
        if !rows.is_empty() {
            output["rows"] = serde_json::to_value(rows)?;
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if !rows.is_empty() {
        println!("\n  {} matched row(s):", rows.len());
        for (i, row) in rows.iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .filter(|(_, v)| !v.is_empty())
                .map(|(k, v)| format!("{}={}", k, truncate_str(v, 30)))
                .collect();
            println!("  {} {}", format!("[{}]", i + 1).dimmed(), cells.join(", "));
        }
    }

    match (&result.status, &result.record) {
        (LookupStatus::Updated, Some(record)) => {
            println!("\n  {} {}\n", "✓".green(), result.query.identifier.bold());
            let width = record.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
            for (field, value) in record.iter() {
                println!("  {}  {}", format!("{:width$}", field, width = width).cyan(), value);
            }
            println!();
        }
        _ => {
            println!(
                "\n  {} {}: {}",
                "No Data".yellow(),
                result.query.identifier,
                result.reason.as_deref().unwrap_or("nothing found")
            );
            println!("  {}\n", result.url.dimmed());
        }
    }

    Ok(())
}
