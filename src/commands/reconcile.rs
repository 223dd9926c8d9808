//! Batch reconciliation of an inventory file

use colored::Colorize;
use std::path::Path;
use std::time::Duration;

use diecast::audit::{CsvAuditLog, LookupStatus};
use diecast::catalog::{BatchRunner, Lookup, MemoryWriteBack};
use diecast::config::Config;
use diecast::error::Result;
use diecast::fetch::HttpSource;
use diecast::inventory::Inventory;

use crate::utils::{format_delay, truncate_str};

/// Look up every inventory row and merge catalog data back into the file
pub fn cmd_reconcile(
    config: &Config,
    inventory_path: &Path,
    log_path: &Path,
    dry_run: bool,
    limit: Option<usize>,
    delay: Option<u64>,
) -> Result<()> {
    let mut inventory = Inventory::load(inventory_path)?.with_protected_columns(&config.constant_columns);
    let mut queries = inventory.queries(&config.default_brand);
    if let Some(limit) = limit {
        queries.truncate(limit);
    }

    if queries.is_empty() {
        println!("No rows with both a Toy # and a Model Name in {}.", inventory_path.display());
        return Ok(());
    }

    let delay_ms = delay.unwrap_or(config.delay_ms);
    println!(
        "\n{} {} row(s) from {} ({} between lookups)\n",
        "Reconciling".cyan().bold(),
        queries.len(),
        inventory_path.display(),
        format_delay(delay_ms)
    );

    let source = HttpSource::from_config(config);
    let runner = BatchRunner::new(config, &source).with_delay(Duration::from_millis(delay_ms));
    let mut audit = CsvAuditLog::create(log_path)?;

    let summary = if dry_run {
        let mut preview = MemoryWriteBack::default();
        runner.run(&queries, &mut audit, &mut preview, print_lookup)?
    } else {
        let summary = runner.run(&queries, &mut audit, &mut inventory, print_lookup)?;
        if summary.updated > 0 {
            inventory.save()?;
        }
        summary
    };

    println!(
        "\n{} processed, {} updated, {} without data",
        summary.processed,
        summary.updated.to_string().green(),
        summary.no_data.to_string().yellow()
    );
    println!("Audit log: {}", log_path.display());
    if dry_run {
        println!("{}", "(dry-run mode - inventory not modified)".dimmed());
    } else if summary.updated > 0 {
        println!("Inventory saved: {}", inventory_path.display());
    }

    Ok(())
}

fn print_lookup(result: &Lookup) {
    let label = format!("Row {}", result.query.row);
    let name = format!("{} ({})", truncate_str(&result.query.model_name, 40), result.query.identifier);
    match (&result.status, &result.record) {
        (LookupStatus::Updated, Some(record)) => {
            println!("  {} {} {} - {} field(s)", "✓".green(), label.bold(), name, record.len());
        }
        _ => {
            println!(
                "  {} {} {} - {}",
                "·".yellow(),
                label.bold(),
                name,
                result.reason.as_deref().unwrap_or("no data").dimmed()
            );
        }
    }
}
