//! Lookup pipeline: page -> tables -> flat rows -> matching rows -> record.
//!
//! Every stage below the page fetch is pure; a lookup never fails, it ends in
//! either an updated record or "no data" with the page URL kept for auditing.

use std::time::Duration;

use serde::Serialize;

use crate::aggregate::{aggregate, ReconciledRecord};
use crate::audit::{AuditRecord, AuditSink, LookupStatus};
use crate::config::Config;
use crate::error::Result;
use crate::extract::{extract, FlatRow};
use crate::fetch::{resolve, PageOutcome, PageSource};
use crate::matcher::matches;
use crate::table::{parse_tables, qualifying_tables};

/// Write-back column carrying the identifier
pub const IDENTIFIER_FIELD: &str = "Toy #";
/// Write-back column carrying the model name
pub const MODEL_FIELD: &str = "Model Name";

/// One identifier to look up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// Inventory row number, reported in the audit log
    pub row: usize,
    pub identifier: String,
    pub model_name: String,
    pub brand: String,
}

/// Every row of every qualifying table in `html` that belongs to `identifier`
pub fn matching_rows(html: &str, identifier: &str, config: &Config) -> Result<Vec<FlatRow>> {
    let tables = qualifying_tables(parse_tables(html, &config.table_selector)?, &config.table_markers);
    tracing::debug!(tables = tables.len(), "qualifying tables");

    let mut rows = Vec::new();
    for table in &tables {
        tracing::debug!(headers = ?table.headers, "reading version table");
        rows.extend(
            extract(table)
                .into_iter()
                .filter(|row| matches(row, identifier, &config.markers)),
        );
    }

    tracing::debug!(identifier, matched = rows.len(), "matched rows");
    Ok(rows)
}

/// Reconcile all rows in `html` belonging to `identifier` into one record.
///
/// `None` means no row matched (or no table qualified).
pub fn reconcile_document(html: &str, identifier: &str, config: &Config) -> Result<Option<ReconciledRecord>> {
    let rows = matching_rows(html, identifier, config)?;
    Ok(aggregate(&rows, &config.schema, config.cutoff))
}

/// Outcome of looking up one identifier
#[derive(Debug, Clone, Serialize)]
pub struct Lookup {
    pub query: Query,
    pub url: String,
    pub status: LookupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ReconciledRecord>,
    /// Why no data was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Lookup {
    fn no_data(query: Query, url: String, reason: impl Into<String>) -> Self {
        Self {
            query,
            url,
            status: LookupStatus::NoData,
            record: None,
            reason: Some(reason.into()),
        }
    }

    pub fn audit_record(&self) -> AuditRecord {
        AuditRecord {
            row: self.query.row,
            model_name: self.query.model_name.clone(),
            identifier: self.query.identifier.clone(),
            status: self.status,
            url: self.url.clone(),
        }
    }

    /// Record to merge into the inventory, if the lookup produced one
    pub fn write_back(&self) -> Option<WriteBack> {
        let record = self.record.as_ref().filter(|_| self.status == LookupStatus::Updated)?;
        Some(WriteBack {
            identifier: self.query.identifier.clone(),
            model_name: self.query.model_name.clone(),
            record: record.clone(),
        })
    }
}

/// Look up one identifier end to end. Never fails.
pub fn lookup(query: &Query, config: &Config, source: &dyn PageSource) -> Lookup {
    let (url, html) = match resolve(&query.model_name, &query.brand, config, source) {
        PageOutcome::Fetched { url, html } => (url, html),
        PageOutcome::Unavailable { url, reason } => {
            return Lookup::no_data(query.clone(), url, format!("page unavailable: {}", reason));
        }
    };

    lookup_document(query, url, &html, config)
}

/// Reconcile an already fetched page for `query`
pub fn lookup_document(query: &Query, url: String, html: &str, config: &Config) -> Lookup {
    match reconcile_document(html, &query.identifier, config) {
        Ok(Some(record)) if !record.is_empty() => Lookup {
            query: query.clone(),
            url,
            status: LookupStatus::Updated,
            record: Some(record),
            reason: None,
        },
        Ok(Some(_)) => Lookup::no_data(query.clone(), url, "matched rows carry no catalog fields"),
        Ok(None) => Lookup::no_data(
            query.clone(),
            url,
            format!("no match for {}", query.identifier),
        ),
        Err(e) => Lookup::no_data(query.clone(), url, e.to_string()),
    }
}

/// Reconciled record plus the identifying columns, merged into the
/// inventory by column name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteBack {
    pub identifier: String,
    pub model_name: String,
    pub record: ReconciledRecord,
}

impl WriteBack {
    /// Column name -> value pairs; the identifier replaces any merged
    /// identifier field from the record
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = self
            .record
            .iter()
            .filter(|(k, _)| *k != IDENTIFIER_FIELD && *k != MODEL_FIELD)
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        fields.push((IDENTIFIER_FIELD.to_string(), self.identifier.clone()));
        fields.push((MODEL_FIELD.to_string(), self.model_name.clone()));
        fields
    }
}

/// Receives reconciled records for the inventory row they belong to
pub trait WriteBackSink {
    fn write_back(&mut self, row: usize, update: &WriteBack) -> Result<()>;
}

/// Collects write-backs without applying them (dry runs, tests)
#[derive(Debug, Default)]
pub struct MemoryWriteBack {
    pub entries: Vec<(usize, WriteBack)>,
}

impl WriteBackSink for MemoryWriteBack {
    fn write_back(&mut self, row: usize, update: &WriteBack) -> Result<()> {
        self.entries.push((row, update.clone()));
        Ok(())
    }
}

/// Totals for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub updated: usize,
    pub no_data: usize,
}

/// Runs lookups one after another with a fixed pause between them
pub struct BatchRunner<'a> {
    config: &'a Config,
    source: &'a dyn PageSource,
    delay: Duration,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: &'a Config, source: &'a dyn PageSource) -> Self {
        Self {
            config,
            source,
            delay: Duration::from_millis(config.delay_ms),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Look up every query in order.
    ///
    /// Each lookup is audited and, when updated, written back before the
    /// next one starts. A lookup without data never stops the batch; a
    /// failing audit or write-back sink does.
    pub fn run(
        &self,
        queries: &[Query],
        audit: &mut dyn AuditSink,
        sink: &mut dyn WriteBackSink,
        mut on_lookup: impl FnMut(&Lookup),
    ) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();

        for (i, query) in queries.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }

            tracing::info!(row = query.row, model = %query.model_name, identifier = %query.identifier, "looking up");
            let result = lookup(query, self.config, self.source);

            if let Some(update) = result.write_back() {
                sink.write_back(query.row, &update)?;
            }
            audit.record(&result.audit_record())?;

            summary.processed += 1;
            match result.status {
                LookupStatus::Updated => summary.updated += 1,
                LookupStatus::NoData => summary.no_data += 1,
            }
            on_lookup(&result);
        }

        Ok(summary)
    }
}
