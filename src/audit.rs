use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Column names of the audit log file
pub const AUDIT_HEADER: [&str; 5] = ["Row", "Model Name", "Toy #", "Status", "Wiki URL"];

/// Per-identifier outcome of a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LookupStatus {
    Updated,
    #[serde(rename = "No Data")]
    NoData,
}

impl fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStatus::Updated => write!(f, "Updated"),
            LookupStatus::NoData => write!(f, "No Data"),
        }
    }
}

/// One line of the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    /// Inventory row the identifier came from
    pub row: usize,
    pub model_name: String,
    pub identifier: String,
    pub status: LookupStatus,
    /// Page that was consulted, also when it could not be fetched
    pub url: String,
}

/// Receives one audit record per processed identifier
pub trait AuditSink {
    fn record(&mut self, entry: &AuditRecord) -> Result<()>;
}

/// Audit log written to a CSV file, one flushed line per record
pub struct CsvAuditLog {
    writer: csv::Writer<File>,
}

impl CsvAuditLog {
    /// Create (or truncate) the log file and write its header
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(AUDIT_HEADER)?;
        writer.flush()?;
        Ok(Self { writer })
    }
}

impl AuditSink for CsvAuditLog {
    fn record(&mut self, entry: &AuditRecord) -> Result<()> {
        self.writer.write_record([
            entry.row.to_string(),
            entry.model_name.clone(),
            entry.identifier.clone(),
            entry.status.to_string(),
            entry.url.clone(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps audit records in memory
#[derive(Debug, Default)]
pub struct MemoryAudit {
    pub records: Vec<AuditRecord>,
}

impl AuditSink for MemoryAudit {
    fn record(&mut self, entry: &AuditRecord) -> Result<()> {
        self.records.push(entry.clone());
        Ok(())
    }
}
