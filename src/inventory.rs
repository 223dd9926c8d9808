//! CSV-backed inventory sheet.
//!
//! The first line holds column names; every other line is one inventory row.
//! Row numbers follow spreadsheet convention, so the first data row is row 2.

use std::path::{Path, PathBuf};

use crate::catalog::{Query, WriteBack, WriteBackSink, IDENTIFIER_FIELD, MODEL_FIELD};
use crate::config::DEFAULT_CONSTANT_COLUMNS;
use crate::error::{DiecastError, Result};

/// Column holding the brand of a row
pub const BRAND_FIELD: &str = "Brand";

/// Sheet row number of the first data row
const FIRST_DATA_ROW: usize = 2;

#[derive(Debug, Clone)]
pub struct Inventory {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Columns that write-backs never touch
    protected: Vec<String>,
}

impl Inventory {
    /// Read an inventory file; rows may be shorter or longer than the header
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        for required in [IDENTIFIER_FIELD, MODEL_FIELD] {
            if !headers.iter().any(|h| h == required) {
                return Err(DiecastError::InventoryError(format!(
                    "{} has no '{}' column",
                    path.display(),
                    required
                )));
            }
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(String::from).collect());
        }

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
            protected: DEFAULT_CONSTANT_COLUMNS.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn with_protected_columns(mut self, columns: &[String]) -> Self {
        self.protected = columns.to_vec();
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value by sheet row number and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column(column)?;
        let idx = row.checked_sub(FIRST_DATA_ROW)?;
        self.rows.get(idx)?.get(col).map(String::as_str)
    }

    /// One query per row with both an identifier and a model name
    pub fn queries(&self, default_brand: &str) -> Vec<Query> {
        (0..self.rows.len())
            .map(|i| i + FIRST_DATA_ROW)
            .filter_map(|row| {
                let identifier = self.value(row, IDENTIFIER_FIELD).unwrap_or_default().trim();
                let model_name = self.value(row, MODEL_FIELD).unwrap_or_default().trim();
                if identifier.is_empty() || model_name.is_empty() {
                    return None;
                }
                let brand = self
                    .value(row, BRAND_FIELD)
                    .map(str::trim)
                    .filter(|b| !b.is_empty())
                    .unwrap_or(default_brand);
                Some(Query {
                    row,
                    identifier: identifier.to_string(),
                    model_name: model_name.to_string(),
                    brand: brand.to_string(),
                })
            })
            .collect()
    }

    /// Merge a write-back into a row by column name.
    ///
    /// Unknown fields get a new column at the end; protected columns are left
    /// alone. Returns the names of the columns that were added.
    pub fn apply(&mut self, row: usize, update: &WriteBack) -> Result<Vec<String>> {
        let idx = row
            .checked_sub(FIRST_DATA_ROW)
            .filter(|&i| i < self.rows.len())
            .ok_or_else(|| DiecastError::InventoryError(format!("No inventory row {}", row)))?;

        let mut added = Vec::new();
        for (field, value) in update.fields() {
            if self.protected.contains(&field) {
                continue;
            }
            let col = match self.column(&field) {
                Some(col) => col,
                None => {
                    self.headers.push(field.clone());
                    added.push(field);
                    self.headers.len() - 1
                }
            };
            let cells = &mut self.rows[idx];
            if cells.len() <= col {
                cells.resize(col + 1, String::new());
            }
            cells[col] = value;
        }

        if !added.is_empty() {
            tracing::info!(columns = ?added, "added inventory columns");
        }
        Ok(added)
    }

    /// Write the inventory back to the file it was loaded from
    pub fn save(&self) -> Result<()> {
        self.save_to(&self.path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            let mut padded = row.clone();
            if padded.len() < self.headers.len() {
                padded.resize(self.headers.len(), String::new());
            }
            writer.write_record(&padded)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl WriteBackSink for Inventory {
    fn write_back(&mut self, row: usize, update: &WriteBack) -> Result<()> {
        self.apply(row, update).map(|_| ())
    }
}
