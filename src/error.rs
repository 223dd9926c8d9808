use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiecastError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] ureq::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Extraction failed: {0}")]
    ExtractionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Inventory error: {0}")]
    InventoryError(String),
}

impl DiecastError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            DiecastError::HttpError(_) => Some(
                "Check your internet connection, or print the page URL with:\n  diecast url \"<model>\" --brand \"<brand>\""
            ),
            DiecastError::ConfigError(_) => Some(
                "Inspect the active configuration with `diecast config show`\nOr write a fresh one with `diecast config init`"
            ),
            DiecastError::TomlError(_) => Some(
                "Fix the syntax in the file reported by `diecast config path`"
            ),
            DiecastError::InventoryError(_) | DiecastError::CsvError(_) => Some(
                "The inventory must be a CSV file whose first row holds column names\nincluding \"Toy #\" and \"Model Name\""
            ),
            DiecastError::ExtractionError(_) => Some(
                "Try a different table selector in the config file, e.g. table_selector = \"table.wikitable\""
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DiecastError>;
