use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::canonical::{CanonicalSchema, DEFAULT_CUTOFF};
use crate::error::{DiecastError, Result};
use crate::matcher::MatchMarkers;

/// Catalog fields pulled from wiki tables
pub const DEFAULT_SCHEMA: &[&str] = &[
    "Year", "Toy #", "Col #", "Series", "Series #", "Color",
    "Body Color", "Base Color/Type", "Country",
    "Wheel Type", "Tampo", "Notes/Variations",
];

/// Inventory columns owned by the user, never overwritten
pub const DEFAULT_CONSTANT_COLUMNS: &[&str] = &[
    "Box #", "Toy #", "Quantity", "Model Name", "Brand", "Origin", "Extra",
];

/// Global diecast configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Canonical field names for reconciled records
    #[serde(default = "default_schema")]
    pub schema: CanonicalSchema,

    /// Minimum header similarity for mapping onto a schema field
    #[serde(default = "default_cutoff")]
    pub cutoff: f32,

    /// A table is read only if its headers contain one of these
    #[serde(default = "default_table_markers")]
    pub table_markers: Vec<String>,

    /// CSS selector for candidate tables
    #[serde(default = "default_table_selector")]
    pub table_selector: String,

    /// Inventory columns never written back
    #[serde(default = "default_constant_columns")]
    pub constant_columns: Vec<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Pause between successive lookups in milliseconds
    #[serde(default = "default_delay")]
    pub delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Brand assumed for inventory rows without one
    #[serde(default = "default_brand")]
    pub default_brand: String,

    /// Wiki base URL for brands not listed in `sources`
    #[serde(default = "default_fallback_source")]
    pub fallback_source: String,

    /// Header substrings locating the identifier columns
    #[serde(default)]
    pub markers: MatchMarkers,

    /// Wiki base URL per brand (brand names compared case-insensitively)
    #[serde(default = "default_sources")]
    pub sources: BTreeMap<String, String>,
}

fn default_schema() -> CanonicalSchema {
    CanonicalSchema::new(DEFAULT_SCHEMA.iter().copied()).expect("Invalid default schema")
}

fn default_cutoff() -> f32 {
    DEFAULT_CUTOFF
}

fn default_table_markers() -> Vec<String> {
    vec!["Toy".to_string(), "Color".to_string()]
}

fn default_table_selector() -> String {
    "table".to_string()
}

fn default_constant_columns() -> Vec<String> {
    DEFAULT_CONSTANT_COLUMNS.iter().map(|s| s.to_string()).collect()
}

fn default_timeout() -> u64 {
    10
}

fn default_delay() -> u64 {
    1500
}

fn default_user_agent() -> String {
    concat!("diecast/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_brand() -> String {
    "Hot Wheels".to_string()
}

fn default_sources() -> BTreeMap<String, String> {
    BTreeMap::from([(
        "hot wheels".to_string(),
        "https://hotwheels.fandom.com/wiki/".to_string(),
    )])
}

fn default_fallback_source() -> String {
    "https://matchbox.fandom.com/wiki/".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            cutoff: default_cutoff(),
            table_markers: default_table_markers(),
            markers: MatchMarkers::default(),
            table_selector: default_table_selector(),
            constant_columns: default_constant_columns(),
            timeout_secs: default_timeout(),
            delay_ms: default_delay(),
            user_agent: default_user_agent(),
            default_brand: default_brand(),
            sources: default_sources(),
            fallback_source: default_fallback_source(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };
        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| DiecastError::ConfigError(e.to_string()))
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.cutoff) {
            return Err(DiecastError::ConfigError(format!(
                "cutoff must be between 0 and 1, got {}",
                self.cutoff
            )));
        }
        if self.table_markers.iter().all(|m| m.is_empty()) {
            return Err(DiecastError::ConfigError(
                "table_markers needs at least one non-empty marker".into(),
            ));
        }
        if self.markers.identifier.is_empty() && self.markers.catalog.is_empty() {
            return Err(DiecastError::ConfigError(
                "markers.identifier and markers.catalog cannot both be empty".into(),
            ));
        }
        if scraper::Selector::parse(&self.table_selector).is_err() {
            return Err(DiecastError::ConfigError(format!(
                "table_selector '{}' is not a valid CSS selector",
                self.table_selector
            )));
        }
        if self.timeout_secs == 0 {
            return Err(DiecastError::ConfigError("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Wiki base URL for a brand
    pub fn source_for(&self, brand: &str) -> &str {
        let brand = brand.trim().to_lowercase();
        self.sources
            .iter()
            .find(|(name, _)| name.to_lowercase() == brand)
            .map(|(_, url)| url.as_str())
            .unwrap_or(&self.fallback_source)
    }

    /// Get the config file path
    ///
    /// Supports DIECAST_CONFIG environment variable for test isolation
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("DIECAST_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "diecast")
            .ok_or_else(|| DiecastError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}
