// Dataset schema
// Loaded from ~/.config/facetgrid/schema.toml (or an explicit --schema path)

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use facetgrid_engine::Schema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Defaults: the BLE module catalogue
// ---------------------------------------------------------------------------

const BLE_NUMERIC: [&str; 12] = [
    "Max Range (M)",
    "Max Length (mm)",
    "Mid Length (mm)",
    "Min Length (mm)",
    "Flash (KB)",
    "RAM (KB)",
    "Reception Sensitivity (dBm)",
    "Transmission Power (min, dBM)",
    "Transmission Power (max, dBM)",
    "Current (TX, mA)",
    "Current (RX, mA)",
    "GPIO",
];

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_group_fallback() -> String {
    facetgrid_engine::record::DEFAULT_GROUP_FALLBACK.to_string()
}

// ---------------------------------------------------------------------------
// SchemaConfig
// ---------------------------------------------------------------------------

/// Declarative schema for a CSV catalogue.
///
/// Fields listed here but absent from a particular CSV are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Separator inside multi-valued cells (exactly one character)
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// The two fields forming a record's identity
    pub identity: Vec<String>,
    /// Field used to cluster pinned records
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default = "default_group_fallback")]
    pub group_fallback: String,
    #[serde(default)]
    pub numeric: Vec<String>,
    #[serde(default)]
    pub multi_valued: Vec<String>,
    /// Filterable but not shown as facets
    #[serde(default)]
    pub hidden: Vec<String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            identity: vec!["Model No.".to_string(), "SoCset".to_string()],
            group: Some("Chipset Vendor".to_string()),
            group_fallback: default_group_fallback(),
            numeric: BLE_NUMERIC.iter().map(|s| s.to_string()).collect(),
            multi_valued: vec!["Certification".to_string()],
            hidden: Vec::new(),
        }
    }
}

impl SchemaConfig {
    /// Default schema file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("facetgrid")
            .join("schema.toml")
    }

    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: SchemaConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    /// Explicit path if given, else the default path if it exists, else the
    /// built-in schema. An explicit path that can't be read is an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = Self::config_path();
        if default_path.exists() {
            log::debug!("loading schema from {}", default_path.display());
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.delimiter.chars().count() != 1 {
            return Err(ConfigError::Validation(format!(
                "delimiter must be a single character, got {:?}",
                self.delimiter
            )));
        }

        if self.identity.len() != 2 {
            return Err(ConfigError::Validation(format!(
                "identity must name exactly 2 fields, got {}",
                self.identity.len()
            )));
        }
        if self.identity[0] == self.identity[1] {
            return Err(ConfigError::Validation(format!(
                "identity fields must differ, got '{}' twice",
                self.identity[0]
            )));
        }

        let numeric: HashSet<&str> = self.numeric.iter().map(String::as_str).collect();
        if let Some(both) = self.multi_valued.iter().find(|f| numeric.contains(f.as_str())) {
            return Err(ConfigError::Validation(format!(
                "field '{both}' cannot be both numeric and multi-valued"
            )));
        }

        Ok(())
    }

    pub fn delimiter_char(&self) -> char {
        self.delimiter.chars().next().unwrap_or(',')
    }

    /// Build the engine schema
    pub fn to_schema(&self) -> Schema {
        let mut schema = Schema::new(&self.identity[0], &self.identity[1])
            .with_delimiter(self.delimiter_char())
            .with_group_fallback(&self.group_fallback)
            .with_numeric(&self.numeric)
            .with_multi_valued(&self.multi_valued)
            .with_hidden(&self.hidden);
        if let Some(group) = &self.group {
            schema = schema.with_group(group);
        }
        schema
    }

    /// Same as `to_schema`, but a group field missing from `fields` is dropped
    /// (with a warning) instead of making the dataset invalid.
    pub fn to_schema_for<S: AsRef<str>>(&self, fields: &[S]) -> Schema {
        let has = |name: &str| fields.iter().any(|f| f.as_ref() == name);
        match &self.group {
            Some(group) if !has(group) => {
                log::warn!("group field '{group}' not in data; pinned records won't be grouped");
                let mut stripped = self.clone();
                stripped.group = None;
                stripped.to_schema()
            }
            _ => self.to_schema(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
