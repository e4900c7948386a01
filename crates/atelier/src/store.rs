//! Catalog persistence
//!
//! Schemas and workshop settings live behind the [`CatalogStore`] trait
//! and are handed to callers by injection. [`JsonFileStore`] is the
//! file-backed implementation: one JSON document per schema under a root
//! directory, plus a single settings file.

use atelier_core::Schema;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Workshop-wide settings: shared pricing parameters and the material
/// price catalog
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Settings {
    /// Named numeric parameters (margin, VAT rate, hourly rate, ...)
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
    /// Material name → unit price
    #[serde(default)]
    pub prices: BTreeMap<String, f64>,
}

/// Load/save contract for schemas and settings
pub trait CatalogStore {
    /// Load a named schema
    fn load_schema(&self, name: &str) -> StoreResult<Schema>;

    /// Save a named schema
    fn save_schema(&self, name: &str, schema: &Schema) -> StoreResult<()>;

    /// Load the workshop settings
    fn load_settings(&self) -> StoreResult<Settings>;

    /// Save the workshop settings
    fn save_settings(&self, settings: &Settings) -> StoreResult<()>;
}

/// File-backed catalog store.
///
/// Layout under the root directory:
/// - `schemas/<name>.json`
/// - `settings.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at the given directory. Nothing is written
    /// until the first save.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn schema_path(&self, name: &str) -> PathBuf {
        self.root.join("schemas").join(format!("{name}.json"))
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    fn read(path: &Path, what: &str) -> StoreResult<String> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(what.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write(path: &Path, json: String) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;
        Ok(())
    }
}

impl CatalogStore for JsonFileStore {
    fn load_schema(&self, name: &str) -> StoreResult<Schema> {
        let text = Self::read(&self.schema_path(name), name)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn save_schema(&self, name: &str, schema: &Schema) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(schema)?;
        Self::write(&self.schema_path(name), json)
    }

    fn load_settings(&self) -> StoreResult<Settings> {
        let text = Self::read(&self.settings_path(), "settings")?;
        Ok(serde_json::from_str(&text)?)
    }

    fn save_settings(&self, settings: &Settings) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(settings)?;
        Self::write(&self.settings_path(), json)
    }
}
