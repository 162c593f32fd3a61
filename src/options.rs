//! Host option storage
//!
//! This module provides:
//! - The OptionStore capability the adapter reads tokens from
//! - An in-memory store
//! - A TOML file store, one file per site

use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Key/value option storage scoped to one site.
///
/// An empty value stands for an option that exists but is unset.
pub trait OptionStore: Send + Sync {
    /// Read an option
    fn get(&self, key: &str) -> Option<String>;

    /// Write an option
    fn set(&self, key: &str, value: &str) -> Result<(), ConfigError>;

    /// Whether the option exists, even with an empty value
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Read an option, treating empty values as absent
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|value| !value.is_empty())
    }
}

/// Option store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryOptionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with options
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: Mutex::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl OptionStore for MemoryOptionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Option store persisted as a flat TOML table
#[derive(Debug)]
pub struct FileOptionStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileOptionStore {
    /// Open a store; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let values = if path.exists() {
            let content =
                std::fs::read_to_string(&path).map_err(|e| ConfigError::read(&path, e))?;
            toml::from_str(&content).map_err(|e| ConfigError::parse(&path, e.to_string()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), ConfigError> {
        let content =
            toml::to_string(values).map_err(|e| ConfigError::parse(&self.path, e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| ConfigError::write(&self.path, e))
    }
}

impl OptionStore for FileOptionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut values = self
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }
}
