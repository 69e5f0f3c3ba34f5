//! YAML configuration stored at `$HOME/.roku-remote.yaml`
//!
//! ```yaml
//! roku:
//!   host: 192.168.1.20
//!   devices:
//!     - 192.168.1.20
//!     - 192.168.1.21
//! ```
//!
//! Keys are addressed with dots (`roku.host`). Keys this tool does not know
//! about are kept as-is when the file is written back.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = ".roku-remote.yaml";
pub const HOST_KEY: &str = "roku.host";
pub const DEVICES_KEY: &str = "roku.devices";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory; pass --config")]
    NoHomeDir,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file {path} is not valid YAML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("config key '{0}' conflicts with an existing non-mapping value")]
    KeyConflict(String),
}

/// Loaded configuration plus the path it is written back to.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    root: Mapping,
}

impl ConfigStore {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing file yields an empty store; it is created on first persist.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path,
            None => default_path()?,
        };

        let root = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Mapping::new(),
            Ok(text) => {
                let value: Value =
                    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                        path: path.clone(),
                        source,
                    })?;
                match value {
                    Value::Mapping(mapping) => mapping,
                    Value::Null => Mapping::new(),
                    _ => {
                        return Err(ConfigError::Parse {
                            path: path.clone(),
                            source: serde::de::Error::custom("top level must be a mapping"),
                        })
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config file at {}, starting empty", path.display());
                Mapping::new()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.clone(),
                    source,
                })
            }
        };

        Ok(Self { path, root })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value at a dotted key, e.g. `roku.host`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_mapping()?.get(segment)?;
        }
        Some(current)
    }

    /// Set a dotted key, creating intermediate mappings as needed.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        let segments: Vec<&str> = key.split('.').collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ConfigError::KeyConflict(key.to_string()))?;

        let mut current = &mut self.root;
        for segment in parents {
            let entry = current
                .entry(Value::from(*segment))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            if entry.is_null() {
                *entry = Value::Mapping(Mapping::new());
            }
            current = entry
                .as_mapping_mut()
                .ok_or_else(|| ConfigError::KeyConflict(key.to_string()))?;
        }
        current.insert(Value::from(*last), value.into());
        Ok(())
    }

    /// Write the whole document back to disk.
    pub fn persist(&self) -> Result<(), ConfigError> {
        let text = serde_yaml::to_string(&self.root)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, text).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("Wrote config to {}", self.path.display());
        Ok(())
    }

    /// Selected device address, if any.
    pub fn host(&self) -> Option<String> {
        match self.get(HOST_KEY)? {
            Value::String(host) if !host.trim().is_empty() => Some(host.trim().to_string()),
            _ => None,
        }
    }

    pub fn set_host(&mut self, host: &str) -> Result<(), ConfigError> {
        self.set(HOST_KEY, host)
    }

    /// Addresses remembered from the last discovery.
    pub fn devices(&self) -> Vec<String> {
        self.get(DEVICES_KEY)
            .and_then(Value::as_sequence)
            .map(|seq| {
                seq.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_devices(&mut self, devices: &[String]) -> Result<(), ConfigError> {
        let sequence: Vec<Value> = devices.iter().map(|d| Value::from(d.as_str())).collect();
        self.set(DEVICES_KEY, Value::Sequence(sequence))
    }
}

/// `$HOME/.roku-remote.yaml`
pub fn default_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::load(Some(dir.path().join(CONFIG_FILE_NAME))).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.host(), None);
        assert!(store.devices().is_empty());
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.set_host("192.168.1.20").unwrap();
        store
            .set_devices(&["192.168.1.20".to_string(), "192.168.1.21".to_string()])
            .unwrap();
        store.persist().unwrap();

        let reloaded = store_in(&dir);
        assert_eq!(reloaded.host().as_deref(), Some("192.168.1.20"));
        assert_eq!(reloaded.devices(), vec!["192.168.1.20", "192.168.1.21"]);

        let text = fs::read_to_string(reloaded.path()).unwrap();
        assert!(text.contains("roku:"));
        assert!(text.contains("host: 192.168.1.20"));
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "theme: dark\nroku:\n  host: 10.0.0.5\n  nickname: den\n",
        )
        .unwrap();

        let mut store = ConfigStore::load(Some(path.clone())).unwrap();
        store.set_host("10.0.0.6").unwrap();
        store.persist().unwrap();

        let reloaded = ConfigStore::load(Some(path)).unwrap();
        assert_eq!(reloaded.host().as_deref(), Some("10.0.0.6"));
        assert_eq!(reloaded.get("theme").and_then(Value::as_str), Some("dark"));
        assert_eq!(
            reloaded.get("roku.nickname").and_then(Value::as_str),
            Some("den")
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "roku: [unclosed").unwrap();
        assert!(matches!(
            ConfigStore::load(Some(path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_set_conflicts_with_scalar() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.set("roku", "not a mapping").unwrap();
        assert!(matches!(
            store.set(HOST_KEY, "10.0.0.5"),
            Err(ConfigError::KeyConflict(_))
        ));
    }

    #[test]
    fn test_blank_host_is_none() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store.set_host("  ").unwrap();
        assert_eq!(store.host(), None);
    }
}
