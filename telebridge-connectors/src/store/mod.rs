//! Key-Value Stores
//!
//! Both stores share the same contract: opening creates the location, every
//! write recreates it if it has gone missing, and values are plain strings.
//!
//! | Kind | Location | Entry |
//! |------|----------|-------|
//! | `registry` | key under `HKEY_CURRENT_USER` | `REG_SZ` value |
//! | `file` | directory | file holding the value text |

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use telebridge_core::KeyValueSink;

use crate::ConnectorError;

pub mod file;

#[cfg(windows)]
pub mod registry;

pub use file::FileStore;

#[cfg(windows)]
pub use registry::RegistryStore;

/// Registry key used when no store path is configured
pub const DEFAULT_REGISTRY_PATH: &str = r"Software\HWiNFO64\Sensors\Custom\PC Water Sensor\Temp0";

/// Directory used by the file store when no store path is configured
pub const DEFAULT_FILE_PATH: &str = "sensors/temp0";

/// Type-erased store handle used by the binary
pub type DynStore = Box<dyn KeyValueSink<Error = ConnectorError> + Send>;

/// Store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Windows registry
    Registry,
    /// Directory tree
    File,
}

impl StoreKind {
    /// Registry on Windows, file tree elsewhere
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            StoreKind::Registry
        } else {
            StoreKind::File
        }
    }

    /// Location used when none is configured
    pub fn default_path(&self) -> &'static str {
        match self {
            StoreKind::Registry => DEFAULT_REGISTRY_PATH,
            StoreKind::File => DEFAULT_FILE_PATH,
        }
    }
}

impl Default for StoreKind {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Registry => f.write_str("registry"),
            StoreKind::File => f.write_str("file"),
        }
    }
}

impl FromStr for StoreKind {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "registry" | "reg" => Ok(StoreKind::Registry),
            "file" | "fs" => Ok(StoreKind::File),
            other => Err(ConnectorError::Config(format!("unknown store '{}'", other))),
        }
    }
}

/// Open (creating if needed) a store of the given kind
pub fn open_store(kind: StoreKind, path: impl AsRef<Path>) -> Result<DynStore, ConnectorError> {
    match kind {
        StoreKind::File => Ok(Box::new(FileStore::open(path)?)),
        #[cfg(windows)]
        StoreKind::Registry => {
            let key = path.as_ref().to_string_lossy();
            Ok(Box::new(RegistryStore::open(&key)?))
        }
        #[cfg(not(windows))]
        StoreKind::Registry => {
            let _ = path;
            Err(ConnectorError::Config(
                "the registry store is only available on Windows".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_store_kind() {
        assert_eq!("file".parse::<StoreKind>().unwrap(), StoreKind::File);
        assert_eq!("Registry".parse::<StoreKind>().unwrap(), StoreKind::Registry);
        assert!("sqlite".parse::<StoreKind>().is_err());
    }

    #[test]
    fn test_default_paths() {
        assert!(StoreKind::Registry.default_path().starts_with("Software"));
        assert_eq!(StoreKind::File.default_path(), DEFAULT_FILE_PATH);
    }

    #[test]
    fn test_open_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(StoreKind::File, dir.path().join("a/b")).unwrap();
        store.write_string("Value", "12.5").unwrap();
        assert!(dir.path().join("a/b/Value").is_file());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_registry_unavailable() {
        let result = open_store(StoreKind::Registry, DEFAULT_REGISTRY_PATH);
        assert!(matches!(result, Err(ConnectorError::Config(_))));
    }
}
