//! Directory-Tree Store
//!
//! The store path is a directory; each entry is a file named after it whose
//! contents are the value text, with no trailing newline. A write goes to a
//! hidden temp file first and is renamed over the entry, so a poller either
//! sees the old value or the new one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use telebridge_core::KeyValueSink;

use crate::ConnectorError;

/// Sink writing one file per entry
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    location: String,
}

impl FileStore {
    /// Open the store, creating the directory tree if needed
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ConnectorError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        Ok(Self {
            location: root.display().to_string(),
            root,
        })
    }

    /// Directory holding the entries
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current value of an entry, if present
    pub fn read_string(&self, name: &str) -> Result<Option<String>, ConnectorError> {
        check_entry_name(name)?;
        match fs::read_to_string(self.root.join(name)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueSink for FileStore {
    type Error = ConnectorError;

    fn write_string(&mut self, name: &str, value: &str) -> Result<(), Self::Error> {
        check_entry_name(name)?;
        // Someone may have removed the directory while we were running
        fs::create_dir_all(&self.root)?;

        let target = self.root.join(name);
        let staging = self.root.join(format!(".{}.tmp", name));

        let mut file = fs::File::create(&staging)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&staging, &target)?;
        Ok(())
    }

    fn location(&self) -> &str {
        &self.location
    }
}

fn check_entry_name(name: &str) -> Result<(), ConnectorError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(|c| c == '/' || c == '\\' || c == '\0');

    if valid {
        Ok(())
    } else {
        Err(ConnectorError::Config(format!("invalid entry name '{}'", name)))
    }
}
