//! Seen-set storage.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::SeenError;

/// A set of item identifiers.
pub type SeenSet = HashSet<String>;

/// Persistent storage for the seen-set.
///
/// Only one process uses a store at a time; implementations take no locks.
pub trait SeenStore: Send + Sync {
    /// Load the persisted set. A store that was never written yields an empty set.
    fn load(&self) -> Result<SeenSet, SeenError>;

    /// Replace the persisted set.
    fn save(&self, ids: &SeenSet) -> Result<(), SeenError>;
}

/// Seen-set stored as a text file, one identifier per line.
#[derive(Debug, Clone)]
pub struct FileSeenStore {
    path: PathBuf,
}

impl FileSeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling written before the atomic rename onto [`path`](Self::path).
    pub fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn write_err(&self, source: std::io::Error) -> SeenError {
        SeenError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl SeenStore for FileSeenStore {
    fn load(&self) -> Result<SeenSet, SeenError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No seen-set yet, starting empty");
                return Ok(SeenSet::new());
            }
            Err(source) => {
                return Err(SeenError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn save(&self, ids: &SeenSet) -> Result<(), SeenError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
            }
        }

        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();

        // Write a sibling file and rename it over the old one
        let temp_path = self.temp_path();
        let file = File::create(&temp_path).map_err(|e| self.write_err(e))?;
        let mut writer = BufWriter::new(file);
        for id in sorted {
            writeln!(writer, "{}", id).map_err(|e| self.write_err(e))?;
        }
        let file = writer
            .into_inner()
            .map_err(|e| self.write_err(e.into_error()))?;
        file.sync_all().map_err(|e| self.write_err(e))?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            self.write_err(e)
        })?;

        debug!(path = %self.path.display(), count = ids.len(), "Saved seen-set");
        Ok(())
    }
}
