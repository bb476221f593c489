//! In-memory media directory for testing.

use std::collections::{BTreeMap, HashSet};
use std::io;
use std::sync::Mutex;
use std::time::SystemTime;

use crate::retention::{MediaDirectory, MediaFile, RetentionError};

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, MediaFile>,
    removed: Vec<String>,
    failing: HashSet<String>,
    fail_scans: bool,
}

/// A [`MediaDirectory`] backed by a map of synthetic files.
#[derive(Debug, Default)]
pub struct MemoryMediaDirectory {
    state: Mutex<State>,
}

impl MemoryMediaDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file whose three timestamps are all `time`.
    pub fn add(&self, name: &str, size: u64, time: SystemTime) {
        self.insert(MediaFile::new(format!("/media/{}", name), size, time));
    }

    /// Add a fully specified file.
    pub fn insert(&self, file: MediaFile) {
        self.lock().files.insert(file.name.clone(), file);
    }

    /// Names of the files still present, sorted.
    pub fn names(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    /// Names removed so far, in removal order.
    pub fn removed(&self) -> Vec<String> {
        self.lock().removed.clone()
    }

    /// Make removal of `name` fail with permission denied.
    pub fn fail_removal(&self, name: &str) {
        self.lock().failing.insert(name.to_string());
    }

    pub fn fail_scans(&self, fail: bool) {
        self.lock().fail_scans = fail;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl MediaDirectory for MemoryMediaDirectory {
    fn scan(&self) -> Result<Vec<MediaFile>, RetentionError> {
        let state = self.lock();
        if state.fail_scans {
            return Err(RetentionError::Scan {
                path: "/media".into(),
                source: io::Error::other("injected failure"),
            });
        }
        Ok(state.files.values().cloned().collect())
    }

    fn remove(&self, file: &MediaFile) -> io::Result<()> {
        let mut state = self.lock();
        if state.failing.contains(&file.name) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        if state.files.remove(&file.name).is_none() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such file"));
        }
        state.removed.push(file.name.clone());
        Ok(())
    }
}
