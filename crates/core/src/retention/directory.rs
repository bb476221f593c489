//! Media directory access.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use super::error::RetentionError;
use super::types::MediaFile;
use crate::config::Config;
use crate::seen::FileSeenStore;

/// Snapshot and deletion access to the media directory.
pub trait MediaDirectory: Send + Sync {
    /// Lists the current media files. Never cached between calls.
    fn scan(&self) -> Result<Vec<MediaFile>, RetentionError>;

    /// Deletes one file.
    fn remove(&self, file: &MediaFile) -> io::Result<()>;
}

/// The media directory on the local filesystem.
///
/// Scanning is non-recursive and skips hidden entries, directories,
/// symlinks and anything else that is not a regular file. Protected paths
/// are skipped whatever their name.
#[derive(Debug, Clone)]
pub struct FsMediaDirectory {
    root: PathBuf,
    hidden_prefix: String,
    protected: Vec<PathBuf>,
}

impl FsMediaDirectory {
    pub fn new(root: impl Into<PathBuf>, hidden_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            hidden_prefix: hidden_prefix.into(),
            protected: Vec::new(),
        }
    }

    /// The configured media directory, with the seen-set file and its
    /// temporary sibling protected from retention.
    pub fn from_config(config: &Config) -> Self {
        let store = FileSeenStore::new(config.state_path());
        Self::new(config.media.dir.clone(), config.media.hidden_prefix.clone())
            .protect(store.path())
            .protect(store.temp_path())
    }

    /// Never list `path` as a media file.
    pub fn protect(mut self, path: impl Into<PathBuf>) -> Self {
        self.protected.push(path.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_hidden(&self, name: &str) -> bool {
        !self.hidden_prefix.is_empty() && name.starts_with(&self.hidden_prefix)
    }

    /// Names of protected paths that live directly in the root.
    fn protected_names(&self) -> HashSet<OsString> {
        if self.protected.is_empty() {
            return HashSet::new();
        }
        let canonical_root = fs::canonicalize(&self.root).ok();

        self.protected
            .iter()
            .filter_map(|path| {
                let name = path.file_name()?;
                let parent = match path.parent() {
                    Some(p) if !p.as_os_str().is_empty() => p,
                    _ => Path::new("."),
                };
                let in_root = parent == self.root
                    || (canonical_root.is_some() && fs::canonicalize(parent).ok() == canonical_root);
                in_root.then(|| name.to_os_string())
            })
            .collect()
    }
}

#[cfg(unix)]
fn status_change_time(meta: &fs::Metadata) -> SystemTime {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let secs = meta.ctime();
    let nanos = meta.ctime_nsec().clamp(0, 999_999_999) as u32;
    if secs >= 0 {
        UNIX_EPOCH + Duration::new(secs as u64, nanos)
    } else {
        UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs())
    }
}

#[cfg(not(unix))]
fn status_change_time(meta: &fs::Metadata) -> SystemTime {
    meta.created()
        .or_else(|_| meta.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

fn media_file(path: PathBuf, name: String, meta: &fs::Metadata) -> io::Result<MediaFile> {
    let modified = meta.modified()?;
    Ok(MediaFile {
        path,
        name,
        size: meta.len(),
        accessed: meta.accessed().unwrap_or(modified),
        modified,
        changed: status_change_time(meta),
    })
}

impl MediaDirectory for FsMediaDirectory {
    fn scan(&self) -> Result<Vec<MediaFile>, RetentionError> {
        let scan_err = |source: io::Error| RetentionError::Scan {
            path: self.root.clone(),
            source,
        };

        let protected = self.protected_names();
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(scan_err)? {
            let entry = entry.map_err(scan_err)?;
            let file_name = entry.file_name();
            if protected.contains(&file_name) {
                continue;
            }
            let name = file_name.to_string_lossy().into_owned();
            if self.is_hidden(&name) {
                continue;
            }

            let path = entry.path();
            // Does not follow symlinks
            let meta = match fs::symlink_metadata(&path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "File vanished during scan");
                    continue;
                }
                Err(e) => return Err(scan_err(e)),
            };
            if !meta.file_type().is_file() {
                continue;
            }

            files.push(media_file(path, name, &meta).map_err(scan_err)?);
        }

        Ok(files)
    }

    fn remove(&self, file: &MediaFile) -> io::Result<()> {
        fs::remove_file(&file.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{File, FileTimes};
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, bytes: usize) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    #[test]
    fn test_scan_skips_hidden_and_non_regular() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "episode.opus", 10);
        write(dir.path(), ".stashcast.state", 5);
        fs::create_dir(dir.path().join("subdir")).unwrap();
        write(&dir.path().join("subdir"), "nested.opus", 7);
        #[cfg(unix)]
        std::os::unix::fs::symlink(dir.path().join("episode.opus"), dir.path().join("link.opus"))
            .unwrap();

        let media = FsMediaDirectory::new(dir.path(), ".");
        let files = media.scan().unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "episode.opus");
        assert_eq!(files[0].size, 10);
    }

    #[test]
    fn test_scan_reads_timestamps() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "old.m4a", 3);
        let past = UNIX_EPOCH + Duration::from_secs(1_000_000);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_times(FileTimes::new().set_accessed(past).set_modified(past))
            .unwrap();

        let files = FsMediaDirectory::new(dir.path(), ".").scan().unwrap();
        assert_eq!(files[0].modified, past);
        assert_eq!(files[0].earliest_time(), past);
        assert!(files[0].changed > past);
    }

    #[test]
    fn test_empty_prefix_hides_nothing() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".dotfile", 1);
        let files = FsMediaDirectory::new(dir.path(), "").scan().unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_seen_set_file_is_never_media() {
        for prefix in ["_", ""] {
            let dir = TempDir::new().unwrap();
            let mut config = Config::default().with_media_dir(dir.path());
            config.media.hidden_prefix = prefix.to_string();
            write(dir.path(), ".stashcast.state", 27);
            write(dir.path(), ".stashcast.state.tmp", 27);
            write(dir.path(), "episode.opus", 10);

            let files = FsMediaDirectory::from_config(&config).scan().unwrap();
            let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["episode.opus"], "hidden_prefix {:?}", prefix);
        }
    }

    #[test]
    fn test_protected_path_matches_through_relative_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("media")).unwrap();
        write(&dir.path().join("media"), "seen.txt", 5);
        write(&dir.path().join("media"), "a.opus", 5);

        // Same directory spelled two ways
        let media = FsMediaDirectory::new(dir.path().join("media/."), "")
            .protect(dir.path().join("media").join("seen.txt"));
        let files = media.scan().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.opus");
    }

    #[test]
    fn test_protected_path_elsewhere_does_not_hide_namesake() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        write(dir.path(), "seen.txt", 5);

        let media = FsMediaDirectory::new(dir.path(), "").protect(other.path().join("seen.txt"));
        assert_eq!(media.scan().unwrap().len(), 1);
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let media = FsMediaDirectory::new("/nonexistent/stashcast-media", ".");
        assert!(matches!(media.scan(), Err(RetentionError::Scan { .. })));
    }

    #[test]
    fn test_remove() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "gone.opus", 1);
        let media = FsMediaDirectory::new(dir.path(), ".");

        let files = media.scan().unwrap();
        media.remove(&files[0]).unwrap();
        assert!(media.scan().unwrap().is_empty());
        assert!(media.remove(&files[0]).is_err());
    }
}
