use md5::{Digest, Md5};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::Builder;

const ENTRY_EXTENSION: &str = "cache";
const TEMP_PREFIX: &str = ".tmp-";

/// Temp files untouched for this long are leftovers from an interrupted write
const STALE_TEMP_AGE: Duration = Duration::from_secs(10 * 60);

/// File-per-entry disk cache for raw response bodies.
///
/// Entries live at `<root>/<md5 hex of key>.cache` and hold the body exactly
/// as received. Writes go through a temp file in the same directory and are
/// renamed into place, so a reader sees either the whole value or no entry.
/// Every failure is logged and degrades to a miss or a no-op.
#[derive(Debug, Clone)]
pub struct DiskCache {
    root: PathBuf,
}

/// Derive the cache key for a full request URL
pub fn cache_key(url: &str) -> String {
    hex::encode(Md5::digest(url.as_bytes()))
}

/// Whether a file name follows the cache's own naming convention
fn is_entry_name(name: &str) -> bool {
    match name.strip_suffix(".cache") {
        Some(stem) => {
            stem.len() == 32
                && stem
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        }
        None => false,
    }
}

/// A temp file last modified long enough ago that no write can still own it
fn is_stale_temp(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age >= STALE_TEMP_AGE)
}

impl DiskCache {
    /// Create a cache rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the entry file for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}", cache_key(key), ENTRY_EXTENSION))
    }

    /// Look up `key`, returning `None` on a miss or an unreadable entry
    pub fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => {
                    ::log::debug!("Cache hit for {}", key);
                    Some(text)
                }
                Err(e) => {
                    ::log::warn!("Discarding corrupt cache entry {}: {}", path.display(), e);
                    self.discard(&path);
                    None
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                ::log::debug!("Cache miss for {}", key);
                None
            }
            Err(e) => {
                ::log::warn!("Cache read error for {}: {}", path.display(), e);
                self.discard(&path);
                None
            }
        }
    }

    /// Store `value` under `key`. Returns `false` if the write failed.
    pub fn put(&self, key: &str, value: &str) -> bool {
        match self.write_entry(key, value) {
            Ok(()) => true,
            Err(e) => {
                ::log::warn!("Cache write error for {}: {}", key, e);
                false
            }
        }
    }

    fn write_entry(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let mut tmp = Builder::new().prefix(TEMP_PREFIX).tempfile_in(&self.root)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }

    /// Delete the entry for `key`. Returns `true` if an entry was removed.
    pub fn remove(&self, key: &str) -> bool {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                ::log::warn!("Cache remove error for {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Delete every cache-managed entry, plus temp files abandoned by interrupted
    /// writes. Other files in the directory are left alone.
    pub fn clear(&self) {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return,
            Err(e) => {
                ::log::warn!("Error clearing cache directory {}: {}", self.root.display(), e);
                return;
            }
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let managed =
                is_entry_name(name) || (name.starts_with(TEMP_PREFIX) && is_stale_temp(&path));
            if !managed || !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => ::log::warn!("Error deleting cache file {}: {}", path.display(), e),
            }
        }
        ::log::info!("Cleared {} cache entries from {}", removed, self.root.display());
    }

    fn discard(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != io::ErrorKind::NotFound {
                ::log::debug!("Could not delete cache entry {}: {}", path.display(), e);
            }
        }
    }
}
