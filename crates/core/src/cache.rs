use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::error::Result;

pub const DEFAULT_CACHE_PATH: &str = "./cache/anki-audio-dl-cache/index.json";

/// Query text -> filenames already retrieved for it. Keys are the raw query
/// strings; a present key means the query is done, whatever is on disk.
#[derive(Debug, Default)]
pub struct CacheIndex {
    path: Option<PathBuf>,
    entries: IndexMap<String, Vec<String>>,
    dirty: bool,
}

impl CacheIndex {
    /// Reads the index at `path`. A missing or unreadable file starts an
    /// empty index that will be written back to `path` on the next flush.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = if path.exists() {
            match read_entries(&path) {
                Ok(entries) => {
                    debug!(path = %path.display(), keys = entries.len(), "loaded cache index");
                    entries
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "ignoring unreadable cache index");
                    IndexMap::new()
                }
            }
        } else {
            IndexMap::new()
        };
        Self {
            path: Some(path),
            entries,
            dirty: false,
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn put(&mut self, key: impl Into<String>, filenames: Vec<String>) {
        self.entries.insert(key.into(), filenames);
        self.dirty = true;
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        let removed = self.entries.shift_remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the whole index out if anything changed since the last flush.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = BufWriter::new(File::create(path)?);
            serde_json::to_writer(&mut file, &self.entries)?;
            file.flush()?;
            info!(path = %path.display(), keys = self.entries.len(), "wrote cache index");
        }
        self.dirty = false;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<IndexMap<String, Vec<String>>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
