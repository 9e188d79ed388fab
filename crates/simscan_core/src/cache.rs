//! Disk-backed analysis cache.
//!
//! Large saves take real time to decompress and walk, and the UI surfaces
//! re-analyze the same file often. Results are keyed by the save's canonical
//! path and validated against its mtime and size, so a touched save is
//! re-read while an untouched one loads from JSON. Any structural change to
//! the analysis output must bump [`SCHEMA_VERSION`], which invalidates every
//! stored entry at once.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use crate::savegame::SaveAnalysis;

/// Bump when the serialized shape of [`SaveAnalysis`] changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    mtime: u64,
    size: u64,
    schema: u32,
    analysis: SaveAnalysis,
}

/// Cache of analysis results, optionally persisted to a JSON file.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, CacheEntry>,
}

impl AnalysisCache {
    /// A cache with no backing file; `persist` is a no-op.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load a cache from `path`. A missing or unreadable file starts empty,
    /// as does one whose JSON no longer deserializes.
    pub fn load(path: &Path) -> Self {
        let entries = fs::read(path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default();
        Self {
            path: Some(path.to_path_buf()),
            entries,
        }
    }

    /// Cached analysis for `save`, if the stored entry still matches the
    /// file's current mtime and size and was written by this schema.
    pub fn get(&self, save: &Path) -> Option<&SaveAnalysis> {
        let entry = self.entries.get(&cache_key(save))?;
        let (mtime, size) = file_stamp(save)?;
        if entry.schema != SCHEMA_VERSION || entry.mtime != mtime || entry.size != size {
            return None;
        }
        Some(&entry.analysis)
    }

    pub fn put(&mut self, save: &Path, analysis: SaveAnalysis) {
        // An unreadable stamp stores (0, 0), which no later stat will match.
        let (mtime, size) = file_stamp(save).unwrap_or((0, 0));
        self.entries.insert(
            cache_key(save),
            CacheEntry {
                mtime,
                size,
                schema: SCHEMA_VERSION,
                analysis,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the cache back to its backing file, if it has one.
    pub fn persist(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(&self.entries).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}

fn cache_key(save: &Path) -> String {
    save.canonicalize()
        .unwrap_or_else(|_| save.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

fn file_stamp(path: &Path) -> Option<(u64, u64)> {
    let meta = fs::metadata(path).ok()?;
    let mtime = meta
        .modified()
        .ok()?
        .duration_since(UNIX_EPOCH)
        .ok()?
        .as_secs();
    Some((mtime, meta.len()))
}
