use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::types::CallSite;

/// SHA-256 of a file's text
pub type ContentHash = [u8; 32];

pub fn content_hash(text: &str) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.finalize().into()
}

/// In-memory per-file scan results, keyed by path and content hash.
///
/// Lives only as long as the `Generator` holding it; nothing is written to
/// disk, so every fresh process starts with a full scan.
#[derive(Debug, Default)]
pub struct ScanCache {
    entries: HashMap<PathBuf, (ContentHash, Vec<CallSite>)>,
    hits: u64,
    misses: u64,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached sites for `path` if its content hash still matches
    pub fn get(&mut self, path: &Path, hash: &ContentHash) -> Option<&[CallSite]> {
        match self.entries.get(path) {
            Some((cached, sites)) if cached == hash => {
                self.hits += 1;
                Some(sites.as_slice())
            }
            _ => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, path: PathBuf, hash: ContentHash, sites: Vec<CallSite>) {
        self.entries.insert(path, (hash, sites));
    }

    /// Drop entries for files no longer part of the compilation
    pub fn retain_paths<'a, I>(&mut self, live: I)
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let live: Vec<&Path> = live.into_iter().collect();
        self.entries.retain(|path, _| live.contains(&path.as_path()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
