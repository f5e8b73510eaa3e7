use std::collections::HashMap;
use std::sync::RwLock;

use crate::hash::Md5Digest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub password: String,
    pub scheme_name: String,
}

/// Process-wide table of cracked hashes.
///
/// Append-only: the first password stored for a hash wins and is never
/// replaced. Lives for the lifetime of the master process; no eviction.
#[derive(Debug, Default)]
pub struct CrackedCache {
    entries: RwLock<HashMap<Md5Digest, CachedEntry>>,
}

impl CrackedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hash: &Md5Digest) -> Option<CachedEntry> {
        self.entries
            .read()
            .expect("cache lock poisoned")
            .get(hash)
            .cloned()
    }

    pub fn put(&self, hash: Md5Digest, password: String, scheme_name: String) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.entry(hash).or_insert_with(|| {
            tracing::info!(hash = %hash, "Caching cracked password");
            CachedEntry {
                password,
                scheme_name,
            }
        });
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
