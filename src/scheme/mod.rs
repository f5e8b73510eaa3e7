//! Password schemes: named, finite, indexable candidate spaces.
//!
//! A scheme maps an index `i` in `[0, size())` to a candidate password
//! string. Schemes are pure functions of the index (no I/O, no state), so a
//! single instance is shared freely across worker threads.

pub mod phone;

use std::collections::HashMap;
use std::sync::Arc;

pub use phone::Phone05xScheme;

use crate::error::Result;

/// Scheme assigned to jobs in the reference deployment.
pub const DEFAULT_SCHEME: &str = "phone-05x";

pub trait PasswordScheme: Send + Sync {
    /// Registry key for this scheme.
    fn name(&self) -> &'static str;

    /// Number of candidates; valid indices are `0..size()`.
    fn size(&self) -> u64;

    /// Candidate at `index`. Fails with `InvalidIndex` when out of range.
    fn at(&self, index: u64) -> Result<String>;
}

/// Startup table of known schemes, keyed by name.
pub struct SchemeRegistry {
    schemes: HashMap<&'static str, Arc<dyn PasswordScheme>>,
}

impl SchemeRegistry {
    /// Registry holding every built-in scheme.
    pub fn builtin() -> Self {
        let mut registry = Self {
            schemes: HashMap::new(),
        };
        registry.register(Arc::new(Phone05xScheme));
        registry
    }

    pub fn register(&mut self, scheme: Arc<dyn PasswordScheme>) {
        self.schemes.insert(scheme.name(), scheme);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PasswordScheme>> {
        self.schemes.get(name).cloned()
    }
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
