//! Local key-value cache
//!
//! The cache is the write-through buffer behind every store: reads and
//! writes complete synchronously before a store operation returns. Values
//! are JSON documents keyed by short names such as `progress-<course>`.

pub mod file;
pub mod memory;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

pub use file::FileCache;
pub use memory::MemoryCache;

/// Synchronous key-value storage for serialized state
pub trait LocalCache: Send + Sync {
    /// Read the raw value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value stored under `key`
    fn remove(&self, key: &str) -> Result<()>;
}

/// Read and parse a JSON entry
///
/// Missing entries yield `Ok(None)`. Corrupt entries are logged, discarded,
/// and also yield `Ok(None)`. An error means the cache itself could not be
/// read, so the stored entry may still be valid and must not be overwritten.
pub fn read_json<T: DeserializeOwned>(cache: &dyn LocalCache, key: &str) -> Result<Option<T>> {
    let Some(raw) = cache.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Discarding corrupt cache entry {}: {}", key, e);
            if let Err(e) = cache.remove(key) {
                warn!("Failed to remove corrupt cache entry {}: {:#}", key, e);
            }
            Ok(None)
        }
    }
}

/// Serialize and store a JSON entry, logging failures
///
/// Returns whether the write succeeded. In-memory state stays authoritative
/// for the session when the write fails.
pub fn write_json<T: Serialize>(cache: &dyn LocalCache, key: &str, value: &T) -> bool {
    let contents = match serde_json::to_string(value) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Failed to serialize cache entry {}: {}", key, e);
            return false;
        }
    };

    match cache.set(key, &contents) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to write cache entry {}: {:#}", key, e);
            false
        }
    }
}

/// Cache whose reads and writes can be switched to fail
#[cfg(test)]
pub(crate) mod failing {
    use std::sync::atomic::{AtomicBool, Ordering};

    use anyhow::{Result, bail};

    use super::{LocalCache, MemoryCache};

    #[derive(Default)]
    pub struct FailingCache {
        pub inner: MemoryCache,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
    }

    impl FailingCache {
        pub fn failing_reads() -> Self {
            let cache = Self::default();
            cache.fail_reads.store(true, Ordering::SeqCst);
            cache
        }

        pub fn failing_writes() -> Self {
            let cache = Self::default();
            cache.fail_writes.store(true, Ordering::SeqCst);
            cache
        }

        pub fn set_fail_reads(&self, fail: bool) {
            self.fail_reads.store(fail, Ordering::SeqCst);
        }
    }

    impl LocalCache for FailingCache {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                bail!("read of {} failed", key);
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                bail!("disk full");
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                bail!("disk full");
            }
            self.inner.remove(key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn read_json_missing_entry_is_none() {
        let cache = MemoryCache::new();
        let value: Option<HashMap<String, u32>> = read_json(&cache, "missing").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn write_then_read_json() {
        let cache = MemoryCache::new();
        assert!(write_json(&cache, "numbers", &vec![1, 2, 3]));

        let value: Option<Vec<u32>> = read_json(&cache, "numbers").unwrap();
        assert_eq!(value, Some(vec![1, 2, 3]));
    }

    #[test]
    fn corrupt_entry_is_discarded() {
        let cache = MemoryCache::new();
        cache.set("broken", "{not json").unwrap();

        let value: Option<Vec<u32>> = read_json(&cache, "broken").unwrap();
        assert!(value.is_none());
        assert!(cache.get("broken").unwrap().is_none());
    }

    #[test]
    fn read_error_is_reported() {
        let cache = failing::FailingCache::failing_reads();
        cache.inner.set("numbers", "[1]").unwrap();

        assert!(read_json::<Vec<u32>>(&cache, "numbers").is_err());
        assert_eq!(cache.inner.get("numbers").unwrap(), Some("[1]".to_string()));
    }

    #[test]
    fn write_failure_returns_false() {
        let cache = failing::FailingCache::failing_writes();
        assert!(!write_json(&cache, "numbers", &vec![1]));
    }
}
