//! File-backed cache: one JSON file per key

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::LocalCache;
use crate::config::Config;

/// Cache storing each entry as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Create a cache rooted at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache under the application data directory
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Config::cache_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Map a key to a safe file stem
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache entry from {:?}", path))?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache directory {:?}", self.dir))?;

        let path = self.entry_path(key);
        fs::write(&path, value)
            .with_context(|| format!("Failed to write cache entry to {:?}", path))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.entry_path(key);

        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove cache entry {:?}", path))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_key_returns_none() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());
        assert!(cache.get("progress-rust").unwrap().is_none());
    }

    #[test]
    fn set_creates_directory_and_persists() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path().join("nested").join("cache"));

        cache.set("user_skills_v1", "[]").unwrap();

        assert_eq!(cache.get("user_skills_v1").unwrap(), Some("[]".to_string()));
        assert!(cache.dir().join("user_skills_v1.json").exists());
    }

    #[test]
    fn keys_with_separators_stay_inside_cache_dir() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());

        cache.set("progress-../Intro to Rust", "{}").unwrap();

        assert!(dir.path().join("progress-___Intro_to_Rust.json").exists());
        assert_eq!(cache.get("progress-../Intro to Rust").unwrap(), Some("{}".to_string()));
    }

    #[test]
    fn remove_deletes_entry() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path());

        cache.set("key", "1").unwrap();
        cache.remove("key").unwrap();
        cache.remove("key").unwrap();

        assert!(cache.get("key").unwrap().is_none());
    }
}
