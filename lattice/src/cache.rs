//! Memoization store for classification results.
//!
//! A [`ToolCache`] maps keys such as `get_cls(5)` to JSON values. It is owned
//! by a [`Classifier`](crate::Classifier) and may be backed by a file so that
//! expensive classifications survive the process.
//!
//! # Examples
//!
//! ```
//! use ns_lattice::cache::{cache_key, ToolCache};
//!
//! let mut cache = ToolCache::in_memory();
//! let key = cache_key("get_bas_lst", &[&4]);
//! assert_eq!(key, "get_bas_lst(4)");
//! cache.put(&key, &vec![1, 2, 3]).unwrap();
//! assert_eq!(cache.get::<Vec<i32>>(&key), Some(vec![1, 2, 3]));
//! cache.clear();
//! assert!(cache.is_empty());
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{LatticeError, Result};

/// Builds the cache key `routine(arg1,arg2,..)`.
pub fn cache_key(routine: &str, args: &[&dyn Display]) -> String {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    format!("{routine}({})", args.join(","))
}

/// Key-value memo store with optional JSON persistence.
#[derive(Debug, Default)]
pub struct ToolCache {
    entries: BTreeMap<String, Value>,
    path: Option<PathBuf>,
}

impl ToolCache {
    /// A cache that never touches the file system.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A cache persisted at `path`. Existing content is loaded; a missing file
    /// starts an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Cache`] when the file exists but cannot be read
    /// or does not hold a JSON object.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let text = fs::read_to_string(&path)
                .map_err(|e| LatticeError::Cache(format!("read {}: {e}", path.display())))?;
            let entries: BTreeMap<String, Value> = serde_json::from_str(&text)
                .map_err(|e| LatticeError::Cache(format!("decode {}: {e}", path.display())))?;
            info!(path = %path.display(), entries = entries.len(), "loaded cache");
            entries
        } else {
            info!(path = %path.display(), "starting empty cache");
            BTreeMap::new()
        };
        Ok(Self {
            entries,
            path: Some(path),
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Cached value for `key`. An entry that does not decode as `T` counts as
    /// a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(v) => {
                debug!(key, "cache hit");
                Some(v)
            }
            Err(e) => {
                warn!(key, error = %e, "ignoring undecodable cache entry");
                None
            }
        }
    }

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Cache`] when the value cannot be serialized.
    pub fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| LatticeError::Cache(format!("encode {key}: {e}")))?;
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    /// True when `key` has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes every entry. The backing file is left alone until [`save`](Self::save).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the cache has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the entries to the backing file. In-memory caches do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Cache`] when encoding or writing fails.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let text = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| LatticeError::Cache(format!("encode {}: {e}", path.display())))?;
        fs::write(path, text)
            .map_err(|e| LatticeError::Cache(format!("write {}: {e}", path.display())))?;
        info!(path = %path.display(), entries = self.entries.len(), "saved cache");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_include_arguments() {
        assert_eq!(cache_key("get_cls", &[&7]), "get_cls(7)");
        assert_eq!(cache_key("get_root_bases", &[&4, &true]), "get_root_bases(4,true)");
        assert_eq!(cache_key("all", &[]), "all()");
    }

    #[test]
    fn undecodable_entry_is_a_miss() {
        let mut cache = ToolCache::in_memory();
        cache.put("k", &"text").unwrap();
        assert!(cache.contains("k"));
        assert_eq!(cache.get::<Vec<i64>>("k"), None);
        assert_eq!(cache.get::<String>("k"), Some("text".to_string()));
    }

    #[test]
    fn persisted_round_trip() {
        let path = std::env::temp_dir().join(format!("ns-lattice-cache-{}.json", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut cache = ToolCache::open(&path).unwrap();
        assert!(cache.is_empty());
        cache.put("get_bas_lst(3)", &vec![vec![0, 1, -1]]).unwrap();
        cache.save().unwrap();

        let reopened = ToolCache::open(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(
            reopened.get::<Vec<Vec<i64>>>("get_bas_lst(3)"),
            Some(vec![vec![0, 1, -1]])
        );
        assert_eq!(reopened.path(), Some(path.as_path()));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn in_memory_save_is_a_no_op() {
        assert!(ToolCache::in_memory().save().is_ok());
    }
}
