//! Key-value persistence engine.
//!
//! Records are JSON values grouped into named object stores. Each record can
//! carry secondary index values (plain strings) that `get_all_by_index` and
//! `get_all_ordered_by` query. Two engines implement [`KvStore`]:
//! an in-memory map and a directory of JSON files, one per object store.

use crate::error::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

/// A stored value and its secondary index entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub value: Value,
    #[serde(default)]
    pub index: BTreeMap<String, String>,
}

/// Generic key-value store with string secondary indexes.
pub trait KvStore {
    /// Fetch one record's value.
    fn get(&self, store: &str, key: &str) -> Result<Option<Value>>;

    /// Insert or replace a record. `index` lists `(index name, value)` pairs.
    fn put(&mut self, store: &str, key: &str, value: Value, index: &[(&str, String)])
        -> Result<()>;

    /// Remove a record; removing a missing key is not an error.
    fn delete(&mut self, store: &str, key: &str) -> Result<()>;

    /// All values in a store, in key order.
    fn get_all(&self, store: &str) -> Result<Vec<Value>>;

    /// Values whose `index` entry equals `value`.
    fn get_all_by_index(&self, store: &str, index: &str, value: &str) -> Result<Vec<Value>>;

    /// Values carrying an `index` entry, ascending by that entry.
    fn get_all_ordered_by(&self, store: &str, index: &str) -> Result<Vec<Value>>;
}

type ObjectStore = BTreeMap<String, Record>;

fn build_record(value: Value, index: &[(&str, String)]) -> Record {
    Record {
        value,
        index: index
            .iter()
            .map(|(name, v)| (name.to_string(), v.clone()))
            .collect(),
    }
}

fn filter_by_index(store: Option<&ObjectStore>, index: &str, value: &str) -> Vec<Value> {
    store
        .map(|records| {
            records
                .values()
                .filter(|r| r.index.get(index).map(String::as_str) == Some(value))
                .map(|r| r.value.clone())
                .collect()
        })
        .unwrap_or_default()
}

fn order_by_index(store: Option<&ObjectStore>, index: &str) -> Vec<Value> {
    let Some(records) = store else {
        return Vec::new();
    };
    let mut keyed: Vec<(&String, &Value)> = records
        .values()
        .filter_map(|r| r.index.get(index).map(|k| (k, &r.value)))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(b.0));
    keyed.into_iter().map(|(_, v)| v.clone()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Memory Engine
// ─────────────────────────────────────────────────────────────────────────────

/// Ephemeral store; contents are lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    stores: HashMap<String, ObjectStore>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, store: &str, key: &str) -> Result<Option<Value>> {
        Ok(self
            .stores
            .get(store)
            .and_then(|s| s.get(key))
            .map(|r| r.value.clone()))
    }

    fn put(
        &mut self,
        store: &str,
        key: &str,
        value: Value,
        index: &[(&str, String)],
    ) -> Result<()> {
        self.stores
            .entry(store.to_string())
            .or_default()
            .insert(key.to_string(), build_record(value, index));
        Ok(())
    }

    fn delete(&mut self, store: &str, key: &str) -> Result<()> {
        if let Some(s) = self.stores.get_mut(store) {
            s.remove(key);
        }
        Ok(())
    }

    fn get_all(&self, store: &str) -> Result<Vec<Value>> {
        Ok(self
            .stores
            .get(store)
            .map(|s| s.values().map(|r| r.value.clone()).collect())
            .unwrap_or_default())
    }

    fn get_all_by_index(&self, store: &str, index: &str, value: &str) -> Result<Vec<Value>> {
        Ok(filter_by_index(self.stores.get(store), index, value))
    }

    fn get_all_ordered_by(&self, store: &str, index: &str) -> Result<Vec<Value>> {
        Ok(order_by_index(self.stores.get(store), index))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON File Engine
// ─────────────────────────────────────────────────────────────────────────────

const STORE_EXTENSION: &str = "json";
const TEMP_SUFFIX: &str = "json.tmp";

/// One pretty-printed JSON file per object store inside `dir`.
///
/// Everything is read at open time; each mutation rewrites the affected
/// store's file through a temporary file and a rename.
#[derive(Debug)]
pub struct JsonFileKvStore {
    dir: PathBuf,
    stores: HashMap<String, ObjectStore>,
}

impl JsonFileKvStore {
    /// Open (creating if needed) a store directory.
    ///
    /// Files that fail to parse are skipped with a warning and start empty.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| Error::FileWrite {
            path: dir.clone(),
            source: e,
        })?;

        let mut stores = HashMap::new();
        let entries = fs::read_dir(&dir).map_err(|e| Error::FileRead {
            path: dir.clone(),
            source: e,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(STORE_EXTENSION) {
                continue;
            }
            let Some(name) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
            else {
                continue;
            };
            match Self::read_store(&path) {
                Ok(store) => {
                    debug!("Loaded object store '{}' ({} records)", name, store.len());
                    stores.insert(name, store);
                }
                Err(e) => warn!("Ignoring unreadable object store {}: {}", path.display(), e),
            }
        }

        Ok(Self { dir, stores })
    }

    fn read_store(path: &Path) -> Result<ObjectStore> {
        let contents = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        if contents.trim().is_empty() {
            return Ok(ObjectStore::new());
        }
        serde_json::from_str(&contents)
            .map_err(|e| Error::storage(format!("{}: {}", path.display(), e)))
    }

    fn store_path(&self, store: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", store, STORE_EXTENSION))
    }

    fn flush(&self, store: &str) -> Result<()> {
        let path = self.store_path(store);
        let temp = self.dir.join(format!("{}.{}", store, TEMP_SUFFIX));
        let empty = ObjectStore::new();
        let records = self.stores.get(store).unwrap_or(&empty);

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| Error::storage(format!("failed to serialize '{}': {}", store, e)))?;
        fs::write(&temp, json).map_err(|e| Error::FileWrite {
            path: temp.clone(),
            source: e,
        })?;
        fs::rename(&temp, &path).map_err(|e| Error::FileWrite {
            path: path.clone(),
            source: e,
        })?;
        Ok(())
    }

    /// Directory holding the store files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl KvStore for JsonFileKvStore {
    fn get(&self, store: &str, key: &str) -> Result<Option<Value>> {
        Ok(self
            .stores
            .get(store)
            .and_then(|s| s.get(key))
            .map(|r| r.value.clone()))
    }

    fn put(
        &mut self,
        store: &str,
        key: &str,
        value: Value,
        index: &[(&str, String)],
    ) -> Result<()> {
        self.stores
            .entry(store.to_string())
            .or_default()
            .insert(key.to_string(), build_record(value, index));
        self.flush(store)
    }

    fn delete(&mut self, store: &str, key: &str) -> Result<()> {
        let removed = self
            .stores
            .get_mut(store)
            .and_then(|s| s.remove(key))
            .is_some();
        if removed {
            self.flush(store)?;
        }
        Ok(())
    }

    fn get_all(&self, store: &str) -> Result<Vec<Value>> {
        Ok(self
            .stores
            .get(store)
            .map(|s| s.values().map(|r| r.value.clone()).collect())
            .unwrap_or_default())
    }

    fn get_all_by_index(&self, store: &str, index: &str, value: &str) -> Result<Vec<Value>> {
        Ok(filter_by_index(self.stores.get(store), index, value))
    }

    fn get_all_ordered_by(&self, store: &str, index: &str) -> Result<Vec<Value>> {
        Ok(order_by_index(self.stores.get(store), index))
    }
}
