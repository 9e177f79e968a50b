//! Usage Store
//!
//! Key-value persistence for the guest usage ledger, plus the ledger itself.
//!
//! The ledger is a JSON object keyed by feature identifier:
//!
//! ```json
//! { "search": { "count": 2, "date": "2024-05-01" } }
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::error::{QuotaError, QuotaResult};
use super::feature::GatedFeature;

/// Capability interface over a string key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn read(&self, key: &str) -> QuotaResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn write(&self, key: &str, value: &str) -> QuotaResult<()>;

    /// Delete `key`; missing keys are not an error
    fn remove(&self, key: &str) -> QuotaResult<()>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> QuotaResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| QuotaError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> QuotaResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| QuotaError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> QuotaResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| QuotaError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Whether `key` can name a stored value in every store.
///
/// Keys are non-empty, use only `[A-Za-z0-9_.-]` and do not start with `.`,
/// so a key always maps to a plain file name.
pub fn is_valid_storage_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// File-backed store: one `<key>.json` file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the store's files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> QuotaResult<PathBuf> {
        if !is_valid_storage_key(key) {
            return Err(QuotaError::Storage(format!("invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> QuotaResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> QuotaResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> QuotaResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Uses of one feature on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Uses consumed on `date`
    pub count: u32,

    /// Local calendar day the count applies to
    pub date: NaiveDate,
}

impl UsageRecord {
    pub fn new(count: u32, date: NaiveDate) -> Self {
        Self { count, date }
    }

    /// Count as seen on `today`; stale records read as zero
    pub fn count_on(&self, today: NaiveDate) -> u32 {
        if self.date == today {
            self.count
        } else {
            0
        }
    }
}

/// All usage records, at most one per feature
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageLedger {
    records: BTreeMap<GatedFeature, UsageRecord>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a persisted ledger.
    ///
    /// Unknown feature keys and malformed records are skipped; only a
    /// document that is not a JSON object fails.
    pub fn from_json(json: &str) -> QuotaResult<Self> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut records = BTreeMap::new();

        for (key, value) in raw {
            let Ok(feature) = key.parse::<GatedFeature>() else {
                tracing::debug!("Ignoring unknown ledger key '{}'", key);
                continue;
            };
            match serde_json::from_value::<UsageRecord>(value) {
                Ok(record) => {
                    records.insert(feature, record);
                }
                Err(e) => {
                    tracing::warn!("Dropping malformed usage record for {}: {}", feature, e);
                }
            }
        }

        Ok(Self { records })
    }

    /// Encode the ledger for persistence
    pub fn to_json(&self) -> QuotaResult<String> {
        Ok(serde_json::to_string(&self.records)?)
    }

    /// Load the ledger stored under `key`; a missing key yields an empty ledger
    pub fn load(store: &dyn KeyValueStore, key: &str) -> QuotaResult<Self> {
        match store.read(key)? {
            Some(json) => Self::from_json(&json),
            None => Ok(Self::new()),
        }
    }

    /// Persist the ledger under `key`
    pub fn save(&self, store: &dyn KeyValueStore, key: &str) -> QuotaResult<()> {
        store.write(key, &self.to_json()?)
    }

    /// Stored record for a feature, stale or not
    pub fn record(&self, feature: GatedFeature) -> Option<&UsageRecord> {
        self.records.get(&feature)
    }

    /// Uses of `feature` on `today`
    pub fn count_for(&self, feature: GatedFeature, today: NaiveDate) -> u32 {
        self.records
            .get(&feature)
            .map(|r| r.count_on(today))
            .unwrap_or(0)
    }

    /// Add one use of `feature` on `today`, replacing a stale record first.
    /// Returns the new count.
    pub fn increment(&mut self, feature: GatedFeature, today: NaiveDate) -> u32 {
        let record = self
            .records
            .entry(feature)
            .or_insert_with(|| UsageRecord::new(0, today));

        if record.date != today {
            *record = UsageRecord::new(0, today);
        }

        record.count = record.count.saturating_add(1);
        record.count
    }

    /// Replace the record for a feature
    pub fn set(&mut self, feature: GatedFeature, record: UsageRecord) {
        self.records.insert(feature, record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
