//! JSON-file secret store.
//!
//! The file is a flat JSON object shared with other keys; game records live
//! under `game_<address>`. Writes go to a temporary file that is then
//! renamed over the original.

use super::{parse_storage_key, storage_key, SecretRecord, SecretStore, StoreError};
use alloy_primitives::Address;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

pub struct FileSecretStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Map::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &Map<String, Value>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SecretStore for FileSecretStore {
    fn store(&self, contract: Address, record: &SecretRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap();
        let mut entries = self.load()?;
        entries.insert(storage_key(&contract), serde_json::to_value(record)?);
        self.save(&entries)
    }

    fn get(&self, contract: Address) -> Result<Option<SecretRecord>, StoreError> {
        let _guard = self.lock.lock().unwrap();
        let entries = self.load()?;
        let Some(value) = entries.get(&storage_key(&contract)) else {
            return Ok(None);
        };
        match serde_json::from_value(value.clone()) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(contract = %contract, error = %e, "unreadable secret record");
                Ok(None)
            }
        }
    }

    fn remove(&self, contract: Address) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap();
        let mut entries = self.load()?;
        if entries.remove(&storage_key(&contract)).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<Address>, StoreError> {
        let _guard = self.lock.lock().unwrap();
        let entries = self.load()?;
        let mut keys: Vec<Address> = entries.keys().filter_map(|k| parse_storage_key(k)).collect();
        keys.sort();
        Ok(keys)
    }
}
