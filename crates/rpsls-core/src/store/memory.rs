//! In-memory secret store.

use super::{SecretRecord, SecretStore, StoreError};
use alloy_primitives::Address;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Secret store held in memory, for tests and the demo
#[derive(Clone, Default)]
pub struct MemorySecretStore {
    records: Arc<Mutex<HashMap<Address, SecretRecord>>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn store(&self, contract: Address, record: &SecretRecord) -> Result<(), StoreError> {
        self.records.lock().unwrap().insert(contract, record.clone());
        Ok(())
    }

    fn get(&self, contract: Address) -> Result<Option<SecretRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(&contract).cloned())
    }

    fn remove(&self, contract: Address) -> Result<(), StoreError> {
        self.records.lock().unwrap().remove(&contract);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<Address>, StoreError> {
        let mut keys: Vec<Address> = self.records.lock().unwrap().keys().copied().collect();
        keys.sort();
        Ok(keys)
    }
}
