use super::{SettingsStorage, StorageChange};
use crate::error::{Result, TabshelfError};
use crate::settings::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// In-memory settings storage.
///
/// Uses `RefCell` for interior mutability since tabshelf is single-threaded.
#[derive(Debug, Default)]
pub struct MemStorage {
    values: RefCell<HashMap<String, Value>>,
    pending: RefCell<Vec<StorageChange>>,
    simulate_write_error: Cell<bool>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `values`, as if persisted by an earlier session.
    /// No changes are queued for them.
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let storage = Self::new();
        storage
            .values
            .borrow_mut()
            .extend(values.into_iter().map(|(k, v)| (k.into(), v)));
        storage
    }

    /// Simulate a write made by another context (another tab, a sync service).
    pub fn inject_external(&self, key: &str, value: Value) {
        self.write(key, Some(value));
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    fn write(&self, key: &str, value: Option<Value>) {
        let old_value = match &value {
            Some(v) => self.values.borrow_mut().insert(key.to_string(), v.clone()),
            None => self.values.borrow_mut().remove(key),
        };
        if old_value.is_none() && value.is_none() {
            return;
        }
        self.pending
            .borrow_mut()
            .push(StorageChange::new(key, old_value, value));
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(TabshelfError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }
}

impl SettingsStorage for MemStorage {
    fn get_all(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let values = self.values.borrow();
        Ok(keys
            .iter()
            .filter_map(|k| values.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    fn set_one(&self, key: &str, value: &Value) -> Result<()> {
        self.check_writable()?;
        self.write(key, Some(value.clone()));
        Ok(())
    }

    fn remove_one(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        self.write(key, None);
        Ok(())
    }

    fn take_changes(&self) -> Result<Vec<StorageChange>> {
        Ok(std::mem::take(&mut *self.pending.borrow_mut()))
    }
}
