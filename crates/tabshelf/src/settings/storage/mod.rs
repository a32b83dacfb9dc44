//! # Persistent Settings Storage
//!
//! The settings store never owns persistence. It talks to a
//! [`SettingsStorage`] that behaves like a browser extension's storage area:
//!
//! - `get_all` is a bulk read used once at load time.
//! - `set_one` / `remove_one` write a single key.
//! - Writes are **not** reflected back to the caller directly. Instead the
//!   storage queues a [`StorageChange`] batch, drained with `take_changes`.
//!   The settings store applies that batch exactly like a change that came
//!   from another tab, so every context converges on the same state.
//!
//! ## Implementations
//!
//! - [`mem::MemStorage`]: `RefCell` maps, for tests and embedding.
//! - [`fs::FsStorage`]: a single JSON object file; changes made by other
//!   processes surface through `take_changes`.

use crate::error::Result;
use crate::settings::Value;
use std::collections::HashMap;

pub mod fs;
pub mod mem;

/// One entry of a storage change batch.
///
/// `None` means "absent": `old_value: None` is a first write, `new_value: None`
/// is a removal.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl StorageChange {
    pub fn new(key: impl Into<String>, old_value: Option<Value>, new_value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            old_value,
            new_value,
        }
    }
}

/// Abstract interface for the persistent key/value area settings live in.
///
/// All methods take `&self`; implementations use interior mutability since
/// tabshelf is single-threaded.
pub trait SettingsStorage {
    /// Read the given keys. Keys never written are simply absent from the map.
    fn get_all(&self, keys: &[&str]) -> Result<HashMap<String, Value>>;

    /// Write one key. The change is observable through `take_changes`.
    fn set_one(&self, key: &str, value: &Value) -> Result<()>;

    /// Remove one key. Removing an absent key queues nothing.
    fn remove_one(&self, key: &str) -> Result<()>;

    /// Drain the changes observed since the last call, in the order they happened.
    fn take_changes(&self) -> Result<Vec<StorageChange>>;
}
