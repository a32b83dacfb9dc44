//! # Settings Store
//!
//! [`SettingsStore`] holds, per key, the stored value and a stack of override
//! slots, and computes the effective value on demand.
//!
//! ## Round-tripping Writes
//!
//! `set` never touches local state. It writes to the [`SettingsStorage`] and
//! then drains the storage's change batch through [`SettingsStore::apply_changes`],
//! the same entry point used for changes made by other tabs. Local state is
//! therefore always "what storage said", never "what we hoped we wrote".
//!
//! ## Notifications
//!
//! Two subscription flavours exist per key:
//!
//! - `on_changed`: the **effective** value changed. De-duplicated: a stored
//!   value changing underneath an active override is silent.
//! - `on_data_changed`: the stored value or any override slot changed.
//!
//! Both are delivered synchronously, after internal state is updated and all
//! borrows are released, so listeners may read the store, write to it, or set
//! overrides (this is how rules cascade).
//!
//! ## Loading
//!
//! `load` reads every key once and notifies with a *forced* flag that bypasses
//! de-duplication, so listeners registered before load always get an initial
//! callback. Startup rules run once afterwards.

use crate::error::Result;
use crate::events::{Emitter, SubscriptionId};
use crate::settings::rules::{self, OverrideOp, StartupContext};
use crate::settings::storage::{SettingsStorage, StorageChange};
use crate::settings::{SettingKey, SettingSnapshot, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq)]
struct SettingData {
    stored: Option<Value>,
    overrides: Vec<Option<Value>>,
}

impl SettingData {
    fn effective(&self, key: SettingKey) -> (Value, Option<usize>) {
        if let Some((index, Some(value))) = self
            .overrides
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.is_some())
        {
            return (value.clone(), Some(index));
        }
        match &self.stored {
            Some(value) => (value.clone(), None),
            None => (key.default_value(), None),
        }
    }

    fn snapshot(&self, key: SettingKey) -> SettingSnapshot {
        let (value, active_override) = self.effective(key);
        SettingSnapshot {
            key,
            value,
            stored: self.stored.clone(),
            overrides: self.overrides.clone(),
            active_override,
        }
    }

    fn set_override(&mut self, priority: usize, value: Value) {
        if self.overrides.len() <= priority {
            self.overrides.resize(priority + 1, None);
        }
        self.overrides[priority] = Some(value);
    }

    fn unset_override(&mut self, priority: usize) {
        if let Some(slot) = self.overrides.get_mut(priority) {
            *slot = None;
        }
        while matches!(self.overrides.last(), Some(None)) {
            self.overrides.pop();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubscriptionKind {
    Value,
    Data,
}

/// Handle for a settings subscription; pass it to [`SettingsStore::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsSubscription {
    pub key: SettingKey,
    kind: SubscriptionKind,
    id: SubscriptionId,
}

type StartupRuleFn = Box<dyn Fn(&StartupContext) -> Vec<OverrideOp>>;

pub struct SettingsStore<S: SettingsStorage> {
    storage: S,
    data: RefCell<HashMap<SettingKey, SettingData>>,
    value_emitters: HashMap<SettingKey, Emitter<Value>>,
    data_emitters: HashMap<SettingKey, Emitter<SettingSnapshot>>,
    startup_rules: RefCell<Vec<StartupRuleFn>>,
    startup_context: StartupContext,
    loaded: Cell<bool>,
}

impl<S: SettingsStorage> SettingsStore<S> {
    pub fn new(storage: S, startup_context: StartupContext) -> Rc<Self> {
        Rc::new(Self {
            storage,
            data: RefCell::new(HashMap::new()),
            value_emitters: SettingKey::ALL.iter().map(|k| (*k, Emitter::new())).collect(),
            data_emitters: SettingKey::ALL.iter().map(|k| (*k, Emitter::new())).collect(),
            startup_rules: RefCell::new(Vec::new()),
            startup_context,
            loaded: Cell::new(false),
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    /// The effective value: first set override, else stored, else default.
    pub fn get(&self, key: SettingKey) -> Value {
        self.data
            .borrow()
            .get(&key)
            .map(|d| d.effective(key).0)
            .unwrap_or_else(|| key.default_value())
    }

    /// The effective value as a bool; non-bool values (including a null override) read as false.
    pub fn get_bool(&self, key: SettingKey) -> bool {
        self.get(key).as_bool().unwrap_or(false)
    }

    /// The effective value as a string, `None` when it is not a string.
    pub fn get_str(&self, key: SettingKey) -> Option<String> {
        self.get(key).as_str().map(str::to_string)
    }

    pub fn get_data(&self, key: SettingKey) -> SettingSnapshot {
        self.data
            .borrow()
            .get(&key)
            .cloned()
            .unwrap_or_default()
            .snapshot(key)
    }

    /// Persist a value. Local state follows once storage reports the change.
    pub fn set(&self, key: SettingKey, value: Value) -> Result<()> {
        self.storage.set_one(key.name(), &value)?;
        self.sync()
    }

    /// Remove the stored value so the key falls back to its default.
    pub fn reset(&self, key: SettingKey) -> Result<()> {
        self.storage.remove_one(key.name())?;
        self.sync()
    }

    /// Drain pending storage changes and apply them.
    pub fn sync(&self) -> Result<()> {
        let changes = self.storage.take_changes()?;
        self.apply_changes(&changes);
        Ok(())
    }

    /// Apply a storage change batch, in batch order.
    ///
    /// Keys that are not settings (other data sharing the storage area) are skipped.
    pub fn apply_changes(&self, changes: &[StorageChange]) {
        for change in changes {
            let key = match change.key.parse::<SettingKey>() {
                Ok(key) => key,
                Err(_) => {
                    warn!(key = %change.key, "ignoring change for unknown setting");
                    continue;
                }
            };
            let new_value = change.new_value.clone();
            self.mutate(key, false, move |data| data.stored = new_value);
        }
    }

    /// Bulk-load every key, notify everyone once, then run startup rules.
    ///
    /// Calling `load` again is a no-op.
    pub fn load(&self) -> Result<()> {
        if self.loaded.get() {
            return Ok(());
        }

        // Anything queued so far is already reflected in the bulk read.
        self.storage.take_changes()?;
        let names = SettingKey::names();
        let mut values = self.storage.get_all(&names)?;
        self.loaded.set(true);
        debug!(count = values.len(), "settings loaded");

        for key in SettingKey::ALL {
            let stored = values.remove(key.name());
            self.mutate(key, true, move |data| data.stored = stored);
        }

        let ops: Vec<OverrideOp> = self
            .startup_rules
            .borrow()
            .iter()
            .flat_map(|rule| rule(&self.startup_context))
            .collect();
        self.apply_ops(ops);
        Ok(())
    }

    pub fn set_override(&self, key: SettingKey, priority: usize, value: Value) {
        self.mutate(key, false, move |data| data.set_override(priority, value));
    }

    pub fn unset_override(&self, key: SettingKey, priority: usize) {
        self.mutate(key, false, move |data| data.unset_override(priority));
    }

    pub fn apply_ops<I>(&self, ops: I)
    where
        I: IntoIterator<Item = OverrideOp>,
    {
        for op in ops {
            match op {
                OverrideOp::Set {
                    key,
                    priority,
                    value,
                } => self.set_override(key, priority, value),
                OverrideOp::Unset { key, priority } => self.unset_override(key, priority),
            }
        }
    }

    /// Register a rule to run once, right after `load`.
    pub fn add_startup_rule<F>(&self, rule: F)
    where
        F: Fn(&StartupContext) -> Vec<OverrideOp> + 'static,
    {
        self.startup_rules.borrow_mut().push(Box::new(rule));
    }

    /// Subscribe to effective value changes of `key`.
    pub fn on_changed<F>(&self, key: SettingKey, listener: F) -> SettingsSubscription
    where
        F: Fn(&Value) + 'static,
    {
        let id = self
            .value_emitters
            .get(&key)
            .map(|emitter| emitter.subscribe(listener));
        self.subscription(key, SubscriptionKind::Value, id)
    }

    /// Subscribe to any change (value or override slots) of `key`.
    pub fn on_data_changed<F>(&self, key: SettingKey, listener: F) -> SettingsSubscription
    where
        F: Fn(&SettingSnapshot) + 'static,
    {
        let id = self
            .data_emitters
            .get(&key)
            .map(|emitter| emitter.subscribe(listener));
        self.subscription(key, SubscriptionKind::Data, id)
    }

    pub fn unsubscribe(&self, subscription: SettingsSubscription) -> bool {
        match subscription.kind {
            SubscriptionKind::Value => self
                .value_emitters
                .get(&subscription.key)
                .is_some_and(|e| e.unsubscribe(subscription.id)),
            SubscriptionKind::Data => self
                .data_emitters
                .get(&subscription.key)
                .is_some_and(|e| e.unsubscribe(subscription.id)),
        }
    }

    fn subscription(
        &self,
        key: SettingKey,
        kind: SubscriptionKind,
        id: Option<SubscriptionId>,
    ) -> SettingsSubscription {
        // Every key gets both emitters in `new`, so `id` is always present.
        let id = id.unwrap_or_else(|| unreachable!("no emitter for setting {}", key));
        SettingsSubscription { key, kind, id }
    }

    /// Update one key's data, then notify with no borrows held.
    fn mutate<F>(&self, key: SettingKey, forced: bool, change: F)
    where
        F: FnOnce(&mut SettingData),
    {
        let (before, after) = {
            let mut data = self.data.borrow_mut();
            let entry = data.entry(key).or_default();
            let before = entry.clone();
            change(entry);
            (before, entry.clone())
        };

        let (old_value, _) = before.effective(key);
        let snapshot = after.snapshot(key);

        if forced || old_value != snapshot.value {
            debug!(%key, value = %snapshot.value, forced, "setting changed");
            if let Some(emitter) = self.value_emitters.get(&key) {
                emitter.emit(&snapshot.value);
            }
        }
        if forced || before != after {
            if let Some(emitter) = self.data_emitters.get(&key) {
                emitter.emit(&snapshot);
            }
        }
    }
}

impl<S: SettingsStorage + 'static> SettingsStore<S> {
    /// Build a store with the default rules installed, and load it.
    pub fn open(storage: S, startup_context: StartupContext) -> Result<Rc<Self>> {
        let store = SettingsStore::new(storage, startup_context);
        rules::install_defaults(&store);
        store.load()?;
        Ok(store)
    }
}
