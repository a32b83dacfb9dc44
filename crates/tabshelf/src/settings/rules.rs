//! # Override Rules
//!
//! Some settings only make sense in combination with others. Rather than
//! rewriting stored values, rules force **override slots** on dependent keys,
//! which disappear again when the trigger changes back. Nothing a rule does is
//! ever persisted.
//!
//! A rule is a pure function from the trigger's new effective value to a list
//! of [`OverrideOp`]s. [`install`] wires it into the trigger's `on_changed`
//! subscription, so rules run synchronously inside the notification and may
//! cascade: an override that changes another key's effective value notifies
//! that key's listeners, including its own rules. The default rule set is
//! acyclic, which is what makes cascades terminate.
//!
//! ## Default Rules
//!
//! | Trigger | Effect |
//! |---------|--------|
//! | `bookmarks-drawer-mode` is `toggle` or `never` | `bookmarks-drawer-small` forced to `false` |
//! | `bookmarks-drawer-mode` is `hover` or `always` | that override cleared |
//! | `show-weather` is `false` | `temperature-unit` forced to `null` (nothing shown) |
//! | `show-weather` is `true` | that override cleared |
//! | startup, outside the easter-egg month | `enable-easter-egg` forced to `false` |

use crate::settings::storage::SettingsStorage;
use crate::settings::store::{SettingsStore, SettingsSubscription};
use crate::settings::{DrawerMode, SettingKey, Value};
use chrono::{Datelike, Local, NaiveDate};
use std::rc::Rc;

/// Priority slot used by the built-in rules.
pub const RULE_PRIORITY: usize = 0;

/// An instruction produced by a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideOp {
    Set {
        key: SettingKey,
        priority: usize,
        value: Value,
    },
    Unset {
        key: SettingKey,
        priority: usize,
    },
}

impl OverrideOp {
    pub fn set(key: SettingKey, value: Value) -> Self {
        OverrideOp::Set {
            key,
            priority: RULE_PRIORITY,
            value,
        }
    }

    pub fn unset(key: SettingKey) -> Self {
        OverrideOp::Unset {
            key,
            priority: RULE_PRIORITY,
        }
    }
}

/// A reaction to one key's effective value.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub trigger: SettingKey,
    pub react: fn(&Value) -> Vec<OverrideOp>,
}

/// What startup rules get to look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupContext {
    pub today: NaiveDate,
    /// Calendar month (1-12) in which the easter egg may appear.
    pub easter_egg_month: u32,
}

impl StartupContext {
    pub fn new(today: NaiveDate, easter_egg_month: u32) -> Self {
        Self {
            today,
            easter_egg_month,
        }
    }

    /// Context for the current local date.
    pub fn now(easter_egg_month: u32) -> Self {
        Self::new(Local::now().date_naive(), easter_egg_month)
    }

    pub fn easter_egg_active(&self) -> bool {
        self.today.month() == self.easter_egg_month
    }
}

fn drawer_mode_rule(value: &Value) -> Vec<OverrideOp> {
    match DrawerMode::from_value(value) {
        Some(DrawerMode::Toggle | DrawerMode::Never) => {
            vec![OverrideOp::set(SettingKey::BookmarksDrawerSmall, Value::Bool(false))]
        }
        Some(DrawerMode::Hover | DrawerMode::Always) => {
            vec![OverrideOp::unset(SettingKey::BookmarksDrawerSmall)]
        }
        None => Vec::new(),
    }
}

fn show_weather_rule(value: &Value) -> Vec<OverrideOp> {
    match value.as_bool() {
        Some(false) => vec![OverrideOp::set(SettingKey::TemperatureUnit, Value::Null)],
        Some(true) => vec![OverrideOp::unset(SettingKey::TemperatureUnit)],
        None => Vec::new(),
    }
}

pub fn easter_egg_rule(context: &StartupContext) -> Vec<OverrideOp> {
    if context.easter_egg_active() {
        Vec::new()
    } else {
        vec![OverrideOp::set(SettingKey::EnableEasterEgg, Value::Bool(false))]
    }
}

pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            trigger: SettingKey::BookmarksDrawerMode,
            react: drawer_mode_rule,
        },
        Rule {
            trigger: SettingKey::ShowWeather,
            react: show_weather_rule,
        },
    ]
}

/// Subscribe `rule` to its trigger. The subscription holds only a weak
/// reference, so installed rules never keep the store alive.
pub fn install<S>(store: &Rc<SettingsStore<S>>, rule: Rule) -> SettingsSubscription
where
    S: SettingsStorage + 'static,
{
    let weak = Rc::downgrade(store);
    store.on_changed(rule.trigger, move |value| {
        if let Some(store) = weak.upgrade() {
            store.apply_ops((rule.react)(value));
        }
    })
}

/// Install the default key rules and the startup rule.
pub fn install_defaults<S>(store: &Rc<SettingsStore<S>>) -> Vec<SettingsSubscription>
where
    S: SettingsStorage + 'static,
{
    store.add_startup_rule(easter_egg_rule);
    default_rules()
        .into_iter()
        .map(|rule| install(store, rule))
        .collect()
}
