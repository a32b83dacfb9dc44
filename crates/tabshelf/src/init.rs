//! # Startup
//!
//! [`initialize`] builds everything a new-tab page needs before its first
//! render: the data directory, the configuration, and a loaded settings
//! store with the default rules installed.
//!
//! ## Data Directory Resolution
//!
//! 1. `data_override`, when given.
//! 2. The `TABSHELF_DATA` environment variable (used by tests and portable
//!    installs).
//! 3. The OS data directory via the `directories` crate.
//!
//! ```text
//! <data dir>/
//!   tabshelf.toml     # optional configuration
//!   settings.json     # user settings (name configurable)
//! ```

use crate::config::TabshelfConfig;
use crate::error::{Result, TabshelfError};
use crate::settings::rules::StartupContext;
use crate::settings::storage::fs::FsStorage;
use crate::settings::store::SettingsStore;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::debug;

pub const DATA_ENV: &str = "TABSHELF_DATA";

pub struct TabshelfContext {
    pub settings: Rc<SettingsStore<FsStorage>>,
    pub config: TabshelfConfig,
    pub data_dir: PathBuf,
}

/// Resolve the data directory without touching the filesystem.
pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(DATA_ENV) {
        return Ok(PathBuf::from(path));
    }
    ProjectDirs::from("com", "tabshelf", "tabshelf")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| TabshelfError::Store("could not determine a data directory".into()))
}

/// Load configuration and open the settings store for today's date.
pub fn initialize(data_override: Option<PathBuf>) -> Result<TabshelfContext> {
    let data_dir = resolve_data_dir(data_override)?;

    let config: TabshelfConfig = Clapfig::builder()
        .app_name("tabshelf")
        .file_name("tabshelf.toml")
        .search_paths(vec![SearchPath::Path(data_dir.clone())])
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_default();

    let startup = StartupContext::now(config.easter_egg_month());
    initialize_with(data_dir, config, startup)
}

/// [`initialize`] with explicit configuration and startup context.
pub fn initialize_with(
    data_dir: PathBuf,
    config: TabshelfConfig,
    startup: StartupContext,
) -> Result<TabshelfContext> {
    let settings_path = data_dir.join(&config.settings_file);
    debug!(path = %settings_path.display(), "opening settings storage");

    let storage = FsStorage::new(settings_path)?;
    let settings = SettingsStore::open(storage, startup)?;

    Ok(TabshelfContext {
        settings,
        config,
        data_dir,
    })
}
