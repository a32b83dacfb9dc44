use super::{SettingsStorage, StorageChange};
use crate::error::{Result, TabshelfError};
use crate::settings::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

type Snapshot = BTreeMap<String, Value>;

/// Settings persisted as one JSON object file.
///
/// ```text
/// settings.json
/// {
///   "show-weather": false,
///   "bookmarks-drawer-mode": "hover"
/// }
/// ```
///
/// Change detection is snapshot based: `take_changes` re-reads the file and
/// diffs it against what this instance saw last, so writes from this
/// instance and from other processes are reported the same way.
pub struct FsStorage {
    path: PathBuf,
    last_seen: RefCell<Snapshot>,
}

impl FsStorage {
    /// Open storage at `path`. The file is created lazily on first write.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let initial = read_snapshot(&path)?;
        Ok(Self {
            path,
            last_seen: RefCell::new(initial),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Snapshot) -> bool,
    {
        let mut snapshot = read_snapshot(&self.path)?;
        if mutate(&mut snapshot) {
            write_snapshot(&self.path, &snapshot)?;
        }
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Ok(Snapshot::new());
    }
    let content = fs::read_to_string(path).map_err(TabshelfError::Io)?;
    if content.trim().is_empty() {
        return Ok(Snapshot::new());
    }
    let snapshot: Snapshot = serde_json::from_str(&content).map_err(TabshelfError::Serialization)?;
    Ok(snapshot)
}

/// Write to a sibling temp file then rename, so readers never see a partial file.
fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(TabshelfError::Io)?;
        }
    }
    let content = serde_json::to_string_pretty(snapshot).map_err(TabshelfError::Serialization)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).map_err(TabshelfError::Io)?;
    fs::rename(&tmp, path).map_err(TabshelfError::Io)?;
    Ok(())
}

impl SettingsStorage for FsStorage {
    fn get_all(&self, keys: &[&str]) -> Result<HashMap<String, Value>> {
        let snapshot = read_snapshot(&self.path)?;
        let found = keys
            .iter()
            .filter_map(|k| snapshot.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect();
        *self.last_seen.borrow_mut() = snapshot;
        Ok(found)
    }

    fn set_one(&self, key: &str, value: &Value) -> Result<()> {
        self.update(|snapshot| {
            snapshot.insert(key.to_string(), value.clone());
            true
        })
    }

    fn remove_one(&self, key: &str) -> Result<()> {
        self.update(|snapshot| snapshot.remove(key).is_some())
    }

    fn take_changes(&self) -> Result<Vec<StorageChange>> {
        let current = read_snapshot(&self.path)?;
        let mut last_seen = self.last_seen.borrow_mut();

        let keys: BTreeSet<&String> = last_seen.keys().chain(current.keys()).collect();
        let changes = keys
            .into_iter()
            .filter_map(|key| {
                let old_value = last_seen.get(key);
                let new_value = current.get(key);
                (old_value != new_value).then(|| {
                    StorageChange::new(key.clone(), old_value.cloned(), new_value.cloned())
                })
            })
            .collect();

        *last_seen = current;
        Ok(changes)
    }
}
