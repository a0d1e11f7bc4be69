use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::models::{Chore, TeamMember};

/// Where chores and team members are kept.
///
/// Loading never fails: a missing or unreadable collection comes back empty,
/// records that cannot be read are skipped, and either problem is logged.
/// Saving reports every failure to the caller.
pub trait Store {
    fn load_chores(&self) -> Vec<Chore>;
    fn save_chores(&self, chores: &[Chore]) -> Result<()>;
    fn load_team(&self) -> Vec<TeamMember>;
    fn save_team(&self, members: &[TeamMember]) -> Result<()>;
}

/// Stores each collection as a pretty-printed JSON array in `dir`
/// (`chores.json` and `team.json`). Before overwriting a file that did not
/// read back cleanly, the old contents are copied to
/// `<file>.<timestamp>.bak` next to it.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path to the chores file (`chores.json`).
    pub fn chores_path(&self) -> PathBuf {
        self.dir.join("chores.json")
    }

    /// Path to the team file (`team.json`).
    pub fn team_path(&self) -> PathBuf {
        self.dir.join("team.json")
    }

    /// Deletes both collection files.
    pub fn delete_all(&self) -> Result<()> {
        for path in [self.chores_path(), self.team_path()] {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// Records read from a collection file, plus how many had to be skipped.
struct Loaded<T> {
    items: Vec<T>,
    skipped: usize,
}

/// Reads a JSON array record by record. A record that does not fit `T` is
/// logged and skipped; only an unreadable file or a non-array is an error.
fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Loaded<T>> {
    if !path.exists() {
        return Ok(Loaded { items: Vec::new(), skipped: 0 });
    }
    let mut f = OpenOptions::new().read(true).open(path)?;
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    if s.trim().is_empty() {
        return Ok(Loaded { items: Vec::new(), skipped: 0 });
    }
    let records: Vec<serde_json::Value> = serde_json::from_str(&s)?;
    let mut items = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value(record) {
            Ok(item) => items.push(item),
            Err(e) => {
                skipped += 1;
                tracing::warn!(path = %path.display(), index, error = %e, "skipping unreadable record");
            }
        }
    }
    Ok(Loaded { items, skipped })
}

fn load_collection<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    match read_collection(path) {
        Ok(loaded) => loaded.items,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not load collection, starting empty");
            Vec::new()
        }
    }
}

/// `chores.json` becomes `chores.json.<timestamp>.bak`.
fn backup_path(path: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{}.bak", stamp));
    path.with_file_name(name)
}

/// Copies the current file aside when any of it could not be read, so the
/// save that follows cannot drop those records for good.
fn preserve_unreadable<T: DeserializeOwned>(path: &Path) -> Result<()> {
    let intact = match read_collection::<T>(path) {
        Ok(loaded) => loaded.skipped == 0,
        Err(_) => false,
    };
    if intact {
        return Ok(());
    }
    let backup = backup_path(path);
    fs::copy(path, &backup)?;
    tracing::warn!(
        path = %path.display(),
        backup = %backup.display(),
        "collection had unreadable records, kept a copy before saving"
    );
    Ok(())
}

fn save_collection<T: Serialize + DeserializeOwned>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    preserve_unreadable::<T>(path)?;
    let s = serde_json::to_string_pretty(items)?;
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    f.write_all(s.as_bytes())?;
    tracing::debug!(path = %path.display(), count = items.len(), "saved collection");
    Ok(())
}

impl Store for JsonStore {
    fn load_chores(&self) -> Vec<Chore> {
        load_collection(&self.chores_path())
    }

    fn save_chores(&self, chores: &[Chore]) -> Result<()> {
        save_collection(&self.chores_path(), chores)
    }

    fn load_team(&self) -> Vec<TeamMember> {
        load_collection(&self.team_path())
    }

    fn save_team(&self, members: &[TeamMember]) -> Result<()> {
        save_collection(&self.team_path(), members)
    }
}

/// Keeps both collections in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    chores: Mutex<Vec<Chore>>,
    team: Mutex<Vec<TeamMember>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl Store for MemoryStore {
    fn load_chores(&self) -> Vec<Chore> {
        self.chores.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn save_chores(&self, chores: &[Chore]) -> Result<()> {
        let mut guard = self.chores.lock().unwrap_or_else(|e| e.into_inner());
        *guard = chores.to_vec();
        Ok(())
    }

    fn load_team(&self) -> Vec<TeamMember> {
        self.team.lock().map(|t| t.clone()).unwrap_or_default()
    }

    fn save_team(&self, members: &[TeamMember]) -> Result<()> {
        let mut guard = self.team.lock().unwrap_or_else(|e| e.into_inner());
        *guard = members.to_vec();
        Ok(())
    }
}
