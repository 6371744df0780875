use crate::ability::Ability;
use crate::progression::{Progression, MAX_ENERGY, MAX_HEALTH};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const KEY_HEALTH: &str = "playerHealth";
pub const KEY_ENERGY: &str = "playerEnergy";
pub const KEY_ACT: &str = "currentAct";
pub const KEY_LEVEL: &str = "currentLevel";
pub const KEY_PLAY_TIME: &str = "playTime";
pub const KEY_GAME_COMPLETED: &str = "gameCompleted";
pub const KEY_CASSETTES: &str = "collectedCassettes";
pub const KEY_ABILITIES: &str = "unlockedAbilities";
pub const KEY_LEVELS: &str = "completedLevels";
pub const KEY_SECRETS: &str = "foundSecrets";
pub const KEY_MEMORIES: &str = "unlockedMemories";
pub const KEY_DIARIES: &str = "readDiaries";
pub const KEY_CUTSCENES: &str = "watchedCutscenes";
pub const KEY_SAVE_TIME: &str = "saveTime";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("no save data")]
    NoSave,
    #[error("corrupted save entry {key}: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("failed to read/write save file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse save file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreValue {
    Int(i32),
    Float(f32),
    Bool(bool),
    Str(String),
    Long(i64),
}

impl StoreValue {
    fn type_name(&self) -> &'static str {
        match self {
            StoreValue::Int(_) => "int",
            StoreValue::Float(_) => "float",
            StoreValue::Bool(_) => "bool",
            StoreValue::Str(_) => "string",
            StoreValue::Long(_) => "long",
        }
    }
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<&StoreValue>;
    fn put(&mut self, key: &str, value: StoreValue);
    fn remove(&mut self, key: &str);
    fn clear(&mut self);
    fn flush(&mut self) -> Result<(), SaveError>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn get_int(&self, key: &str) -> Option<i32> {
        match self.get(key) {
            Some(StoreValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    fn get_float(&self, key: &str) -> Option<f32> {
        match self.get(key) {
            Some(StoreValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(StoreValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    fn get_string(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(StoreValue::Str(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    fn get_long(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(StoreValue::Long(v)) => Some(*v),
            _ => None,
        }
    }

    fn put_int(&mut self, key: &str, value: i32) {
        self.put(key, StoreValue::Int(value));
    }

    fn put_float(&mut self, key: &str, value: f32) {
        self.put(key, StoreValue::Float(value));
    }

    fn put_bool(&mut self, key: &str, value: bool) {
        self.put(key, StoreValue::Bool(value));
    }

    fn put_string(&mut self, key: &str, value: &str) {
        self.put(key, StoreValue::Str(value.to_string()));
    }

    fn put_long(&mut self, key: &str, value: i64) {
        self.put(key, StoreValue::Long(value));
    }
}

/// In-memory store. `flush` is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<String, StoreValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<&StoreValue> {
        self.entries.get(key)
    }

    fn put(&mut self, key: &str, value: StoreValue) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn flush(&mut self) -> Result<(), SaveError> {
        Ok(())
    }
}

/// Store backed by a JSON object on disk. Writes go to a sibling temp file
/// that is then renamed over the target.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, StoreValue>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| SaveError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(SaveError::Io { path, source }),
        };
        Ok(Self { path, entries })
    }

    /// Opens the store, starting empty if the file cannot be used.
    pub fn open_or_empty(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::open(path.clone()).unwrap_or_else(|e| {
            warn!(error = %e, "save_store_unreadable");
            Self {
                path,
                entries: BTreeMap::new(),
            }
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<&StoreValue> {
        self.entries.get(key)
    }

    fn put(&mut self, key: &str, value: StoreValue) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn flush(&mut self) -> Result<(), SaveError> {
        let text = serde_json::to_string_pretty(&self.entries).map_err(|source| SaveError::Json {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, text.as_bytes()).map_err(|source| SaveError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, bytes)?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("save.json");
    let tmp_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

pub fn join_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    ids.into_iter().collect::<Vec<_>>().join(",")
}

pub fn split_ids(joined: &str) -> BTreeSet<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveSummary {
    pub saved_at_millis: i64,
    pub play_time: f32,
    pub current_act: u32,
    pub cassettes: usize,
    pub completed_levels: usize,
    pub game_completed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SaveSystem<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SaveSystem<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn save(&mut self, progress: &Progression, now_millis: i64) -> Result<(), SaveError> {
        let store = &mut self.store;
        store.put_int(KEY_HEALTH, progress.health() as i32);
        store.put_int(KEY_ENERGY, progress.energy() as i32);
        store.put_int(KEY_ACT, progress.current_act as i32);
        store.put_int(KEY_LEVEL, progress.current_level as i32);
        store.put_float(KEY_PLAY_TIME, progress.play_time());
        store.put_bool(KEY_GAME_COMPLETED, progress.game_completed());

        let sets: [(&str, String); 7] = [
            (KEY_CASSETTES, join_ids(progress.collected_cassettes().iter().map(String::as_str))),
            (KEY_ABILITIES, join_ids(progress.unlocked_abilities().iter().map(|a| a.id()))),
            (KEY_LEVELS, join_ids(progress.completed_levels().iter().map(String::as_str))),
            (KEY_SECRETS, join_ids(progress.found_secrets().iter().map(String::as_str))),
            (KEY_MEMORIES, join_ids(progress.unlocked_memories().iter().map(String::as_str))),
            (KEY_DIARIES, join_ids(progress.read_diaries().iter().map(String::as_str))),
            (KEY_CUTSCENES, join_ids(progress.watched_cutscenes().iter().map(String::as_str))),
        ];
        for (key, joined) in &sets {
            store.put_string(key, joined);
        }

        store.put_long(KEY_SAVE_TIME, now_millis.max(1));
        store.flush()?;
        info!(
            play_time = progress.play_time(),
            cassettes = progress.cassette_count(),
            "game_saved"
        );
        Ok(())
    }

    /// Reads a complete progression. Nothing is returned unless every entry
    /// is well-formed.
    pub fn load(&self) -> Result<Progression, SaveError> {
        if !self.has_save() {
            return Err(SaveError::NoSave);
        }
        let store = &self.store;

        let mut progress = Progression::default();
        progress.health = bounded(store, KEY_HEALTH, MAX_HEALTH)?;
        progress.energy = bounded(store, KEY_ENERGY, MAX_ENERGY)?;
        progress.current_act = bounded(store, KEY_ACT, u32::MAX)?;
        progress.current_level = bounded(store, KEY_LEVEL, u32::MAX)?;
        progress.play_time = match store.get(KEY_PLAY_TIME) {
            None => 0.0,
            Some(StoreValue::Float(t)) if t.is_finite() && *t >= 0.0 => *t,
            Some(other) => return Err(corrupt(KEY_PLAY_TIME, other, "non-negative float")),
        };
        progress.game_completed = match store.get(KEY_GAME_COMPLETED) {
            None => false,
            Some(StoreValue::Bool(b)) => *b,
            Some(other) => return Err(corrupt(KEY_GAME_COMPLETED, other, "bool")),
        };

        progress.collected_cassettes = id_set(store, KEY_CASSETTES)?;
        progress.completed_levels = id_set(store, KEY_LEVELS)?;
        progress.found_secrets = id_set(store, KEY_SECRETS)?;
        progress.unlocked_memories = id_set(store, KEY_MEMORIES)?;
        progress.read_diaries = id_set(store, KEY_DIARIES)?;
        progress.watched_cutscenes = id_set(store, KEY_CUTSCENES)?;
        progress.unlocked_abilities = id_set(store, KEY_ABILITIES)?
            .iter()
            .map(|id| {
                Ability::from_id(id).ok_or_else(|| SaveError::Corrupt {
                    key: KEY_ABILITIES.to_string(),
                    reason: format!("unknown ability {id}"),
                })
            })
            .collect::<Result<_, _>>()?;

        info!(play_time = progress.play_time, "game_loaded");
        Ok(progress)
    }

    pub fn has_save(&self) -> bool {
        self.store.get_long(KEY_SAVE_TIME).is_some_and(|t| t > 0)
    }

    pub fn delete_save(&mut self) -> Result<(), SaveError> {
        self.store.clear();
        self.store.flush()?;
        info!("save_deleted");
        Ok(())
    }

    pub fn save_info(&self) -> Option<SaveSummary> {
        if !self.has_save() {
            return None;
        }
        let count = |key: &str| self.store.get_string(key).map(|s| split_ids(s).len()).unwrap_or(0);
        Some(SaveSummary {
            saved_at_millis: self.store.get_long(KEY_SAVE_TIME).unwrap_or(0),
            play_time: self.store.get_float(KEY_PLAY_TIME).unwrap_or(0.0),
            current_act: self.store.get_int(KEY_ACT).unwrap_or(1).max(1) as u32,
            cassettes: count(KEY_CASSETTES),
            completed_levels: count(KEY_LEVELS),
            game_completed: self.store.get_bool(KEY_GAME_COMPLETED).unwrap_or(false),
        })
    }

    pub fn auto_save(&mut self, progress: &Progression, now_millis: i64) -> Result<bool, SaveError> {
        if progress.play_time() <= 0.0 {
            return Ok(false);
        }
        self.save(progress, now_millis)?;
        Ok(true)
    }
}

fn corrupt(key: &str, found: &StoreValue, expected: &str) -> SaveError {
    SaveError::Corrupt {
        key: key.to_string(),
        reason: format!("expected {expected}, found {} {:?}", found.type_name(), found),
    }
}

fn bounded(store: &impl KeyValueStore, key: &str, max: u32) -> Result<u32, SaveError> {
    match store.get(key) {
        None => Err(SaveError::Corrupt {
            key: key.to_string(),
            reason: "missing".to_string(),
        }),
        Some(StoreValue::Int(v)) if *v >= 0 && (*v as u32) <= max => Ok(*v as u32),
        Some(other) => Err(corrupt(key, other, &format!("int in 0..={max}"))),
    }
}

fn id_set(store: &impl KeyValueStore, key: &str) -> Result<BTreeSet<String>, SaveError> {
    match store.get(key) {
        None => Ok(BTreeSet::new()),
        Some(StoreValue::Str(joined)) => Ok(split_ids(joined)),
        Some(other) => Err(corrupt(key, other, "string")),
    }
}
