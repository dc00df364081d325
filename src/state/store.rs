//! Persisted key-value store for user preferences and the joke cache
//!
//! Everything lives in one JSON object on disk. Reads see the last completed
//! write; concurrent writers are serialized and the last one wins.
//!
//! Writers are only serialized within one process. The coordinator, panel and
//! countdown each do their own read-modify-write, so two processes writing at
//! the same instant can lose the other's key.
//!
//! A corrupt file fails reads but not writes: a write starts over from an
//! empty document.

use std::{path::PathBuf, sync::Arc};

use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const SELECTED_SOUND_KEY: &str = "selectedSound";
pub const LAST_JOKE_KEY: &str = "lastDadJoke";
pub const DEFAULT_SOUND: &str = "beep.mp3";

const STORE_FILE: &str = "storage.json";

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl PreferenceStore {
    /// Open (lazily) the store inside `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir.into().join(STORE_FILE),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Sound identifier chosen by the user, or the built-in default
    pub async fn selected_sound(&self) -> Result<String, String> {
        Ok(self
            .get_string(SELECTED_SOUND_KEY)
            .await?
            .unwrap_or_else(|| DEFAULT_SOUND.to_string()))
    }

    pub async fn set_selected_sound(&self, sound: &str) -> Result<(), String> {
        self.set(SELECTED_SOUND_KEY, Value::String(sound.to_string())).await
    }

    /// Most recently fetched joke, if any
    pub async fn last_joke(&self) -> Result<Option<String>, String> {
        self.get_string(LAST_JOKE_KEY).await
    }

    pub async fn set_last_joke(&self, joke: &str) -> Result<(), String> {
        self.set(LAST_JOKE_KEY, Value::String(joke.to_string())).await
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>, String> {
        let map = self.load().await?;
        Ok(match map.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), String> {
        let _guard = self.write_lock.lock().await;

        let mut map = match self.load().await {
            Ok(map) => map,
            Err(e) if self.path.exists() => {
                warn!("{}; rewriting it", e);
                Map::new()
            }
            Err(e) => return Err(e),
        };
        map.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }

        let body = serde_json::to_vec_pretty(&Value::Object(map))
            .map_err(|e| format!("Failed to encode store: {}", e))?;

        // Write to a sibling file first so readers never see a torn document
        let tmp = self.path.with_extension(format!("json.{}.tmp", std::process::id()));
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| format!("Failed to replace {}: {}", self.path.display(), e))?;

        debug!("Stored {} in {}", key, self.path.display());
        Ok(())
    }

    async fn load(&self) -> Result<Map<String, Value>, String> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(format!("Failed to read {}: {}", self.path.display(), e)),
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(format!("{} does not contain a JSON object", self.path.display())),
            Err(e) => Err(format!("Failed to parse {}: {}", self.path.display(), e)),
        }
    }
}
