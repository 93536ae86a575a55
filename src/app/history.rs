use crate::config::cli::LocalStorage;
use crate::core::Storage;
use crate::utils::error::{Result, TrackError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub tracking_number: String,
    pub courier: String,
    #[serde(default)]
    pub alias: String,
}

/// Saved tracking numbers, stored as a JSON array in a single file.
pub struct HistoryStore<S: Storage> {
    storage: S,
    file_name: String,
}

impl HistoryStore<LocalStorage> {
    /// 以完整檔案路徑建立 (例如 ~/.parcel-track/history.json)
    pub fn at_path(path: &Path) -> Self {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "history.json".to_string());
        Self::new(LocalStorage::new(parent), file_name)
    }
}

impl<S: Storage> HistoryStore<S> {
    pub fn new(storage: S, file_name: impl Into<String>) -> Self {
        Self {
            storage,
            file_name: file_name.into(),
        }
    }

    /// 檔案不存在或內容損毀時視為空白歷史
    pub async fn load(&self) -> Result<Vec<HistoryEntry>> {
        let data = match self.storage.read_file(&self.file_name).await {
            Ok(data) => data,
            Err(TrackError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_slice(&data) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!("History file {} is unreadable, ignoring it: {}", self.file_name, e);
                Ok(Vec::new())
            }
        }
    }

    async fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        let json_data = serde_json::to_string_pretty(entries)?;
        self.storage
            .write_file(&self.file_name, json_data.as_bytes())
            .await
    }

    pub async fn find(&self, tracking_number: &str) -> Result<Option<HistoryEntry>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|entry| entry.tracking_number == tracking_number))
    }

    /// Saves a number, or updates its courier. Returns `true` for a new entry.
    pub async fn add(&self, tracking_number: &str, courier: &str) -> Result<bool> {
        let mut entries = self.load().await?;

        let added = match entries
            .iter_mut()
            .find(|entry| entry.tracking_number == tracking_number)
        {
            Some(entry) => {
                entry.courier = courier.to_string();
                false
            }
            None => {
                entries.push(HistoryEntry {
                    tracking_number: tracking_number.to_string(),
                    courier: courier.to_string(),
                    alias: String::new(),
                });
                true
            }
        };

        self.persist(&entries).await?;
        tracing::debug!("Saved {} ({}) to history", tracking_number, courier);
        Ok(added)
    }

    pub async fn remove(&self, tracking_number: &str) -> Result<bool> {
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|entry| entry.tracking_number != tracking_number);

        if entries.len() == before {
            return Ok(false);
        }
        self.persist(&entries).await?;
        Ok(true)
    }

    /// Returns `false` when the number is not in the history.
    pub async fn rename(&self, tracking_number: &str, alias: &str) -> Result<bool> {
        let mut entries = self.load().await?;

        let Some(entry) = entries
            .iter_mut()
            .find(|entry| entry.tracking_number == tracking_number)
        else {
            return Ok(false);
        };
        entry.alias = alias.to_string();

        self.persist(&entries).await?;
        Ok(true)
    }
}
