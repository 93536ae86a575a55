use crate::adapters::couriers::{build_tracker, COURIER_IDS};
use crate::adapters::http::build_client;
use crate::config::toml_config::TrackerConfig;
use crate::domain::ports::CourierTracker;
use crate::utils::error::{Result, TrackError};
use std::sync::Arc;

struct RegistryEntry {
    id: String,
    tracker: Arc<dyn CourierTracker>,
}

/// Courier id → adapter table.
///
/// Built once at start-up and then shared read-only (usually behind an
/// `Arc`); nothing can be registered after construction ends.
#[derive(Default)]
pub struct CourierRegistry {
    entries: Vec<RegistryEntry>,
}

fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

impl CourierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder step; ids are stored trimmed and lower-cased and must be unique.
    pub fn register(mut self, id: &str, tracker: Arc<dyn CourierTracker>) -> Result<Self> {
        let id = normalize_id(id);
        if id.is_empty() {
            return Err(TrackError::ConfigValidationError {
                field: "couriers".to_string(),
                message: "courier identifier cannot be empty".to_string(),
            });
        }
        if self.entries.iter().any(|entry| entry.id == id) {
            return Err(TrackError::ConfigValidationError {
                field: format!("couriers.{}", id),
                message: "courier registered twice".to_string(),
            });
        }

        self.entries.push(RegistryEntry { id, tracker });
        Ok(self)
    }

    /// Registers every enabled built-in courier, all sharing one http client.
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        let client = build_client(&config.http_settings())?;
        let mut registry = Self::new();

        for id in COURIER_IDS {
            if !config.courier_enabled(id) {
                tracing::debug!("Courier {} disabled by configuration", id);
                continue;
            }
            if let Some(tracker) = build_tracker(id, client.clone(), config.base_url(id)) {
                registry = registry.register(id, tracker)?;
            }
        }

        tracing::debug!("Registered {} couriers", registry.len());
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn CourierTracker>> {
        let id = normalize_id(id);
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| Arc::clone(&entry.tracker))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Identifiers in registration order.
    pub fn list_all(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for CourierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.list_all()).finish()
    }
}
