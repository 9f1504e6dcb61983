use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use super::errors::RepositoryError;
use super::parse_timestamp;
use crate::models::reading::StoredReading;

/// Repository trait for blood pressure readings
#[async_trait]
pub trait ReadingRepositoryTrait {
    /// Store a new reading. Readings are append-only; an existing id is a
    /// validation error, never an overwrite.
    async fn create(&self, reading: StoredReading) -> Result<StoredReading, RepositoryError>;

    /// Get a reading by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<StoredReading>, RepositoryError>;

    /// Get all readings for one member, ordered by recorded time ascending
    async fn list_for_subject(&self, subject_id: &str) -> Result<Vec<StoredReading>, RepositoryError>;

    /// Get all readings
    async fn get_all(&self) -> Result<Vec<StoredReading>, RepositoryError>;
}

/// In-memory repository for blood pressure readings
#[derive(Debug, Clone, Default)]
pub struct InMemoryReadingRepository {
    readings: Arc<Mutex<HashMap<String, StoredReading>>>,
}

impl InMemoryReadingRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadingRepositoryTrait for InMemoryReadingRepository {
    async fn create(&self, reading: StoredReading) -> Result<StoredReading, RepositoryError> {
        let mut store = self
            .readings
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        if store.contains_key(&reading.id) {
            return Err(RepositoryError::Validation(format!(
                "Reading {} already exists",
                reading.id
            )));
        }
        debug!("Storing blood pressure reading: id={}", reading.id);
        store.insert(reading.id.clone(), reading.clone());
        Ok(reading)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredReading>, RepositoryError> {
        let store = self
            .readings
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store.get(id).cloned())
    }

    async fn list_for_subject(&self, subject_id: &str) -> Result<Vec<StoredReading>, RepositoryError> {
        let store = self
            .readings
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;

        let mut keyed: Vec<(chrono::DateTime<chrono::Utc>, StoredReading)> = Vec::new();
        for reading in store.values().filter(|r| r.subject_id == subject_id) {
            keyed.push((parse_timestamp(&reading.recorded_at)?, reading.clone()));
        }
        keyed.sort_by_key(|(recorded_at, _)| *recorded_at);

        Ok(keyed.into_iter().map(|(_, reading)| reading).collect())
    }

    async fn get_all(&self) -> Result<Vec<StoredReading>, RepositoryError> {
        let store = self
            .readings
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store.values().cloned().collect())
    }
}
