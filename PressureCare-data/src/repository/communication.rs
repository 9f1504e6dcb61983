use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::RepositoryError;
use super::parse_timestamp;
use crate::models::communication::StoredCommunication;

/// Repository trait for member outreach records
#[async_trait]
pub trait CommunicationRepositoryTrait {
    /// Store a new communication record
    async fn create(
        &self,
        communication: StoredCommunication,
    ) -> Result<StoredCommunication, RepositoryError>;

    /// Get all communications for one member at or after the given instant,
    /// ordered by occurrence ascending
    async fn list_for_subject_since(
        &self,
        subject_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoredCommunication>, RepositoryError>;
}

/// In-memory repository for outreach records
#[derive(Debug, Clone, Default)]
pub struct InMemoryCommunicationRepository {
    communications: Arc<Mutex<HashMap<String, StoredCommunication>>>,
}

impl InMemoryCommunicationRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommunicationRepositoryTrait for InMemoryCommunicationRepository {
    async fn create(
        &self,
        communication: StoredCommunication,
    ) -> Result<StoredCommunication, RepositoryError> {
        let mut store = self
            .communications
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        store.insert(communication.id.clone(), communication.clone());
        Ok(communication)
    }

    async fn list_for_subject_since(
        &self,
        subject_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoredCommunication>, RepositoryError> {
        let store = self
            .communications
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;

        let mut keyed: Vec<(DateTime<Utc>, StoredCommunication)> = Vec::new();
        for comm in store.values().filter(|c| c.subject_id == subject_id) {
            let occurred_at = parse_timestamp(&comm.occurred_at)?;
            if occurred_at >= since {
                keyed.push((occurred_at, comm.clone()));
            }
        }
        keyed.sort_by_key(|(occurred_at, _)| *occurred_at);

        Ok(keyed.into_iter().map(|(_, comm)| comm).collect())
    }
}
