use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::errors::RepositoryError;
use crate::models::subject::StoredSubject;

/// Repository trait for monitored members
#[async_trait]
pub trait SubjectRepositoryTrait {
    /// Store a new member record
    async fn create(&self, subject: StoredSubject) -> Result<StoredSubject, RepositoryError>;

    /// Get a member by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<StoredSubject>, RepositoryError>;

    /// Get all member records
    async fn get_all(&self) -> Result<Vec<StoredSubject>, RepositoryError>;
}

/// In-memory repository for member records
#[derive(Debug, Clone, Default)]
pub struct InMemorySubjectRepository {
    subjects: Arc<Mutex<HashMap<String, StoredSubject>>>,
}

impl InMemorySubjectRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubjectRepositoryTrait for InMemorySubjectRepository {
    async fn create(&self, subject: StoredSubject) -> Result<StoredSubject, RepositoryError> {
        let mut store = self
            .subjects
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        store.insert(subject.id.clone(), subject.clone());
        Ok(subject)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredSubject>, RepositoryError> {
        let store = self
            .subjects
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store.get(id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<StoredSubject>, RepositoryError> {
        let store = self
            .subjects
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_subject(id: &str) -> StoredSubject {
        StoredSubject {
            id: id.to_string(),
            first_name: "Maria".to_string(),
            last_name: "Lopez".to_string(),
            date_of_birth: Some("1961-05-14".to_string()),
            gender: Some("female".to_string()),
            custom_systolic_threshold: None,
            custom_diastolic_threshold: None,
            height_inches: Some(64.0),
            weight_lbs: Some(150.0),
            has_hypertension: true,
            has_diabetes: false,
            has_heart_disease: false,
            smoking_status: "never".to_string(),
            activity_level: "moderate".to_string(),
            average_sleep_hours: Some(7.0),
            status: "active".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_id() {
        let repo = InMemorySubjectRepository::new();
        repo.create(sample_subject("s-1")).await.unwrap();

        let fetched = repo.get_by_id("s-1").await.unwrap().unwrap();
        assert_eq!(fetched.first_name, "Maria");
    }

    #[tokio::test]
    async fn test_get_by_id_missing() {
        let repo = InMemorySubjectRepository::new();
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all() {
        let repo = InMemorySubjectRepository::new();
        repo.create(sample_subject("s-1")).await.unwrap();
        repo.create(sample_subject("s-2")).await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), 2);
    }
}
