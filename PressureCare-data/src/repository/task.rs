use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use super::errors::RepositoryError;
use crate::models::task::StoredWorkflowTask;

/// Repository trait for workflow tasks
#[async_trait]
pub trait TaskRepositoryTrait {
    /// Store a new task
    async fn create(&self, task: StoredWorkflowTask) -> Result<StoredWorkflowTask, RepositoryError>;

    /// Get a task by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<StoredWorkflowTask>, RepositoryError>;

    /// Replace the stored record for an existing task
    async fn update(&self, task: StoredWorkflowTask) -> Result<StoredWorkflowTask, RepositoryError>;

    /// Find the rule-created task spawned by a given reading, if any
    async fn find_by_source_reading(
        &self,
        reading_id: &str,
    ) -> Result<Option<StoredWorkflowTask>, RepositoryError>;

    /// Get all tasks for one member
    async fn list_for_subject(
        &self,
        subject_id: &str,
    ) -> Result<Vec<StoredWorkflowTask>, RepositoryError>;

    /// Get all tasks that are not in a terminal status
    async fn list_open(&self) -> Result<Vec<StoredWorkflowTask>, RepositoryError>;

    /// Get all tasks
    async fn get_all(&self) -> Result<Vec<StoredWorkflowTask>, RepositoryError>;
}

/// In-memory repository for workflow tasks
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<Mutex<HashMap<String, StoredWorkflowTask>>>,
}

impl InMemoryTaskRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepositoryTrait for InMemoryTaskRepository {
    async fn create(&self, task: StoredWorkflowTask) -> Result<StoredWorkflowTask, RepositoryError> {
        let mut store = self
            .tasks
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        if store.contains_key(&task.id) {
            return Err(RepositoryError::Validation(format!(
                "Task {} already exists",
                task.id
            )));
        }
        debug!("Storing workflow task: id={} title={}", task.id, task.title);
        store.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<StoredWorkflowTask>, RepositoryError> {
        let store = self
            .tasks
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store.get(id).cloned())
    }

    async fn update(&self, task: StoredWorkflowTask) -> Result<StoredWorkflowTask, RepositoryError> {
        let mut store = self
            .tasks
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        if !store.contains_key(&task.id) {
            return Err(RepositoryError::NotFound(format!("Task {}", task.id)));
        }
        store.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    async fn find_by_source_reading(
        &self,
        reading_id: &str,
    ) -> Result<Option<StoredWorkflowTask>, RepositoryError> {
        let store = self
            .tasks
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store
            .values()
            .find(|t| t.source_reading_id.as_deref() == Some(reading_id))
            .cloned())
    }

    async fn list_for_subject(
        &self,
        subject_id: &str,
    ) -> Result<Vec<StoredWorkflowTask>, RepositoryError> {
        let store = self
            .tasks
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store
            .values()
            .filter(|t| t.subject_id == subject_id)
            .cloned()
            .collect())
    }

    async fn list_open(&self) -> Result<Vec<StoredWorkflowTask>, RepositoryError> {
        let store = self
            .tasks
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store
            .values()
            .filter(|t| t.status == "pending" || t.status == "in_progress")
            .cloned()
            .collect())
    }

    async fn get_all(&self) -> Result<Vec<StoredWorkflowTask>, RepositoryError> {
        let store = self
            .tasks
            .lock()
            .map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(id: &str, status: &str, source_reading_id: Option<&str>) -> StoredWorkflowTask {
        StoredWorkflowTask {
            id: id.to_string(),
            subject_id: "s-1".to_string(),
            source_reading_id: source_reading_id.map(str::to_string),
            assigned_to: None,
            title: "Follow-up: Hypertension Stage 2 - Maria Lopez".to_string(),
            description: "Reading 152/96 mmHg".to_string(),
            priority: "medium".to_string(),
            status: status.to_string(),
            due_date: Some("2026-03-06T08:00:00Z".to_string()),
            completed_at: None,
            created_by_rule: true,
            created_at: "2026-03-01T08:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_source_reading() {
        let repo = InMemoryTaskRepository::new();
        repo.create(sample_task("t-1", "pending", Some("r-1")))
            .await
            .unwrap();

        let found = repo.find_by_source_reading("r-1").await.unwrap();
        assert_eq!(found.unwrap().id, "t-1");
        assert!(repo.find_by_source_reading("r-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_task() {
        let repo = InMemoryTaskRepository::new();
        let result = repo.update(sample_task("t-1", "pending", None)).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_open_excludes_terminal_statuses() {
        let repo = InMemoryTaskRepository::new();
        repo.create(sample_task("t-1", "pending", None)).await.unwrap();
        repo.create(sample_task("t-2", "in_progress", None)).await.unwrap();
        repo.create(sample_task("t-3", "completed", None)).await.unwrap();
        repo.create(sample_task("t-4", "cancelled", None)).await.unwrap();

        let open = repo.list_open().await.unwrap();
        let mut ids: Vec<String> = open.into_iter().map(|t| t.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["t-1", "t-2"]);
    }
}
