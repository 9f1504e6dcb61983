use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::entities::conversions::{convert_to_data_task, convert_to_domain_task};
use crate::entities::task::{TaskPriority, TaskStatus, WorkflowTask};
use pressure_care_data::repository::{RepositoryError, TaskRepositoryTrait};

/// Task lifecycle errors
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// The requested status change is not an allowed transition
    #[error("Invalid task transition: {from} -> {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    /// Task not found
    #[error("Task not found: {0}")]
    NotFound(Uuid),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),

    /// Stored record could not be converted to a domain entity
    #[error("Conversion error: {0}")]
    Conversion(String),
}

/// Whether a status change follows the task state machine.
///
/// Allowed edges: pending -> in_progress, pending -> completed,
/// in_progress -> completed, and pending or in_progress -> cancelled.
/// Completed and cancelled are terminal.
pub fn is_valid_transition(from: TaskStatus, to: TaskStatus) -> bool {
    matches!(
        (from, to),
        (TaskStatus::Pending, TaskStatus::InProgress)
            | (TaskStatus::Pending, TaskStatus::Completed)
            | (TaskStatus::Pending, TaskStatus::Cancelled)
            | (TaskStatus::InProgress, TaskStatus::Completed)
            | (TaskStatus::InProgress, TaskStatus::Cancelled)
    )
}

/// A task is overdue when its due date has passed and it is still open
pub fn is_overdue(task: &WorkflowTask, now: DateTime<Utc>) -> bool {
    match task.due_date() {
        Some(due) => due < now && !task.status().is_terminal(),
        None => false,
    }
}

/// One escalation step. Medium becomes high and high becomes urgent; urgent
/// has nowhere to go, and low tasks are never escalated.
pub fn escalated(priority: TaskPriority) -> TaskPriority {
    match priority {
        TaskPriority::Medium => TaskPriority::High,
        TaskPriority::High => TaskPriority::Urgent,
        other => other,
    }
}

/// Derived, read-only counts over a set of tasks
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskStatistics {
    pub by_status: HashMap<TaskStatus, usize>,
    pub by_priority: HashMap<TaskPriority, usize>,
    pub overdue_count: usize,
    pub due_today_count: usize,
}

/// Compute statistics for a set of tasks at the given instant
pub fn task_statistics(tasks: &[WorkflowTask], now: DateTime<Utc>) -> TaskStatistics {
    let mut stats = TaskStatistics::default();
    let today = now.date_naive();

    for task in tasks {
        *stats.by_status.entry(task.status()).or_insert(0) += 1;
        *stats.by_priority.entry(task.priority()).or_insert(0) += 1;

        if is_overdue(task, now) {
            stats.overdue_count += 1;
        }
        if !task.status().is_terminal()
            && task.due_date().is_some_and(|due| due.date_naive() == today)
        {
            stats.due_today_count += 1;
        }
    }

    stats
}

/// Owns workflow task state transitions, assignment, overdue detection and
/// priority escalation
pub struct TaskLifecycleService<T: TaskRepositoryTrait> {
    repository: T,
    clock: Arc<dyn Clock>,
}

impl<T: TaskRepositoryTrait + Send + Sync> TaskLifecycleService<T> {
    /// Create a new lifecycle service
    pub fn new(repository: T, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    fn map_repo_error(err: RepositoryError) -> TaskServiceError {
        TaskServiceError::Repository(err.to_string())
    }

    async fn load(&self, task_id: Uuid) -> Result<WorkflowTask, TaskServiceError> {
        let stored = self
            .repository
            .get_by_id(&task_id.to_string())
            .await
            .map_err(Self::map_repo_error)?
            .ok_or(TaskServiceError::NotFound(task_id))?;
        convert_to_domain_task(stored).map_err(TaskServiceError::Conversion)
    }

    async fn persist(&self, task: &WorkflowTask) -> Result<(), TaskServiceError> {
        self.repository
            .update(convert_to_data_task(task))
            .await
            .map_err(Self::map_repo_error)?;
        Ok(())
    }

    /// Create a task manually on behalf of staff
    pub async fn create_manual(
        &self,
        subject_id: Uuid,
        assigned_to: Option<Uuid>,
        title: String,
        description: String,
        priority: TaskPriority,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<WorkflowTask, TaskServiceError> {
        let task = WorkflowTask::manual(
            subject_id,
            assigned_to,
            title,
            description,
            priority,
            due_date,
            self.clock.now(),
        );
        self.repository
            .create(convert_to_data_task(&task))
            .await
            .map_err(Self::map_repo_error)?;
        Ok(task)
    }

    /// Apply a status change, enforcing the state machine.
    ///
    /// Transitioning to completed stamps the completion time; an invalid
    /// transition is rejected without touching stored state. When
    /// `completed_by` is given on completion, the task is attributed to that
    /// staff member.
    pub async fn update_status(
        &self,
        task_id: Uuid,
        new_status: TaskStatus,
        completed_by: Option<Uuid>,
    ) -> Result<WorkflowTask, TaskServiceError> {
        let mut task = self.load(task_id).await?;

        if !is_valid_transition(task.status(), new_status) {
            return Err(TaskServiceError::InvalidTransition {
                from: task.status(),
                to: new_status,
            });
        }

        task.status = new_status;
        if new_status == TaskStatus::Completed {
            task.completed_at = Some(self.clock.now());
            if let Some(user_id) = completed_by {
                task.assigned_to = Some(user_id);
            }
        }

        debug!(task_id = %task_id, status = %new_status, "Task status updated");
        self.persist(&task).await?;
        Ok(task)
    }

    /// Reassign a task to another staff member. The status is unchanged.
    pub async fn assign(
        &self,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<WorkflowTask, TaskServiceError> {
        let mut task = self.load(task_id).await?;
        task.assigned_to = Some(user_id);
        self.persist(&task).await?;
        Ok(task)
    }

    /// Bump every overdue open task one priority level.
    ///
    /// Returns the number of tasks escalated. Safe to run repeatedly and
    /// concurrently with task creation: priority only ever increases, and a
    /// task already at urgent is left alone.
    pub async fn run_escalation_sweep(&self) -> Result<usize, TaskServiceError> {
        let now = self.clock.now();
        let open = self
            .repository
            .list_open()
            .await
            .map_err(Self::map_repo_error)?;

        let mut escalated_count = 0;
        for stored in open {
            let mut task = convert_to_domain_task(stored).map_err(TaskServiceError::Conversion)?;
            if !is_overdue(&task, now) {
                continue;
            }
            let bumped = escalated(task.priority());
            if bumped == task.priority() {
                continue;
            }

            info!(
                task_id = %task.id(),
                from = %task.priority(),
                to = %bumped,
                "Escalating overdue task"
            );
            task.priority = bumped;
            self.persist(&task).await?;
            escalated_count += 1;
        }

        Ok(escalated_count)
    }

    /// All tasks on record for one member
    pub async fn tasks_for_subject(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<WorkflowTask>, TaskServiceError> {
        let stored = self
            .repository
            .list_for_subject(&subject_id.to_string())
            .await
            .map_err(Self::map_repo_error)?;
        let mut tasks = Vec::with_capacity(stored.len());
        for record in stored {
            tasks.push(convert_to_domain_task(record).map_err(TaskServiceError::Conversion)?);
        }
        Ok(tasks)
    }

    /// Compute task statistics across all stored tasks
    pub async fn statistics(&self) -> Result<TaskStatistics, TaskServiceError> {
        let stored = self
            .repository
            .get_all()
            .await
            .map_err(Self::map_repo_error)?;
        let mut tasks = Vec::with_capacity(stored.len());
        for record in stored {
            tasks.push(convert_to_domain_task(record).map_err(TaskServiceError::Conversion)?);
        }
        Ok(task_statistics(&tasks, self.clock.now()))
    }
}
