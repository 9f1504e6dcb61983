use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::entities::reading::Reading;
use crate::entities::subject::Subject;
use crate::entities::task::{TaskPriority, WorkflowTask};
use crate::entities::triage::{StaffRole, TriageDecision};

/// Looks up an available staff member for a role.
///
/// Implemented by the staffing subsystem and injected; the factory never
/// consults a global directory.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    /// Find an available staff member for the role, if any
    async fn find_available(&self, role: StaffRole) -> Option<Uuid>;
}

/// Materializes workflow tasks from triage decisions.
///
/// The factory is a stateless constructor: it keeps nothing between calls,
/// and deduplication of tasks for a retried reading belongs to the storage
/// boundary, keyed on the source reading id.
pub struct WorkflowTaskFactory<D: StaffDirectory> {
    directory: D,
    clock: Arc<dyn Clock>,
}

impl<D: StaffDirectory> WorkflowTaskFactory<D> {
    /// Create a factory over a staff directory and clock
    pub fn new(directory: D, clock: Arc<dyn Clock>) -> Self {
        Self { directory, clock }
    }

    /// Build the workflow task a triage decision calls for.
    ///
    /// Returns `None` when the decision recommends no action. Failing to find
    /// an available staff member is not an error; the task is created
    /// unassigned.
    pub async fn create_task_if_needed(
        &self,
        decision: &TriageDecision,
        subject: &Subject,
        reading: &Reading,
    ) -> Option<WorkflowTask> {
        let role = decision.assignee_role()?;
        let priority = decision.priority().unwrap_or(TaskPriority::Medium);

        let assigned_to = self.directory.find_available(role).await;
        if assigned_to.is_none() {
            warn!(
                subject_id = %subject.id,
                role = %role,
                "No available staff for role; task will be created unassigned"
            );
        }

        let title = format!(
            "{}: {} - {}",
            title_prefix(priority),
            reading.category(),
            subject.full_name()
        );
        let description = format!(
            "Blood pressure {}/{} mmHg recorded {}. {}",
            reading.systolic(),
            reading.diastolic(),
            reading.recorded_at().format("%Y-%m-%d %H:%M UTC"),
            decision.reasoning()
        );

        debug!(subject_id = %subject.id, title = %title, "Creating rule-driven workflow task");
        Some(WorkflowTask::rule_created(
            subject.id,
            reading.id(),
            assigned_to,
            title,
            description,
            priority,
            decision.due_date(),
            self.clock.now(),
        ))
    }
}

fn title_prefix(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Urgent => "Urgent",
        TaskPriority::High => "High priority",
        TaskPriority::Medium => "Follow-up",
        TaskPriority::Low => "Routine",
    }
}
