use serde::{Deserialize, Serialize};

/// Storage model for a workflow task.
///
/// Tasks are never physically deleted; cancelled tasks stay on record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredWorkflowTask {
    /// Unique identifier for the task
    pub id: String,

    /// Identifier of the member this task concerns
    pub subject_id: String,

    /// Identifier of the reading that triggered this task, for rule-created
    /// tasks. Used as the idempotency key when the creation unit is retried.
    pub source_reading_id: Option<String>,

    /// Identifier of the staff member the task is assigned to
    pub assigned_to: Option<String>,

    /// Short task title
    pub title: String,

    /// Task description with clinical context
    pub description: String,

    /// Priority label (low, medium, high, urgent)
    pub priority: String,

    /// Status label (pending, in_progress, completed, cancelled)
    pub status: String,

    /// When the task is due, as an RFC3339 timestamp
    pub due_date: Option<String>,

    /// When the task was completed, as an RFC3339 timestamp
    pub completed_at: Option<String>,

    /// Whether the task was generated by a triage rule rather than by staff
    pub created_by_rule: bool,

    /// When the task was created, as an RFC3339 timestamp
    pub created_at: String,
}
