use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Priority of a workflow task. Ordered so that escalation can compare levels.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Status of a workflow task
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Completed and cancelled tasks admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}

/// An actionable follow-up item for a member.
///
/// Tasks are created by the rule-driven task factory or manually by staff.
/// Status, priority and completion time can only change through the lifecycle
/// service: the state machine rejects invalid transitions and priority never
/// decreases. Tasks are cancelled, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowTask {
    pub(crate) id: Uuid,
    pub(crate) subject_id: Uuid,
    pub(crate) source_reading_id: Option<Uuid>,
    pub(crate) assigned_to: Option<Uuid>,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) priority: TaskPriority,
    pub(crate) status: TaskStatus,
    pub(crate) due_date: Option<DateTime<Utc>>,
    pub(crate) completed_at: Option<DateTime<Utc>>,
    pub(crate) created_by_rule: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl WorkflowTask {
    /// Construct a pending task generated by a triage rule for a reading
    #[allow(clippy::too_many_arguments)]
    pub fn rule_created(
        subject_id: Uuid,
        source_reading_id: Uuid,
        assigned_to: Option<Uuid>,
        title: String,
        description: String,
        priority: TaskPriority,
        due_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            source_reading_id: Some(source_reading_id),
            assigned_to,
            title,
            description,
            priority,
            status: TaskStatus::Pending,
            due_date,
            completed_at: None,
            created_by_rule: true,
            created_at,
        }
    }

    /// Construct a pending task created manually by staff
    #[allow(clippy::too_many_arguments)]
    pub fn manual(
        subject_id: Uuid,
        assigned_to: Option<Uuid>,
        title: String,
        description: String,
        priority: TaskPriority,
        due_date: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_id,
            source_reading_id: None,
            assigned_to,
            title,
            description,
            priority,
            status: TaskStatus::Pending,
            due_date,
            completed_at: None,
            created_by_rule: false,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    pub fn source_reading_id(&self) -> Option<Uuid> {
        self.source_reading_id
    }

    pub fn assigned_to(&self) -> Option<Uuid> {
        self.assigned_to
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn created_by_rule(&self) -> bool {
        self.created_by_rule
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        };
        write!(f, "{label}")
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            "urgent" => Ok(TaskPriority::Urgent),
            _ => Err(format!("Invalid task priority: {s}")),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "cancelled" => Ok(TaskStatus::Cancelled),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert!(TaskPriority::Medium < TaskPriority::High);
        assert!(TaskPriority::High < TaskPriority::Urgent);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_rule_created_task_defaults() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let reading_id = Uuid::new_v4();
        let task = WorkflowTask::rule_created(
            Uuid::new_v4(),
            reading_id,
            None,
            "Urgent: Hypertensive Crisis - Maria Lopez".to_string(),
            "Reading 185/122 mmHg".to_string(),
            TaskPriority::Urgent,
            Some(now + chrono::Duration::hours(4)),
            now,
        );

        assert_eq!(task.status(), TaskStatus::Pending);
        assert_eq!(task.source_reading_id(), Some(reading_id));
        assert!(task.created_by_rule());
        assert_eq!(task.completed_at(), None);
    }
}
