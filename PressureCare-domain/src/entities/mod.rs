// Domain entities and value objects
pub mod communication;
pub mod conversions;
pub mod reading;
pub mod subject;
pub mod task;
pub mod triage;

// Re-export common types for easier imports
pub use communication::{CommChannel, CommOutcome, Communication};
pub use reading::{BpCategory, CreateReadingRequest, Reading};
pub use subject::{ActivityLevel, Lifestyle, MedicalHistory, SmokingStatus, Subject, SubjectStatus};
pub use task::{TaskPriority, TaskStatus, WorkflowTask};
pub use triage::{
    ClinicalReview, FlagSeverity, FlaggedTrend, Recommendation, ReviewStatus, StaffRole,
    TrendFlagKind, TriageDecision,
};
