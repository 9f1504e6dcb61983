// Repository module structure
pub mod errors;
mod communication;
mod reading;
mod subject;
mod task;

use chrono::{DateTime, Utc};

// Re-export commonly used types
pub use errors::RepositoryError;
pub use communication::{CommunicationRepositoryTrait, InMemoryCommunicationRepository};
pub use reading::{InMemoryReadingRepository, ReadingRepositoryTrait};
pub use subject::{InMemorySubjectRepository, SubjectRepositoryTrait};
pub use task::{InMemoryTaskRepository, TaskRepositoryTrait};

/// Parse an RFC3339 timestamp stored as a string.
///
/// Stored timestamps are written by the domain layer and should always parse;
/// a failure indicates a corrupt record and is surfaced as `DateParse`.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::DateParse(format!("{value}: {e}")))
}
