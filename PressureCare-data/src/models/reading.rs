use serde::{Deserialize, Serialize};

/// Storage model for a blood pressure reading.
///
/// The clinical category is persisted alongside the raw measurement so that
/// readings stay an append-only record: the category is never recomputed
/// after the reading has been stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredReading {
    /// Unique identifier for the reading
    pub id: String,

    /// Identifier of the monitored member this reading belongs to
    pub subject_id: String,

    /// Systolic blood pressure (the higher number)
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: u16,

    /// Optional heart rate in beats per minute
    pub heart_rate: Option<u16>,

    /// When the reading was taken, as an RFC3339 timestamp
    pub recorded_at: String,

    /// Clinical category label derived at creation time
    pub category: String,

    /// Whether the reading was flagged abnormal at creation time
    pub is_abnormal: bool,

    /// Optional notes about the reading
    pub notes: Option<String>,

    /// When the reading was created in the system, as an RFC3339 timestamp
    pub created_at: String,
}
