use serde::{Deserialize, Serialize};

/// Storage model for a monitored member.
///
/// Owned by the registry subsystem; the triage pipeline only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSubject {
    /// Unique identifier for the member
    pub id: String,

    /// Member's first name
    pub first_name: String,

    /// Member's last name
    pub last_name: String,

    /// Date of birth in ISO format (YYYY-MM-DD)
    pub date_of_birth: Option<String>,

    /// Self-reported gender
    pub gender: Option<String>,

    /// Personalized systolic threshold overriding the population default
    pub custom_systolic_threshold: Option<u16>,

    /// Personalized diastolic threshold overriding the population default
    pub custom_diastolic_threshold: Option<u16>,

    /// Height in inches, used for BMI scoring
    pub height_inches: Option<f64>,

    /// Weight in pounds, used for BMI scoring
    pub weight_lbs: Option<f64>,

    /// Whether the member has a hypertension diagnosis on record
    pub has_hypertension: bool,

    /// Whether the member has a diabetes diagnosis on record
    pub has_diabetes: bool,

    /// Whether the member has a heart disease diagnosis on record
    pub has_heart_disease: bool,

    /// Smoking status label (never, former, current)
    pub smoking_status: String,

    /// Activity level label (sedentary, light, moderate, active)
    pub activity_level: String,

    /// Average nightly sleep in hours
    pub average_sleep_hours: Option<f64>,

    /// Program lifecycle status label (pending, active, inactive, discharged)
    pub status: String,
}
