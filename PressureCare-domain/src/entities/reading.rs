use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::entities::subject::Subject;
use crate::services::classifier::classify;

/// Clinical category for a blood pressure measurement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BpCategory {
    /// Hypotension (systolic < 90 or diastolic < 60)
    Hypotension,

    /// Normal blood pressure (systolic < 120 and diastolic < 80)
    Normal,

    /// Elevated blood pressure (systolic 120-129 and diastolic < 80)
    Elevated,

    /// Stage 1 Hypertension (systolic 130-139 or diastolic 80-89)
    Hypertension1,

    /// Stage 2 Hypertension (systolic >= 140 or diastolic >= 90,
    /// or the member's personalized thresholds)
    Hypertension2,

    /// Hypertensive crisis (systolic >= 180 or diastolic >= 120)
    HypertensiveCrisis,
}

impl BpCategory {
    /// Ordinal used to compare clinical severity across categories.
    ///
    /// Hypotension is abnormal but does not escalate the way high pressure
    /// does, so it shares the Elevated rank.
    pub fn priority_rank(&self) -> u8 {
        match self {
            BpCategory::Normal => 0,
            BpCategory::Hypotension | BpCategory::Elevated => 1,
            BpCategory::Hypertension1 => 2,
            BpCategory::Hypertension2 => 3,
            BpCategory::HypertensiveCrisis => 4,
        }
    }

    /// Whether readings in this category are flagged for follow-up
    pub fn is_abnormal(&self) -> bool {
        !matches!(self, BpCategory::Normal)
    }
}

impl fmt::Display for BpCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BpCategory::Hypotension => "Hypotension",
            BpCategory::Normal => "Normal",
            BpCategory::Elevated => "Elevated",
            BpCategory::Hypertension1 => "Hypertension Stage 1",
            BpCategory::Hypertension2 => "Hypertension Stage 2",
            BpCategory::HypertensiveCrisis => "Hypertensive Crisis",
        };
        write!(f, "{label}")
    }
}

impl FromStr for BpCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Hypotension" => Ok(BpCategory::Hypotension),
            "Normal" => Ok(BpCategory::Normal),
            "Elevated" => Ok(BpCategory::Elevated),
            "Hypertension Stage 1" => Ok(BpCategory::Hypertension1),
            "Hypertension Stage 2" => Ok(BpCategory::Hypertension2),
            "Hypertensive Crisis" => Ok(BpCategory::HypertensiveCrisis),
            _ => Err(format!("Invalid blood pressure category: {s}")),
        }
    }
}

/// One blood pressure measurement with its derived clinical category.
///
/// The category and abnormal flag are computed exactly once, at construction,
/// from the measurement and the member's effective thresholds. Readings form
/// an append-only record: no field is mutable from outside the domain crate,
/// and the only permitted change is appending a note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    pub(crate) id: Uuid,
    pub(crate) subject_id: Uuid,
    pub(crate) systolic: u16,
    pub(crate) diastolic: u16,
    pub(crate) heart_rate: Option<u16>,
    pub(crate) recorded_at: DateTime<Utc>,
    pub(crate) category: BpCategory,
    pub(crate) is_abnormal: bool,
    pub(crate) notes: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Reading {
    /// Classify a measurement against the member's effective thresholds and
    /// construct the reading
    pub fn classified(
        subject: &Subject,
        systolic: u16,
        diastolic: u16,
        heart_rate: Option<u16>,
        recorded_at: DateTime<Utc>,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let classification = classify(
            systolic,
            diastolic,
            subject.custom_systolic_threshold,
            subject.custom_diastolic_threshold,
        );

        Self {
            id: Uuid::new_v4(),
            subject_id: subject.id,
            systolic,
            diastolic,
            heart_rate,
            recorded_at,
            category: classification.category,
            is_abnormal: classification.is_abnormal,
            notes,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    pub fn systolic(&self) -> u16 {
        self.systolic
    }

    pub fn diastolic(&self) -> u16 {
        self.diastolic
    }

    pub fn heart_rate(&self) -> Option<u16> {
        self.heart_rate
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn category(&self) -> BpCategory {
        self.category
    }

    pub fn is_abnormal(&self) -> bool {
        self.is_abnormal
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append an annotation to the reading's notes. Annotations are the only
    /// permitted change to a stored reading.
    pub fn append_note(&mut self, note: &str) {
        match &mut self.notes {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(note);
            }
            None => self.notes = Some(note.to_string()),
        }
    }
}

/// Request payload for recording a new blood pressure reading
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReadingRequest {
    /// Identifier of the member the reading belongs to
    pub subject_id: Uuid,

    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 40, max = 300, message = "Systolic must be between 40 and 300"))]
    pub systolic: u16,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 20, max = 200, message = "Diastolic must be between 20 and 200"))]
    pub diastolic: u16,

    /// Optional heart rate in beats per minute
    #[validate(range(min = 20, max = 250, message = "Heart rate must be between 20 and 250"))]
    pub heart_rate: Option<u16>,

    /// Optional notes about the reading
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,

    /// When the reading was taken. Defaults to the current time if not provided.
    pub recorded_at: Option<DateTime<Utc>>,
}
