use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Program lifecycle state for a monitored member.
///
/// Owned by the registry subsystem; the triage pipeline reads it but never
/// changes it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubjectStatus {
    /// Registered but not yet approved into the program
    Pending,
    /// Actively monitored
    Active,
    /// Temporarily not monitored
    Inactive,
    /// Left the program
    Discharged,
}

/// Smoking status used for risk-factor scoring
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SmokingStatus {
    #[default]
    Never,
    Former,
    Current,
}

/// Self-reported activity level used for risk-factor scoring
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
}

/// Diagnoses on record for a member
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MedicalHistory {
    pub hypertension: bool,
    pub diabetes: bool,
    pub heart_disease: bool,
}

/// Lifestyle attributes used for risk-factor scoring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Lifestyle {
    pub smoking: SmokingStatus,
    pub activity: ActivityLevel,
    /// Average nightly sleep in hours
    pub average_sleep_hours: Option<f64>,
}

/// A monitored program member.
///
/// The triage pipeline only reads this record; registration, approval and
/// updates belong to the registry subsystem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subject {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    /// Personalized systolic threshold. Replaces the population default of
    /// 140 only when the diastolic override is also set.
    pub custom_systolic_threshold: Option<u16>,
    /// Personalized diastolic threshold. Replaces the population default of
    /// 90 only when the systolic override is also set.
    pub custom_diastolic_threshold: Option<u16>,
    /// Height in inches
    pub height_inches: Option<f64>,
    /// Weight in pounds
    pub weight_lbs: Option<f64>,
    pub medical_history: MedicalHistory,
    pub lifestyle: Lifestyle,
    pub status: SubjectStatus,
}

impl Subject {
    /// Member's display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Age in whole years on the given date, if the date of birth is known
    pub fn age_years(&self, on: NaiveDate) -> Option<u32> {
        self.date_of_birth.and_then(|dob| on.years_since(dob))
    }

    /// Body-mass index from imperial height and weight
    pub fn bmi(&self) -> Option<f64> {
        let height_m = self.height_inches? * 0.0254;
        let weight_kg = self.weight_lbs? * 0.453592;
        if height_m <= 0.0 {
            return None;
        }
        Some(weight_kg / (height_m * height_m))
    }
}

#[cfg(test)]
impl Subject {
    /// A healthy active member with no custom thresholds, for tests
    pub fn sample(first_name: &str, last_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 6, 15),
            gender: None,
            custom_systolic_threshold: None,
            custom_diastolic_threshold: None,
            height_inches: Some(66.0),
            weight_lbs: Some(150.0),
            medical_history: MedicalHistory::default(),
            lifestyle: Lifestyle::default(),
            status: SubjectStatus::Active,
        }
    }
}

impl fmt::Display for SubjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubjectStatus::Pending => "pending",
            SubjectStatus::Active => "active",
            SubjectStatus::Inactive => "inactive",
            SubjectStatus::Discharged => "discharged",
        };
        write!(f, "{label}")
    }
}

impl FromStr for SubjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubjectStatus::Pending),
            "active" => Ok(SubjectStatus::Active),
            "inactive" => Ok(SubjectStatus::Inactive),
            "discharged" => Ok(SubjectStatus::Discharged),
            _ => Err(format!("Invalid subject status: {s}")),
        }
    }
}

impl fmt::Display for SmokingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SmokingStatus::Never => "never",
            SmokingStatus::Former => "former",
            SmokingStatus::Current => "current",
        };
        write!(f, "{label}")
    }
}

impl FromStr for SmokingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(SmokingStatus::Never),
            "former" => Ok(SmokingStatus::Former),
            "current" => Ok(SmokingStatus::Current),
            _ => Err(format!("Invalid smoking status: {s}")),
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
        };
        write!(f, "{label}")
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            _ => Err(format!("Invalid activity level: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let subject = Subject::sample("Maria", "Lopez");
        assert_eq!(subject.full_name(), "Maria Lopez");
    }

    #[test]
    fn test_age_years() {
        let mut subject = Subject::sample("Maria", "Lopez");
        subject.date_of_birth = NaiveDate::from_ymd_opt(1960, 3, 15);

        let before_birthday = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(subject.age_years(before_birthday), Some(65));

        let after_birthday = NaiveDate::from_ymd_opt(2026, 3, 20).unwrap();
        assert_eq!(subject.age_years(after_birthday), Some(66));

        subject.date_of_birth = None;
        assert_eq!(subject.age_years(after_birthday), None);
    }

    #[test]
    fn test_bmi_imperial_conversion() {
        let mut subject = Subject::sample("Maria", "Lopez");
        subject.height_inches = Some(66.0);
        subject.weight_lbs = Some(180.0);

        // 66in = 1.6764m, 180lbs = 81.65kg -> BMI about 29.05
        let bmi = subject.bmi().unwrap();
        assert!((bmi - 29.05).abs() < 0.05, "unexpected BMI {bmi}");

        subject.weight_lbs = None;
        assert_eq!(subject.bmi(), None);
    }
}
