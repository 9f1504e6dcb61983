use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::task::TaskPriority;

/// Staff role that can receive triage-generated work
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StaffRole {
    Coach,
    NursePractitioner,
}

/// Level of intervention a triage rule recommends
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Recommendation {
    /// Reading needs no follow-up
    None,
    /// Health coach outreach
    Coach,
    /// Nurse practitioner review
    NursePractitioner,
}

impl Recommendation {
    /// Role the recommendation needs, if it is actionable
    pub fn staff_role(&self) -> Option<StaffRole> {
        match self {
            Recommendation::None => None,
            Recommendation::Coach => Some(StaffRole::Coach),
            Recommendation::NursePractitioner => Some(StaffRole::NursePractitioner),
        }
    }
}

/// Kind of observation flagged alongside a triage decision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrendFlagKind {
    /// Mean systolic pressure is rising across the trend window
    RisingBp,
    /// Repeated outreach attempts have not reached the member
    FailedOutreach,
    /// The member's demographic and history profile scores high risk
    HighRiskProfile,
    /// Readings have stayed elevated with little variation
    SustainedElevation,
}

/// Severity attached to a flagged observation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FlagSeverity {
    Low,
    Moderate,
    High,
}

/// One observation flagged during triage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlaggedTrend {
    pub kind: TrendFlagKind,
    pub severity: FlagSeverity,
}

/// Outcome of a clinician's review of a triage decision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReviewStatus {
    /// The clinician agreed with the rule-based recommendation
    Confirmed,
    /// The clinician substituted their own decision
    Overridden,
}

/// A clinician's review of a triage decision.
///
/// Recorded next to the original recommendation; the rule-produced fields are
/// never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicalReview {
    pub status: ReviewStatus,
    /// The intervention the clinician decided on
    pub clinical_decision: Recommendation,
    pub reviewed_by: Uuid,
    pub notes: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

/// Error attaching a clinical review
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// A decision is reviewed at most once
    #[error("Triage decision has already been reviewed")]
    AlreadyReviewed,
}

/// The outcome of scoring one reading against the triage rules.
///
/// The rule-produced fields (recommendation, confidence, reasoning, flags,
/// priority, due date) are fixed at construction. A clinical review may be
/// attached exactly once and lives alongside them; it never replaces them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriageDecision {
    pub(crate) recommendation: Recommendation,
    pub(crate) confidence: f64,
    pub(crate) reasoning: String,
    pub(crate) flagged_trends: Vec<FlaggedTrend>,
    pub(crate) priority: Option<TaskPriority>,
    pub(crate) due_date: Option<DateTime<Utc>>,
    pub(crate) review: Option<ClinicalReview>,
}

impl TriageDecision {
    /// Construct an actionable decision
    pub fn new(
        recommendation: Recommendation,
        confidence: f64,
        reasoning: impl Into<String>,
        flagged_trends: Vec<FlaggedTrend>,
        priority: TaskPriority,
        due_date: DateTime<Utc>,
    ) -> Self {
        Self {
            recommendation,
            confidence,
            reasoning: reasoning.into(),
            flagged_trends,
            priority: Some(priority),
            due_date: Some(due_date),
            review: None,
        }
    }

    /// Construct a decision that requires no intervention
    pub fn no_action(
        confidence: f64,
        reasoning: impl Into<String>,
        flagged_trends: Vec<FlaggedTrend>,
    ) -> Self {
        Self {
            recommendation: Recommendation::None,
            confidence,
            reasoning: reasoning.into(),
            flagged_trends,
            priority: None,
            due_date: None,
            review: None,
        }
    }

    pub fn recommendation(&self) -> Recommendation {
        self.recommendation
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn flagged_trends(&self) -> &[FlaggedTrend] {
        &self.flagged_trends
    }

    pub fn priority(&self) -> Option<TaskPriority> {
        self.priority
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Role required to act on this decision, if any
    pub fn assignee_role(&self) -> Option<StaffRole> {
        self.recommendation.staff_role()
    }

    /// Whether this decision should spawn a workflow task
    pub fn is_actionable(&self) -> bool {
        self.recommendation != Recommendation::None
    }

    /// The clinical review, if one has been recorded
    pub fn review(&self) -> Option<&ClinicalReview> {
        self.review.as_ref()
    }

    /// Record the clinician's review. Fails if the decision was already
    /// reviewed; the rule-produced fields are untouched either way.
    pub fn attach_review(&mut self, review: ClinicalReview) -> Result<(), ReviewError> {
        if self.review.is_some() {
            return Err(ReviewError::AlreadyReviewed);
        }
        self.review = Some(review);
        Ok(())
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Recommendation::None => "none",
            Recommendation::Coach => "coach",
            Recommendation::NursePractitioner => "nurse_practitioner",
        };
        write!(f, "{label}")
    }
}

impl FromStr for Recommendation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Recommendation::None),
            "coach" => Ok(Recommendation::Coach),
            "nurse_practitioner" => Ok(Recommendation::NursePractitioner),
            _ => Err(format!("Invalid recommendation: {s}")),
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StaffRole::Coach => "coach",
            StaffRole::NursePractitioner => "nurse_practitioner",
        };
        write!(f, "{label}")
    }
}
