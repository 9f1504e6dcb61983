use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Channel used for an outreach attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommChannel {
    Phone,
    Sms,
    Email,
}

/// Outcome of an outreach attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommOutcome {
    /// The member was reached and spoken to
    Answered,
    /// The attempt rang out with no contact
    NoAnswer,
    /// A voicemail was left without reaching the member
    Voicemail,
    /// The member was reached and declined the conversation
    Refused,
}

impl CommOutcome {
    /// Whether this attempt failed to reach the member. A refusal still
    /// counts as contact made.
    pub fn is_failed_contact(&self) -> bool {
        matches!(self, CommOutcome::NoAnswer | CommOutcome::Voicemail)
    }
}

/// One outreach attempt to a member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Communication {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub channel: CommChannel,
    pub outcome: CommOutcome,
    pub occurred_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl fmt::Display for CommChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommChannel::Phone => "phone",
            CommChannel::Sms => "sms",
            CommChannel::Email => "email",
        };
        write!(f, "{label}")
    }
}

impl FromStr for CommChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "phone" => Ok(CommChannel::Phone),
            "sms" => Ok(CommChannel::Sms),
            "email" => Ok(CommChannel::Email),
            _ => Err(format!("Invalid communication channel: {s}")),
        }
    }
}

impl fmt::Display for CommOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CommOutcome::Answered => "answered",
            CommOutcome::NoAnswer => "no_answer",
            CommOutcome::Voicemail => "voicemail",
            CommOutcome::Refused => "refused",
        };
        write!(f, "{label}")
    }
}

impl FromStr for CommOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "answered" => Ok(CommOutcome::Answered),
            "no_answer" => Ok(CommOutcome::NoAnswer),
            "voicemail" => Ok(CommOutcome::Voicemail),
            "refused" => Ok(CommOutcome::Refused),
            _ => Err(format!("Invalid communication outcome: {s}")),
        }
    }
}
