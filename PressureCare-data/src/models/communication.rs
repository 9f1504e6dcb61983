use serde::{Deserialize, Serialize};

/// Storage model for one outreach attempt to a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCommunication {
    /// Unique identifier for the communication
    pub id: String,

    /// Identifier of the member that was contacted
    pub subject_id: String,

    /// Channel label (phone, sms, email)
    pub channel: String,

    /// Outcome label (answered, no_answer, voicemail, refused)
    pub outcome: String,

    /// When the contact attempt happened, as an RFC3339 timestamp
    pub occurred_at: String,

    /// Optional notes about the attempt
    pub notes: Option<String>,
}
