use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use pressure_care_data::models::{
    StoredCommunication, StoredReading, StoredSubject, StoredWorkflowTask,
};

use crate::entities::communication::Communication;
use crate::entities::reading::Reading;
use crate::entities::subject::{Lifestyle, MedicalHistory, Subject};
use crate::entities::task::WorkflowTask;

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Helper function to safely parse a string ID to UUID
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {id}"))
}

/// Helper function to parse an RFC3339 timestamp from the data layer
pub fn parse_rfc3339(timestamp: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("Invalid RFC3339 timestamp: {timestamp}"))
}

/// Convert from domain entity to data model for a blood pressure reading
pub fn convert_to_data_reading(reading: &Reading) -> StoredReading {
    StoredReading {
        id: reading.id().to_string(),
        subject_id: reading.subject_id().to_string(),
        systolic: reading.systolic(),
        diastolic: reading.diastolic(),
        heart_rate: reading.heart_rate(),
        recorded_at: reading.recorded_at().to_rfc3339(),
        category: reading.category().to_string(),
        is_abnormal: reading.is_abnormal(),
        notes: reading.notes().map(str::to_string),
        created_at: reading.created_at().to_rfc3339(),
    }
}

/// Convert from data model to domain entity for a blood pressure reading.
///
/// The stored category is trusted as-is rather than recomputed, so a reading
/// keeps the classification it was given at creation time even if thresholds
/// have since changed.
pub fn convert_to_domain_reading(stored: StoredReading) -> Result<Reading, String> {
    Ok(Reading {
        id: parse_string_to_uuid(&stored.id)?,
        subject_id: parse_string_to_uuid(&stored.subject_id)?,
        systolic: stored.systolic,
        diastolic: stored.diastolic,
        heart_rate: stored.heart_rate,
        recorded_at: parse_rfc3339(&stored.recorded_at)?,
        category: stored.category.parse()?,
        is_abnormal: stored.is_abnormal,
        notes: stored.notes,
        created_at: parse_rfc3339(&stored.created_at)?,
    })
}

/// Convert from data model to domain entity for a member record
pub fn convert_to_domain_subject(stored: StoredSubject) -> Result<Subject, String> {
    let date_of_birth = stored
        .date_of_birth
        .map(|d| {
            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .map_err(|_| format!("Invalid date of birth: {d}"))
        })
        .transpose()?;

    Ok(Subject {
        id: parse_string_to_uuid(&stored.id)?,
        first_name: stored.first_name,
        last_name: stored.last_name,
        date_of_birth,
        gender: stored.gender,
        custom_systolic_threshold: stored.custom_systolic_threshold,
        custom_diastolic_threshold: stored.custom_diastolic_threshold,
        height_inches: stored.height_inches,
        weight_lbs: stored.weight_lbs,
        medical_history: MedicalHistory {
            hypertension: stored.has_hypertension,
            diabetes: stored.has_diabetes,
            heart_disease: stored.has_heart_disease,
        },
        lifestyle: Lifestyle {
            smoking: stored.smoking_status.parse()?,
            activity: stored.activity_level.parse()?,
            average_sleep_hours: stored.average_sleep_hours,
        },
        status: stored.status.parse()?,
    })
}

/// Convert from domain entity to data model for a member record
pub fn convert_to_data_subject(subject: &Subject) -> StoredSubject {
    StoredSubject {
        id: subject.id.to_string(),
        first_name: subject.first_name.clone(),
        last_name: subject.last_name.clone(),
        date_of_birth: subject.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()),
        gender: subject.gender.clone(),
        custom_systolic_threshold: subject.custom_systolic_threshold,
        custom_diastolic_threshold: subject.custom_diastolic_threshold,
        height_inches: subject.height_inches,
        weight_lbs: subject.weight_lbs,
        has_hypertension: subject.medical_history.hypertension,
        has_diabetes: subject.medical_history.diabetes,
        has_heart_disease: subject.medical_history.heart_disease,
        smoking_status: subject.lifestyle.smoking.to_string(),
        activity_level: subject.lifestyle.activity.to_string(),
        average_sleep_hours: subject.lifestyle.average_sleep_hours,
        status: subject.status.to_string(),
    }
}

/// Convert from domain entity to data model for a workflow task
pub fn convert_to_data_task(task: &WorkflowTask) -> StoredWorkflowTask {
    StoredWorkflowTask {
        id: task.id().to_string(),
        subject_id: task.subject_id().to_string(),
        source_reading_id: task.source_reading_id().map(|id| id.to_string()),
        assigned_to: task.assigned_to().map(|id| id.to_string()),
        title: task.title().to_string(),
        description: task.description().to_string(),
        priority: task.priority().to_string(),
        status: task.status().to_string(),
        due_date: task.due_date().map(|d| d.to_rfc3339()),
        completed_at: task.completed_at().map(|d| d.to_rfc3339()),
        created_by_rule: task.created_by_rule(),
        created_at: task.created_at().to_rfc3339(),
    }
}

/// Convert from data model to domain entity for a workflow task
pub fn convert_to_domain_task(stored: StoredWorkflowTask) -> Result<WorkflowTask, String> {
    Ok(WorkflowTask {
        id: parse_string_to_uuid(&stored.id)?,
        subject_id: parse_string_to_uuid(&stored.subject_id)?,
        source_reading_id: stored
            .source_reading_id
            .as_deref()
            .map(parse_string_to_uuid)
            .transpose()?,
        assigned_to: stored
            .assigned_to
            .as_deref()
            .map(parse_string_to_uuid)
            .transpose()?,
        title: stored.title,
        description: stored.description,
        priority: stored.priority.parse()?,
        status: stored.status.parse()?,
        due_date: stored.due_date.as_deref().map(parse_rfc3339).transpose()?,
        completed_at: stored
            .completed_at
            .as_deref()
            .map(parse_rfc3339)
            .transpose()?,
        created_by_rule: stored.created_by_rule,
        created_at: parse_rfc3339(&stored.created_at)?,
    })
}

/// Convert from domain entity to data model for a communication record
pub fn convert_to_data_communication(communication: &Communication) -> StoredCommunication {
    StoredCommunication {
        id: communication.id.to_string(),
        subject_id: communication.subject_id.to_string(),
        channel: communication.channel.to_string(),
        outcome: communication.outcome.to_string(),
        occurred_at: communication.occurred_at.to_rfc3339(),
        notes: communication.notes.clone(),
    }
}

/// Convert from data model to domain entity for a communication record
pub fn convert_to_domain_communication(
    stored: StoredCommunication,
) -> Result<Communication, String> {
    Ok(Communication {
        id: parse_string_to_uuid(&stored.id)?,
        subject_id: parse_string_to_uuid(&stored.subject_id)?,
        channel: stored.channel.parse()?,
        outcome: stored.outcome.parse()?,
        occurred_at: parse_rfc3339(&stored.occurred_at)?,
        notes: stored.notes,
    })
}
