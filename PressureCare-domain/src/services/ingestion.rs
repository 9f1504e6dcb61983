use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;
use validator::Validate;

use crate::clock::Clock;
use crate::entities::communication::Communication;
use crate::entities::conversions::{
    convert_to_data_reading, convert_to_data_task, convert_to_domain_communication,
    convert_to_domain_reading, convert_to_domain_subject, convert_to_domain_task,
};
use crate::entities::reading::{CreateReadingRequest, Reading};
use crate::entities::subject::Subject;
use crate::entities::task::WorkflowTask;
use crate::entities::triage::TriageDecision;
use crate::services::task_factory::{StaffDirectory, WorkflowTaskFactory};
use crate::services::trend::analyze_trend;
use crate::services::triage::TriageScorer;
use pressure_care_data::repository::{
    CommunicationRepositoryTrait, ReadingRepositoryTrait, RepositoryError, SubjectRepositoryTrait,
    TaskRepositoryTrait,
};

/// Reading ingestion errors
#[derive(Debug, Error)]
pub enum IngestionServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The reading references a member that does not exist. Nothing is
    /// persisted in this case.
    #[error("Subject not found: {0}")]
    SubjectNotFound(Uuid),

    /// The reading to re-triage does not exist
    #[error("Reading not found: {0}")]
    ReadingNotFound(Uuid),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),

    /// Stored record could not be converted to a domain entity
    #[error("Conversion error: {0}")]
    Conversion(String),
}

/// Everything one ingested reading produced
#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    pub reading: Reading,
    pub decision: TriageDecision,
    pub task: Option<WorkflowTask>,
}

/// Runs the reading-creation pipeline as one logical unit: validate, load the
/// member, classify, persist the reading, analyze trend, triage, and create
/// the follow-up task an actionable decision calls for.
///
/// Task creation is keyed on the source reading id, so retrying the unit for
/// a reading never produces a duplicate task.
pub struct ReadingIngestionService<R, S, T, C, D>
where
    R: ReadingRepositoryTrait,
    S: SubjectRepositoryTrait,
    T: TaskRepositoryTrait,
    C: CommunicationRepositoryTrait,
    D: StaffDirectory,
{
    readings: R,
    subjects: S,
    tasks: T,
    communications: C,
    factory: WorkflowTaskFactory<D>,
    scorer: TriageScorer,
    clock: Arc<dyn Clock>,
}

impl<R, S, T, C, D> ReadingIngestionService<R, S, T, C, D>
where
    R: ReadingRepositoryTrait + Send + Sync,
    S: SubjectRepositoryTrait + Send + Sync,
    T: TaskRepositoryTrait + Send + Sync,
    C: CommunicationRepositoryTrait + Send + Sync,
    D: StaffDirectory,
{
    /// Create the ingestion pipeline over its collaborators
    pub fn new(
        readings: R,
        subjects: S,
        tasks: T,
        communications: C,
        factory: WorkflowTaskFactory<D>,
        scorer: TriageScorer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            readings,
            subjects,
            tasks,
            communications,
            factory,
            scorer,
            clock,
        }
    }

    fn map_repo_error(err: RepositoryError) -> IngestionServiceError {
        IngestionServiceError::Repository(err.to_string())
    }

    /// Validate a create reading request
    pub fn validate_request(
        &self,
        request: &CreateReadingRequest,
    ) -> Result<(), IngestionServiceError> {
        if let Err(validation_errors) = request.validate() {
            let error_message = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors
                        .iter()
                        .map(|err| {
                            if let Some(msg) = &err.message {
                                msg.to_string()
                            } else {
                                format!("Invalid {field}")
                            }
                        })
                        .collect();
                    format!("{}: {}", field, error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            return Err(IngestionServiceError::Validation(error_message));
        }

        if request.systolic <= request.diastolic {
            return Err(IngestionServiceError::Validation(
                "Systolic pressure must be greater than diastolic pressure".to_string(),
            ));
        }

        Ok(())
    }

    /// Ingest one reading: classify it, persist it, triage it, and create the
    /// follow-up task if one is warranted.
    ///
    /// A missing member aborts the whole pipeline before anything is
    /// persisted. A triage decision of no action persists the reading only.
    pub async fn ingest_reading(
        &self,
        request: CreateReadingRequest,
    ) -> Result<IngestionOutcome, IngestionServiceError> {
        self.validate_request(&request)?;

        let subject = self.load_subject(request.subject_id).await?;

        let now = self.clock.now();
        let recorded_at = request.recorded_at.unwrap_or(now);
        let reading = Reading::classified(
            &subject,
            request.systolic,
            request.diastolic,
            request.heart_rate,
            recorded_at,
            request.notes,
            now,
        );
        debug!(
            reading_id = %reading.id(),
            subject_id = %subject.id,
            category = %reading.category(),
            abnormal = reading.is_abnormal(),
            "Classified incoming reading"
        );

        let prior_readings = self.load_history(subject.id, Some(reading.id())).await?;

        self.readings
            .create(convert_to_data_reading(&reading))
            .await
            .map_err(Self::map_repo_error)?;

        let (decision, task) = self
            .triage_and_build_task(&reading, &subject, &prior_readings)
            .await?;

        Ok(IngestionOutcome {
            reading,
            decision,
            task,
        })
    }

    /// Re-run triage and task creation for an already-persisted reading.
    ///
    /// This is the retry path for the creation unit: safe to call any number
    /// of times, because at most one task is ever created per reading.
    /// Returns the task the reading warrants, existing or newly created.
    pub async fn ensure_task_for_reading(
        &self,
        reading_id: Uuid,
    ) -> Result<Option<WorkflowTask>, IngestionServiceError> {
        let stored = self
            .readings
            .get_by_id(&reading_id.to_string())
            .await
            .map_err(Self::map_repo_error)?
            .ok_or(IngestionServiceError::ReadingNotFound(reading_id))?;
        let reading = convert_to_domain_reading(stored).map_err(IngestionServiceError::Conversion)?;

        let subject = self.load_subject(reading.subject_id()).await?;
        let prior_readings = self.load_history(subject.id, Some(reading.id())).await?;

        let (_, task) = self
            .triage_and_build_task(&reading, &subject, &prior_readings)
            .await?;
        Ok(task)
    }

    async fn load_subject(&self, subject_id: Uuid) -> Result<Subject, IngestionServiceError> {
        let stored = self
            .subjects
            .get_by_id(&subject_id.to_string())
            .await
            .map_err(Self::map_repo_error)?
            .ok_or(IngestionServiceError::SubjectNotFound(subject_id))?;
        convert_to_domain_subject(stored).map_err(IngestionServiceError::Conversion)
    }

    /// The member's reading history ascending, excluding `skip_reading`
    async fn load_history(
        &self,
        subject_id: Uuid,
        skip_reading: Option<Uuid>,
    ) -> Result<Vec<Reading>, IngestionServiceError> {
        let stored = self
            .readings
            .list_for_subject(&subject_id.to_string())
            .await
            .map_err(Self::map_repo_error)?;

        let mut history = Vec::with_capacity(stored.len());
        for record in stored {
            let reading =
                convert_to_domain_reading(record).map_err(IngestionServiceError::Conversion)?;
            if Some(reading.id()) != skip_reading {
                history.push(reading);
            }
        }
        Ok(history)
    }

    async fn triage_and_build_task(
        &self,
        reading: &Reading,
        subject: &Subject,
        prior_readings: &[Reading],
    ) -> Result<(TriageDecision, Option<WorkflowTask>), IngestionServiceError> {
        let now = self.clock.now();
        let config = self.scorer.config();

        let mut window = prior_readings.to_vec();
        window.push(reading.clone());
        window.sort_by_key(|r| r.recorded_at());
        let trend = analyze_trend(
            &window,
            config.trend_window_days,
            config.trend_delta_mmhg,
            now,
        );

        let since = now - Duration::days(config.recent_contact_window_days);
        let stored_comms = self
            .communications
            .list_for_subject_since(&subject.id.to_string(), since)
            .await
            .map_err(Self::map_repo_error)?;
        let mut communications: Vec<Communication> = Vec::with_capacity(stored_comms.len());
        for record in stored_comms {
            communications.push(
                convert_to_domain_communication(record)
                    .map_err(IngestionServiceError::Conversion)?,
            );
        }

        let decision = self.scorer.triage(
            reading,
            subject,
            &trend,
            &communications,
            prior_readings,
            now,
        );

        if !decision.is_actionable() {
            debug!(reading_id = %reading.id(), "Triage decided no action is needed");
            return Ok((decision, None));
        }

        // Retried units must not duplicate the reading's task
        if let Some(existing) = self
            .tasks
            .find_by_source_reading(&reading.id().to_string())
            .await
            .map_err(Self::map_repo_error)?
        {
            debug!(
                reading_id = %reading.id(),
                task_id = %existing.id,
                "Task already exists for reading; skipping creation"
            );
            let task =
                convert_to_domain_task(existing).map_err(IngestionServiceError::Conversion)?;
            return Ok((decision, Some(task)));
        }

        let task = match self
            .factory
            .create_task_if_needed(&decision, subject, reading)
            .await
        {
            Some(task) => task,
            None => return Ok((decision, None)),
        };

        self.tasks
            .create(convert_to_data_task(&task))
            .await
            .map_err(|e| {
                error!(reading_id = %reading.id(), "Failed to persist workflow task: {e}");
                Self::map_repo_error(e)
            })?;

        Ok((decision, Some(task)))
    }
}
