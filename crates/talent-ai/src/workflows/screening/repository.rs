use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationId, ApplicationStatus, CandidateCv, CvSettingResult, CvStatus, InterviewHistoryEntry,
    JobApplication, JobId, PipelineStatus, PreScreeningAnswer, PreScreeningQuestion,
    ScreeningPolicy, StateClass,
};

/// Persisted application record; one per candidate and job. Mutated only
/// through state-machine transitions, never deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    #[serde(rename = "interviewID")]
    pub application_id: ApplicationId,
    pub job_id: JobId,
    pub email: String,
    #[serde(rename = "name")]
    pub candidate_name: String,
    pub job_title: String,
    pub description: String,
    #[serde(default)]
    pub screening_setting: ScreeningPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_secret_prompt: Option<String>,
    #[serde(default)]
    pub pre_screening_questions: Vec<PreScreeningQuestion>,
    #[serde(default)]
    pub pre_screening_answers: Vec<PreScreeningAnswer>,
    pub application_status: ApplicationStatus,
    pub status: PipelineStatus,
    pub current_step: String,
    #[serde(default)]
    pub cv_status: Option<CvStatus>,
    #[serde(default)]
    pub cv_screening_reason: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub job_fit_score: Option<f64>,
    #[serde(default)]
    pub cv_setting_result: Option<CvSettingResult>,
    #[serde(default)]
    pub state_class: Option<StateClass>,
    #[serde(default)]
    pub status_date: BTreeMap<String, DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationRecord {
    /// Create the intake record. Jobs with pre-screening questions gate CV
    /// upload behind the pre-screening stage.
    pub fn from_application(application: JobApplication, now: DateTime<Utc>) -> Self {
        let status = if application.pre_screening_questions.is_empty() {
            PipelineStatus::ForCvUpload
        } else {
            PipelineStatus::ForPreScreening
        };

        Self {
            application_id: ApplicationId::generate(),
            job_id: application.job_id,
            email: application.email,
            candidate_name: application.candidate_name,
            job_title: application.job_title,
            description: application.description,
            screening_setting: application.screening_setting,
            cv_secret_prompt: application.cv_secret_prompt,
            pre_screening_questions: application.pre_screening_questions,
            pre_screening_answers: Vec::new(),
            application_status: ApplicationStatus::Ongoing,
            status,
            current_step: "Applied".to_string(),
            cv_status: None,
            cv_screening_reason: None,
            confidence: None,
            job_fit_score: None,
            cv_setting_result: None,
            state_class: None,
            status_date: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.application_id.clone(),
            status: self.status.label(),
            current_step: self.current_step.clone(),
            application_status: self.application_status,
            cv_status: self.cv_status.map(CvStatus::label),
            cv_screening_reason: self.cv_screening_reason.clone(),
            confidence: self.confidence,
            job_fit_score: self.job_fit_score,
            cv_setting_result: self.cv_setting_result,
            state_class: self.state_class,
        }
    }
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusView {
    #[serde(rename = "interviewID")]
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub current_step: String,
    pub application_status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_screening_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_fit_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_setting_result: Option<CvSettingResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_class: Option<StateClass>,
}

/// Document-store abstraction so the service module can be exercised in
/// isolation. Audit entries are append-only; `touch_job_activity` bumps the
/// parent job's `lastActivityAt`.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn find_by_job_and_email(
        &self,
        job_id: &JobId,
        email: &str,
    ) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn append_history(&self, entry: InterviewHistoryEntry) -> Result<(), RepositoryError>;
    fn touch_job_activity(
        &self,
        job_id: &JobId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

/// Digitized-CV collaborator; read-only to the orchestrator.
pub trait CvRepository: Send + Sync {
    fn fetch_by_email(&self, email: &str) -> Result<Option<CandidateCv>, RepositoryError>;
}

/// Org-wide screening-evaluation instructions (opaque configuration text).
pub trait InstructionsSource: Send + Sync {
    fn screening_instructions(&self) -> Result<Option<String>, RepositoryError>;
}

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
