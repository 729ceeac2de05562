use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::cascade::{CascadeError, ProviderCascade};
use super::domain::{
    ApplicationId, ApplicationStatus, CvSettingResult, CvStatus, JobApplication, PipelineStatus,
    PreScreeningAnswer, PreScreeningAnswerInput, StateClass,
};
use super::evaluation::{AdvanceMode, PromotionPolicyEngine, ScreeningRules};
use super::prompt::{build_screening_prompt, PromptError, PromptInputs};
use super::repository::{
    ApplicationRecord, ApplicationRepository, CvRepository, InstructionsSource, RepositoryError,
};
use super::state;

/// Service composing the prompt builder, provider cascade, promotion policy
/// engine, and state machine behind the three screening operations.
///
/// Each call is an independent, stateless request; racing screenings for the
/// same application resolve last-writer-wins, which is acceptable because
/// every run produces a fresh, equally valid verdict.
pub struct ScreeningService<R, C, G> {
    repository: Arc<R>,
    cvs: Arc<C>,
    instructions: Arc<G>,
    cascade: Arc<ProviderCascade>,
    engine: PromotionPolicyEngine,
}

impl<R, C, G> ScreeningService<R, C, G>
where
    R: ApplicationRepository + 'static,
    C: CvRepository + 'static,
    G: InstructionsSource + 'static,
{
    pub fn new(
        repository: Arc<R>,
        cvs: Arc<C>,
        instructions: Arc<G>,
        cascade: Arc<ProviderCascade>,
        rules: ScreeningRules,
    ) -> Self {
        Self {
            repository,
            cvs,
            instructions,
            cascade,
            engine: PromotionPolicyEngine::new(rules),
        }
    }

    /// Intake: create the application record for one candidate and job.
    pub fn apply(
        &self,
        application: JobApplication,
    ) -> Result<ApplicationRecord, ScreeningServiceError> {
        if self
            .repository
            .find_by_job_and_email(&application.job_id, &application.email)?
            .is_some()
        {
            return Err(ScreeningServiceError::Repository(RepositoryError::Conflict));
        }

        let record = ApplicationRecord::from_application(application, Utc::now());
        let stored = self.repository.insert(record)?;
        Ok(stored)
    }

    /// Full screening: classify, apply the org policy, and commit the stage
    /// transition, audit entry, and job activity touch.
    pub async fn screen_cv(
        &self,
        application_id: &ApplicationId,
        email: &str,
    ) -> Result<ScreeningOutcome, ScreeningServiceError> {
        self.classify_and_apply(application_id, email, AdvanceMode::Transition)
            .await
    }

    /// Preview analysis: identical classification, but the pipeline stage is
    /// never advanced. Verdict fields are still written.
    pub async fn analyze_cv(
        &self,
        application_id: &ApplicationId,
        email: &str,
    ) -> Result<ScreeningOutcome, ScreeningServiceError> {
        self.classify_and_apply(application_id, email, AdvanceMode::RecordOnly)
            .await
    }

    /// Store validated pre-screening answers and advance the data-collection
    /// gate to CV upload.
    pub fn submit_pre_screening(
        &self,
        application_id: &ApplicationId,
        answers: Vec<PreScreeningAnswerInput>,
    ) -> Result<PreScreeningReceipt, ScreeningServiceError> {
        let mut record = self
            .repository
            .fetch(application_id)?
            .ok_or(ScreeningServiceError::ApplicationNotFound)?;

        let cleaned = state::apply_pre_screening(&mut record, answers, Utc::now());
        let status = record.status;
        self.repository.update(record)?;

        Ok(PreScreeningReceipt {
            application_id: application_id.clone(),
            status,
            pre_screening_answers: cleaned,
        })
    }

    /// Fetch an application for API status views.
    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ScreeningServiceError> {
        self.repository
            .fetch(application_id)?
            .ok_or(ScreeningServiceError::ApplicationNotFound)
    }

    async fn classify_and_apply(
        &self,
        application_id: &ApplicationId,
        email: &str,
        mode: AdvanceMode,
    ) -> Result<ScreeningOutcome, ScreeningServiceError> {
        let mut record = self
            .repository
            .fetch(application_id)?
            .filter(|record| record.email.eq_ignore_ascii_case(email))
            .ok_or(ScreeningServiceError::ApplicationNotFound)?;

        let Some(cv) = self.cvs.fetch_by_email(email)? else {
            if mode == AdvanceMode::Transition {
                // Persist the missing-CV marker before reporting the error so
                // the pipeline view reflects why screening cannot run.
                state::apply_no_cv(&mut record, Utc::now());
                self.repository.update(record)?;
            }
            return Err(ScreeningServiceError::CvNotFound);
        };

        let instructions = self
            .instructions
            .screening_instructions()?
            .filter(|text| !text.trim().is_empty())
            .ok_or(ScreeningServiceError::Prompt(
                PromptError::MissingInstructions,
            ))?;

        let prompt = build_screening_prompt(&PromptInputs {
            job_title: &record.job_title,
            job_description: &record.description,
            candidate_name: &record.candidate_name,
            cv: &cv,
            pre_screening_answers: &record.pre_screening_answers,
            instructions: &instructions,
            secret_instructions: record.cv_secret_prompt.as_deref(),
        })?;

        let classification = self.cascade.classify(&prompt).await?;
        let decision =
            self.engine
                .decide(classification.verdict.result, record.screening_setting, mode);

        let now = Utc::now();
        let audit_entry = state::apply_verdict(
            &mut record,
            &classification.verdict,
            &decision,
            &self.engine.rules().automation_actor,
            now,
        );

        let outcome = ScreeningOutcome {
            application_id: record.application_id.clone(),
            cv_status: CvStatus::Classified(classification.verdict.result),
            cv_screening_reason: classification.verdict.reason.clone(),
            confidence: classification.verdict.confidence,
            job_fit_score: classification.verdict.job_fit_score,
            cv_setting_result: Some(decision.cv_setting_result),
            state_class: decision.state_class,
            status: record.status,
            current_step: record.current_step.clone(),
            application_status: record.application_status,
            provider: classification.provider.to_string(),
            model: classification.model.clone(),
        };

        let job_id = record.job_id.clone();
        self.repository.update(record)?;
        if let Some(entry) = audit_entry {
            self.repository.append_history(entry)?;
        }
        if mode == AdvanceMode::Transition {
            self.repository.touch_job_activity(&job_id, now)?;
        }

        Ok(outcome)
    }
}

/// Result of one screening or analysis call, reported to the boundary layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningOutcome {
    #[serde(rename = "interviewID")]
    pub application_id: ApplicationId,
    pub cv_status: CvStatus,
    pub cv_screening_reason: String,
    pub confidence: f64,
    pub job_fit_score: f64,
    pub cv_setting_result: Option<CvSettingResult>,
    pub state_class: StateClass,
    pub status: PipelineStatus,
    pub current_step: String,
    pub application_status: ApplicationStatus,
    pub provider: String,
    pub model: String,
}

/// Acknowledgement returned after pre-screening answers are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreScreeningReceipt {
    #[serde(rename = "interviewID")]
    pub application_id: ApplicationId,
    pub status: PipelineStatus,
    pub pre_screening_answers: Vec<PreScreeningAnswer>,
}

/// Error raised by the screening service.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error("no application found for the selected job")]
    ApplicationNotFound,
    #[error("no CV uploaded for this application")]
    CvNotFound,
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Cascade(#[from] CascadeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
