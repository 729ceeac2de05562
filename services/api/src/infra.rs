use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use talent_ai::config::ScreeningConfig;
use talent_ai::workflows::screening::{
    ApplicationId, ApplicationRecord, ApplicationRepository, CandidateCv, CvRepository,
    InstructionsSource, InterviewHistoryEntry, JobId, RepositoryError, ScreeningRules,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
    history: Arc<Mutex<Vec<InterviewHistoryEntry>>>,
    job_activity: Arc<Mutex<HashMap<JobId, DateTime<Utc>>>>,
}

impl InMemoryApplicationRepository {
    pub(crate) fn history(&self) -> Vec<InterviewHistoryEntry> {
        self.history.lock().expect("history mutex poisoned").clone()
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.application_id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application_id) {
            guard.insert(record.application_id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_job_and_email(
        &self,
        job_id: &JobId,
        email: &str,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .find(|record| &record.job_id == job_id && record.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn append_history(&self, entry: InterviewHistoryEntry) -> Result<(), RepositoryError> {
        self.history
            .lock()
            .expect("history mutex poisoned")
            .push(entry);
        Ok(())
    }

    fn touch_job_activity(
        &self,
        job_id: &JobId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.job_activity
            .lock()
            .expect("activity mutex poisoned")
            .insert(job_id.clone(), at);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCvRepository {
    cvs: Arc<Mutex<HashMap<String, CandidateCv>>>,
}

impl InMemoryCvRepository {
    pub(crate) fn insert(&self, cv: CandidateCv) {
        self.cvs
            .lock()
            .expect("cv mutex poisoned")
            .insert(cv.email.to_ascii_lowercase(), cv);
    }
}

impl CvRepository for InMemoryCvRepository {
    fn fetch_by_email(&self, email: &str) -> Result<Option<CandidateCv>, RepositoryError> {
        let guard = self.cvs.lock().expect("cv mutex poisoned");
        Ok(guard.get(&email.to_ascii_lowercase()).cloned())
    }
}

const DEFAULT_SCREENING_INSTRUCTIONS: &str = "Compare the applicant's CV against every stated \
requirement of the job description. Weigh demonstrated experience over keyword matches.";

/// Org-wide screening instructions resolved once at startup.
#[derive(Clone)]
pub(crate) struct StaticInstructionsSource {
    text: String,
}

impl StaticInstructionsSource {
    pub(crate) fn from_env() -> Self {
        let text = std::env::var("SCREENING_INSTRUCTIONS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SCREENING_INSTRUCTIONS.to_string());
        Self { text }
    }
}

impl InstructionsSource for StaticInstructionsSource {
    fn screening_instructions(&self) -> Result<Option<String>, RepositoryError> {
        Ok(Some(self.text.clone()))
    }
}

pub(crate) fn default_screening_rules(config: &ScreeningConfig) -> ScreeningRules {
    ScreeningRules {
        automation_actor: config.automation_actor.clone(),
        ..ScreeningRules::default()
    }
}
