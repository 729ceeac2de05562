use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::workflows::screening::cascade::ProviderCascade;
use crate::workflows::screening::domain::{
    ApplicationId, CandidateCv, CvSection, InterviewHistoryEntry, JobApplication, JobId,
    PreScreeningQuestion, ScreeningPolicy,
};
use crate::workflows::screening::provider::{ProviderClient, ProviderError};
use crate::workflows::screening::repository::{
    ApplicationRecord, ApplicationRepository, CvRepository, InstructionsSource, RepositoryError,
};
use crate::workflows::screening::router::screening_router;
use crate::workflows::screening::service::ScreeningService;
use crate::workflows::screening::ScreeningRules;

pub(super) type TestService = ScreeningService<MemoryRepository, MemoryCvs, StaticInstructions>;

pub(super) const CANDIDATE_EMAIL: &str = "dana.reyes@example.com";

pub(super) fn job_application(policy: ScreeningPolicy, with_questions: bool) -> JobApplication {
    let pre_screening_questions = if with_questions {
        vec![
            PreScreeningQuestion {
                id: Some("q-visa".to_string()),
                question: "Are you authorized to work in the EU?".to_string(),
                question_type: Some("boolean".to_string()),
            },
            PreScreeningQuestion {
                id: Some("q-notice".to_string()),
                question: "What is your notice period?".to_string(),
                question_type: Some("text".to_string()),
            },
        ]
    } else {
        Vec::new()
    };

    JobApplication {
        job_id: JobId("job-backend-7".to_string()),
        job_title: "Senior Backend Engineer".to_string(),
        description: "Design and operate distributed services in Rust.".to_string(),
        email: CANDIDATE_EMAIL.to_string(),
        candidate_name: "Dana Reyes".to_string(),
        screening_setting: policy,
        cv_secret_prompt: None,
        pre_screening_questions,
    }
}

pub(super) fn candidate_cv(email: &str) -> CandidateCv {
    CandidateCv {
        email: email.to_string(),
        sections: vec![
            CvSection {
                name: "Experience".to_string(),
                content: "Eight years building payment APIs in Rust and Go.".to_string(),
            },
            CvSection {
                name: "Education".to_string(),
                content: "BSc Computer Science.".to_string(),
            },
        ],
    }
}

pub(super) fn verdict_json(result: &str, confidence: f64, job_fit_score: f64) -> String {
    serde_json::json!({
        "result": result,
        "reason": format!("classified as {result} for testing"),
        "confidence": confidence,
        "jobFitScore": job_fit_score,
    })
    .to_string()
}

/// Scripted per-model behavior for a fake provider.
pub(super) enum Script {
    Respond(String),
    NotSupported,
    Transient,
    Unavailable,
}

/// Fake provider with a recorded call log, so cascade ordering can be
/// asserted without network access.
pub(super) struct ScriptedProvider {
    name: &'static str,
    models: Vec<String>,
    scripts: HashMap<String, Script>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub(super) fn new(name: &'static str) -> Self {
        Self {
            name,
            models: Vec::new(),
            scripts: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(super) fn with_model(mut self, model: &str, script: Script) -> Self {
        self.models.push(model.to_string());
        self.scripts.insert(model.to_string(), script);
        self
    }

    /// Handle onto the call log that survives boxing into the cascade.
    pub(super) fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl ProviderClient for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn models(&self) -> &[String] {
        &self.models
    }

    async fn classify(&self, model: &str, _prompt: &str) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .expect("call log mutex poisoned")
            .push(format!("{}:{}", self.name, model));

        match self.scripts.get(model) {
            Some(Script::Respond(raw)) => Ok(raw.clone()),
            Some(Script::NotSupported) => Err(ProviderError::NotSupported(format!(
                "model {model} is not supported"
            ))),
            Some(Script::Transient) => {
                Err(ProviderError::Transient("rate limited".to_string()))
            }
            Some(Script::Unavailable) | None => Err(ProviderError::Unavailable(format!(
                "{} not configured",
                self.name
            ))),
        }
    }
}

pub(super) fn calls_of(log: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    log.lock().expect("call log mutex poisoned").clone()
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
    history: Arc<Mutex<Vec<InterviewHistoryEntry>>>,
    job_activity: Arc<Mutex<HashMap<JobId, DateTime<Utc>>>>,
}

impl MemoryRepository {
    pub(super) fn history(&self) -> Vec<InterviewHistoryEntry> {
        self.history.lock().expect("history mutex poisoned").clone()
    }

    pub(super) fn job_activity(&self, job_id: &JobId) -> Option<DateTime<Utc>> {
        self.job_activity
            .lock()
            .expect("activity mutex poisoned")
            .get(job_id)
            .copied()
    }
}

impl ApplicationRepository for MemoryRepository {
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
        guard.insert(record.application_id.clone(), record);
        Ok(())
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
            .find(|record| {
                &record.job_id == job_id && record.email.eq_ignore_ascii_case(email)
            })
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
pub(super) struct MemoryCvs {
    cvs: Arc<Mutex<HashMap<String, CandidateCv>>>,
}

impl MemoryCvs {
    pub(super) fn insert(&self, cv: CandidateCv) {
        self.cvs
            .lock()
            .expect("cv mutex poisoned")
            .insert(cv.email.to_ascii_lowercase(), cv);
    }
}

impl CvRepository for MemoryCvs {
    fn fetch_by_email(&self, email: &str) -> Result<Option<CandidateCv>, RepositoryError> {
        let guard = self.cvs.lock().expect("cv mutex poisoned");
        Ok(guard.get(&email.to_ascii_lowercase()).cloned())
    }
}

#[derive(Clone)]
pub(super) struct StaticInstructions(pub(super) Option<String>);

impl Default for StaticInstructions {
    fn default() -> Self {
        Self(Some(
            "Evaluate the candidate strictly against the job requirements.".to_string(),
        ))
    }
}

impl InstructionsSource for StaticInstructions {
    fn screening_instructions(&self) -> Result<Option<String>, RepositoryError> {
        Ok(self.0.clone())
    }
}

pub(super) fn build_service(
    providers: Vec<Box<dyn ProviderClient>>,
    rules: ScreeningRules,
) -> (Arc<TestService>, Arc<MemoryRepository>, Arc<MemoryCvs>) {
    let repository = Arc::new(MemoryRepository::default());
    let cvs = Arc::new(MemoryCvs::default());
    let instructions = Arc::new(StaticInstructions::default());
    let cascade = Arc::new(ProviderCascade::new(providers));
    let service = Arc::new(ScreeningService::new(
        repository.clone(),
        cvs.clone(),
        instructions,
        cascade,
        rules,
    ));
    (service, repository, cvs)
}

/// Apply with the given policy and upload a CV, returning the handles tests
/// need to run screening calls.
pub(super) fn applied_service(
    policy: ScreeningPolicy,
    providers: Vec<Box<dyn ProviderClient>>,
) -> (
    Arc<TestService>,
    Arc<MemoryRepository>,
    Arc<MemoryCvs>,
    ApplicationId,
) {
    let (service, repository, cvs) = build_service(providers, ScreeningRules::default());
    let record = service
        .apply(job_application(policy, false))
        .expect("application intake succeeds");
    cvs.insert(candidate_cv(CANDIDATE_EMAIL));
    (service, repository, cvs, record.application_id)
}

pub(super) fn screening_router_with_service(service: Arc<TestService>) -> axum::Router {
    screening_router(service)
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
