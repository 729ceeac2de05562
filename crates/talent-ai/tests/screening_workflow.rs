//! End-to-end specifications for the screening workflow delivered through the
//! public service facade and HTTP router: intake, pre-screening, CV
//! classification, policy-driven promotion, and the audit trail.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use talent_ai::workflows::screening::{
        ApplicationId, ApplicationRecord, ApplicationRepository, CandidateCv, CvRepository,
        CvSection, InstructionsSource, InterviewHistoryEntry, JobApplication, JobId,
        PreScreeningQuestion, ProviderCascade, ProviderClient, ProviderError, RepositoryError,
        ScreeningPolicy, ScreeningRules, ScreeningService,
    };

    pub(super) const CANDIDATE_EMAIL: &str = "ines.fournier@example.com";

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

        fn fetch(
            &self,
            id: &ApplicationId,
        ) -> Result<Option<ApplicationRecord>, RepositoryError> {
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

    pub(super) struct OrgInstructions;

    impl InstructionsSource for OrgInstructions {
        fn screening_instructions(&self) -> Result<Option<String>, RepositoryError> {
            Ok(Some(
                "Compare the CV against each stated requirement before deciding.".to_string(),
            ))
        }
    }

    /// Provider double returning a fixed verdict payload.
    pub(super) struct FixedProvider {
        verdict: String,
        models: Vec<String>,
    }

    impl FixedProvider {
        pub(super) fn new(result: &str, confidence: f64, job_fit_score: f64) -> Self {
            Self {
                verdict: serde_json::json!({
                    "result": result,
                    "reason": format!("fixture verdict: {result}"),
                    "confidence": confidence,
                    "jobFitScore": job_fit_score,
                })
                .to_string(),
                models: vec!["fixture-1".to_string()],
            }
        }
    }

    #[async_trait]
    impl ProviderClient for FixedProvider {
        fn name(&self) -> &'static str {
            "fixture"
        }

        fn models(&self) -> &[String] {
            &self.models
        }

        async fn classify(&self, _model: &str, _prompt: &str) -> Result<String, ProviderError> {
            Ok(self.verdict.clone())
        }
    }

    pub(super) type WorkflowService = ScreeningService<MemoryRepository, MemoryCvs, OrgInstructions>;

    pub(super) fn build_workflow(
        provider: FixedProvider,
    ) -> (Arc<WorkflowService>, Arc<MemoryRepository>, Arc<MemoryCvs>) {
        let repository = Arc::new(MemoryRepository::default());
        let cvs = Arc::new(MemoryCvs::default());
        let cascade = Arc::new(ProviderCascade::new(vec![Box::new(provider)]));
        let service = Arc::new(ScreeningService::new(
            repository.clone(),
            cvs.clone(),
            Arc::new(OrgInstructions),
            cascade,
            ScreeningRules::default(),
        ));
        (service, repository, cvs)
    }

    pub(super) fn application(policy: ScreeningPolicy) -> JobApplication {
        JobApplication {
            job_id: JobId("job-sre-2".to_string()),
            job_title: "Site Reliability Engineer".to_string(),
            description: "Own observability and incident response tooling.".to_string(),
            email: CANDIDATE_EMAIL.to_string(),
            candidate_name: "Ines Fournier".to_string(),
            screening_setting: policy,
            cv_secret_prompt: Some("Prioritize on-call experience.".to_string()),
            pre_screening_questions: vec![PreScreeningQuestion {
                id: Some("q-oncall".to_string()),
                question: "Have you carried a production pager?".to_string(),
                question_type: Some("boolean".to_string()),
            }],
        }
    }

    pub(super) fn cv() -> CandidateCv {
        CandidateCv {
            email: CANDIDATE_EMAIL.to_string(),
            sections: vec![CvSection {
                name: "Experience".to_string(),
                content: "Five years running 24/7 platform operations.".to_string(),
            }],
        }
    }
}

use common::*;
use talent_ai::workflows::screening::{
    AnswerValue, ApplicationRepository, ApplicationStatus, AuditAction, CvSettingResult, CvStatus,
    PipelineStatus, PreScreeningAnswerInput, ScreeningPolicy, Verdict,
};

#[tokio::test]
async fn full_pipeline_promotes_a_strong_candidate() {
    let (service, repository, cvs) =
        build_workflow(FixedProvider::new("Strong Fit", 96.0, 92.0));

    let record = service
        .apply(application(ScreeningPolicy::GoodFitAndAbove))
        .expect("intake succeeds");
    assert_eq!(record.status, PipelineStatus::ForPreScreening);

    let receipt = service
        .submit_pre_screening(
            &record.application_id,
            vec![PreScreeningAnswerInput {
                question_id: Some("q-oncall".to_string()),
                id: None,
                question: Some("Have you carried a production pager?".to_string()),
                answer: Some(AnswerValue::Bool(true)),
                answer_type: Some("boolean".to_string()),
            }],
        )
        .expect("answers stored");
    assert_eq!(receipt.status, PipelineStatus::ForCvUpload);

    cvs.insert(cv());

    let outcome = service
        .screen_cv(&record.application_id, CANDIDATE_EMAIL)
        .await
        .expect("screening succeeds");

    assert_eq!(outcome.cv_status, CvStatus::Classified(Verdict::StrongFit));
    assert_eq!(outcome.status, PipelineStatus::ForAiInterview);
    assert_eq!(outcome.cv_setting_result, Some(CvSettingResult::Passed));
    assert_eq!(outcome.application_status, ApplicationStatus::Ongoing);

    let stored = repository
        .fetch(&record.application_id)
        .unwrap()
        .expect("record persists");
    assert_eq!(stored.status, PipelineStatus::ForAiInterview);
    assert_eq!(stored.current_step, "AI Interview");
    assert_eq!(stored.pre_screening_answers.len(), 1);
    assert!(stored.status_date.contains_key("AI Interview"));

    let history = repository.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, AuditAction::AutoPromoted);
    assert!(repository.job_activity(&stored.job_id).is_some());
}

#[tokio::test]
async fn full_pipeline_drops_a_no_fit_candidate() {
    let (service, repository, cvs) = build_workflow(FixedProvider::new("No Fit", 88.0, 9.0));

    let record = service
        .apply(application(ScreeningPolicy::GoodFitAndAbove))
        .expect("intake succeeds");
    cvs.insert(cv());

    let outcome = service
        .screen_cv(&record.application_id, CANDIDATE_EMAIL)
        .await
        .expect("screening succeeds");

    assert_eq!(outcome.application_status, ApplicationStatus::Dropped);
    assert_eq!(outcome.status, PipelineStatus::FailedCvScreening);

    let stored = repository
        .fetch(&record.application_id)
        .unwrap()
        .expect("record persists");
    assert_eq!(stored.application_status, ApplicationStatus::Dropped);

    let history = repository.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, AuditAction::Dropped);
}

#[tokio::test]
async fn analysis_then_screening_keeps_one_authoritative_status() {
    let (service, repository, cvs) =
        build_workflow(FixedProvider::new("Good Fit", 74.0, 66.0));

    let record = service
        .apply(application(ScreeningPolicy::OnlyStrongFit))
        .expect("intake succeeds");
    cvs.insert(cv());

    let preview = service
        .analyze_cv(&record.application_id, CANDIDATE_EMAIL)
        .await
        .expect("analysis succeeds");
    assert_eq!(preview.status, PipelineStatus::ForPreScreening, "unchanged");
    assert_eq!(preview.cv_setting_result, Some(CvSettingResult::Failed));

    let outcome = service
        .screen_cv(&record.application_id, CANDIDATE_EMAIL)
        .await
        .expect("screening succeeds");
    assert_eq!(outcome.status, PipelineStatus::FailedCvScreening);

    let stored = repository
        .fetch(&record.application_id)
        .unwrap()
        .expect("record persists");
    assert_eq!(stored.status, PipelineStatus::FailedCvScreening);
    assert!(
        repository.history().is_empty(),
        "a policy rejection of a promote-tier verdict is not audited"
    );
}
