use crate::infra::{
    default_screening_rules, InMemoryApplicationRepository, InMemoryCvRepository,
    StaticInstructionsSource,
};
use async_trait::async_trait;
use clap::Args;
use std::sync::Arc;
use talent_ai::config::ScreeningConfig;
use talent_ai::error::AppError;
use talent_ai::workflows::screening::{
    AnswerValue, CandidateCv, CvSection, JobApplication, JobId, PreScreeningAnswerInput,
    PreScreeningQuestion, ProviderCascade, ProviderClient, ProviderError, ScreeningPolicy,
    ScreeningService,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Verdict the demo provider returns (e.g. "Strong Fit", "No Fit")
    #[arg(long, default_value = "Strong Fit")]
    pub(crate) verdict: String,
    /// Org screening setting applied to the demo job
    #[arg(long, default_value = "Good Fit and above")]
    pub(crate) screening_setting: String,
    /// Skip the pre-screening portion of the demo
    #[arg(long)]
    pub(crate) skip_pre_screening: bool,
}

/// Offline provider double so the demo runs without API keys or network.
struct DemoProvider {
    payload: String,
    models: Vec<String>,
}

impl DemoProvider {
    fn new(verdict: &str) -> Self {
        Self {
            payload: serde_json::json!({
                "result": verdict,
                "reason": format!("Demo classification fixed to {verdict}."),
                "confidence": 90,
                "jobFitScore": 84,
            })
            .to_string(),
            models: vec!["demo-1".to_string()],
        }
    }
}

#[async_trait]
impl ProviderClient for DemoProvider {
    fn name(&self) -> &'static str {
        "demo"
    }

    fn models(&self) -> &[String] {
        &self.models
    }

    async fn classify(&self, _model: &str, _prompt: &str) -> Result<String, ProviderError> {
        Ok(self.payload.clone())
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        verdict,
        screening_setting,
        skip_pre_screening,
    } = args;

    println!("Screening workflow demo");

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let cvs = Arc::new(InMemoryCvRepository::default());
    let instructions = Arc::new(StaticInstructionsSource::from_env());
    let cascade = Arc::new(ProviderCascade::new(vec![Box::new(DemoProvider::new(
        &verdict,
    ))]));
    let service = Arc::new(ScreeningService::new(
        repository.clone(),
        cvs.clone(),
        instructions,
        cascade,
        default_screening_rules(&ScreeningConfig {
            automation_actor: "demo-screener".to_string(),
        }),
    ));

    let policy = ScreeningPolicy::from_label(&screening_setting);
    let email = "demo.candidate@example.com";
    let application = JobApplication {
        job_id: JobId("job-demo-1".to_string()),
        job_title: "Platform Engineer".to_string(),
        description: "Build and run the internal deployment platform.".to_string(),
        email: email.to_string(),
        candidate_name: "Demo Candidate".to_string(),
        screening_setting: policy,
        cv_secret_prompt: None,
        pre_screening_questions: if skip_pre_screening {
            Vec::new()
        } else {
            vec![PreScreeningQuestion {
                id: Some("q-relocate".to_string()),
                question: "Are you willing to relocate?".to_string(),
                question_type: Some("boolean".to_string()),
            }]
        },
    };

    let record = service.apply(application)?;
    println!(
        "- Application {} received -> status {}",
        record.application_id, record.status.label()
    );

    if !skip_pre_screening {
        let receipt = service.submit_pre_screening(
            &record.application_id,
            vec![PreScreeningAnswerInput {
                question_id: Some("q-relocate".to_string()),
                id: None,
                question: Some("Are you willing to relocate?".to_string()),
                answer: Some(AnswerValue::Bool(true)),
                answer_type: Some("boolean".to_string()),
            }],
        )?;
        println!(
            "- Pre-screening stored ({} answer(s)) -> status {}",
            receipt.pre_screening_answers.len(),
            receipt.status.label()
        );
    }

    cvs.insert(CandidateCv {
        email: email.to_string(),
        sections: vec![
            CvSection {
                name: "Experience".to_string(),
                content: "Six years operating Kubernetes platforms.".to_string(),
            },
            CvSection {
                name: "Education".to_string(),
                content: "MSc Software Engineering.".to_string(),
            },
        ],
    });
    println!("- Digitized CV uploaded for {email}");

    let preview = service.analyze_cv(&record.application_id, email).await?;
    println!(
        "- Preview analysis: {} (setting result {:?}) -> stage unchanged at {}",
        preview.cv_status.label(),
        preview.cv_setting_result,
        preview.status.label()
    );

    let outcome = service.screen_cv(&record.application_id, email).await?;
    println!(
        "- Screening under '{}': {} via {}/{}",
        policy.label(),
        outcome.cv_status.label(),
        outcome.provider,
        outcome.model
    );
    println!(
        "  Result: status {} | step {} | application {:?}",
        outcome.status.label(),
        outcome.current_step,
        outcome.application_status
    );
    println!("  Reason: {}", outcome.cv_screening_reason);

    let history = repository.history();
    if history.is_empty() {
        println!("  Audit trail: no stage-changing transition recorded");
    } else {
        println!("  Audit trail:");
        for entry in history {
            println!(
                "    - {} from {} to {} by {}",
                entry.action.label(),
                entry.from_stage,
                entry.to_stage.as_deref().unwrap_or("-"),
                entry.actor
            );
        }
    }

    Ok(())
}
