use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier wrapper for a candidate's application to one job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for the advertised job a candidate applied to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Pipeline stage tracked on the application record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStatus {
    #[serde(rename = "For Pre-Screening")]
    ForPreScreening,
    #[serde(rename = "For CV Upload")]
    ForCvUpload,
    #[serde(rename = "For CV Screening")]
    ForCvScreening,
    #[serde(rename = "For AI Interview")]
    ForAiInterview,
    #[serde(rename = "Failed CV Screening")]
    FailedCvScreening,
}

impl PipelineStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PipelineStatus::ForPreScreening => "For Pre-Screening",
            PipelineStatus::ForCvUpload => "For CV Upload",
            PipelineStatus::ForCvScreening => "For CV Screening",
            PipelineStatus::ForAiInterview => "For AI Interview",
            PipelineStatus::FailedCvScreening => "Failed CV Screening",
        }
    }
}

/// Orthogonal lifecycle flag; `Dropped` is terminal from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Ongoing,
    Dropped,
}

/// Six-way classification of a candidate's CV against a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Strong Fit")]
    StrongFit,
    #[serde(rename = "Good Fit")]
    GoodFit,
    #[serde(rename = "Bad Fit")]
    BadFit,
    #[serde(rename = "No Fit")]
    NoFit,
    #[serde(rename = "Ineligible CV")]
    IneligibleCv,
    #[serde(rename = "Insufficient Data")]
    InsufficientData,
}

impl Verdict {
    pub const ALL: [Verdict; 6] = [
        Verdict::StrongFit,
        Verdict::GoodFit,
        Verdict::BadFit,
        Verdict::NoFit,
        Verdict::IneligibleCv,
        Verdict::InsufficientData,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Verdict::StrongFit => "Strong Fit",
            Verdict::GoodFit => "Good Fit",
            Verdict::BadFit => "Bad Fit",
            Verdict::NoFit => "No Fit",
            Verdict::IneligibleCv => "Ineligible CV",
            Verdict::InsufficientData => "Insufficient Data",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|verdict| verdict.label() == trimmed)
    }

    /// Three-way grouping applied before the org policy is consulted.
    pub const fn tier(self) -> VerdictTier {
        match self {
            Verdict::StrongFit | Verdict::GoodFit => VerdictTier::Promote,
            Verdict::BadFit | Verdict::NoFit => VerdictTier::Drop,
            Verdict::IneligibleCv | Verdict::InsufficientData => VerdictTier::Review,
        }
    }
}

/// Grouping of verdicts used by the promotion policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictTier {
    Promote,
    Drop,
    Review,
}

/// Normalized provider output for one screening call.
///
/// Produced fresh on every run; `confidence` and `job_fit_score` are passed
/// through without clamping to the documented [0, 100] range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningVerdict {
    pub result: Verdict,
    pub reason: String,
    pub confidence: f64,
    pub job_fit_score: f64,
}

/// Stored screening state; either a real verdict or the missing-CV marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CvStatus {
    #[serde(rename = "No CV")]
    NoCv,
    #[serde(untagged)]
    Classified(Verdict),
}

impl CvStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CvStatus::NoCv => "No CV",
            CvStatus::Classified(verdict) => verdict.label(),
        }
    }
}

/// Pass/fail outcome of the org screening setting for one verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CvSettingResult {
    Passed,
    Failed,
}

/// Presentation hint derived from the screening outcome. Not authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateClass {
    #[serde(rename = "state-accepted")]
    Accepted,
    #[serde(rename = "state-good")]
    Good,
    #[serde(rename = "state-rejected")]
    Rejected,
    #[serde(rename = "state-muted")]
    Muted,
}

/// Org-configured rule converting a verdict into a pipeline decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreeningPolicy {
    #[default]
    NoAutomaticPromotion,
    GoodFitAndAbove,
    OnlyStrongFit,
}

impl ScreeningPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            ScreeningPolicy::NoAutomaticPromotion => "No Automatic Promotion",
            ScreeningPolicy::GoodFitAndAbove => "Good Fit and above",
            ScreeningPolicy::OnlyStrongFit => "Only Strong Fit",
        }
    }

    /// Unknown or absent labels fall back to the non-promoting default.
    pub fn from_label(value: &str) -> Self {
        match value.trim() {
            "Good Fit and above" => ScreeningPolicy::GoodFitAndAbove,
            "Only Strong Fit" => ScreeningPolicy::OnlyStrongFit,
            _ => ScreeningPolicy::NoAutomaticPromotion,
        }
    }
}

impl Serialize for ScreeningPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ScreeningPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(Self::from_label)
            .unwrap_or_default())
    }
}

/// One named, ordered section of a digitized CV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvSection {
    pub name: String,
    pub content: String,
}

/// Digitized CV keyed by candidate email; read-only to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCv {
    pub email: String,
    pub sections: Vec<CvSection>,
}

/// Scalar or list answer captured by a pre-screening form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
}

impl AnswerValue {
    /// Render for prompt assembly; list answers are comma-joined.
    pub fn render(&self) -> String {
        match self {
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::Number(number) => number.to_string(),
            AnswerValue::Bool(flag) => flag.to_string(),
            AnswerValue::List(items) => items.join(", "),
        }
    }
}

/// Pre-screening question configured on the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreScreeningQuestion {
    #[serde(default)]
    pub id: Option<String>,
    pub question: String,
    #[serde(rename = "type", default)]
    pub question_type: Option<String>,
}

/// Raw answer payload as submitted by the candidate-facing form.
///
/// `answer` may be absent for skipped questions; those entries are dropped
/// during normalization instead of being persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreScreeningAnswerInput {
    #[serde(default)]
    pub question_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<AnswerValue>,
    #[serde(rename = "type", default)]
    pub answer_type: Option<String>,
}

/// Normalized, persisted pre-screening answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreScreeningAnswer {
    pub question_id: Option<String>,
    pub question: String,
    pub answer: AnswerValue,
    #[serde(rename = "type")]
    pub answer_type: Option<String>,
}

/// Intake payload creating an application record for one candidate and job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    pub job_id: JobId,
    pub job_title: String,
    pub description: String,
    pub email: String,
    pub candidate_name: String,
    #[serde(default)]
    pub screening_setting: ScreeningPolicy,
    #[serde(default)]
    pub cv_secret_prompt: Option<String>,
    #[serde(default)]
    pub pre_screening_questions: Vec<PreScreeningQuestion>,
}

/// Action recorded on stage-changing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Dropped,
    #[serde(rename = "Auto-Promoted")]
    AutoPromoted,
}

impl AuditAction {
    pub const fn label(self) -> &'static str {
        match self {
            AuditAction::Dropped => "Dropped",
            AuditAction::AutoPromoted => "Auto-Promoted",
        }
    }
}

/// Append-only audit entry; created on stage-changing transitions only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewHistoryEntry {
    pub entry_id: String,
    pub application_id: ApplicationId,
    pub from_stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_stage: Option<String>,
    pub action: AuditAction,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl InterviewHistoryEntry {
    pub fn new(
        application_id: ApplicationId,
        from_stage: impl Into<String>,
        to_stage: Option<String>,
        action: AuditAction,
        actor: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            application_id,
            from_stage: from_stage.into(),
            to_stage,
            action,
            actor: actor.into(),
            created_at,
        }
    }
}
