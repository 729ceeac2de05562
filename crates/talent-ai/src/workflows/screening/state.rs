//! Applies stage decisions to application records as single, idempotent
//! overwrites. Re-running screening replaces the verdict fields wholesale;
//! only the audit trail is append-only.

use chrono::{DateTime, Utc};

use super::domain::{
    ApplicationStatus, AuditAction, CvStatus, InterviewHistoryEntry, PipelineStatus,
    PreScreeningAnswer, PreScreeningAnswerInput, ScreeningVerdict, StateClass,
};
use super::evaluation::StageDecision;
use super::repository::ApplicationRecord;

pub(crate) const CV_SCREENING_STAGE: &str = "CV Screening";
pub(crate) const AI_INTERVIEW_STAGE: &str = "AI Interview";
pub(crate) const PENDING_AI_INTERVIEW_STAGE: &str = "Pending AI Interview";
pub(crate) const NO_CV_REASON: &str = "Applicant has no CV uploaded.";

/// Overwrite the verdict fields and apply the stage decision. Returns the
/// audit entry for stage-changing transitions, which the caller must append.
pub(crate) fn apply_verdict(
    record: &mut ApplicationRecord,
    verdict: &ScreeningVerdict,
    decision: &StageDecision,
    actor: &str,
    now: DateTime<Utc>,
) -> Option<InterviewHistoryEntry> {
    record.cv_status = Some(CvStatus::Classified(verdict.result));
    record.cv_screening_reason = Some(verdict.reason.clone());
    record.confidence = Some(verdict.confidence);
    record.job_fit_score = Some(verdict.job_fit_score);
    record.cv_setting_result = Some(decision.cv_setting_result);
    record.state_class = Some(decision.state_class);
    record.updated_at = now;

    let Some(status) = decision.status else {
        // Preview analysis records the verdict without touching the stage.
        return None;
    };

    record.status = status;
    if let Some(step) = decision.current_step {
        record.current_step = step.to_string();
    }
    record
        .status_date
        .insert(CV_SCREENING_STAGE.to_string(), now);
    if decision.promoted {
        record
            .status_date
            .insert(AI_INTERVIEW_STAGE.to_string(), now);
    }
    if decision.dropped {
        record.application_status = ApplicationStatus::Dropped;
    }

    decision.audit.map(|action| {
        let to_stage = match action {
            AuditAction::AutoPromoted => Some(PENDING_AI_INTERVIEW_STAGE.to_string()),
            AuditAction::Dropped => None,
        };
        InterviewHistoryEntry::new(
            record.application_id.clone(),
            CV_SCREENING_STAGE,
            to_stage,
            action,
            actor,
            now,
        )
    })
}

/// Short-circuit for applicants who never uploaded a CV: mark the record
/// without invoking any provider.
pub(crate) fn apply_no_cv(record: &mut ApplicationRecord, now: DateTime<Utc>) {
    record.cv_status = Some(CvStatus::NoCv);
    record.cv_screening_reason = Some(NO_CV_REASON.to_string());
    record.cv_setting_result = None;
    record.state_class = Some(StateClass::Muted);
    record.updated_at = now;
}

/// Persist normalized answers and advance the data-collection gate. Entries
/// without an `answer` value are dropped, not persisted.
pub(crate) fn apply_pre_screening(
    record: &mut ApplicationRecord,
    answers: Vec<PreScreeningAnswerInput>,
    now: DateTime<Utc>,
) -> Vec<PreScreeningAnswer> {
    let cleaned: Vec<PreScreeningAnswer> = answers
        .into_iter()
        .filter_map(|input| {
            let answer = input.answer?;
            Some(PreScreeningAnswer {
                question_id: input.question_id.or(input.id),
                question: input.question.unwrap_or_default(),
                answer,
                answer_type: input.answer_type,
            })
        })
        .collect();

    record.pre_screening_answers = cleaned.clone();
    record.status = PipelineStatus::ForCvUpload;
    record.updated_at = now;
    cleaned
}
