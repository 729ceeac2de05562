use super::super::domain::{
    AuditAction, CvSettingResult, PipelineStatus, ScreeningPolicy, StateClass, Verdict, VerdictTier,
};
use super::config::{ReviewTierOutcome, ScreeningRules};
use super::AdvanceMode;

/// Verdicts each policy promotes straight to the AI-interview stage. The
/// lookup is data so new policies are added here without touching provider
/// or state-machine code.
const PROMOTION_TABLE: [(ScreeningPolicy, &[Verdict]); 3] = [
    (ScreeningPolicy::NoAutomaticPromotion, &[]),
    (
        ScreeningPolicy::GoodFitAndAbove,
        &[Verdict::GoodFit, Verdict::StrongFit],
    ),
    (ScreeningPolicy::OnlyStrongFit, &[Verdict::StrongFit]),
];

pub(crate) fn promoted_verdicts(policy: ScreeningPolicy) -> &'static [Verdict] {
    PROMOTION_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == policy)
        .map(|(_, verdicts)| *verdicts)
        .unwrap_or(&[])
}

/// Pipeline decision for one verdict under one org policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDecision {
    pub cv_setting_result: CvSettingResult,
    pub state_class: StateClass,
    /// New pipeline status; `None` when the operation must not advance.
    pub status: Option<PipelineStatus>,
    pub current_step: Option<&'static str>,
    pub promoted: bool,
    pub dropped: bool,
    pub audit: Option<AuditAction>,
}

/// Pure mapping of (`verdict`, `policy`) to the stage decision. Same inputs
/// always produce the same outputs.
pub(crate) fn decide_stage(
    verdict: Verdict,
    policy: ScreeningPolicy,
    rules: &ScreeningRules,
    mode: AdvanceMode,
) -> StageDecision {
    let tier = verdict.tier();
    let promoted = promoted_verdicts(policy).contains(&verdict);
    let passed = promoted
        || (policy == ScreeningPolicy::NoAutomaticPromotion && tier == VerdictTier::Promote);

    let cv_setting_result = if passed {
        CvSettingResult::Passed
    } else {
        CvSettingResult::Failed
    };
    let state_class = state_class_for(verdict, policy, passed);

    if mode == AdvanceMode::RecordOnly {
        return StageDecision {
            cv_setting_result,
            state_class,
            status: None,
            current_step: None,
            promoted: false,
            dropped: false,
            audit: None,
        };
    }

    let dropped = tier == VerdictTier::Drop;
    let status = match policy {
        ScreeningPolicy::NoAutomaticPromotion => PipelineStatus::ForCvScreening,
        _ if promoted => PipelineStatus::ForAiInterview,
        _ if tier == VerdictTier::Review
            && rules.review_tier_outcome == ReviewTierOutcome::HoldForReview =>
        {
            PipelineStatus::ForCvScreening
        }
        _ => PipelineStatus::FailedCvScreening,
    };
    let current_step = if promoted { "AI Interview" } else { "CV Screening" };

    let audit = if promoted {
        Some(AuditAction::AutoPromoted)
    } else if dropped {
        Some(AuditAction::Dropped)
    } else {
        None
    };

    StageDecision {
        cv_setting_result,
        state_class,
        status: Some(status),
        current_step: Some(current_step),
        promoted,
        dropped,
        audit,
    }
}

/// Presentation hint: promoting policies collapse to accepted/rejected; the
/// default policy keeps the per-verdict shading used before a human decides.
fn state_class_for(verdict: Verdict, policy: ScreeningPolicy, passed: bool) -> StateClass {
    if policy != ScreeningPolicy::NoAutomaticPromotion {
        return if passed {
            StateClass::Accepted
        } else {
            StateClass::Rejected
        };
    }

    match verdict {
        Verdict::GoodFit => StateClass::Good,
        Verdict::StrongFit => StateClass::Accepted,
        _ => StateClass::Rejected,
    }
}
