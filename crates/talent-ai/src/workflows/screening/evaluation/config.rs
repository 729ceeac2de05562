use serde::{Deserialize, Serialize};

/// How review-tier verdicts (Ineligible CV, Insufficient Data) resolve when
/// the org policy would otherwise promote or fail the candidate. The upstream
/// call sites disagreed on this mapping, so it is an explicit dial here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReviewTierOutcome {
    /// Treat a review-tier verdict as a failed screening under promoting
    /// policies.
    #[default]
    FailScreening,
    /// Park review-tier verdicts at the CV-screening stage for a human
    /// decision even under promoting policies.
    HoldForReview,
}

/// Rules applied on top of the per-job screening policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRules {
    pub review_tier_outcome: ReviewTierOutcome,
    /// Actor name recorded on automatic audit-trail entries.
    pub automation_actor: String,
}

impl Default for ScreeningRules {
    fn default() -> Self {
        Self {
            review_tier_outcome: ReviewTierOutcome::default(),
            automation_actor: "ai-screener".to_string(),
        }
    }
}
