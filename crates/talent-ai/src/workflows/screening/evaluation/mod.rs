mod config;
mod policy;

pub use config::{ReviewTierOutcome, ScreeningRules};
pub use policy::StageDecision;

use super::domain::{ScreeningPolicy, Verdict};
use policy::decide_stage;

/// Whether a classification is allowed to move the application between
/// pipeline stages, or only to record its verdict fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceMode {
    /// Full screening: apply stage transitions, drops, and audit entries.
    Transition,
    /// Preview analysis: write verdict fields only.
    RecordOnly,
}

/// Stateless engine mapping a verdict plus the org screening policy to a
/// pipeline-stage decision.
pub struct PromotionPolicyEngine {
    rules: ScreeningRules,
}

impl PromotionPolicyEngine {
    pub fn new(rules: ScreeningRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScreeningRules {
        &self.rules
    }

    pub fn decide(
        &self,
        verdict: Verdict,
        policy: ScreeningPolicy,
        mode: AdvanceMode,
    ) -> StageDecision {
        decide_stage(verdict, policy, &self.rules, mode)
    }
}
