//! Who may appeal a decision.

use serde::{Deserialize, Serialize};
use std::fmt;
use vetted_types::{ExpertId, ReviewParams, StakeAmount};

/// Review decision on the application being appealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationDecision {
    Pending,
    Accepted,
    Rejected,
}

/// Facts needed to decide whether an appeal may be filed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityContext {
    pub decision: ApplicationDecision,
    pub has_open_appeal: bool,
    pub appealer: ExpertId,
    pub candidate: ExpertId,
    pub sponsor: Option<ExpertId>,
    pub available_stake: StakeAmount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IneligibilityReason {
    NotRejected,
    AppealAlreadyOpen,
    NotCandidateOrSponsor,
    InsufficientStake {
        needed: StakeAmount,
        available: StakeAmount,
    },
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRejected => f.write_str("only rejected applications can be appealed"),
            Self::AppealAlreadyOpen => f.write_str("an appeal is already open for this application"),
            Self::NotCandidateOrSponsor => {
                f.write_str("only the candidate or their sponsor can appeal")
            }
            Self::InsufficientStake { needed, available } => {
                write!(f, "appeal stake of {needed} required, {available} available")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
    /// Every failed condition; empty when eligible.
    pub reasons: Vec<IneligibilityReason>,
}

pub fn check_eligibility(ctx: &EligibilityContext, params: &ReviewParams) -> Eligibility {
    let mut reasons = Vec::new();
    if ctx.decision != ApplicationDecision::Rejected {
        reasons.push(IneligibilityReason::NotRejected);
    }
    if ctx.has_open_appeal {
        reasons.push(IneligibilityReason::AppealAlreadyOpen);
    }
    if ctx.appealer != ctx.candidate && ctx.sponsor.as_ref() != Some(&ctx.appealer) {
        reasons.push(IneligibilityReason::NotCandidateOrSponsor);
    }
    if ctx.available_stake < params.min_appeal_stake {
        reasons.push(IneligibilityReason::InsufficientStake {
            needed: params.min_appeal_stake,
            available: ctx.available_stake,
        });
    }
    Eligibility {
        eligible: reasons.is_empty(),
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EligibilityContext {
        EligibilityContext {
            decision: ApplicationDecision::Rejected,
            has_open_appeal: false,
            appealer: ExpertId::new("cand").unwrap(),
            candidate: ExpertId::new("cand").unwrap(),
            sponsor: Some(ExpertId::new("mentor").unwrap()),
            available_stake: StakeAmount::from_tokens(50),
        }
    }

    #[test]
    fn candidate_with_stake_is_eligible() {
        let e = check_eligibility(&ctx(), &ReviewParams::default());
        assert!(e.eligible);
        assert!(e.reasons.is_empty());
    }

    #[test]
    fn sponsor_may_appeal() {
        let mut c = ctx();
        c.appealer = ExpertId::new("mentor").unwrap();
        assert!(check_eligibility(&c, &ReviewParams::default()).eligible);
    }

    #[test]
    fn all_reasons_reported() {
        let c = EligibilityContext {
            decision: ApplicationDecision::Accepted,
            has_open_appeal: true,
            appealer: ExpertId::new("stranger").unwrap(),
            candidate: ExpertId::new("cand").unwrap(),
            sponsor: None,
            available_stake: StakeAmount::from_tokens(10),
        };
        let e = check_eligibility(&c, &ReviewParams::default());
        assert!(!e.eligible);
        assert_eq!(e.reasons.len(), 4);
        assert_eq!(
            e.reasons[3].to_string(),
            "appeal stake of 50 required, 10 available"
        );
    }

    #[test]
    fn reason_serialization() {
        let json = serde_json::to_value(IneligibilityReason::AppealAlreadyOpen).unwrap();
        assert_eq!(json, serde_json::json!({ "reason": "appeal_already_open" }));
    }
}
