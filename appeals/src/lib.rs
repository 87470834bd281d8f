//! Appeal arbitration for rejected applications.
//!
//! A rejected candidate (or their sponsor) stakes tokens to contest the
//! rejection. A panel of experts votes to uphold or overturn it:
//!
//! - **Overturned**: the stake is returned, the appealer gains reputation and
//!   the original reviewers lose some.
//! - **Upheld**: the stake is forfeited and the appealer loses reputation.
//!
//! The backend's own appeal records are translated by [`mapping`].

pub mod appeal;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod settlement;

pub use appeal::{
    Appeal, AppealDecision, AppealOutcome, AppealStatus, AppealVote, FileAppealRequest,
    OutcomeDecision, OVERTURN_REPUTATION_DELTA, UPHELD_REPUTATION_DELTA,
};
pub use eligibility::{
    check_eligibility, ApplicationDecision, Eligibility, EligibilityContext, IneligibilityReason,
};
pub use engine::AppealEngine;
pub use error::AppealError;
pub use mapping::{
    map_appeal_response, map_appeal_response_with, AppealResponse, BackendAppealStatus,
    BackendVote, MappingError, PanelMemberResponse,
};
pub use settlement::{settlement, AppealSettlement, PanelistOutcome};
