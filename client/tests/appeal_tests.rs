//! Appeal lifecycle and guild directory against the in-memory backend.

use std::sync::Arc;

use vetted_appeals::{
    AppealError, AppealStatus, ApplicationDecision, BackendVote, FileAppealRequest,
    IneligibilityReason, OutcomeDecision,
};
use vetted_client::{AppealVoteSubmission, ClientError, Guild, GuildDirectory, ReviewApi};
use vetted_nullables::{ApplicationRecord, NullReviewBackend};
use vetted_types::{ApplicationId, ExpertId, GuildId, StakeAmount};

fn app() -> ApplicationId {
    ApplicationId::new("application-7").unwrap()
}

fn expert(id: &str) -> ExpertId {
    ExpertId::new(id).unwrap()
}

fn guild() -> GuildId {
    GuildId::new("rust-guild").unwrap()
}

fn rejected_backend() -> Arc<NullReviewBackend> {
    let backend = Arc::new(NullReviewBackend::new(1_000));
    backend.register_application(
        app(),
        ApplicationRecord {
            candidate: expert("cand"),
            sponsor: Some(expert("sponsor")),
            decision: ApplicationDecision::Rejected,
        },
    );
    backend.set_balance(expert("cand"), StakeAmount::from_tokens(80));
    backend
}

fn request(stake: u128) -> FileAppealRequest {
    FileAppealRequest {
        application_id: app(),
        guild_id: guild(),
        appealer_expert_id: expert("cand"),
        justification: "My portfolio was not considered.".into(),
        stake_amount: StakeAmount::from_tokens(stake),
    }
}

fn ballot(id: &str, vote: BackendVote) -> AppealVoteSubmission {
    AppealVoteSubmission {
        expert_id: expert(id),
        expert_name: id.to_uppercase(),
        vote,
        reasoning: String::new(),
    }
}

#[tokio::test]
async fn overturned_appeal_end_to_end() {
    let backend = rejected_backend();

    let eligibility = backend
        .check_appeal_eligibility(&app(), &expert("cand"))
        .await
        .unwrap();
    assert!(eligibility.eligible);

    let filed = backend.file_appeal(&request(50)).await.unwrap();
    assert_eq!(filed.status, AppealStatus::Pending);
    assert_eq!(filed.panel_size, 3);

    // A second appeal while one is open is refused, and eligibility says why.
    assert!(matches!(
        backend.file_appeal(&request(50)).await,
        Err(ClientError::Rejected { .. })
    ));
    let blocked = backend
        .check_appeal_eligibility(&app(), &expert("cand"))
        .await
        .unwrap();
    assert!(!blocked.eligible);
    assert_eq!(blocked.reasons, vec![IneligibilityReason::AppealAlreadyOpen]);

    backend
        .assign_panel(&filed.id, vec![expert("p1"), expert("p2"), expert("p3")])
        .unwrap();
    backend
        .vote_on_appeal(&filed.id, &ballot("p1", BackendVote::ApproveAppeal))
        .await
        .unwrap();
    backend
        .vote_on_appeal(&filed.id, &ballot("p2", BackendVote::UpholdRejection))
        .await
        .unwrap();
    let after = backend
        .vote_on_appeal(&filed.id, &ballot("p3", BackendVote::ApproveAppeal))
        .await
        .unwrap();
    assert_eq!((after.votes_overturn, after.votes_uphold), (2, 1));
    assert_eq!(after.votes.len(), 3);

    backend.clock().advance(3600);
    let resolved = backend.resolve_by_majority(&filed.id, Some(-10)).unwrap();
    assert_eq!(resolved.status, AppealStatus::Overturned);
    let outcome = resolved.outcome.as_ref().unwrap();
    assert_eq!(outcome.decision, OutcomeDecision::Overturned);
    assert_eq!(outcome.appealer_reputation_change, 3);
    assert!(outcome.appealer_stake_returned);
    assert_eq!(outcome.original_reviewers_reputation_change, Some(-10));

    let fetched = backend.get_appeal_by_application(&app()).await.unwrap().unwrap();
    assert_eq!(fetched.id, filed.id);
    assert!(fetched.is_resolved());
    assert_eq!(backend.get_guild_appeals(&guild()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn panel_rules_are_enforced_through_backend() {
    let backend = rejected_backend();
    let filed = backend.file_appeal(&request(60)).await.unwrap();

    // No votes before a panel exists.
    let err = backend
        .vote_on_appeal(&filed.id, &ballot("p1", BackendVote::ApproveAppeal))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Appeal(AppealError::WrongStatus { .. })
    ));

    backend.assign_panel(&filed.id, vec![expert("p1"), expert("p2")]).unwrap();
    let err = backend
        .vote_on_appeal(&filed.id, &ballot("outsider", BackendVote::ApproveAppeal))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Appeal(AppealError::NotOnPanel(_))));

    backend
        .vote_on_appeal(&filed.id, &ballot("p1", BackendVote::UpholdRejection))
        .await
        .unwrap();
    let err = backend
        .vote_on_appeal(&filed.id, &ballot("p1", BackendVote::ApproveAppeal))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Appeal(AppealError::AlreadyVoted(_))));

    let resolved = backend.resolve_by_majority(&filed.id, Some(-10)).unwrap();
    assert_eq!(resolved.status, AppealStatus::Upheld);
    let outcome = resolved.outcome.unwrap();
    assert_eq!(outcome.appealer_reputation_change, -5);
    assert!(!outcome.appealer_stake_returned);
    assert_eq!(outcome.original_reviewers_reputation_change, None);

    // Terminal now.
    assert!(matches!(
        backend.resolve_by_majority(&filed.id, None),
        Err(ClientError::Appeal(AppealError::AlreadyResolved(_)))
    ));
}

#[tokio::test]
async fn under_staked_appeal_is_refused() {
    let backend = rejected_backend();
    let err = backend.file_appeal(&request(49)).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Appeal(AppealError::InsufficientStake { .. })
    ));
    assert!(err.is_retryable());
    assert!(backend.get_appeal_by_application(&app()).await.unwrap().is_none());
}

#[tokio::test]
async fn eligibility_lists_every_failed_condition() {
    let backend = rejected_backend();
    backend.register_application(
        app(),
        ApplicationRecord {
            candidate: expert("cand"),
            sponsor: None,
            decision: ApplicationDecision::Accepted,
        },
    );
    let result = backend
        .check_appeal_eligibility(&app(), &expert("stranger"))
        .await
        .unwrap();
    assert!(!result.eligible);
    assert!(result.reasons.contains(&IneligibilityReason::NotRejected));
    assert!(result.reasons.contains(&IneligibilityReason::NotCandidateOrSponsor));
    assert!(result
        .reasons
        .iter()
        .any(|r| matches!(r, IneligibilityReason::InsufficientStake { .. })));

    let unknown = ApplicationId::new("nope").unwrap();
    assert!(matches!(
        backend.check_appeal_eligibility(&unknown, &expert("cand")).await,
        Err(ClientError::NotFound(_))
    ));
}

#[tokio::test]
async fn guild_list_is_fetched_once_for_concurrent_callers() {
    let backend = Arc::new(NullReviewBackend::new(0));
    backend.add_guild(Guild {
        id: guild(),
        name: "Rust".into(),
        description: None,
    });
    let directory = GuildDirectory::new(Arc::clone(&backend));
    assert!(!directory.is_loaded());

    let (a, b) = tokio::join!(directory.guilds(), directory.guilds());
    assert_eq!(a.unwrap().len(), 1);
    assert_eq!(b.unwrap().len(), 1);
    assert_eq!(backend.guild_fetches(), 1);

    let found = directory.find(&guild()).await.unwrap().unwrap();
    assert_eq!(found.name, "Rust");
    assert!(directory.find(&GuildId::new("go").unwrap()).await.unwrap().is_none());
    assert_eq!(backend.guild_fetches(), 1);
}

#[tokio::test]
async fn failed_guild_fetch_is_retried() {
    let backend = Arc::new(NullReviewBackend::new(0));
    let directory = GuildDirectory::new(Arc::clone(&backend));

    backend.set_offline(true);
    assert!(matches!(
        directory.guilds().await,
        Err(ClientError::Unreachable(_))
    ));
    assert!(!directory.is_loaded());

    backend.set_offline(false);
    assert!(directory.guilds().await.unwrap().is_empty());
    assert!(directory.is_loaded());
    assert_eq!(backend.guild_fetches(), 1);
}
