//! Vetted CLI: reviewer-side entry point for the review core.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use vetted_appeals::{AppealDecision, BackendVote, FileAppealRequest};
use vetted_client::{
    AppealVoteSubmission, ClientConfig, ClientError, HttpReviewClient, ManualReveal, ReviewApi,
    ReviewerSession,
};
use vetted_crypto::{commitment_hash, generate_nonce, OsNonceSource};
use vetted_rewards::get_reward_tier_progress;
use vetted_types::{AppealId, ApplicationId, ExpertId, GuildId, Score, StakeAmount, Timestamp};
use vetted_utils::{format_remaining, init_logging, LogFormat};
use vetted_voting::RevealCache;

#[derive(Parser)]
#[command(name = "vetted", about = "Vetted expert review client")]
struct Cli {
    /// Base URL of the review backend.
    #[arg(long, env = "VETTED_BACKEND_URL")]
    backend_url: Option<String>,

    /// Directory holding the local reveal cache.
    #[arg(long, env = "VETTED_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VETTED_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VETTED_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "VETTED_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print a fresh random nonce.
    Nonce,

    /// Compute a commitment hash locally.
    Hash {
        #[arg(long)]
        score: i64,
        #[arg(long)]
        nonce: String,
    },

    /// Show the reward tier for a reputation score.
    Tier {
        #[arg(long, allow_negative_numbers = true)]
        reputation: i64,
    },

    /// Show the commit-reveal phase of an application.
    Phase {
        #[arg(long)]
        application: ApplicationId,
    },

    /// Commit a hidden score.
    Commit {
        #[arg(long)]
        application: ApplicationId,
        #[arg(long, env = "VETTED_EXPERT_ID")]
        expert: ExpertId,
        #[arg(long)]
        score: i64,
        /// Stake in tokens, e.g. "10" or "12.5".
        #[arg(long)]
        stake: StakeAmount,
    },

    /// Reveal a committed score. Uses the local cache unless both
    /// --score and --nonce are given.
    Reveal {
        #[arg(long)]
        application: ApplicationId,
        #[arg(long, env = "VETTED_EXPERT_ID")]
        expert: ExpertId,
        #[arg(long, requires = "nonce")]
        score: Option<i64>,
        #[arg(long, requires = "score")]
        nonce: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },

    /// Appeal operations.
    Appeal {
        #[command(subcommand)]
        action: AppealAction,
    },
}

#[derive(clap::Subcommand)]
enum AppealAction {
    /// Show the appeal for an application, or one appeal by id.
    Show {
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        application: Option<ApplicationId>,
        #[arg(long)]
        id: Option<AppealId>,
    },

    /// File an appeal against a rejection.
    File {
        #[arg(long)]
        application: ApplicationId,
        #[arg(long)]
        guild: GuildId,
        #[arg(long, env = "VETTED_EXPERT_ID")]
        expert: ExpertId,
        #[arg(long)]
        stake: StakeAmount,
        #[arg(long)]
        justification: String,
    },

    /// Cast a panel vote on an appeal.
    Vote {
        #[arg(long)]
        appeal: AppealId,
        #[arg(long, env = "VETTED_EXPERT_ID")]
        expert: ExpertId,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, value_enum)]
        decision: Ballot,
        #[arg(long, default_value = "")]
        reasoning: String,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Ballot {
    Uphold,
    Overturn,
}

impl From<Ballot> for AppealDecision {
    fn from(b: Ballot) -> Self {
        match b {
            Ballot::Uphold => AppealDecision::Uphold,
            Ballot::Overturn => AppealDecision::Overturn,
        }
    }
}

/// File settings as the base, flags and env vars on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::from_toml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(ref url) = cli.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(ref dir) = cli.cache_dir {
        config.reveal_cache_dir = dir.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    config.validate()?;
    Ok(config)
}

fn session(
    config: &ClientConfig,
    api: Arc<HttpReviewClient>,
    expert: ExpertId,
) -> ReviewerSession<HttpReviewClient, OsNonceSource> {
    ReviewerSession::new(
        api,
        OsNonceSource,
        expert,
        RevealCache::open(&config.reveal_cache_dir),
    )
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    init_logging(config.log_format, &config.log_level)?;

    match cli.command {
        Command::Nonce => println!("{}", generate_nonce()?.as_str()),

        Command::Hash { score, nonce } => {
            let score = Score::new(score)?;
            println!("{}", commitment_hash(score, &nonce));
        }

        Command::Tier { reputation } => {
            let progress = get_reward_tier_progress(reputation);
            println!(
                "{} (weight {}x)",
                progress.tier.name,
                progress.tier.reward_weight()
            );
            match progress.next_tier {
                Some(next) => println!(
                    "{}% of the way to {} at {}",
                    progress.progress, next.name, next.min_reputation
                ),
                None => println!("top tier"),
            }
        }

        Command::Phase { application } => {
            let api = HttpReviewClient::from_config(&config)?;
            let status = api.get_phase_status(&application).await?;
            let now = Timestamp::now();
            println!("{}: {}", status.application_id, status.phase);
            println!("commits: {}  reveals: {}", status.commit_count, status.reveal_count);
            if let Some(deadline) = status.commit_deadline {
                println!("commit window {}", format_remaining(deadline, now));
            }
            if let Some(deadline) = status.reveal_deadline {
                println!("reveal window {}", format_remaining(deadline, now));
            }
        }

        Command::Commit {
            application,
            expert,
            score,
            stake,
        } => {
            let api = Arc::new(HttpReviewClient::from_config(&config)?);
            let receipt = match session(&config, api, expert)
                .commit_vote(&application, score, stake, Timestamp::now())
                .await
            {
                Ok(receipt) => receipt,
                Err(ClientError::CommitUnconfirmed {
                    score,
                    nonce,
                    cached: false,
                    reason,
                    ..
                }) => anyhow::bail!(
                    "commitment not confirmed ({reason}) and not cached; \
                     keep score {score} and nonce {} to reveal it",
                    nonce.as_str()
                ),
                Err(e) => return Err(e.into()),
            };
            println!("committed {}", receipt.commitment_hash);
            if !receipt.cached {
                println!(
                    "WARNING: could not cache this vote; you will need score {} and nonce {} to reveal",
                    receipt.score,
                    receipt.nonce.as_str()
                );
            }
        }

        Command::Reveal {
            application,
            expert,
            score,
            nonce,
            comment,
        } => {
            let manual = match (score, nonce) {
                (Some(score), Some(nonce)) => Some(ManualReveal { score, nonce }),
                _ => None,
            };
            let api = Arc::new(HttpReviewClient::from_config(&config)?);
            let revealed = session(&config, api, expert)
                .reveal_vote(&application, manual, comment)
                .await?;
            println!("revealed score {revealed}");
        }

        Command::Appeal { action } => {
            let api = HttpReviewClient::from_config(&config)?;
            match action {
                AppealAction::Show { application, id } => {
                    let appeal = match (application, id) {
                        (_, Some(id)) => Some(api.get_appeal(&id).await?),
                        (Some(application), None) => api.get_appeal_by_application(&application).await?,
                        (None, None) => anyhow::bail!("pass --application or --id"),
                    };
                    match appeal {
                        Some(appeal) => print_json(&appeal)?,
                        None => println!("no appeal"),
                    }
                }
                AppealAction::File {
                    application,
                    guild,
                    expert,
                    stake,
                    justification,
                } => {
                    let eligibility = api.check_appeal_eligibility(&application, &expert).await?;
                    if !eligibility.eligible {
                        for reason in &eligibility.reasons {
                            eprintln!("not eligible: {reason}");
                        }
                        anyhow::bail!("appeal not filed");
                    }
                    let appeal = api
                        .file_appeal(&FileAppealRequest {
                            application_id: application,
                            guild_id: guild,
                            appealer_expert_id: expert,
                            justification,
                            stake_amount: stake,
                        })
                        .await?;
                    tracing::info!(appeal = %appeal.id, "appeal filed");
                    print_json(&appeal)?;
                }
                AppealAction::Vote {
                    appeal,
                    expert,
                    name,
                    decision,
                    reasoning,
                } => {
                    let updated = api
                        .vote_on_appeal(
                            &appeal,
                            &AppealVoteSubmission {
                                expert_id: expert,
                                expert_name: name,
                                vote: BackendVote::from(AppealDecision::from(decision)),
                                reasoning,
                            },
                        )
                        .await?;
                    println!(
                        "{}: {} uphold / {} overturn",
                        updated.id, updated.votes_uphold, updated.votes_overturn
                    );
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vetted.toml");
        std::fs::write(
            &path,
            "backend_url = \"https://file.example/api\"\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "vetted",
            "--config",
            path.to_str().unwrap(),
            "--log-level",
            "warn",
            "nonce",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.backend_url, "https://file.example/api");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn bad_backend_url_rejected() {
        let cli = Cli::try_parse_from(["vetted", "--backend-url", "ftp://x", "nonce"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn parses_typed_arguments() {
        let cli = Cli::try_parse_from([
            "vetted", "commit", "--application", "app-1", "--expert", "alice", "--score", "80",
            "--stake", "12.5",
        ])
        .unwrap();
        match cli.command {
            Command::Commit { stake, score, .. } => {
                assert_eq!(stake, "12.5".parse::<StakeAmount>().unwrap());
                assert_eq!(score, 80);
            }
            _ => panic!("expected commit"),
        }
        assert!(Cli::try_parse_from(["vetted", "reveal", "--application", "a", "--expert", "e", "--score", "5"]).is_err());
        assert!(Cli::try_parse_from(["vetted", "tier", "--reputation", "-10"]).is_ok());
    }
}
