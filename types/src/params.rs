//! Review parameters: stakes, panel sizing and phase windows.

use crate::amount::StakeAmount;
use serde::{Deserialize, Serialize};

/// Tunable values shared by the voting and appeal crates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewParams {
    // ── Commit-reveal ────────────────────────────────────────────────────
    /// Minimum stake an expert must put behind a commitment.
    pub required_commit_stake: StakeAmount,

    /// Length of the commit window in seconds.
    pub commit_duration_secs: u64,

    /// Length of the reveal window in seconds (starts when commit closes).
    pub reveal_duration_secs: u64,

    // ── Appeals ──────────────────────────────────────────────────────────
    /// Minimum stake required to file an appeal.
    pub min_appeal_stake: StakeAmount,

    /// Panel size reported before a panel has been assigned.
    pub default_panel_size: u32,
}

impl ReviewParams {
    /// Values used by the live platform.
    pub fn vetted_defaults() -> Self {
        Self {
            required_commit_stake: StakeAmount::from_tokens(10),
            commit_duration_secs: 48 * 3600,
            reveal_duration_secs: 24 * 3600,

            min_appeal_stake: StakeAmount::from_tokens(50),
            default_panel_size: 3,
        }
    }
}

impl Default for ReviewParams {
    fn default() -> Self {
        Self::vetted_defaults()
    }
}
