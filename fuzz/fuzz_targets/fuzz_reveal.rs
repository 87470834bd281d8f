#![no_main]

use libfuzzer_sys::fuzz_target;
use vetted_crypto::{commitment_hash, verify_commitment};
use vetted_rewards::{get_reward_tier, get_reward_tier_progress};
use vetted_types::Score;

// Arbitrary (score, nonce) reveals against a fixed commitment, plus tier
// lookups for arbitrary reputations. None of it may panic.
fuzz_target!(|data: &[u8]| {
    if data.len() < 9 {
        return;
    }
    let raw_score = i64::from_le_bytes([
        data[0], data[1], data[2], data[3],
        data[4], data[5], data[6], data[7],
    ]);
    let nonce = String::from_utf8_lossy(&data[8..]);

    let committed = commitment_hash(Score::new(50).expect("50 is a valid score"), "fixed-nonce");
    if let Ok(score) = Score::new(raw_score) {
        let matches = verify_commitment(&committed, score, &nonce);
        assert_eq!(matches, score.value() == 50 && nonce == "fixed-nonce");
    }

    let progress = get_reward_tier_progress(raw_score);
    assert!(progress.progress <= 100);
    assert!(get_reward_tier(raw_score).contains(raw_score) || raw_score < 0);
});
