use proptest::prelude::*;

use vetted_crypto::{commitment_hash, verify_commitment};
use vetted_types::Score;

proptest! {
    /// Repeated hashing of the same pair yields the same commitment.
    #[test]
    fn hash_is_deterministic(score in 0i64..=100, nonce in ".{0,80}") {
        let score = Score::new(score).unwrap();
        prop_assert_eq!(commitment_hash(score, &nonce), commitment_hash(score, &nonce));
    }

    /// The committed pair verifies; any other score or nonce does not.
    #[test]
    fn only_the_committed_pair_verifies(
        score in 0i64..=100,
        other_score in 0i64..=100,
        nonce in "[a-f0-9]{1,64}",
        other_nonce in "[a-f0-9]{1,64}",
    ) {
        let s = Score::new(score).unwrap();
        let os = Score::new(other_score).unwrap();
        let hash = commitment_hash(s, &nonce);

        prop_assert!(verify_commitment(&hash, s, &nonce));
        if (other_score, other_nonce.as_str()) != (score, nonce.as_str()) {
            prop_assert!(!verify_commitment(&hash, os, &other_nonce));
        }
    }
}
