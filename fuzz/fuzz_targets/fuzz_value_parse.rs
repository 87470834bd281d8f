#![no_main]

use libfuzzer_sys::fuzz_target;
use vetted_types::{CommitmentHash, StakeAmount};

// Stake strings and commitment hashes arrive as text from the backend.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(stake) = text.parse::<StakeAmount>() {
        // Display output must parse back to the same amount.
        let again: StakeAmount = stake.to_string().parse().expect("display round-trips");
        assert_eq!(again, stake);
    }

    if let Ok(hash) = CommitmentHash::from_hex(text) {
        assert_eq!(CommitmentHash::from_hex(&hash.to_hex()).ok(), Some(hash));
    }

    let _ = serde_json::from_str::<StakeAmount>(text);
});
