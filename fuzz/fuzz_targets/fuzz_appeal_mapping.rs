#![no_main]

use libfuzzer_sys::fuzz_target;
use vetted_appeals::{map_appeal_response, AppealResponse};

// Backend appeal payloads are untrusted. Parsing and mapping must never panic,
// and a mapped appeal always keeps its tallies consistent with its ballots.
fuzz_target!(|data: &[u8]| {
    let Ok(response) = serde_json::from_slice::<AppealResponse>(data) else {
        return;
    };
    if let Ok(appeal) = map_appeal_response(&response) {
        assert_eq!(
            (appeal.votes_uphold + appeal.votes_overturn) as usize,
            appeal.votes.len()
        );
        assert!(appeal.panel_size >= 1);
    }
});
