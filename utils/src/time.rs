//! Time formatting helpers for phase deadlines.

use vetted_types::Timestamp;

/// Format a duration in seconds to a short human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Describe how long until `deadline`, or `"closed"` once it has passed.
pub fn format_remaining(deadline: Timestamp, now: Timestamp) -> String {
    if deadline.has_passed(now) {
        "closed".to_string()
    } else {
        format!("closes in {}", format_duration(deadline.secs_until(now)))
    }
}
