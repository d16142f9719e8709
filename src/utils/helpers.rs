//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Generate a request correlation id
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Truncate a timestamp to whole seconds
pub fn truncate_to_seconds(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(0)
}

/// Format a timestamp for error bodies and the statistics service
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_request_id_is_unique() {
        assert_ne!(generate_request_id(), generate_request_id());
    }

    #[test]
    fn test_truncate_to_seconds() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap()
            + chrono::Duration::milliseconds(789);
        let truncated = truncate_to_seconds(ts);
        assert_eq!(truncated.timestamp_subsec_millis(), 0);
        assert_eq!(format_timestamp(truncated), "2024-05-01 12:30:45");
    }
}
