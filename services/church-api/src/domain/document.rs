/// Document id and timestamp helpers shared by every collection
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Generate a new random document id (UUID v4, hyphenated)
pub fn new_document_id() -> String {
    Uuid::new_v4().to_string()
}

/// Format a timestamp the way every document stores it
///
/// RFC 3339, UTC, millisecond precision and a trailing `Z`, so that the
/// lexical order of two timestamps equals their chronological order.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as a document timestamp
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_document_id_is_unique_uuid() {
        let a = new_document_id();
        let b = new_document_id();

        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_timestamp(at), "2024-03-09T07:05:01.000Z");
    }

    #[test]
    fn test_timestamps_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 9, 30, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap();

        assert!(format_timestamp(earlier) < format_timestamp(later));
    }
}
