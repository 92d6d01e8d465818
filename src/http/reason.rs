//! Status code to reason phrase lookup.

use http::StatusCode;

/// Reason text for codes with no registered phrase.
pub const UNASSIGNED_REASON_PHRASE: &str = "Unassigned";

/// Standard reason phrase for `status`, or [`UNASSIGNED_REASON_PHRASE`].
pub fn reason_phrase(status: u32) -> &'static str {
    u16::try_from(status)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .and_then(|code| code.canonical_reason())
        .unwrap_or(UNASSIGNED_REASON_PHRASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_phrases() {
        assert_eq!(reason_phrase(200), "OK");
        assert_eq!(reason_phrase(404), "Not Found");
        assert_eq!(reason_phrase(302), "Found");
        assert_eq!(reason_phrase(503), "Service Unavailable");
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(reason_phrase(299), UNASSIGNED_REASON_PHRASE);
        assert_eq!(reason_phrase(0), UNASSIGNED_REASON_PHRASE);
        assert_eq!(reason_phrase(70_000), UNASSIGNED_REASON_PHRASE);
    }
}
