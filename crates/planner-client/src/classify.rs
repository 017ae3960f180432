//! Keyword classification of backend error text.
//!
//! Rules are evaluated against the lower-cased message in a fixed order and
//! the first match wins, so a message mentioning both a quota and a timeout
//! is a quota error. The original message is kept verbatim in the result.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::errors::ClassifiedError;

const QUOTA_MARKERS: &[&str] = &["429", "resource_exhausted", "quota", "quota exceeded"];
const CREDENTIAL_MARKERS: &[&str] = &[
    "401",
    "403",
    "unauthorized",
    "invalid api key",
    "api key not valid",
    "permission denied",
];
const SESSION_MARKERS: &[&str] = &["session not found", "session does not exist"];
const RATE_LIMIT_MARKERS: &[&str] = &["rate limit", "too many requests"];
const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out", "deadline exceeded"];
const MODEL_MARKERS: &[&str] = &[
    "model not found",
    "model not available",
    "model is not supported",
];

static QUOTA_RETRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)retry in (\d+\.?\d*)s").expect("valid quota retry pattern"));
static QUOTA_LIMIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)limit: (\d+)").expect("valid quota limit pattern"));
static RATE_LIMIT_RETRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)retry.*?(\d+\.?\d*)\s*s").expect("valid rate limit retry pattern")
});

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Maps a backend error message to its typed error.
pub fn classify_error(message: &str) -> ClassifiedError {
    let lowered = message.to_lowercase();
    let message = message.to_string();

    let classified = if contains_any(&lowered, QUOTA_MARKERS) {
        ClassifiedError::Quota {
            retry_after_seconds: quota_retry_delay(&message),
            quota_limit: quota_limit(&message),
            message,
        }
    } else if contains_any(&lowered, CREDENTIAL_MARKERS) {
        ClassifiedError::InvalidCredential { message }
    } else if contains_any(&lowered, SESSION_MARKERS) {
        ClassifiedError::SessionNotFound { message }
    } else if contains_any(&lowered, RATE_LIMIT_MARKERS) {
        ClassifiedError::RateLimit {
            retry_after_seconds: rate_limit_retry_delay(&message),
            message,
        }
    } else if contains_any(&lowered, TIMEOUT_MARKERS) {
        ClassifiedError::BackendTimeout { message }
    } else if contains_any(&lowered, MODEL_MARKERS) {
        ClassifiedError::ModelUnavailable { message }
    } else {
        ClassifiedError::Generic { message }
    };

    debug!(kind = %classified.kind(), "classified backend error");
    classified
}

/// Extracts the delay from a `retry in <n>s` hint.
///
/// Matching ignores case, so `Retry In 5S` yields `Some(5.0)` as well.
pub fn quota_retry_delay(text: &str) -> Option<f64> {
    capture_number(&QUOTA_RETRY_RE, text)
}

/// Extracts the integer from a `limit: <n>` hint.
pub fn quota_limit(text: &str) -> Option<u64> {
    capture_number(&QUOTA_LIMIT_RE, text)
}

/// Extracts the first `<n> s` delay that follows the word `retry`.
pub fn rate_limit_retry_delay(text: &str) -> Option<f64> {
    capture_number(&RATE_LIMIT_RETRY_RE, text)
}

fn capture_number<T: std::str::FromStr>(re: &Regex, text: &str) -> Option<T> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn quota_message_carries_retry_delay_and_limit() {
        let err = classify_error("Error 429: resource exhausted, retry in 12.5s, limit: 100");
        assert_eq!(
            err,
            ClassifiedError::Quota {
                message: "Error 429: resource exhausted, retry in 12.5s, limit: 100".into(),
                retry_after_seconds: Some(12.5),
                quota_limit: Some(100),
            }
        );
    }

    #[test]
    fn quota_without_hints_leaves_metadata_unset() {
        let err = classify_error("RESOURCE_EXHAUSTED");
        assert!(matches!(
            err,
            ClassifiedError::Quota {
                retry_after_seconds: None,
                quota_limit: None,
                ..
            }
        ));
    }

    #[test]
    fn credential_errors() {
        for message in [
            "401 Unauthorized",
            "403 Forbidden",
            "API key not valid. Please pass a valid API key.",
            "Permission denied on resource",
        ] {
            assert_eq!(
                classify_error(message).kind(),
                ErrorKind::InvalidCredential,
                "{message}"
            );
        }
    }

    #[test]
    fn session_rate_limit_timeout_and_model_errors() {
        assert_eq!(
            classify_error("Session not found: abc").kind(),
            ErrorKind::SessionNotFound
        );
        assert_eq!(
            classify_error("Request timed out").kind(),
            ErrorKind::BackendTimeout
        );
        assert_eq!(
            classify_error("Deadline Exceeded while calling tool").kind(),
            ErrorKind::BackendTimeout
        );
        assert_eq!(
            classify_error("Model is not supported for generateContent").kind(),
            ErrorKind::ModelUnavailable
        );
        assert_eq!(
            classify_error("Too Many Requests, retry after 3 s"),
            ClassifiedError::RateLimit {
                message: "Too Many Requests, retry after 3 s".into(),
                retry_after_seconds: Some(3.0),
            }
        );
    }

    #[test]
    fn earlier_rule_wins_when_keywords_overlap() {
        assert_eq!(
            classify_error("quota check timed out").kind(),
            ErrorKind::Quota
        );
        assert_eq!(
            classify_error("401: session not found").kind(),
            ErrorKind::InvalidCredential
        );
        assert_eq!(
            classify_error("rate limit hit, upstream timeout").kind(),
            ErrorKind::RateLimit
        );
    }

    #[test]
    fn unmatched_text_is_generic_and_keeps_original_case() {
        let err = classify_error("Something Broke");
        assert_eq!(err.message(), "Something Broke");
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.to_string(), "API error: Something Broke");
    }

    #[test]
    fn extractors_are_independent_of_classification() {
        assert_eq!(quota_retry_delay("please retry in 30s"), Some(30.0));
        assert_eq!(quota_retry_delay("retry in a while"), None);
        assert_eq!(quota_retry_delay("Retry In 5S"), Some(5.0));
        assert_eq!(quota_limit("limit: 15, used: 15"), Some(15));
        assert_eq!(quota_limit("no limit here"), None);
        assert_eq!(rate_limit_retry_delay("retry after 2.5 seconds"), Some(2.5));
        assert_eq!(rate_limit_retry_delay("slow down"), None);
    }
}
