//! Submission body parsing and validation.
//!
//! The email check is deliberately loose: it looks for `\S+@\S+\.\S+`
//! anywhere in the value, not an RFC 5322 address.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::{SignupSubmission, ValidationError};

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

/// Parses a raw request body as a JSON object.
///
/// Anything that is not a JSON object (invalid UTF-8, malformed JSON, an
/// array, a bare string) is treated as an empty object so that the missing
/// email produces the rejection.
pub fn parse_body(raw: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::Object(Map::new()),
    }
}

/// Returns `true` if `email` has the minimal `local@domain.tld` shape.
pub fn is_plausible_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// Validates a parsed body into a [`SignupSubmission`].
pub fn validate(raw: &Value) -> Result<SignupSubmission, ValidationError> {
    let email = raw
        .get("email")
        .and_then(Value::as_str)
        .filter(|email| is_plausible_email(email))
        .ok_or(ValidationError::InvalidEmail)?;

    Ok(SignupSubmission {
        email: email.to_string(),
        utm_source: optional_field(raw, "utm_source"),
        utm_medium: optional_field(raw, "utm_medium"),
        utm_campaign: optional_field(raw, "utm_campaign"),
        utm_term: optional_field(raw, "utm_term"),
        utm_content: optional_field(raw, "utm_content"),
        referrer: optional_field(raw, "referrer"),
    })
}

// Strings pass through untouched; other non-null values keep their JSON text.
fn optional_field(raw: &Value, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_simple_address() {
        let submission = validate(&json!({ "email": "a@b.com" })).unwrap();
        assert_eq!(submission.email, "a@b.com");
        assert_eq!(submission.utm_source, None);
        assert_eq!(submission.referrer, None);
    }

    #[test]
    fn test_rejects_bad_addresses() {
        for body in [
            json!({ "email": "not-an-email" }),
            json!({}),
            json!({ "email": "" }),
            json!({ "email": null }),
            json!({ "email": 42 }),
            json!({ "email": "a@b" }),
            json!({ "email": "@b.com" }),
        ] {
            assert_eq!(validate(&body), Err(ValidationError::InvalidEmail), "{body}");
        }
    }

    #[test]
    fn test_pattern_is_an_unanchored_search() {
        assert!(is_plausible_email("  hello there a@b.c  "));
        assert!(is_plausible_email("a@@b..c"));
        assert!(!is_plausible_email("a @b.c"));
    }

    #[test]
    fn test_optional_fields_pass_through() {
        let submission = validate(&json!({
            "email": "user@example.com",
            "utm_source": "instagram",
            "utm_medium": null,
            "utm_campaign": "launch",
            "utm_term": 7,
            "referrer": "https://budmeet.app/",
        }))
        .unwrap();

        assert_eq!(submission.utm_source.as_deref(), Some("instagram"));
        assert_eq!(submission.utm_medium, None);
        assert_eq!(submission.utm_campaign.as_deref(), Some("launch"));
        assert_eq!(submission.utm_term.as_deref(), Some("7"));
        assert_eq!(submission.utm_content, None);
        assert_eq!(submission.referrer.as_deref(), Some("https://budmeet.app/"));
    }

    #[test]
    fn test_malformed_bodies_become_empty_objects() {
        assert_eq!(parse_body(b"{not json"), json!({}));
        assert_eq!(parse_body(b""), json!({}));
        assert_eq!(parse_body(b"[1,2,3]"), json!({}));
        assert_eq!(parse_body(b"\"a@b.com\""), json!({}));
        assert_eq!(
            validate(&parse_body(b"{not json")),
            Err(ValidationError::InvalidEmail)
        );
    }

    #[test]
    fn test_well_formed_body_is_kept() {
        let body = parse_body(br#"{"email":"a@b.com","utm_source":"x"}"#);
        assert_eq!(body, json!({ "email": "a@b.com", "utm_source": "x" }));
    }
}
