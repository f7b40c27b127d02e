//! Sensitive data redaction
//!
//! The API key travels as a query parameter, so anything that may echo a URL
//! (transport errors, upstream error bodies, log lines) is scrubbed here before
//! it reaches a caller.

use regex::Regex;
use std::sync::OnceLock;

static QUERY_KEY_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

const MASK: &str = "***";

fn query_key_regex() -> Option<&'static Regex> {
    QUERY_KEY_REGEX
        .get_or_init(|| Regex::new(r#"(?i)(api[_-]?key)("?\s*[=:]\s*"?)([^&\s"')]+)"#).ok())
        .as_ref()
}

/// Replace every literal occurrence of `secret` with `***`
pub fn redact_secret(input: &str, secret: &str) -> String {
    if secret.is_empty() {
        return input.to_string();
    }
    input.replace(secret, MASK)
}

/// Replace `api_key=<value>` style fragments with `api_key=***`
pub fn redact_query_keys(input: &str) -> String {
    match query_key_regex() {
        Some(regex) => regex.replace_all(input, "$1$2***").to_string(),
        None => input.to_string(),
    }
}

/// Apply both redactions
pub fn redact(input: &str, secret: Option<&str>) -> String {
    let scrubbed = redact_query_keys(input);
    match secret {
        Some(secret) => redact_secret(&scrubbed, secret),
        None => scrubbed,
    }
}
