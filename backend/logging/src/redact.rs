//! Log Redaction
//!
//! Scrubs API tokens and email addresses from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(hf_[a-zA-Z0-9]{20,})|(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)")
        .unwrap()
});
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = TOKEN_RE.replace_all(input, "[REDACTED_TOKEN]");
    EMAIL_RE.replace_all(&redacted, "[REDACTED_EMAIL]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "401 from api with Bearer hf_abcdefghijklmnopqrstuvwxyz for jane.doe@example.org";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("hf_abcdefghijklmnopqrstuvwxyz"));
        assert!(!clean.contains("jane.doe@example.org"));
        assert!(clean.contains("[REDACTED_TOKEN]"));
        assert!(clean.contains("[REDACTED_EMAIL]"));
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(redact_sensitive_data("bamboo_bottle.jpg"), "bamboo_bottle.jpg");
    }
}
