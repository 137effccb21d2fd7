use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("email pattern is valid")
});

static EMAIL_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern is valid")
});

/// Extract the first email address from a user ID such as
/// `Jane Doe <jane@example.com>`, preserving its case.
///
/// Returns an empty string when the user ID carries no address.
pub fn extract_email(user_id: &str) -> String {
    EMAIL_PATTERN
        .find(user_id)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Whether `value` is an email address and nothing else.
pub fn is_email(value: &str) -> bool {
    EMAIL_ONLY.is_match(value)
}
