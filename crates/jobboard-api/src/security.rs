//! Input normalization for account fields.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum display name length.
pub const MAX_NAME_LENGTH: usize = 100;

/// Upper bound on password length so hashing cost stays bounded.
pub const MAX_PASSWORD_LENGTH: usize = 1024;

/// Maximum email length (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Canonical form used for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Loose shape check: one `@`, a dot in the domain, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_PATTERN.is_match(email)
}

/// Strip control characters and clamp to [`MAX_NAME_LENGTH`].
/// Returns `None` when nothing printable is left.
pub fn sanitize_name(input: &str) -> Option<String> {
    let name: String = input
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_NAME_LENGTH)
        .collect();
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}
