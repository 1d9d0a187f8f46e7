//! Small string helpers shared by the models.

/// Maximum slug length before the id suffix is appended.
const MAX_SLUG_LENGTH: usize = 60;

/// Lowercase, ASCII-only, hyphen-separated slug for a job title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
        if slug.len() >= MAX_SLUG_LENGTH {
            break;
        }
    }

    if slug.is_empty() {
        "job".to_string()
    } else {
        slug
    }
}
