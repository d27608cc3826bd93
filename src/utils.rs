use url::Url;

/// Longest body excerpt carried inside an error
pub const MAX_BODY_EXCERPT: usize = 500;

/// Cut a response body down for display, appending `...` when anything was dropped
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Resolve a possibly relative reference against `base`.
/// Returns `None` for empty references or ones that do not form a valid URL.
pub fn resolve_url(base: &Url, reference: &str) -> Option<Url> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    base.join(reference).ok()
}
