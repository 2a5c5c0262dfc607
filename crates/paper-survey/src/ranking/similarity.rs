//! Title normalization and fuzzy similarity.
//!
//! Pure functions only; clustering builds on [`title_similarity`].

/// Lowercase, replace punctuation with spaces, collapse whitespace.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized title with its tokens sorted, so word order does not matter.
#[must_use]
pub fn sorted_token_key(title: &str) -> String {
    let normalized = normalize_title(title);
    let mut tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token-sort ratio of two already-keyed strings in [0, 1].
///
/// Two empty keys score 0 so records without a usable title never merge.
#[must_use]
pub fn key_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b)
}

/// Token-sort ratio of two raw titles in [0, 1].
#[must_use]
pub fn title_similarity(a: &str, b: &str) -> f64 {
    key_similarity(&sorted_token_key(a), &sorted_token_key(b))
}
