//! Title normalization for exact matching.

/// Canonical comparison key for a title: lowercase, only alphanumeric and
/// whitespace characters kept, whitespace runs collapsed to one space, trimmed.
///
/// Index keys and lookup keys must both go through this function.
pub fn normalize_title(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
