// Query functions over the cache.
// Each function owns its cache key, request shape and invalidation rules.

pub mod posts;
pub mod users;

/// Case-insensitive substring match; an empty needle matches everything.
pub(crate) fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}
