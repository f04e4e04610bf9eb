//! Helpers for free-text fields and partial-field (patch) objects.

use serde::{Deserialize, Deserializer};

/// Trim a free-text value; blank values become `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Apply a patch value to an optional field: absent keeps `current`, blank
/// clears it, anything else replaces it.
pub fn patch_optional(current: Option<String>, patch: Option<String>) -> Option<String> {
    match patch {
        None => current,
        Some(value) => non_blank(Some(value)),
    }
}

/// Deserialize a field that distinguishes "absent" from explicit `null`.
///
/// Use with `#[serde(default, deserialize_with = "deserialize_present")]` on an
/// `Option<Option<T>>`: absent → `None`, `null` → `Some(None)`.
pub fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
