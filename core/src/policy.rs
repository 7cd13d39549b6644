//! Tunable limits applied by the validator.

use serde::{Deserialize, Serialize};

/// Default minimum number of letters in a name.
pub const DEFAULT_MIN_NAME_LEN: usize = 3;
/// Default maximum length, in characters, of one-line human-readable text.
pub const DEFAULT_MAX_TEXT_LEN: usize = 80;
/// Default maximum length, in characters, of an example invocation snippet.
pub const DEFAULT_MAX_SNIPPET_LEN: usize = 40;
/// Default upper bound of each version number.
pub const DEFAULT_MAX_VERSION_COMPONENT: i64 = 99;

/// Limits used by [`Validator`](crate::Validator).
///
/// Missing fields take their defaults when deserialized, so a policy file
/// only needs to name what it changes.
///
/// # Examples
///
/// ```
/// use tri_core::ValidationPolicy;
///
/// let policy: ValidationPolicy = serde_json::from_str(r#"{"min_name_len": 4}"#).unwrap();
/// assert_eq!(policy.min_name_len, 4);
/// assert_eq!(policy.max_text_len, 80);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Minimum number of letters in names, groups and command references.
    pub min_name_len: usize,
    /// Maximum characters in `Brief`, `Usage` and example explanations.
    pub max_text_len: usize,
    /// Maximum characters in an example invocation snippet.
    pub max_snippet_len: usize,
    /// Largest accepted version number component.
    pub max_version_component: i64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_name_len: DEFAULT_MIN_NAME_LEN,
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            max_snippet_len: DEFAULT_MAX_SNIPPET_LEN,
            max_version_component: DEFAULT_MAX_VERSION_COMPONENT,
        }
    }
}

impl ValidationPolicy {
    /// Sets the minimum name length.
    pub fn with_min_name_len(mut self, len: usize) -> Self {
        self.min_name_len = len;
        self
    }
}
