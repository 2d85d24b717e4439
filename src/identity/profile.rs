use serde::{Deserialize, Serialize};

/// Immutable snapshot of the signed-in account as reported by `/users/me`.
/// Replaced wholesale on each fetch, never patched field-by-field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}
