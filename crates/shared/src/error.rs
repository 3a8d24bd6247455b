use serde::{Deserialize, Serialize};

/// JSON error body returned by the directory API. The `detail` string is
/// optional; callers fall back to a status-based message when it is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
