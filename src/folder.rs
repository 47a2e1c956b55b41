use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A named bucket cards can be filed into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Epoch-millisecond timestamp at creation, as a string
    pub id: String,
    pub name: String,
    /// Reserved for nesting; nothing reads it yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Expansion flag of the folder panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
}

impl Folder {
    pub fn new(name: String) -> Self {
        Folder {
            id: Utc::now().timestamp_millis().to_string(),
            name,
            parent_id: None,
            is_open: Some(true),
        }
    }
}
