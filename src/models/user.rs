use serde::{Deserialize, Serialize};

/// A reader record, keyed by email. At most one row per email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    pub display_name: Option<String>,
    /// License the reader most recently redeemed.
    pub license_key: Option<String>,
    pub first_seen_at: i64,
    pub last_seen_at: i64,
}
