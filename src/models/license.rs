use serde::{Deserialize, Serialize};

/// A license row. `activated_identities` is stored as a JSON array in a TEXT
/// column; order is insertion order and carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub license_key: String,
    /// Ceiling on distinct identities this key may bind.
    pub max_activations: u32,
    /// Identities (emails or IPs) that have consumed a slot.
    pub activated_identities: Vec<String>,
    /// Set on the first successful activation, never cleared.
    pub used: bool,
    /// Explicit revocation flag, independent of expiry and exhaustion.
    pub valid: bool,
    pub issued_at: i64,
    /// Unix seconds; None = never expires.
    pub expires_at: Option<i64>,
    /// Most recent successful redemption, informational only.
    pub last_used_by: Option<String>,
    pub last_used_at: Option<i64>,
}

impl License {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }

    pub fn is_bound(&self, identity: &str) -> bool {
        // Case-sensitive exact match; no email case-folding or IP
        // normalization.
        self.activated_identities.iter().any(|id| id == identity)
    }
}

#[derive(Debug, Clone)]
pub struct CreateLicense {
    pub max_activations: u32,
    /// None = never expires.
    pub expires_at: Option<i64>,
}
