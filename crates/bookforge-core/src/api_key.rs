use chrono::{DateTime, Utc};
use serde::Serialize;

/// A server API key. Only the SHA-256 hash of the secret is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    pub key_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}
