use crate::service::generator::GeneratedCredential;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Issued credentials bound to their lease.
#[derive(Debug, Clone)]
pub struct Secret {
    /// Returned to the caller once; never re-derivable.
    pub data: GeneratedCredential,
    /// Minimal data a revoker needs to drop the principal later.
    pub internal: RevocationData,
    pub ttl: Duration,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevocationData {
    pub username: String,
}

/// HTTP view of a [`Secret`]; revocation data stays server-side.
#[derive(Debug, Serialize)]
pub struct SecretResponse {
    pub data: GeneratedCredential,
    pub lease_duration: u64,
    pub renewable: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Secret> for SecretResponse {
    fn from(s: Secret) -> Self {
        Self {
            data: s.data,
            lease_duration: s.ttl.as_secs(),
            renewable: false,
            issued_at: s.issued_at,
            expires_at: s.expires_at,
        }
    }
}
