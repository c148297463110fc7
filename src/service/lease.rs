use crate::service::generator::GeneratedCredential;
use crate::types::lease::LeaseConfig;
use crate::types::secret::{RevocationData, Secret};
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Configured lease if one exists, otherwise `default`.
pub fn resolve_ttl(config: Option<&LeaseConfig>, default: Duration) -> Duration {
    config.map(|c| c.lease).unwrap_or(default)
}

/// Expiry instant for a lease starting at `issued_at`, saturating at the
/// largest representable time.
pub fn expires_at(issued_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| issued_at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Package issued credentials as a Secret stamped with its TTL.
pub fn bind(credential: GeneratedCredential, ttl: Duration, issued_at: DateTime<Utc>) -> Secret {
    let internal = RevocationData {
        username: credential.username.clone(),
    };
    Secret {
        data: credential,
        internal,
        ttl,
        issued_at,
        expires_at: expires_at(issued_at, ttl),
    }
}
