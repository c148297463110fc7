use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default lifetime of issued credentials when written by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseConfig {
    pub lease: Duration,
}

/// Body of `PUT /config/lease`.
#[derive(Debug, Deserialize)]
pub struct LeaseBody {
    pub lease_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct LeaseResponse {
    pub lease_secs: u64,
    /// True when no lease is configured and the system default applies.
    pub default: bool,
}
