use axum::{Json, extract::State, http::StatusCode};
use std::time::Duration;
use tracing::info;

use crate::middleware::auth::RequireKeyAuth;
use crate::types::lease::{LeaseBody, LeaseResponse};
use crate::{CredsError, router::CredsState};

/// Upper bound on a configured lease (ten years).
const MAX_LEASE_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// GET /config/lease
pub async fn read_lease_handler(
    _auth: RequireKeyAuth,
    State(state): State<CredsState>,
) -> Result<Json<LeaseResponse>, CredsError> {
    let resp = match state.storage.get_lease().await? {
        Some(row) => LeaseResponse {
            lease_secs: row.lease_secs.max(1) as u64,
            default: false,
        },
        None => LeaseResponse {
            lease_secs: state.default_lease.as_secs(),
            default: true,
        },
    };
    Ok(Json(resp))
}

/// PUT /config/lease
pub async fn write_lease_handler(
    _auth: RequireKeyAuth,
    State(state): State<CredsState>,
    Json(body): Json<LeaseBody>,
) -> Result<StatusCode, CredsError> {
    if body.lease_secs == 0 || body.lease_secs > MAX_LEASE_SECS {
        return Err(CredsError::InvalidRequest(format!(
            "lease_secs must be between 1 and {MAX_LEASE_SECS}"
        )));
    }
    state
        .storage
        .set_lease(Duration::from_secs(body.lease_secs))
        .await?;
    info!(lease_secs = body.lease_secs, "lease configured");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /config/lease -> fall back to the default lease.
pub async fn delete_lease_handler(
    _auth: RequireKeyAuth,
    State(state): State<CredsState>,
) -> Result<StatusCode, CredsError> {
    if state.storage.clear_lease().await? {
        info!("lease configuration cleared");
    }
    Ok(StatusCode::NO_CONTENT)
}
