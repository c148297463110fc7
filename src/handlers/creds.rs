use axum::{
    Json,
    extract::{Path, State},
};

use crate::middleware::auth::RequireKeyAuth;
use crate::middleware::caller::CallerDisplayName;
use crate::types::secret::SecretResponse;
use crate::types::{IssuanceRequest, RoleName};
use crate::{CredsError, router::CredsState};

/// GET /creds/{name} -> provisions a fresh credential for the role.
pub async fn issue_creds_handler(
    _auth: RequireKeyAuth,
    State(state): State<CredsState>,
    Path(name): Path<String>,
    CallerDisplayName(display_name): CallerDisplayName,
) -> Result<Json<SecretResponse>, CredsError> {
    let request = IssuanceRequest::new(RoleName::parse(name)?, display_name)?;
    let secret = state.issuer.issue(&request).await?;
    Ok(Json(secret.into()))
}
