use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;

use crate::db::DbRole;
use crate::middleware::auth::RequireKeyAuth;
use crate::service::sql_split::split_sql;
use crate::types::RoleName;
use crate::types::role::{RoleBody, RoleList};
use crate::{CredsError, router::CredsState};

/// GET /roles
pub async fn list_roles_handler(
    _auth: RequireKeyAuth,
    State(state): State<CredsState>,
) -> Result<Json<RoleList>, CredsError> {
    let roles = state.storage.list_roles().await?;
    Ok(Json(RoleList { roles }))
}

/// GET /roles/{name}
pub async fn read_role_handler(
    _auth: RequireKeyAuth,
    State(state): State<CredsState>,
    Path(name): Path<String>,
) -> Result<Json<DbRole>, CredsError> {
    let name = RoleName::parse(name)?;
    state
        .storage
        .get_role(&name)
        .await?
        .map(Json)
        .ok_or_else(|| CredsError::RoleNotFound(name.to_string()))
}

/// PUT /roles/{name} -> create or replace the role's SQL template.
pub async fn write_role_handler(
    _auth: RequireKeyAuth,
    State(state): State<CredsState>,
    Path(name): Path<String>,
    Json(body): Json<RoleBody>,
) -> Result<StatusCode, CredsError> {
    let name = RoleName::parse(name)?;
    let statements = split_sql(&body.sql).len();
    if statements == 0 {
        return Err(CredsError::InvalidRequest(
            "role sql must contain at least one statement".to_string(),
        ));
    }
    state.storage.upsert_role(&name, &body.sql).await?;
    info!(role = %name, statements, "role written");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /roles/{name}; deleting a missing role is not an error.
pub async fn delete_role_handler(
    _auth: RequireKeyAuth,
    State(state): State<CredsState>,
    Path(name): Path<String>,
) -> Result<StatusCode, CredsError> {
    let name = RoleName::parse(name)?;
    if state.storage.delete_role(&name).await? {
        info!(role = %name, "role deleted");
    }
    Ok(StatusCode::NO_CONTENT)
}
