use axum::{Router, routing::get};
use std::sync::Arc;
use std::time::Duration;

use crate::db::{PolicyStorage, TargetDatabase};
use crate::handlers::{creds, lease, roles};
use crate::service::issuer::CredentialIssuer;

pub type Issuer = CredentialIssuer<PolicyStorage, PolicyStorage, TargetDatabase>;

#[derive(Clone)]
pub struct CredsState {
    pub issuer: Arc<Issuer>,
    pub storage: PolicyStorage,
    pub api_key: Arc<str>,
    pub default_lease: Duration,
}

impl CredsState {
    pub fn new(
        storage: PolicyStorage,
        target: TargetDatabase,
        api_key: Arc<str>,
        default_lease: Duration,
    ) -> Self {
        let issuer = CredentialIssuer::new(storage.clone(), storage.clone(), target, default_lease);
        Self {
            issuer: Arc::new(issuer),
            storage,
            api_key,
            default_lease,
        }
    }
}

pub fn creds_router(state: CredsState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/creds/{name}", get(creds::issue_creds_handler))
        .route("/roles", get(roles::list_roles_handler))
        .route(
            "/roles/{name}",
            get(roles::read_role_handler)
                .put(roles::write_role_handler)
                .delete(roles::delete_role_handler),
        )
        .route(
            "/config/lease",
            get(lease::read_lease_handler)
                .put(lease::write_lease_handler)
                .delete(lease::delete_lease_handler),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
