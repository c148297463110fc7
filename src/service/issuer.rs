use crate::db::target::Catalog;
use crate::error::CredsError;
use crate::service::executor::execute_atomically;
use crate::service::generator::{self, GeneratedCredential};
use crate::service::lease;
use crate::service::sql_split::split_sql;
use crate::service::template::{TemplateValues, ensure_sql_safe, render};
use crate::types::{IssuanceRequest, LeaseConfig, Role, RoleName, Secret};
use chrono::{DateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyConnection};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Looks up role definitions.
pub trait RoleSource: Send + Sync {
    fn fetch_role(
        &self,
        name: &RoleName,
    ) -> impl Future<Output = Result<Option<Role>, CredsError>> + Send;
}

/// Looks up the operator's lease configuration.
pub trait LeaseSource: Send + Sync {
    fn fetch_lease_config(
        &self,
    ) -> impl Future<Output = Result<Option<LeaseConfig>, CredsError>> + Send;
}

/// Hands out connections to the database credentials are provisioned in.
pub trait ConnectionSource: Send + Sync {
    fn acquire(&self) -> impl Future<Output = Result<PoolConnection<Any>, CredsError>> + Send;

    fn catalog(&self) -> Option<&Catalog>;
}

/// Everything needed to provision one credential, computed before any
/// connection is taken.
#[derive(Debug)]
pub struct IssuancePlan {
    pub credential: GeneratedCredential,
    pub statements: Vec<String>,
    pub ttl: Duration,
    pub issued_at: DateTime<Utc>,
}

/// Generate credentials and render the role's statements with them.
pub fn plan(
    role: &Role,
    lease_config: Option<&LeaseConfig>,
    default_lease: Duration,
    display_name: &str,
) -> Result<IssuancePlan, CredsError> {
    let ttl = lease::resolve_ttl(lease_config, default_lease);
    let issued_at = Utc::now();
    let expiration = lease::expires_at(issued_at, ttl)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let credential = generator::generate(display_name)?;

    let values: TemplateValues<'_> = [
        ("name", credential.username.as_str()),
        ("password", credential.password.as_str()),
        ("expiration", expiration.as_str()),
    ]
    .into_iter()
    .collect();
    for (placeholder, value) in &values {
        ensure_sql_safe(placeholder, value)?;
    }

    let statements = split_sql(&role.sql)
        .iter()
        .map(|stmt| render(stmt, &values))
        .collect();

    Ok(IssuancePlan {
        credential,
        statements,
        ttl,
        issued_at,
    })
}

/// Execute a plan on `conn` and, once committed, bind the Secret.
pub async fn provision(
    conn: &mut AnyConnection,
    catalog: Option<&Catalog>,
    plan: IssuancePlan,
) -> Result<Secret, CredsError> {
    execute_atomically(conn, catalog, &plan.statements).await?;
    Ok(lease::bind(plan.credential, plan.ttl, plan.issued_at))
}

/// Credential issuance over injected role, lease and connection sources.
pub struct CredentialIssuer<R, L, C> {
    roles: R,
    leases: L,
    connections: C,
    default_lease: Duration,
}

impl<R, L, C> CredentialIssuer<R, L, C>
where
    R: RoleSource,
    L: LeaseSource,
    C: ConnectionSource,
{
    pub fn new(roles: R, leases: L, connections: C, default_lease: Duration) -> Self {
        Self {
            roles,
            leases,
            connections,
            default_lease,
        }
    }

    pub async fn issue(&self, request: &IssuanceRequest) -> Result<Secret, CredsError> {
        let role = self
            .roles
            .fetch_role(&request.role)
            .await?
            .ok_or_else(|| CredsError::UnknownRole(request.role.to_string()))?;
        let lease_config = self.leases.fetch_lease_config().await?;

        let plan = plan(
            &role,
            lease_config.as_ref(),
            self.default_lease,
            &request.display_name,
        )?;
        let statement_count = plan.statements.len();
        debug!(role = %role.name, statements = statement_count, "issuance planned");

        // Held only for this issuance; dropping returns it to the pool.
        let mut conn = self.connections.acquire().await?;
        let secret = provision(&mut conn, self.connections.catalog(), plan)
            .await
            .inspect_err(|e| {
                warn!(role = %role.name, error_code = ?e.db_code(), "issuance failed: {}", describe(e));
            })?;

        info!(
            role = %role.name,
            statements = statement_count,
            ttl_secs = secret.ttl.as_secs(),
            "credentials issued"
        );
        Ok(secret)
    }
}

/// Log-safe summary; driver messages may echo rendered SQL.
fn describe(e: &CredsError) -> String {
    match e {
        CredsError::Execution {
            position, stage, ..
        } => format!("statement {position} failed to {stage}"),
        CredsError::Connection(_) => "target database unavailable".to_string(),
        CredsError::Commit(_) => "commit failed".to_string(),
        other => other.to_string(),
    }
}
