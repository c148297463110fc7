//! Target database: where role SQL runs and credentials are provisioned.

use crate::config::IssuerConfig;
use crate::error::CredsError;
use crate::service::issuer::ConnectionSource;
use crate::service::template::ensure_sql_safe;
use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::pool::PoolConnection;
use sqlx::{Any, AnyPool};
use tracing::info;

/// SQL flavour of the target database, inferred from its URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    MySql,
}

impl Dialect {
    pub fn from_url(url: &str) -> Result<Self, CredsError> {
        let scheme = url.split_once(':').map(|(s, _)| s).unwrap_or_default();
        match scheme.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Dialect::Sqlite),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            other => Err(CredsError::Config(format!(
                "unsupported target database scheme: {other:?}"
            ))),
        }
    }

    /// Statement switching the session's default catalog, if the dialect has
    /// catalogs. SQLite connections see exactly one main database.
    pub fn select_catalog(&self, name: &str) -> Option<String> {
        match self {
            Dialect::Sqlite => None,
            Dialect::MySql => Some(format!("USE `{name}`")),
        }
    }

    /// Database named in the URL path, e.g. `mysql://host/app` → `app`.
    fn catalog_from_url(&self, raw: &str) -> Option<String> {
        if *self == Dialect::Sqlite {
            return None;
        }
        let parsed = url::Url::parse(raw).ok()?;
        let db = parsed.path().trim_start_matches('/');
        (!db.is_empty()).then(|| db.to_string())
    }
}

/// Default catalog every issuance transaction starts in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    dialect: Dialect,
    name: String,
}

impl Catalog {
    pub fn new(dialect: Dialect, name: impl Into<String>) -> Result<Self, CredsError> {
        let name = name.into();
        if name.is_empty() || ensure_sql_safe("catalog", &name).is_err() {
            return Err(CredsError::Config(format!("invalid default catalog: {name:?}")));
        }
        Ok(Self { dialect, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn select_statement(&self) -> Option<String> {
        self.dialect.select_catalog(&self.name)
    }
}

#[derive(Clone)]
pub struct TargetDatabase {
    pool: AnyPool,
    catalog: Option<Catalog>,
}

impl TargetDatabase {
    pub async fn connect(cfg: &IssuerConfig) -> Result<Self, CredsError> {
        install_default_drivers();
        let url = cfg.target_database_url.as_str();
        let dialect = Dialect::from_url(url)?;
        let catalog = cfg
            .default_catalog
            .clone()
            .or_else(|| dialect.catalog_from_url(url))
            .map(|name| Catalog::new(dialect, name))
            .transpose()?;

        let pool = AnyPoolOptions::new()
            .max_connections(cfg.max_connections.max(1))
            .acquire_timeout(cfg.acquire_timeout())
            .connect(url)
            .await
            .map_err(CredsError::Connection)?;

        info!(
            dialect = ?dialect,
            catalog = catalog.as_ref().map(Catalog::name).unwrap_or("<none>"),
            max_connections = cfg.max_connections,
            "target database pool ready"
        );
        Ok(Self::from_pool(pool, catalog))
    }

    pub fn from_pool(pool: AnyPool, catalog: Option<Catalog>) -> Self {
        Self { pool, catalog }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

impl ConnectionSource for TargetDatabase {
    async fn acquire(&self) -> Result<PoolConnection<Any>, CredsError> {
        self.pool.acquire().await.map_err(CredsError::Connection)
    }

    fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }
}
