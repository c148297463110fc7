use crate::db::models::{DbLease, DbRole};
use crate::db::schema::SQLITE_INIT;
use crate::error::CredsError;
use crate::service::issuer::{LeaseSource, RoleSource};
use crate::service::sql_split::split_sql;
use crate::types::{LeaseConfig, Role, RoleName};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

pub type SqlitePool = Pool<Sqlite>;

/// Roles and lease configuration, persisted in SQLite.
#[derive(Clone)]
pub struct PolicyStorage {
    pool: SqlitePool,
}

impl PolicyStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the store at `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> Result<Self, CredsError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), CredsError> {
        // sqlx::query runs one statement at a time
        for stmt in split_sql(SQLITE_INIT) {
            sqlx::query(&stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Create or replace a role, keeping its original `created_at`.
    pub async fn upsert_role(&self, name: &RoleName, sql: &str) -> Result<(), CredsError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO roles (name, sql, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                sql=excluded.sql,
                updated_at=excluded.updated_at
            "#,
        )
        .bind(name.as_str())
        .bind(sql)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_role(&self, name: &RoleName) -> Result<Option<DbRole>, CredsError> {
        let row = sqlx::query_as::<_, DbRole>(
            "SELECT name, sql, created_at, updated_at FROM roles WHERE name = ?",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_roles(&self) -> Result<Vec<String>, CredsError> {
        let names = sqlx::query_scalar("SELECT name FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    /// Returns whether a role was removed.
    pub async fn delete_role(&self, name: &RoleName) -> Result<bool, CredsError> {
        let res = sqlx::query("DELETE FROM roles WHERE name = ?")
            .bind(name.as_str())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn get_lease(&self) -> Result<Option<DbLease>, CredsError> {
        let row = sqlx::query_as::<_, DbLease>(
            "SELECT lease_secs, updated_at FROM lease_config WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn set_lease(&self, lease: Duration) -> Result<(), CredsError> {
        let secs = i64::try_from(lease.as_secs())
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| CredsError::InvalidRequest("lease must be a positive duration".into()))?;
        sqlx::query(
            r#"
            INSERT INTO lease_config (id, lease_secs, updated_at) VALUES (1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                lease_secs=excluded.lease_secs,
                updated_at=excluded.updated_at
            "#,
        )
        .bind(secs)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Drop the configured lease so the default applies again.
    pub async fn clear_lease(&self) -> Result<bool, CredsError> {
        let res = sqlx::query("DELETE FROM lease_config WHERE id = 1")
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

impl RoleSource for PolicyStorage {
    async fn fetch_role(&self, name: &RoleName) -> Result<Option<Role>, CredsError> {
        self.get_role(name).await?.map(Role::try_from).transpose()
    }
}

impl LeaseSource for PolicyStorage {
    async fn fetch_lease_config(&self) -> Result<Option<LeaseConfig>, CredsError> {
        Ok(self.get_lease().await?.map(LeaseConfig::from))
    }
}
