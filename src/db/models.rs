use crate::error::CredsError;
use crate::types::{LeaseConfig, Role, RoleName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbRole {
    pub name: String,
    pub sql: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbRole> for Role {
    type Error = CredsError;

    fn try_from(d: DbRole) -> Result<Self, Self::Error> {
        Ok(Role {
            name: RoleName::parse(d.name)?,
            sql: d.sql,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbLease {
    pub lease_secs: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<DbLease> for LeaseConfig {
    fn from(d: DbLease) -> Self {
        LeaseConfig {
            lease: Duration::from_secs(d.lease_secs.max(1) as u64),
        }
    }
}
