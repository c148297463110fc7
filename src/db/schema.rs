//! SQL DDL for initializing the policy store.

/// SQLite schema with:
/// - `roles`: one SQL template per role name
/// - `lease_config`: at most one row (`id = 1`), lease strictly positive
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS roles (
    name TEXT PRIMARY KEY NOT NULL,
    sql TEXT NOT NULL, -- template; may itself contain ';'
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL
);

/* Singleton row; absence means the configured default lease applies. */
CREATE TABLE IF NOT EXISTS lease_config (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    lease_secs INTEGER NOT NULL CHECK (lease_secs > 0),
    updated_at TEXT NOT NULL
);
"#;
