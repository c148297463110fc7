use crate::db::target::Catalog;
use crate::error::{CredsError, ExecutionStage};
use sqlx::{AnyConnection, Connection, Executor, Statement};
use tracing::{debug, warn};

/// Run `statements` in order inside one transaction on `conn`.
///
/// The catalog selection, when the dialect has one, runs first inside the
/// same transaction so a pooled connection never carries over another
/// session's default database. Nothing is committed unless every statement
/// succeeds; the transaction guard rolls back if this future is dropped.
pub async fn execute_atomically(
    conn: &mut AnyConnection,
    catalog: Option<&Catalog>,
    statements: &[String],
) -> Result<(), CredsError> {
    let mut tx = conn.begin().await.map_err(CredsError::Connection)?;

    if let Err(e) = run_statements(&mut tx, catalog, statements).await {
        if let CredsError::Execution { position, stage, .. } = &e {
            warn!(position, %stage, code = ?e.db_code(), "statement failed; rolling back");
        }
        if let Err(rb) = tx.rollback().await {
            warn!(error = %rb, "rollback failed");
        }
        return Err(e);
    }

    tx.commit().await.map_err(CredsError::Commit)?;
    debug!(count = statements.len(), "transaction committed");
    Ok(())
}

async fn run_statements(
    conn: &mut AnyConnection,
    catalog: Option<&Catalog>,
    statements: &[String],
) -> Result<(), CredsError> {
    if let Some(select) = catalog.and_then(Catalog::select_statement) {
        // Catalog switches are not preparable on every backend; send as text.
        (&mut *conn)
            .execute(select.as_str())
            .await
            .map_err(|source| CredsError::Execution {
                position: 0,
                stage: ExecutionStage::Execute,
                source,
            })?;
    }

    for (idx, statement) in statements.iter().enumerate() {
        let position = idx + 1;
        let prepared = (&mut *conn)
            .prepare(statement.as_str())
            .await
            .map_err(|source| CredsError::Execution {
                position,
                stage: ExecutionStage::Prepare,
                source,
            })?;
        prepared
            .query()
            .execute(&mut *conn)
            .await
            .map_err(|source| CredsError::Execution {
                position,
                stage: ExecutionStage::Execute,
                source,
            })?;
        debug!(position, "statement executed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::target::Dialect;
    use sqlx::AnyPool;
    use sqlx::any::AnyPoolOptions;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    async fn memory_pool() -> AnyPool {
        sqlx::any::install_default_drivers();
        AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite")
    }

    async fn table_exists(pool: &AnyPool, name: &str) -> bool {
        let n: i64 = sqlx::query_scalar("SELECT count(*) FROM sqlite_master WHERE name = ?")
            .bind(name.to_string())
            .fetch_one(pool)
            .await
            .unwrap();
        n > 0
    }

    struct TempFiles(Vec<PathBuf>);

    impl Drop for TempFiles {
        fn drop(&mut self) {
            for f in &self.0 {
                let _ = std::fs::remove_file(f);
            }
        }
    }

    fn temp_db(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "dbcreds-exec-{tag}-{}-{nanos}.sqlite",
            std::process::id()
        ))
    }

    fn stmts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn commits_when_every_statement_succeeds() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        execute_atomically(
            &mut conn,
            None,
            &stmts(&[
                r#"CREATE TABLE "svc-1" (id INTEGER)"#,
                r#"INSERT INTO "svc-1" VALUES (1)"#,
            ]),
        )
        .await
        .unwrap();
        drop(conn);

        assert!(table_exists(&pool, "svc-1").await);
        let rows: i64 = sqlx::query_scalar(r#"SELECT count(*) FROM "svc-1""#)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn failing_second_statement_leaves_no_trace() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let err = execute_atomically(
            &mut conn,
            None,
            &stmts(&["CREATE TABLE first_step (id INTEGER)", "INSERT INTO missing VALUES (1)"]),
        )
        .await
        .unwrap_err();
        drop(conn);

        assert!(matches!(err, CredsError::Execution { position: 2, .. }));
        assert!(!table_exists(&pool, "first_step").await);
    }

    #[tokio::test]
    async fn execution_failure_reports_execute_stage() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let err = execute_atomically(
            &mut conn,
            None,
            &stmts(&[
                "CREATE TABLE once (id INTEGER PRIMARY KEY)",
                "INSERT INTO once VALUES (1)",
                "INSERT INTO once VALUES (1)",
            ]),
        )
        .await
        .unwrap_err();
        drop(conn);

        match err {
            CredsError::Execution { position, stage, .. } => {
                assert_eq!(position, 3);
                assert_eq!(stage, ExecutionStage::Execute);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!table_exists(&pool, "once").await);
    }

    #[tokio::test]
    async fn connection_is_clean_after_rollback() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let _ = execute_atomically(&mut conn, None, &stmts(&["CREATE TABLE a (id INTEGER)", "BOGUS"]))
            .await
            .unwrap_err();
        execute_atomically(&mut conn, None, &stmts(&["CREATE TABLE b (id INTEGER)"]))
            .await
            .unwrap();
        drop(conn);

        assert!(!table_exists(&pool, "a").await);
        assert!(table_exists(&pool, "b").await);
    }

    #[tokio::test]
    async fn sqlite_catalog_adds_no_statement() {
        let pool = memory_pool().await;
        let catalog = Catalog::new(Dialect::Sqlite, "main").unwrap();
        let mut conn = pool.acquire().await.unwrap();
        execute_atomically(&mut conn, Some(&catalog), &stmts(&["CREATE TABLE c (id INTEGER)"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failing_catalog_selection_reports_position_zero() {
        let pool = memory_pool().await;
        // `USE` is not SQLite syntax, so the selection itself fails.
        let catalog = Catalog::new(Dialect::MySql, "app").unwrap();
        let mut conn = pool.acquire().await.unwrap();
        let err = execute_atomically(
            &mut conn,
            Some(&catalog),
            &stmts(&["CREATE TABLE never_run (id INTEGER)"]),
        )
        .await
        .unwrap_err();

        match err {
            CredsError::Execution { position, stage, .. } => {
                assert_eq!(position, 0);
                assert_eq!(stage, ExecutionStage::Execute);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        execute_atomically(&mut conn, None, &stmts(&["CREATE TABLE after_catalog (id INTEGER)"]))
            .await
            .unwrap();
        drop(conn);

        assert!(!table_exists(&pool, "never_run").await);
        assert!(table_exists(&pool, "after_catalog").await);
    }

    #[tokio::test]
    async fn cancelled_issuance_rolls_back_and_connection_is_reused() {
        let main_path = temp_db("main");
        let locked_path = temp_db("locked");
        let _files = TempFiles(vec![main_path.clone(), locked_path.clone()]);

        sqlx::any::install_default_drivers();
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect(&format!("sqlite://{}?mode=rwc", main_path.display()))
            .await
            .unwrap();
        let blocker = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&locked_path)
                    .create_if_missing(true),
            )
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        sqlx::query(&format!("ATTACH DATABASE '{}' AS locked", locked_path.display()))
            .execute(&mut *conn)
            .await
            .unwrap();

        // Another session holds the write lock on the attached file, so the
        // second statement waits in the busy handler until it is released.
        let mut hold = blocker.begin().await.unwrap();
        sqlx::query("CREATE TABLE hold (id INTEGER)")
            .execute(&mut *hold)
            .await
            .unwrap();

        let outcome = tokio::time::timeout(
            Duration::from_millis(250),
            execute_atomically(
                &mut conn,
                None,
                &stmts(&[
                    "CREATE TABLE first_step (id INTEGER)",
                    "CREATE TABLE locked.second_step (id INTEGER)",
                ]),
            ),
        )
        .await;
        assert!(outcome.is_err(), "issuance should still be waiting on the lock");
        hold.rollback().await.unwrap();

        execute_atomically(&mut conn, None, &stmts(&["CREATE TABLE after_cancel (id INTEGER)"]))
            .await
            .unwrap();

        let leftover: i64 = sqlx::query_scalar(
            "SELECT (SELECT count(*) FROM main.sqlite_master WHERE name = 'first_step') \
                  + (SELECT count(*) FROM locked.sqlite_master WHERE name = 'second_step')",
        )
        .fetch_one(&mut *conn)
        .await
        .unwrap();
        assert_eq!(leftover, 0);
        drop(conn);

        assert!(table_exists(&pool, "after_cancel").await);
        pool.close().await;
        blocker.close().await;
    }
}
