//! Database schema migrations.
//!
//! Migration files are stored in this directory with the naming convention:
//! - `migration_NN_up.sql` - Upgrades schema from version `NN-1` to version `NN`
//! - `migration_NN_down.sql` - Downgrades schema from version `NN` to version `NN-1`
//!
//! The version lives in a one-row `schema_version` table that is created outside of any
//! migration, so version 0 is a database with nothing else in it.

use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::{debug, info};

use crate::Result;

/// The schema version this build of the program expects.
pub(crate) const CURRENT_VERSION: i32 = 1;

struct Migration {
    /// The version this migration brings the database to when going up.
    version: i32,
    up_sql: &'static str,
    down_sql: &'static str,
}

/// All available migrations in order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up_sql: include_str!("migration_01_up.sql"),
    down_sql: include_str!("migration_01_down.sql"),
}];

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Direction {
    Up,
    Down,
}

/// Creates the `schema_version` table at version 0 in an empty database.
pub(crate) async fn bootstrap(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin bootstrap transaction")?;
    sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
        .execute(&mut *tx)
        .await
        .context("Failed to create schema_version table")?;
    sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
        .execute(&mut *tx)
        .await
        .context("Failed to insert initial schema version")?;
    tx.commit()
        .await
        .context("Failed to commit bootstrap transaction")
}

/// Reads the schema version recorded in the database.
pub(crate) async fn current_version(pool: &SqlitePool) -> Result<i32> {
    let row: (Option<i32>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to read the schema version, is this a statement database?")?;
    row.0.context("The schema_version table is empty")
}

/// Brings the database from `current_ver` to `target_ver`, one migration per transaction.
///
/// Validates that every required migration exists before running any of them.
pub(crate) async fn run(pool: &SqlitePool, current_ver: i32, target_ver: i32) -> Result<()> {
    if current_ver == target_ver {
        debug!("Database already at target version {target_ver}, no migrations needed");
        return Ok(());
    }
    validate_migrations(current_ver, target_ver)?;

    if current_ver < target_ver {
        for version in (current_ver + 1)..=target_ver {
            step(pool, version, Direction::Up).await?;
        }
    } else {
        for version in (target_ver + 1..=current_ver).rev() {
            step(pool, version, Direction::Down).await?;
        }
    }

    info!("Database schema migrated from version {current_ver} to {target_ver}");
    Ok(())
}

/// Runs the migration numbered `version` in `direction` and records the resulting version.
async fn step(pool: &SqlitePool, version: i32, direction: Direction) -> Result<()> {
    let migration = MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .with_context(|| format!("Migration {version} not found"))?;
    let (sql, new_version) = match direction {
        Direction::Up => (migration.up_sql, version),
        Direction::Down => (migration.down_sql, version - 1),
    };
    debug!("Running migration {version:02} ({direction:?})");

    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin migration transaction")?;
    tx.execute(sql)
        .await
        .with_context(|| format!("Failed to execute migration {version:02} ({direction:?})"))?;
    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .context("Failed to update schema_version")?;
    tx.commit()
        .await
        .context("Failed to commit migration transaction")
}

fn validate_migrations(current_version: i32, target_version: i32) -> Result<()> {
    let (start, end) = if current_version < target_version {
        (current_version + 1, target_version)
    } else {
        (target_version + 1, current_version)
    };
    for version in start..=end {
        if !MIGRATIONS.iter().any(|m| m.version == version) {
            bail!(
                "Migration {version} is missing but required to migrate from version \
                {current_version} to {target_version}"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use tempfile::TempDir;

    async fn create_test_db() -> (TempDir, SqlitePool) {
        let temp_dir = TempDir::new().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(temp_dir.path().join("test.sqlite"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        bootstrap(&pool).await.unwrap();
        (temp_dir, pool)
    }

    async fn table_exists(pool: &SqlitePool, table_name: &str) -> bool {
        let row: (i32,) =
            sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?")
                .bind(table_name)
                .fetch_one(pool)
                .await
                .unwrap();
        row.0 > 0
    }

    #[tokio::test]
    async fn test_bootstrap_starts_at_zero() {
        let (_temp_dir, pool) = create_test_db().await;
        assert_eq!(current_version(&pool).await.unwrap(), 0);
        assert!(!table_exists(&pool, "customers").await);
    }

    #[tokio::test]
    async fn test_migration_up_creates_tables() {
        let (_temp_dir, pool) = create_test_db().await;
        run(&pool, 0, CURRENT_VERSION).await.unwrap();
        assert_eq!(current_version(&pool).await.unwrap(), CURRENT_VERSION);
        assert!(table_exists(&pool, "customers").await);
        assert!(table_exists(&pool, "accounts").await);
        assert!(table_exists(&pool, "transactions").await);
    }

    #[tokio::test]
    async fn test_migration_down_drops_tables() {
        let (_temp_dir, pool) = create_test_db().await;
        run(&pool, 0, 1).await.unwrap();
        run(&pool, 1, 0).await.unwrap();
        assert_eq!(current_version(&pool).await.unwrap(), 0);
        assert!(!table_exists(&pool, "customers").await);
        assert!(!table_exists(&pool, "accounts").await);
        assert!(!table_exists(&pool, "transactions").await);
    }

    #[tokio::test]
    async fn test_migration_no_op_when_already_at_target() {
        let (_temp_dir, pool) = create_test_db().await;
        run(&pool, 0, 1).await.unwrap();
        run(&pool, 1, 1).await.unwrap();
        assert_eq!(current_version(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_current_version_without_table() {
        let temp_dir = TempDir::new().unwrap();
        let options = SqliteConnectOptions::new()
            .filename(temp_dir.path().join("other.sqlite"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await.unwrap();
        assert!(current_version(&pool).await.is_err());
    }

    #[test]
    fn test_validate_migrations() {
        assert!(validate_migrations(0, 1).is_ok());
        assert!(validate_migrations(1, 0).is_ok());
        assert!(validate_migrations(0, 2).is_err());
        assert!(validate_migrations(1, 3).is_err());
    }
}
