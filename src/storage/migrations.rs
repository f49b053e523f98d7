//! # Database Migration Management
//!
//! Handles database schema evolution using embedded SQL migrations. Migration
//! files are compiled into the binary so production deployments never depend
//! on a migrations directory being shipped alongside the executable. Applied
//! versions are tracked in a dedicated table and each migration runs inside
//! its own transaction.

use crate::errors::{Error, Result};
use crate::storage::DbPool;
use sqlx::Row;
use tracing::{error, info};

/// Migrations embedded at compile time, ordered by version.
const MIGRATIONS: &[(i64, &str, &str)] = &[(
    1,
    "0001_create_users_table",
    include_str!("../../migrations/0001_create_users_table.sql"),
)];

/// Run all pending database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    info!("Starting database migration process");

    create_migration_table(pool).await?;

    let applied = get_applied_migration_versions(pool).await?;

    let mut migrations_run = 0;
    for (version, name, sql) in MIGRATIONS {
        if applied.contains(version) {
            continue;
        }

        info!(version = version, "Running migration: {}", name);
        let start_time = std::time::Instant::now();

        let mut tx = pool.begin().await.map_err(|e| Error::Database {
            source: e,
            context: "Failed to start migration transaction".to_string(),
        })?;

        // raw_sql supports multi-statement migration files
        sqlx::raw_sql(sql).execute(&mut *tx).await.map_err(|e| {
            error!(error = %e, migration = name, "Migration failed");
            Error::Database { source: e, context: format!("Migration failed: {}", name) }
        })?;

        let execution_time = start_time.elapsed().as_millis() as i64;
        let now = chrono::Utc::now();

        sqlx::query(
            "INSERT INTO _userhub_migrations (version, description, execution_time, installed_on) VALUES ($1, $2, $3, $4)"
        )
        .bind(version)
        .bind(name)
        .bind(execution_time)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, migration = name, "Failed to record migration");
            Error::Database { source: e, context: format!("Failed to record migration: {}", name) }
        })?;

        tx.commit().await.map_err(|e| Error::Database {
            source: e,
            context: "Failed to commit migration transaction".to_string(),
        })?;

        migrations_run += 1;
        info!(
            version = version,
            execution_time_ms = execution_time,
            "Migration completed: {}",
            name
        );
    }

    if migrations_run > 0 {
        info!(count = migrations_run, "Database migrations completed");
    } else {
        info!("No pending migrations");
    }

    Ok(())
}

/// Create the migration tracking table
async fn create_migration_table(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _userhub_migrations (
            version BIGINT PRIMARY KEY,
            description TEXT NOT NULL,
            execution_time BIGINT NOT NULL,
            installed_on TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
    "#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Database {
        source: e,
        context: "Failed to create migration tracking table".to_string(),
    })?;

    Ok(())
}

/// Get list of applied migration versions
async fn get_applied_migration_versions(pool: &DbPool) -> Result<Vec<i64>> {
    let rows = sqlx::query("SELECT version FROM _userhub_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .map_err(|e| Error::Database {
            source: e,
            context: "Failed to get applied migrations".to_string(),
        })?;

    Ok(rows.into_iter().map(|row| row.get::<i64, _>("version")).collect())
}
