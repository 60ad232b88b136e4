//! Versioned schema changes.
//!
//! Each schema version `NN` has two SQL files next to this module: `migration_NN_up.sql` moves a
//! database from `NN-1` to `NN`, and `migration_NN_down.sql` undoes it. The version a database is
//! at lives in the single-row `schema_version` table.

use crate::Result;
use anyhow::{bail, Context};
use sqlx::{Executor, SqlitePool};
use tracing::{debug, info};

/// The schema version this build of the program reads and writes.
pub(crate) const CURRENT_VERSION: i32 = 1;

struct Migration {
    version: i32,
    up: &'static str,
    down: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    up: include_str!("migration_01_up.sql"),
    down: include_str!("migration_01_down.sql"),
}];

fn migration(version: i32) -> Result<&'static Migration> {
    MIGRATIONS
        .iter()
        .find(|m| m.version == version)
        .with_context(|| format!("There is no migration for schema version {version}"))
}

/// Moves the schema of `pool` from version `from` to version `to`, in either direction, one
/// version at a time. Every required migration is looked up before the first one runs.
pub(crate) async fn run(pool: &SqlitePool, from: i32, to: i32) -> Result<()> {
    if from == to {
        debug!("Schema is at version {to}, nothing to migrate");
        return Ok(());
    }
    check_available(from, to)?;

    if from < to {
        for version in from + 1..=to {
            debug!("Migrating schema up to version {version:02}");
            apply(pool, migration(version)?.up, version).await?;
        }
    } else {
        for version in (to + 1..=from).rev() {
            debug!("Migrating schema down from version {version:02}");
            apply(pool, migration(version)?.down, version - 1).await?;
        }
    }

    info!("Database schema migrated from version {from} to {to}");
    Ok(())
}

/// Runs `sql` and records `version` in one transaction, so a failed migration leaves both the
/// schema and the recorded version as they were.
async fn apply(pool: &SqlitePool, sql: &str, version: i32) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .context("Unable to start a migration transaction")?;
    tx.execute(sql)
        .await
        .with_context(|| format!("Migration to schema version {version} failed"))?;
    sqlx::query("UPDATE schema_version SET version = ?")
        .bind(version)
        .execute(&mut *tx)
        .await
        .context("Unable to record the schema version")?;
    tx.commit()
        .await
        .context("Unable to commit the migration transaction")?;
    Ok(())
}

fn check_available(from: i32, to: i32) -> Result<()> {
    let (low, high) = if from < to { (from + 1, to) } else { (to + 1, from) };
    if let Some(missing) = (low..=high).find(|v| !MIGRATIONS.iter().any(|m| m.version == *v)) {
        bail!("Cannot migrate from schema version {from} to {to}: migration {missing} is missing");
    }
    Ok(())
}
