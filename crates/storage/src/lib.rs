use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;
use uuid::Uuid;

use shared::{
    domain::{EntryId, Operator},
    protocol::HistoryEntry,
};

/// SQLite-backed store of computed results.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Records `entry` and trims the table to the newest `retention` rows in
    /// the same transaction.
    pub async fn insert_history_entry(&self, entry: &HistoryEntry, retention: u32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO calculations (id, a, b, op, result, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.0.to_string())
        .bind(entry.a)
        .bind(entry.b)
        .bind(entry.op.as_str())
        .bind(entry.result)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await
        .context("failed to insert calculation")?;

        let pruned = sqlx::query(
            "DELETE FROM calculations
             WHERE seq NOT IN (SELECT seq FROM calculations ORDER BY seq DESC LIMIT ?)",
        )
        .bind(i64::from(retention))
        .execute(&mut *tx)
        .await
        .context("failed to prune calculations")?
        .rows_affected();

        tx.commit().await?;
        if pruned > 0 {
            debug!(pruned, retention, "pruned history past retention");
        }
        Ok(())
    }

    /// Returns at most `limit` entries, newest first.
    pub async fn list_history(&self, limit: u32) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            "SELECT id, a, b, op, result, created_at
             FROM calculations
             ORDER BY seq DESC
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .context("failed to list calculations")?;

        rows.iter().map(history_entry_from_row).collect()
    }

    pub async fn clear_history(&self) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM calculations")
            .execute(&self.pool)
            .await
            .context("failed to clear calculations")?
            .rows_affected();
        Ok(deleted)
    }

    /// Keeps the newest `keep` entries and deletes the rest.
    pub async fn prune_history(&self, keep: u32) -> Result<u64> {
        let deleted = sqlx::query(
            "DELETE FROM calculations
             WHERE seq NOT IN (SELECT seq FROM calculations ORDER BY seq DESC LIMIT ?)",
        )
        .bind(i64::from(keep))
        .execute(&self.pool)
        .await
        .context("failed to prune calculations")?
        .rows_affected();
        Ok(deleted)
    }

    pub async fn count_history(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM calculations")
            .fetch_one(&self.pool)
            .await
            .context("failed to count calculations")?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn history_entry_from_row(row: &SqliteRow) -> Result<HistoryEntry> {
    let id: String = row.try_get("id")?;
    let op: String = row.try_get("op")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(HistoryEntry {
        id: EntryId(
            Uuid::parse_str(&id).with_context(|| format!("invalid entry id '{id}' in history"))?,
        ),
        a: row.try_get("a")?,
        b: row.try_get("b")?,
        op: Operator::from_str(&op).map_err(|_| anyhow!("invalid operator '{op}' in history"))?,
        result: row.try_get("result")?,
        created_at,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
