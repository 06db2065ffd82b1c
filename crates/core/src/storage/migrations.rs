//! Schema migrations
//!
//! Versioned SQL applied in order; `schema_migrations` records what ran.

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{debug, info, instrument};

use crate::error::Result;

pub struct Migration {
    /// Starts at 1, no gaps
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema",
        sql: r#"
            -- Workspaces (financial profiles), one set per user
            CREATE TABLE IF NOT EXISTS workspaces (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                color TEXT NOT NULL DEFAULT '#6366F1',
                icon TEXT,
                is_default INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#,
    },
    Migration {
        version: 2,
        description: "Add workspace listing index",
        sql: r#"
            -- Matches list_for_user: WHERE user_id = ? ORDER BY is_default DESC, name
            CREATE INDEX IF NOT EXISTS idx_workspaces_user_order
                ON workspaces(user_id, is_default DESC, name);
        "#,
    },
    Migration {
        version: 3,
        description: "Add client preferences",
        sql: r#"
            -- Client-local key/value settings that survive restarts
            CREATE TABLE IF NOT EXISTS client_preferences (
                key TEXT PRIMARY KEY,
                value TEXT,
                updated_at TEXT NOT NULL
            );
        "#,
    },
];

const CREATE_MIGRATIONS_TABLE: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    applied_at TEXT NOT NULL
)";

/// Highest applied version, 0 for a fresh database
pub(super) fn schema_version(conn: &Connection) -> Result<u32> {
    let version: Option<u32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

/// Apply every migration newer than the stored version. Each one commits
/// together with its `schema_migrations` row. Returns how many ran.
#[instrument(skip(conn))]
pub fn run_migrations(conn: &mut Connection) -> Result<usize> {
    conn.execute(CREATE_MIGRATIONS_TABLE, [])?;

    let from = schema_version(conn)?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > from).collect();
    if pending.is_empty() {
        debug!(version = from, "Schema up to date");
        return Ok(0);
    }

    for migration in &pending {
        info!(
            version = migration.version,
            description = migration.description,
            "Applying migration"
        );
        let tx = conn.transaction()?;
        tx.execute_batch(migration.sql)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
            params![
                migration.version,
                migration.description,
                Utc::now().to_rfc3339()
            ],
        )?;
        tx.commit()?;
    }

    let to = schema_version(conn)?;
    info!(from, to, "Database schema updated");
    Ok(pending.len())
}
