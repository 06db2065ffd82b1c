//! Client preferences persistence
//!
//! Client-local key/value settings, such as the last active workspace.

use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse::{parse_uuid_opt, OptionalExt};
use crate::error::Result;

const ACTIVE_WORKSPACE_KEY: &str = "active_workspace_id";

/// Preferences store
pub struct PreferencesStore<'a> {
    conn: &'a Connection,
}

impl<'a> PreferencesStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Read a raw preference value
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM client_preferences WHERE key = ?1",
                params![key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    /// Write a raw preference value, replacing any previous one
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO client_preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM client_preferences WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Get the remembered active workspace.
    ///
    /// A malformed stored value reads as absent.
    pub fn active_workspace(&self) -> Result<Option<Uuid>> {
        let raw = self.get(ACTIVE_WORKSPACE_KEY)?;
        Ok(parse_uuid_opt(raw).ok().flatten())
    }

    /// Remember the active workspace
    pub fn set_active_workspace(&self, workspace_id: Uuid) -> Result<()> {
        self.set(ACTIVE_WORKSPACE_KEY, &workspace_id.to_string())
    }

    /// Forget the active workspace (e.g., when the last one is deleted)
    pub fn clear_active_workspace(&self) -> Result<()> {
        self.remove(ACTIVE_WORKSPACE_KEY)
    }
}
