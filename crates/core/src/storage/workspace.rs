//! Workspace storage operations

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use tracing::instrument;
use uuid::Uuid;

use super::parse::{workspace_from_row, OptionalExt};
use crate::error::Result;
use crate::models::{FieldUpdate, NewWorkspace, Workspace, WorkspacePatch};

const WORKSPACE_COLUMNS: &str =
    "id, user_id, name, description, color, icon, is_default, created_at, updated_at";

pub struct WorkspaceStore<'a> {
    conn: &'a Connection,
}

impl<'a> WorkspaceStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a fully built workspace row
    #[instrument(skip(self, workspace), fields(workspace_id = %workspace.id, name = %workspace.name))]
    pub fn insert(&self, workspace: &Workspace) -> Result<()> {
        self.conn.execute(
            "INSERT INTO workspaces (id, user_id, name, description, color, icon, is_default, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                workspace.id.to_string(),
                workspace.user_id.to_string(),
                workspace.name,
                workspace.description,
                workspace.color,
                workspace.icon,
                workspace.is_default as i32,
                workspace.created_at.to_rfc3339(),
                workspace.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Create a non-default workspace for a user, assigning id and timestamps
    pub fn create(&self, user_id: Uuid, data: &NewWorkspace) -> Result<Workspace> {
        let workspace = Workspace::new(user_id, data.clone());
        self.insert(&workspace)?;
        Ok(workspace)
    }

    /// Provision the default workspace a new user starts with
    pub fn create_default(&self, user_id: Uuid, name: &str) -> Result<Workspace> {
        let mut workspace = Workspace::new(user_id, NewWorkspace::new(name));
        workspace.is_default = true;
        self.insert(&workspace)?;
        Ok(workspace)
    }

    /// Find workspace by ID
    #[instrument(skip(self))]
    pub fn find_by_id(&self, id: Uuid) -> Result<Option<Workspace>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM workspaces WHERE id = ?1",
            WORKSPACE_COLUMNS
        ))?;

        let workspace = stmt
            .query_row(params![id.to_string()], workspace_from_row)
            .optional()?;

        Ok(workspace)
    }

    /// List a user's workspaces, default first then by name
    #[instrument(skip(self))]
    pub fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Workspace>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM workspaces WHERE user_id = ?1 ORDER BY is_default DESC, name",
            WORKSPACE_COLUMNS
        ))?;

        let workspaces = stmt
            .query_map(params![user_id.to_string()], workspace_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(workspaces)
    }

    /// Apply a patch. Returns false if no such workspace exists.
    #[instrument(skip(self, patch))]
    pub fn update(&self, id: Uuid, patch: &WorkspacePatch) -> Result<bool> {
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let FieldUpdate::Set(name) = &patch.name {
            sets.push("name = ?");
            values.push(Value::Text(name.clone()));
        }
        if let Some(description) = patch.description.as_column() {
            sets.push("description = ?");
            values.push(text_or_null(description));
        }
        if let FieldUpdate::Set(color) = &patch.color {
            sets.push("color = ?");
            values.push(Value::Text(color.clone()));
        }
        if let Some(icon) = patch.icon.as_column() {
            sets.push("icon = ?");
            values.push(text_or_null(icon));
        }

        sets.push("updated_at = ?");
        values.push(Value::Text(Utc::now().to_rfc3339()));
        values.push(Value::Text(id.to_string()));

        let sql = format!("UPDATE workspaces SET {} WHERE id = ?", sets.join(", "));
        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        Ok(changed > 0)
    }

    /// Delete a workspace. Returns false if no such workspace exists.
    #[instrument(skip(self))]
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM workspaces WHERE id = ?1", params![id.to_string()])?;
        Ok(changed > 0)
    }
}

fn text_or_null(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |v| Value::Text(v.clone()))
}
