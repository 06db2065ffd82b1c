//! Collaborator traits
//!
//! The workspace manager only sees these interfaces, so the backing
//! service can be the local SQLite backend, a hosted API, or a test double.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RemoteError;
use crate::models::{NewWorkspace, Workspace, WorkspacePatch};

/// Remote data collaborator for workspaces
#[async_trait]
pub trait WorkspaceRemote: Send + Sync {
    /// All workspaces owned by `user_id`, default first then name ascending
    async fn list_workspaces(&self, user_id: Uuid) -> Result<Vec<Workspace>, RemoteError>;

    /// Insert a workspace. The service assigns the id and `is_default = false`.
    async fn insert_workspace(
        &self,
        user_id: Uuid,
        data: &NewWorkspace,
    ) -> Result<Workspace, RemoteError>;

    /// Apply a partial update
    async fn update_workspace(&self, id: Uuid, patch: &WorkspacePatch) -> Result<(), RemoteError>;

    /// Delete a workspace
    async fn delete_workspace(&self, id: Uuid) -> Result<(), RemoteError>;
}

/// Persisted selection store, surviving restarts
#[async_trait]
pub trait SelectionStore: Send + Sync {
    async fn active_workspace_id(&self) -> Result<Option<Uuid>, RemoteError>;

    async fn set_active_workspace_id(&self, id: Uuid) -> Result<(), RemoteError>;

    async fn clear_active_workspace_id(&self) -> Result<(), RemoteError>;
}
