//! Local backend
//!
//! Serves both collaborator traits from one SQLite database, so the
//! application runs without a hosted service.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::traits::{SelectionStore, WorkspaceRemote};
use super::Database;
use crate::error::{Error, RemoteError};
use crate::models::{NewWorkspace, Workspace, WorkspacePatch};

#[derive(Clone)]
pub struct LocalBackend {
    db: Arc<Mutex<Database>>,
}

impl LocalBackend {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Shared handle to the underlying database
    pub fn database(&self) -> Arc<Mutex<Database>> {
        self.db.clone()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>, RemoteError> {
        self.db
            .lock()
            .map_err(|_| RemoteError::new("database lock poisoned"))
    }
}

fn remote(err: Error) -> RemoteError {
    match err {
        Error::Remote(e) => e,
        other => RemoteError::new(other.to_string()),
    }
}

fn not_found(id: Uuid) -> RemoteError {
    RemoteError::new(format!("workspace not found: {}", id))
}

#[async_trait]
impl WorkspaceRemote for LocalBackend {
    async fn list_workspaces(&self, user_id: Uuid) -> Result<Vec<Workspace>, RemoteError> {
        let db = self.lock()?;
        db.workspaces().list_for_user(user_id).map_err(remote)
    }

    async fn insert_workspace(
        &self,
        user_id: Uuid,
        data: &NewWorkspace,
    ) -> Result<Workspace, RemoteError> {
        let db = self.lock()?;
        let workspace = db.workspaces().create(user_id, data).map_err(remote)?;
        debug!(workspace_id = %workspace.id, "Inserted workspace");
        Ok(workspace)
    }

    async fn update_workspace(&self, id: Uuid, patch: &WorkspacePatch) -> Result<(), RemoteError> {
        let db = self.lock()?;
        if db.workspaces().update(id, patch).map_err(remote)? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }

    async fn delete_workspace(&self, id: Uuid) -> Result<(), RemoteError> {
        let db = self.lock()?;
        if db.workspaces().delete(id).map_err(remote)? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

#[async_trait]
impl SelectionStore for LocalBackend {
    async fn active_workspace_id(&self) -> Result<Option<Uuid>, RemoteError> {
        let db = self.lock()?;
        db.preferences().active_workspace().map_err(remote)
    }

    async fn set_active_workspace_id(&self, id: Uuid) -> Result<(), RemoteError> {
        let db = self.lock()?;
        db.preferences().set_active_workspace(id).map_err(remote)
    }

    async fn clear_active_workspace_id(&self) -> Result<(), RemoteError> {
        let db = self.lock()?;
        db.preferences().clear_active_workspace().map_err(remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> LocalBackend {
        LocalBackend::new(Database::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_insert_then_list() {
        let backend = backend();
        let user_id = Uuid::new_v4();

        let ws = backend
            .insert_workspace(user_id, &NewWorkspace::new("Freelance"))
            .await
            .unwrap();
        assert!(!ws.is_default);

        let list = backend.list_workspaces(user_id).await.unwrap();
        assert_eq!(list, vec![ws]);
    }

    #[tokio::test]
    async fn test_missing_rows_are_remote_errors() {
        let backend = backend();
        let missing = Uuid::new_v4();

        let err = backend
            .update_workspace(missing, &WorkspacePatch::rename("x"))
            .await
            .unwrap_err();
        assert!(err.message.contains("not found"));
        assert!(backend.delete_workspace(missing).await.is_err());
    }

    #[tokio::test]
    async fn test_selection_round_trip() {
        let backend = backend();
        assert_eq!(backend.active_workspace_id().await.unwrap(), None);

        let id = Uuid::new_v4();
        backend.set_active_workspace_id(id).await.unwrap();
        assert_eq!(backend.active_workspace_id().await.unwrap(), Some(id));

        backend.clear_active_workspace_id().await.unwrap();
        assert_eq!(backend.active_workspace_id().await.unwrap(), None);
    }
}
