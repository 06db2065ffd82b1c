//! SQLite storage layer for Pocketbook

mod local;
mod migrations;
mod parse;
mod preferences;
mod traits;
mod workspace;

use rusqlite::Connection;
use std::path::Path;
use tracing::instrument;

use crate::error::Result;

pub use local::LocalBackend;
pub use preferences::PreferencesStore;
pub use traits::{SelectionStore, WorkspaceRemote};
pub use workspace::WorkspaceStore;

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database file and bring its schema up to date
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::migrated(Connection::open(path)?)
    }

    /// Throwaway database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(mut conn: Connection) -> Result<Self> {
        migrations::run_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn schema_version(&self) -> Result<u32> {
        migrations::schema_version(&self.conn)
    }

    /// Run `f` in one transaction. An error from `f` rolls back every
    /// write it made through the stores.
    pub fn atomically<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    /// Get workspace store
    pub fn workspaces(&self) -> WorkspaceStore<'_> {
        WorkspaceStore::new(&self.conn)
    }

    /// Get preferences store for client-local settings
    pub fn preferences(&self) -> PreferencesStore<'_> {
        PreferencesStore::new(&self.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use uuid::Uuid;

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pocketbook.db");
        let user_id = Uuid::new_v4();
        let workspace_id = Uuid::new_v4();

        {
            let db = Database::open(&path).unwrap();
            db.workspaces().create_default(user_id, "Personal").unwrap();
            db.preferences().set_active_workspace(workspace_id).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.workspaces().list_for_user(user_id).unwrap().len(), 1);
        assert_eq!(db.preferences().active_workspace().unwrap(), Some(workspace_id));
        assert_eq!(db.schema_version().unwrap(), 3);
    }

    #[test]
    fn test_atomically_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        let user_id = Uuid::new_v4();

        let result: Result<()> = db.atomically(|db| {
            db.preferences().set("local_user_id", &user_id.to_string())?;
            db.workspaces().create_default(user_id, "Personal")?;
            Err(crate::error::Error::Validation("disk full".into()))
        });

        assert!(result.is_err());
        assert_eq!(db.preferences().get("local_user_id").unwrap(), None);
        assert!(db.workspaces().list_for_user(user_id).unwrap().is_empty());
    }

    #[test]
    fn test_atomically_commits_on_success() {
        let db = Database::open_in_memory().unwrap();
        let user_id = Uuid::new_v4();

        let created = db
            .atomically(|db| db.workspaces().create_default(user_id, "Personal"))
            .unwrap();

        assert_eq!(db.workspaces().find_by_id(created.id).unwrap(), Some(created));
    }
}
