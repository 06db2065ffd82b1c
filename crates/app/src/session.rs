//! Local session
//!
//! The CLI has no sign-in; it acts as a single local user whose id is
//! minted on first run and kept in the client preferences.

use pocketbook_core::{Database, Result};
use tracing::info;
use uuid::Uuid;

const LOCAL_USER_KEY: &str = "local_user_id";
const FIRST_WORKSPACE_NAME: &str = "Personal";

/// Return the local user's id, minting one (and its default workspace)
/// on first run
pub fn local_user(db: &Database) -> Result<Uuid> {
    mint_local_user(db, provision)
}

/// The id is only stored once provisioning succeeded, so a failed first
/// run is retried in full next time
fn mint_local_user(
    db: &Database,
    provision: impl FnOnce(&Database, Uuid) -> Result<()>,
) -> Result<Uuid> {
    if let Some(id) = db
        .preferences()
        .get(LOCAL_USER_KEY)?
        .and_then(|raw| Uuid::parse_str(&raw).ok())
    {
        return Ok(id);
    }

    let user_id = Uuid::new_v4();
    db.atomically(|db| {
        provision(db, user_id)?;
        db.preferences().set(LOCAL_USER_KEY, &user_id.to_string())
    })?;
    info!(%user_id, "Created local user");
    Ok(user_id)
}

/// Give a user with no workspaces their default one
fn provision(db: &Database, user_id: Uuid) -> Result<()> {
    let store = db.workspaces();
    if store.list_for_user(user_id)?.is_empty() {
        let workspace = store.create_default(user_id, FIRST_WORKSPACE_NAME)?;
        info!(workspace_id = %workspace.id, "Provisioned default workspace");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketbook_core::Error;

    #[test]
    fn test_first_run_provisions_default() {
        let db = Database::open_in_memory().unwrap();
        let user_id = local_user(&db).unwrap();

        let list = db.workspaces().list_for_user(user_id).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, FIRST_WORKSPACE_NAME);
        assert!(list[0].is_default);
    }

    #[test]
    fn test_local_user_is_stable() {
        let db = Database::open_in_memory().unwrap();
        let first = local_user(&db).unwrap();
        let second = local_user(&db).unwrap();

        assert_eq!(first, second);
        assert_eq!(db.workspaces().list_for_user(first).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_provisioning_is_retried_next_run() {
        let db = Database::open_in_memory().unwrap();
        let failed = mint_local_user(&db, |db, user_id| {
            provision(db, user_id)?;
            Err(Error::Validation("interrupted".into()))
        });
        assert!(failed.is_err());
        assert_eq!(db.preferences().get(LOCAL_USER_KEY).unwrap(), None);

        let user_id = local_user(&db).unwrap();
        let list = db.workspaces().list_for_user(user_id).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, FIRST_WORKSPACE_NAME);
    }

    #[test]
    fn test_provision_skips_existing_user() {
        let db = Database::open_in_memory().unwrap();
        let user_id = Uuid::new_v4();
        provision(&db, user_id).unwrap();
        provision(&db, user_id).unwrap();

        assert_eq!(db.workspaces().list_for_user(user_id).unwrap().len(), 1);
    }
}
