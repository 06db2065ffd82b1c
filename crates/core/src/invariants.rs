//! Developer guardrails and invariants
//!
//! Two kinds of checks. States the manager builds itself are asserted in
//! debug builds. Lists that arrive from the remote collaborator are only
//! checked and logged, since the manager cannot vouch for them.

use std::collections::HashSet;

use tracing::warn;

use crate::manager::{Selection, WorkspaceSnapshot};
use crate::models::Workspace;

/// Validate a published snapshot: the selection never dangles
pub fn assert_snapshot_invariants(snapshot: &WorkspaceSnapshot) {
    let list = &snapshot.workspaces;

    match &snapshot.selection {
        Selection::Resolved(active) => debug_assert!(
            list.iter().any(|w| w.id == active.id),
            "Active workspace {} is not in the list",
            active.id
        ),
        Selection::Empty => debug_assert!(
            list.is_empty(),
            "Selection is empty but {} workspaces are loaded",
            list.len()
        ),
        Selection::Unresolved => {}
    }
}

/// Inspect a fetched list. Returns false (and warns) on anything a
/// well-behaved backend would not send.
pub fn check_fetched_list(workspaces: &[Workspace]) -> bool {
    let mut healthy = check_single_default(workspaces);

    for workspace in workspaces {
        if workspace.name.trim().is_empty() {
            warn!(workspace_id = %workspace.id, "Workspace has a blank name");
            healthy = false;
        }
        if workspace.updated_at < workspace.created_at {
            warn!(workspace_id = %workspace.id, "Workspace updated before it was created");
            healthy = false;
        }
    }

    let ids: HashSet<_> = workspaces.iter().map(|w| w.id).collect();
    if ids.len() != workspaces.len() {
        warn!(
            duplicates = workspaces.len() - ids.len(),
            "Workspace list has duplicate ids"
        );
        healthy = false;
    }

    let owners: HashSet<_> = workspaces.iter().map(|w| w.user_id).collect();
    if owners.len() > 1 {
        warn!(owners = owners.len(), "Workspace list mixes owners");
        healthy = false;
    }

    healthy
}

/// At most one default per user is enforced by the backend, not here.
/// Returns false (and warns) when the backend let a second one through.
pub fn check_single_default(workspaces: &[Workspace]) -> bool {
    let defaults = workspaces.iter().filter(|w| w.is_default).count();
    if defaults > 1 {
        warn!(defaults, "More than one default workspace");
        return false;
    }
    true
}
