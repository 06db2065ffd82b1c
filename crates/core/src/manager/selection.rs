//! Active selection and the published snapshot

use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::models::Workspace;

/// Which workspace is in focus for the session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "workspace", rename_all = "snake_case")]
pub enum Selection {
    /// Before the first load completes, and after sign-out
    #[default]
    Unresolved,
    /// The user has no workspaces
    Empty,
    Resolved(Workspace),
}

impl Selection {
    pub fn workspace(&self) -> Option<&Workspace> {
        match self {
            Selection::Resolved(w) => Some(w),
            _ => None,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.workspace().map(|w| w.id)
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Selection::Unresolved)
    }

    /// `Resolved` for a member, `Empty` for none
    pub fn from_option(workspace: Option<Workspace>) -> Self {
        workspace.map_or(Selection::Empty, Selection::Resolved)
    }
}

/// Read-only view handed to consumers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkspaceSnapshot {
    pub workspaces: Vec<Workspace>,
    pub selection: Selection,
    pub is_loading: bool,
}

impl WorkspaceSnapshot {
    pub fn active_workspace(&self) -> Option<&Workspace> {
        self.selection.workspace()
    }

    /// Key consumers scope their own queries by
    pub fn active_id(&self) -> Option<Uuid> {
        self.selection.id()
    }

    /// Pretty JSON for front ends that don't link this crate
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Pick the active workspace by preference: the remembered id, then the
/// default-flagged workspace, then the first in display order. `excluded`
/// is never chosen (used when its workspace is being deleted).
pub fn resolve_active(
    workspaces: &[Workspace],
    remembered: Option<Uuid>,
    excluded: Option<Uuid>,
) -> Option<&Workspace> {
    let candidates = || workspaces.iter().filter(move |w| Some(w.id) != excluded);

    remembered
        .and_then(|id| candidates().find(|w| w.id == id))
        .or_else(|| candidates().find(|w| w.is_default))
        .or_else(|| candidates().next())
}
