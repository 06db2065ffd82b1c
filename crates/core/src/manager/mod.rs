//! Workspace manager
//!
//! Owns the signed-in user's workspace list and the active selection,
//! and is the only writer of either. Views read snapshots through
//! [`WorkspaceManager::subscribe`] or the accessors.
//!
//! Every list fetch takes a ticket from one counter when it is issued.
//! Only the latest-issued ticket may commit, so a slow response can never
//! overwrite a newer one, whichever finishes first. A fetch also records
//! the selection epoch it was issued under; if the user switched while it
//! was in flight, committing it keeps their choice.

mod selection;


use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Error, RemoteError, Result};
use crate::invariants::{assert_snapshot_invariants, check_fetched_list};
use crate::models::{
    sort_workspaces, NewWorkspace, Workspace, WorkspacePatch, DEFAULT_COLOR, DEFAULT_ICON,
};
use crate::notify::{Notice, Notifier};
use crate::storage::{SelectionStore, WorkspaceRemote};

pub use selection::{resolve_active, Selection, WorkspaceSnapshot};

/// How a committed list picks its active workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconcile {
    /// Fresh load: remembered id, default, first
    Fresh,
    /// Reload after a mutation: stay on the current workspace if it survived
    KeepActive,
}

/// Result of settling one fetch against current state
#[derive(Debug)]
enum FetchOutcome {
    Applied,
    Superseded,
    Failed { error: RemoteError, superseded: bool },
}

/// Stamp taken when a list fetch is issued
#[derive(Debug, Clone, Copy)]
struct FetchTicket {
    seq: u64,
    selection_epoch: u64,
}

#[derive(Debug, Default)]
struct ManagerState {
    user_id: Option<Uuid>,
    workspaces: Vec<Workspace>,
    selection: Selection,
    is_loading: bool,
    /// Sequence number of the most recently issued list fetch
    latest_fetch: u64,
    /// Bumped on every explicit switch
    selection_epoch: u64,
    /// Created workspace waiting for a list that contains it
    pending_active: Option<Uuid>,
}

impl ManagerState {
    fn issue_fetch(&mut self) -> FetchTicket {
        self.latest_fetch += 1;
        FetchTicket {
            seq: self.latest_fetch,
            selection_epoch: self.selection_epoch,
        }
    }

    fn is_current(&self, ticket: FetchTicket, user_id: Uuid) -> bool {
        self.latest_fetch == ticket.seq && self.user_id == Some(user_id)
    }

    fn contains(&self, id: Uuid) -> bool {
        self.workspaces.iter().any(|w| w.id == id)
    }

    fn find(&self, id: Uuid) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.id == id)
    }

    fn reset(&mut self) {
        self.workspaces.clear();
        self.selection = Selection::Unresolved;
        self.is_loading = false;
        self.pending_active = None;
    }

    /// Replace the list and re-derive the selection from it.
    ///
    /// Preference: a switch made after the fetch was issued, then a
    /// just-created workspace, then (for reloads) the current one, then
    /// remembered, default, first.
    fn apply_list(
        &mut self,
        mut list: Vec<Workspace>,
        ticket: FetchTicket,
        remembered: Option<Uuid>,
        mode: Reconcile,
    ) {
        sort_workspaces(&mut list);
        check_fetched_list(&list);

        let in_list = |id: &Uuid| list.iter().any(|w| w.id == *id);
        let switched = if ticket.selection_epoch != self.selection_epoch {
            self.selection.id().filter(in_list)
        } else {
            None
        };
        let pending = self.pending_active.filter(in_list);
        if pending.is_some() {
            self.pending_active = None;
        }
        let kept = match mode {
            Reconcile::KeepActive => self.selection.id().filter(in_list),
            Reconcile::Fresh => None,
        };

        let active = match switched.or(pending).or(kept) {
            Some(id) => list.iter().find(|w| w.id == id),
            None => resolve_active(&list, remembered, None),
        };
        self.selection = Selection::from_option(active.cloned());
        self.workspaces = list;
    }

    fn settle(
        &mut self,
        ticket: FetchTicket,
        user_id: Uuid,
        fetched: std::result::Result<Vec<Workspace>, RemoteError>,
        remembered: Option<Uuid>,
        mode: Reconcile,
    ) -> FetchOutcome {
        let current = self.is_current(ticket, user_id);
        match fetched {
            Ok(list) if current => {
                self.is_loading = false;
                self.apply_list(list, ticket, remembered, mode);
                FetchOutcome::Applied
            }
            Ok(_) => FetchOutcome::Superseded,
            Err(error) => {
                if current {
                    self.is_loading = false;
                }
                FetchOutcome::Failed {
                    error,
                    superseded: !current,
                }
            }
        }
    }

    fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            workspaces: self.workspaces.clone(),
            selection: self.selection.clone(),
            is_loading: self.is_loading,
        }
    }
}

pub struct WorkspaceManager {
    remote: Arc<dyn WorkspaceRemote>,
    selection_store: Arc<dyn SelectionStore>,
    notifier: Arc<dyn Notifier>,
    default_color: String,
    default_icon: String,
    state: Mutex<ManagerState>,
    published: watch::Sender<WorkspaceSnapshot>,
}

impl WorkspaceManager {
    pub fn new(
        remote: Arc<dyn WorkspaceRemote>,
        selection_store: Arc<dyn SelectionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (published, _) = watch::channel(WorkspaceSnapshot::default());
        Self {
            remote,
            selection_store,
            notifier,
            default_color: DEFAULT_COLOR.to_string(),
            default_icon: DEFAULT_ICON.to_string(),
            state: Mutex::new(ManagerState::default()),
            published,
        }
    }

    /// Use the configured color and icon for new workspaces
    pub fn with_config(mut self, config: &Config) -> Self {
        self.default_color = config.default_color.clone();
        self.default_icon = config.default_icon.clone();
        self
    }

    // ------------------------------------------------------------------
    // Published state
    // ------------------------------------------------------------------

    /// Receive a new snapshot after every committed change
    pub fn subscribe(&self) -> watch::Receiver<WorkspaceSnapshot> {
        self.published.subscribe()
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        self.state().snapshot()
    }

    pub fn workspaces(&self) -> Vec<Workspace> {
        self.state().workspaces.clone()
    }

    pub fn active_workspace(&self) -> Option<Workspace> {
        self.state().selection.workspace().cloned()
    }

    pub fn selection(&self) -> Selection {
        self.state().selection.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    pub fn current_user(&self) -> Option<Uuid> {
        self.state().user_id
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Load the user's workspaces and resolve the active one.
    ///
    /// A different user than the current session starts from a clean
    /// slate; the same user keeps the last good list while loading.
    #[instrument(skip(self))]
    pub async fn load(&self, user_id: Option<Uuid>) -> Result<()> {
        let user_id = user_id.ok_or(Error::NotAuthenticated)?;

        let ticket = {
            let mut state = self.state();
            if state.user_id != Some(user_id) {
                state.reset();
                state.user_id = Some(user_id);
            }
            state.is_loading = true;
            let ticket = state.issue_fetch();
            self.publish(&state);
            ticket
        };

        let remembered = self.remembered_selection().await;
        let fetched = self.remote.list_workspaces(user_id).await;

        let outcome = {
            let mut state = self.state();
            let outcome = state.settle(ticket, user_id, fetched, remembered, Reconcile::Fresh);
            if !matches!(outcome, FetchOutcome::Superseded) {
                self.publish(&state);
            }
            outcome
        };

        match outcome {
            FetchOutcome::Applied => {
                info!(active = ?self.selection().id(), "Workspaces loaded");
                Ok(())
            }
            FetchOutcome::Superseded => {
                debug!(seq = ticket.seq, "Discarding superseded workspace load");
                Ok(())
            }
            FetchOutcome::Failed { error, superseded } => {
                if superseded {
                    debug!(seq = ticket.seq, error = %error, "Superseded workspace load failed");
                } else {
                    self.report_failure("Could not load workspaces", &error);
                }
                Err(error.into())
            }
        }
    }

    /// Re-run [`load`](Self::load) for the signed-in user
    pub async fn refresh(&self) -> Result<()> {
        let user_id = self.current_user();
        self.load(user_id).await
    }

    /// Forget the session. Outstanding fetches will be discarded.
    #[instrument(skip(self))]
    pub fn sign_out(&self) {
        let mut state = self.state();
        state.reset();
        state.user_id = None;
        state.issue_fetch();
        self.publish(&state);
        info!("Workspace session cleared");
    }

    /// Make `workspace` the active one and remember the choice
    pub async fn switch_to(&self, workspace: &Workspace) -> Result<()> {
        self.switch_to_id(workspace.id).await
    }

    #[instrument(skip(self))]
    pub async fn switch_to_id(&self, workspace_id: Uuid) -> Result<()> {
        {
            let mut state = self.state();
            let target = state
                .find(workspace_id)
                .cloned()
                .ok_or(Error::InvalidSelection(workspace_id))?;

            if state.selection.id() == Some(workspace_id) {
                debug!("Workspace already active");
                return Ok(());
            }

            state.selection = Selection::Resolved(target);
            state.selection_epoch += 1;
            state.pending_active = None;
            self.publish(&state);
        }

        self.persist_selection(Some(workspace_id)).await;
        info!(%workspace_id, "Switched workspace");
        Ok(())
    }

    /// Create a workspace and make it active
    #[instrument(skip(self, data), fields(name = %data.name))]
    pub async fn create(&self, data: NewWorkspace) -> Result<Workspace> {
        let data = data.resolve(&self.default_color, &self.default_icon)?;
        let user_id = self.current_user().ok_or(Error::NotAuthenticated)?;

        let created = match self.remote.insert_workspace(user_id, &data).await {
            Ok(workspace) => workspace,
            Err(error) => {
                self.report_failure("Could not create workspace", &error);
                return Err(error.into());
            }
        };
        info!(workspace_id = %created.id, "Workspace created");
        self.notifier.notify(Notice::success("Workspace created"));

        let same_session = {
            let mut state = self.state();
            let same = state.user_id == Some(user_id);
            if same {
                state.pending_active = Some(created.id);
            }
            same
        };
        if !same_session {
            debug!("Session changed while creating workspace");
            return Ok(created);
        }

        // Remembered before the reload so a failed reload still lands on it next load
        self.persist_selection(Some(created.id)).await;
        self.reload(user_id).await?;
        Ok(created)
    }

    /// Change a workspace's name, description, color or icon
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: Uuid, patch: WorkspacePatch) -> Result<()> {
        let patch = patch.validate()?;
        let user_id = {
            let state = self.state();
            let user_id = state.user_id.ok_or(Error::NotAuthenticated)?;
            if !state.contains(id) {
                return Err(Error::NotFound(id));
            }
            user_id
        };
        if patch.is_empty() {
            debug!("Empty patch, nothing to update");
            return Ok(());
        }

        if let Err(error) = self.remote.update_workspace(id, &patch).await {
            self.report_failure("Could not update workspace", &error);
            return Err(error.into());
        }
        info!(workspace_id = %id, "Workspace updated");
        self.notifier.notify(Notice::success("Workspace updated"));

        let reloaded = self.reload(user_id).await;
        if reloaded.is_err() {
            // The write landed; mirror it locally so the view isn't stale
            let mut state = self.state();
            if state.user_id == Some(user_id) {
                if let Some(ws) = state.workspaces.iter_mut().find(|w| w.id == id) {
                    ws.apply(&patch);
                }
                sort_workspaces(&mut state.workspaces);
                if state.selection.id() == Some(id) {
                    let refreshed = state.find(id).cloned();
                    state.selection = Selection::from_option(refreshed);
                }
                self.publish(&state);
            }
        }
        reloaded
    }

    /// Delete a workspace, moving the selection off it if it was active
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let user_id = {
            let state = self.state();
            let user_id = state.user_id.ok_or(Error::NotAuthenticated)?;
            if !state.contains(id) {
                return Err(Error::NotFound(id));
            }
            user_id
        };

        if let Err(error) = self.remote.delete_workspace(id).await {
            self.report_failure("Could not delete workspace", &error);
            return Err(error.into());
        }
        info!(workspace_id = %id, "Workspace deleted");
        self.notifier.notify(Notice::success("Workspace deleted"));

        let remembered = self.remembered_selection().await;
        let reassigned = {
            let mut state = self.state();
            if state.user_id != Some(user_id) {
                None
            } else {
                state.workspaces.retain(|w| w.id != id);
                if state.pending_active == Some(id) {
                    state.pending_active = None;
                }
                let reassigned = if state.selection.id() == Some(id) {
                    let next = resolve_active(&state.workspaces, remembered, Some(id)).cloned();
                    let next_id = next.as_ref().map(|w| w.id);
                    state.selection = Selection::from_option(next);
                    Some(next_id)
                } else {
                    None
                };
                self.publish(&state);
                reassigned
            }
        };

        if let Some(next) = reassigned {
            info!(from = %id, to = ?next, "Active workspace reassigned");
            self.persist_selection(next).await;
        }

        self.reload(user_id).await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn state(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ManagerState) {
        let snapshot = state.snapshot();
        assert_snapshot_invariants(&snapshot);
        self.published.send_replace(snapshot);
    }

    /// Fetch and commit the list after a write, staying on the active
    /// workspace when it survived
    async fn reload(&self, user_id: Uuid) -> Result<()> {
        let ticket = self.state().issue_fetch();
        let remembered = self.remembered_selection().await;
        let fetched = self.remote.list_workspaces(user_id).await;

        let outcome = {
            let mut state = self.state();
            let outcome = state.settle(ticket, user_id, fetched, remembered, Reconcile::KeepActive);
            if !matches!(outcome, FetchOutcome::Superseded) {
                self.publish(&state);
            }
            outcome
        };

        match outcome {
            FetchOutcome::Applied => Ok(()),
            FetchOutcome::Superseded => {
                debug!(seq = ticket.seq, "Discarding superseded workspace reload");
                Ok(())
            }
            FetchOutcome::Failed { error, .. } => {
                self.report_failure("Could not refresh workspaces", &error);
                Err(error.into())
            }
        }
    }

    /// The remembered choice is a hint; a failed read counts as absent
    async fn remembered_selection(&self) -> Option<Uuid> {
        match self.selection_store.active_workspace_id().await {
            Ok(id) => id,
            Err(error) => {
                warn!(error = %error, "Could not read remembered workspace");
                None
            }
        }
    }

    async fn persist_selection(&self, workspace_id: Option<Uuid>) {
        let result = match workspace_id {
            Some(id) => self.selection_store.set_active_workspace_id(id).await,
            None => self.selection_store.clear_active_workspace_id().await,
        };
        if let Err(error) = result {
            self.report_failure("Could not remember the selected workspace", &error);
        }
    }

    fn report_failure(&self, action: &str, error: &RemoteError) {
        warn!(error = %error, "{}", action);
        self.notifier.notify(Notice::error(action));
    }
}
