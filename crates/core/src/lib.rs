//! Pocketbook Core Library
//!
//! Workspace models, the workspace manager, and local storage for the
//! Pocketbook personal finance app.

pub mod config;
pub mod error;
pub mod invariants;
pub mod manager;
pub mod models;
pub mod notify;
pub mod storage;

pub use config::Config;
pub use error::{Error, RemoteError, Result};
pub use manager::{Selection, WorkspaceManager, WorkspaceSnapshot};
pub use models::*;
pub use notify::{ChannelNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use storage::{
    Database, LocalBackend, PreferencesStore, SelectionStore, WorkspaceRemote, WorkspaceStore,
};
