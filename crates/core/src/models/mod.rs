//! Data models for Pocketbook

mod patch;
mod workspace;

pub use patch::*;
pub use workspace::*;
