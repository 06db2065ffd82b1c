//! Typed partial updates for workspaces

use chrono::Utc;
use super::workspace::{validate_color, validate_description, validate_name, Workspace};
use crate::error::{Error, Result};

/// Change to a single field.
///
/// `Keep` leaves the stored value alone. `Clear` is distinct from
/// `Set("")` and only valid for optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }

    /// Value to store for an optional column, or `None` to leave it alone
    pub fn as_column(&self) -> Option<Option<&T>> {
        match self {
            FieldUpdate::Keep => None,
            FieldUpdate::Set(v) => Some(Some(v)),
            FieldUpdate::Clear => Some(None),
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldUpdate::Set(v),
            None => FieldUpdate::Keep,
        }
    }
}

/// Updatable workspace fields. `is_default` is not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspacePatch {
    pub name: FieldUpdate<String>,
    pub description: FieldUpdate<String>,
    pub color: FieldUpdate<String>,
    pub icon: FieldUpdate<String>,
}

impl WorkspacePatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: FieldUpdate::Set(name.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_keep()
            && self.description.is_keep()
            && self.color.is_keep()
            && self.icon.is_keep()
    }

    /// Validate and normalize before the patch leaves the client
    pub fn validate(self) -> Result<Self> {
        let name = match self.name {
            FieldUpdate::Keep => FieldUpdate::Keep,
            FieldUpdate::Set(n) => FieldUpdate::Set(validate_name(&n)?),
            FieldUpdate::Clear => {
                return Err(Error::Validation("workspace name cannot be cleared".into()))
            }
        };
        let description = match self.description {
            FieldUpdate::Set(d) => FieldUpdate::Set(validate_description(&d)?),
            other => other,
        };
        let color = match self.color {
            FieldUpdate::Keep => FieldUpdate::Keep,
            FieldUpdate::Set(c) => FieldUpdate::Set(validate_color(&c)?),
            FieldUpdate::Clear => {
                return Err(Error::Validation("workspace color cannot be cleared".into()))
            }
        };
        Ok(Self {
            name,
            description,
            color,
            icon: self.icon,
        })
    }
}

impl Workspace {
    /// Apply a validated patch in place
    pub fn apply(&mut self, patch: &WorkspacePatch) {
        if let FieldUpdate::Set(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = patch.description.as_column() {
            self.description = description.cloned();
        }
        if let FieldUpdate::Set(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(icon) = patch.icon.as_column() {
            self.icon = icon.cloned();
        }
        if !patch.is_empty() {
            self.updated_at = Utc::now();
        }
    }
}
