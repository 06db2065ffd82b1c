//! Workspace model - a named financial profile

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Accent colors offered when creating a workspace
pub const WORKSPACE_COLORS: [&str; 9] = [
    "#6366F1", "#10B981", "#EF4444", "#F59E0B", "#8B5CF6", "#EC4899", "#14B8A6", "#F97316",
    "#06B6D4",
];

/// Icon tags offered when creating a workspace
pub const WORKSPACE_ICONS: [&str; 9] = [
    "User",
    "Briefcase",
    "Home",
    "Building2",
    "TrendingUp",
    "Wallet",
    "ShoppingBag",
    "Plane",
    "Heart",
];

pub const DEFAULT_COLOR: &str = "#6366F1";
pub const DEFAULT_ICON: &str = "Briefcase";

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// A workspace scopes transactions, categories, goals, projects and bills
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Hex accent color, `#RRGGBB`
    pub color: String,
    pub icon: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// Build a workspace the way the backend does on insert.
    pub fn new(user_id: Uuid, data: NewWorkspace) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: data.name.trim().to_string(),
            description: data.description,
            color: data.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            icon: Some(data.icon.unwrap_or_else(|| DEFAULT_ICON.to_string())),
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Display order: default-flagged first, then by name
    pub fn display_order(&self, other: &Self) -> Ordering {
        other
            .is_default
            .cmp(&self.is_default)
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Sort workspaces into display order (stable)
pub fn sort_workspaces(workspaces: &mut [Workspace]) {
    workspaces.sort_by(Workspace::display_order);
}

/// Input for creating a workspace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewWorkspace {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl NewWorkspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Validate and normalize: trimmed name, blank description dropped,
    /// color and icon filled from the given defaults.
    pub fn resolve(self, default_color: &str, default_icon: &str) -> Result<Self> {
        let name = validate_name(&self.name)?;
        let description = match self.description {
            Some(d) if d.trim().is_empty() => None,
            Some(d) => Some(validate_description(&d)?),
            None => None,
        };
        let color = match self.color {
            Some(c) => validate_color(&c)?,
            None => default_color.to_string(),
        };
        let icon = self
            .icon
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| default_icon.to_string());

        Ok(Self {
            name,
            description,
            color: Some(color),
            icon: Some(icon),
        })
    }
}

/// Returns the trimmed name, rejecting blank or overlong names
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("workspace name is required".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "workspace name is too long (max {} characters)",
            MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

pub fn validate_description(description: &str) -> Result<String> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::Validation(format!(
            "description is too long (max {} characters)",
            MAX_DESCRIPTION_LEN
        )));
    }
    Ok(description.to_string())
}

/// Accepts `#RRGGBB`, returned upper-cased
pub fn validate_color(color: &str) -> Result<String> {
    let color = color.trim();
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(Error::Validation(format!(
            "color must be a hex value like #6366F1, got '{}'",
            color
        )));
    }
    Ok(color.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws(name: &str, is_default: bool) -> Workspace {
        let mut w = Workspace::new(Uuid::new_v4(), NewWorkspace::new(name));
        w.is_default = is_default;
        w
    }

    #[test]
    fn test_sort_default_first_then_name() {
        let mut list = vec![ws("Zeta", false), ws("Home", true), ws("Acme", false)];
        sort_workspaces(&mut list);
        let names: Vec<&str> = list.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Acme", "Zeta"]);
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let data = NewWorkspace::new("  Freelance  ")
            .with_description("   ")
            .resolve(DEFAULT_COLOR, DEFAULT_ICON)
            .unwrap();
        assert_eq!(data.name, "Freelance");
        assert_eq!(data.description, None);
        assert_eq!(data.color.as_deref(), Some("#6366F1"));
        assert_eq!(data.icon.as_deref(), Some("Briefcase"));
    }

    #[test]
    fn test_resolve_rejects_blank_name() {
        let err = NewWorkspace::new("  ")
            .resolve(DEFAULT_COLOR, DEFAULT_ICON)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_resolve_rejects_long_name() {
        let err = NewWorkspace::new("x".repeat(MAX_NAME_LEN + 1))
            .resolve(DEFAULT_COLOR, DEFAULT_ICON)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_validate_color() {
        assert_eq!(validate_color("#10b981").unwrap(), "#10B981");
        assert!(validate_color("10B981").is_err());
        assert!(validate_color("#10B98").is_err());
        assert!(validate_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_palette_colors_are_valid() {
        for color in WORKSPACE_COLORS {
            assert_eq!(validate_color(color).unwrap(), color);
        }
        assert!(WORKSPACE_ICONS.contains(&DEFAULT_ICON));
    }
}
