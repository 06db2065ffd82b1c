//! Subcommand handlers
//!
//! Each handler drives the workspace manager and prints the result.

use pocketbook_core::{
    Error, FieldUpdate, NewWorkspace, Result, Workspace, WorkspaceManager, WorkspacePatch,
};
use uuid::Uuid;

/// Fields for `pocketbook update`
#[derive(Debug, Default)]
pub struct UpdateArgs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub clear_icon: bool,
}

impl UpdateArgs {
    pub fn into_patch(self) -> WorkspacePatch {
        WorkspacePatch {
            name: self.name.into(),
            description: optional_field(self.description, self.clear_description),
            color: self.color.into(),
            icon: optional_field(self.icon, self.clear_icon),
        }
    }
}

fn optional_field(value: Option<String>, clear: bool) -> FieldUpdate<String> {
    if clear {
        FieldUpdate::Clear
    } else {
        value.into()
    }
}

/// Find a loaded workspace by id, or by name ignoring case
pub fn find_workspace<'a>(workspaces: &'a [Workspace], key: &str) -> Option<&'a Workspace> {
    if let Ok(id) = Uuid::parse_str(key) {
        return workspaces.iter().find(|w| w.id == id);
    }
    let key = key.trim();
    workspaces
        .iter()
        .find(|w| w.name.eq_ignore_ascii_case(key))
}

fn lookup(manager: &WorkspaceManager, key: &str) -> Result<Workspace> {
    let workspaces = manager.workspaces();
    find_workspace(&workspaces, key)
        .cloned()
        .ok_or_else(|| Error::Validation(format!("no workspace named '{}'", key)))
}

/// One line per workspace, active marked with `*`
pub fn render_list(workspaces: &[Workspace], active: Option<Uuid>) -> String {
    workspaces
        .iter()
        .map(|w| {
            let marker = if Some(w.id) == active { '*' } else { ' ' };
            let default = if w.is_default { " (default)" } else { "" };
            format!("{} {}  {}{}  {}", marker, w.color, w.name, default, w.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_details(workspace: &Workspace) -> String {
    let mut lines = vec![
        format!("Name:        {}", workspace.name),
        format!("Id:          {}", workspace.id),
        format!("Color:       {}", workspace.color),
    ];
    if let Some(icon) = &workspace.icon {
        lines.push(format!("Icon:        {}", icon));
    }
    if let Some(description) = &workspace.description {
        lines.push(format!("Description: {}", description));
    }
    if workspace.is_default {
        lines.push("Default:     yes".to_string());
    }
    lines.push(format!(
        "Updated:     {}",
        workspace.updated_at.format("%Y-%m-%d %H:%M")
    ));
    lines.join("\n")
}

pub fn list(manager: &WorkspaceManager, json: bool) -> Result<()> {
    let snapshot = manager.snapshot();
    if json {
        println!("{}", snapshot.to_json()?);
    } else if snapshot.workspaces.is_empty() {
        println!("No workspaces. Create one with `pocketbook create <name>`.");
    } else {
        println!("{}", render_list(&snapshot.workspaces, snapshot.active_id()));
    }
    Ok(())
}

pub fn show(manager: &WorkspaceManager, json: bool) -> Result<()> {
    let snapshot = manager.snapshot();
    if json {
        println!("{}", snapshot.to_json()?);
        return Ok(());
    }
    match snapshot.active_workspace() {
        Some(workspace) => println!("{}", render_details(workspace)),
        None => println!("No active workspace."),
    }
    Ok(())
}

pub async fn create(manager: &WorkspaceManager, data: NewWorkspace) -> Result<()> {
    let created = manager.create(data).await?;
    println!("{}", render_details(&created));
    Ok(())
}

pub async fn switch(manager: &WorkspaceManager, key: &str) -> Result<()> {
    let target = lookup(manager, key)?;
    manager.switch_to(&target).await?;
    println!("Active workspace: {}", target.name);
    Ok(())
}

pub async fn update(manager: &WorkspaceManager, key: &str, patch: WorkspacePatch) -> Result<()> {
    let target = lookup(manager, key)?;
    manager.update(target.id, patch).await?;
    list(manager, false)
}

pub async fn delete(manager: &WorkspaceManager, key: &str) -> Result<()> {
    let target = lookup(manager, key)?;
    manager.delete(target.id).await?;
    list(manager, false)
}
