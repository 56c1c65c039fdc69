//! Interactive element ids.
//!
//! Every button the bot offers has a stable string id such as `panel:tasks`
//! or `project:view:proj_004`. Pressing one either runs a command or, for
//! elements that used to open a form, returns the usage line to type.

use std::fmt;
use std::str::FromStr;

use super::Command;
use crate::shared::errors::BotError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentId {
    PanelTasks,
    PanelSchedule,
    PanelWeather,
    PanelStocks,
    PanelReminders,
    PanelHelp,
    ServerStatus,
    ServerPlayers,
    ServerPlugins,
    ServerWorlds,
    ServerTps,
    ServerSeed,
    ServerMap,
    ServerSizeWorld,
    ServerSizeMap,
    ServerSizeMine,
    ServerCommand,
    BoardCreate,
    BoardRefresh,
    ProjectView(String),
    ProjectProgress(String),
    ProjectMaterials(String),
    ProjectCollab(String),
    ProjectNote(String),
    ProjectDelete(String),
}

static FIXED: [(&str, ComponentId); 19] = [
    ("panel:tasks", ComponentId::PanelTasks),
    ("panel:schedule", ComponentId::PanelSchedule),
    ("panel:weather", ComponentId::PanelWeather),
    ("panel:stocks", ComponentId::PanelStocks),
    ("panel:reminders", ComponentId::PanelReminders),
    ("panel:help", ComponentId::PanelHelp),
    ("server:status", ComponentId::ServerStatus),
    ("server:players", ComponentId::ServerPlayers),
    ("server:plugins", ComponentId::ServerPlugins),
    ("server:worlds", ComponentId::ServerWorlds),
    ("server:tps", ComponentId::ServerTps),
    ("server:seed", ComponentId::ServerSeed),
    ("server:map", ComponentId::ServerMap),
    ("server:sizeworld", ComponentId::ServerSizeWorld),
    ("server:sizemap", ComponentId::ServerSizeMap),
    ("server:sizemine", ComponentId::ServerSizeMine),
    ("server:command", ComponentId::ServerCommand),
    ("board:create", ComponentId::BoardCreate),
    ("board:refresh", ComponentId::BoardRefresh),
];

/// `project:<action>:<id>` elements.
const PROJECT_SCOPED: [(&str, fn(String) -> ComponentId); 6] = [
    ("view", ComponentId::ProjectView),
    ("progress", ComponentId::ProjectProgress),
    ("materials", ComponentId::ProjectMaterials),
    ("collab", ComponentId::ProjectCollab),
    ("note", ComponentId::ProjectNote),
    ("delete", ComponentId::ProjectDelete),
];

/// What pressing an element does.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Run(Command),
    /// The element needs free-form input; tell the user what to type.
    Prompt(String),
}

impl ComponentId {
    fn project_scope(&self) -> Option<(&'static str, &str)> {
        match self {
            ComponentId::ProjectView(id) => Some(("view", id)),
            ComponentId::ProjectProgress(id) => Some(("progress", id)),
            ComponentId::ProjectMaterials(id) => Some(("materials", id)),
            ComponentId::ProjectCollab(id) => Some(("collab", id)),
            ComponentId::ProjectNote(id) => Some(("note", id)),
            ComponentId::ProjectDelete(id) => Some(("delete", id)),
            _ => None,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            ComponentId::PanelTasks => Action::Run(Command::Schedule {
                category: None,
                date: None,
            }),
            ComponentId::PanelSchedule => Action::Run(Command::Week),
            ComponentId::PanelWeather => Action::Run(Command::Weather { city: None }),
            ComponentId::PanelStocks => Action::Run(Command::Stocks),
            ComponentId::PanelReminders => Action::Run(Command::Reminders),
            ComponentId::PanelHelp => Action::Run(Command::Help),
            ComponentId::ServerStatus => Action::Run(Command::Status),
            ComponentId::ServerPlayers => Action::Run(Command::Players),
            ComponentId::ServerPlugins => Action::Run(Command::Plugins),
            ComponentId::ServerWorlds => Action::Run(Command::Worlds),
            ComponentId::ServerTps => Action::Run(Command::Tps),
            ComponentId::ServerSeed => Action::Run(Command::Seed),
            ComponentId::ServerMap => Action::Run(Command::Map),
            ComponentId::ServerSizeWorld => Action::Run(Command::SizeWorld),
            ComponentId::ServerSizeMap => Action::Run(Command::SizeMap),
            ComponentId::ServerSizeMine => Action::Run(Command::SizeMine),
            ComponentId::ServerCommand => Action::Prompt(prompt("command", None)),
            ComponentId::BoardCreate => Action::Prompt(prompt("newproject", None)),
            ComponentId::BoardRefresh => Action::Run(Command::Projects),
            ComponentId::ProjectView(id) => Action::Run(Command::Project { id: id.clone() }),
            ComponentId::ProjectProgress(id) => Action::Prompt(prompt("progress", Some(id))),
            ComponentId::ProjectMaterials(id) => Action::Prompt(prompt("materials", Some(id))),
            ComponentId::ProjectCollab(id) => Action::Prompt(prompt("collab", Some(id))),
            ComponentId::ProjectNote(id) => Action::Prompt(prompt("note", Some(id))),
            ComponentId::ProjectDelete(id) => Action::Run(Command::DeleteProject { id: id.clone() }),
        }
    }
}

/// Usage line for `command`, with `<project_id>` filled in when known.
fn prompt(command: &str, project_id: Option<&str>) -> String {
    let usage = super::lookup(command)
        .map(|def| def.usage)
        .unwrap_or(command);
    let usage = match project_id {
        Some(id) => usage.replace("<project_id>", id),
        None => usage.to_string(),
    };
    format!("✏️ Reply with: `!{}`", usage)
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((action, id)) = self.project_scope() {
            return write!(f, "project:{}:{}", action, id);
        }
        let name = FIXED
            .iter()
            .find(|(_, component)| component == self)
            .map(|(name, _)| *name)
            .unwrap_or("unknown");
        f.write_str(name)
    }
}

impl FromStr for ComponentId {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((_, component)) = FIXED.iter().find(|(name, _)| *name == s) {
            return Ok(component.clone());
        }

        if let Some((action, id)) = s.strip_prefix("project:").and_then(|rest| rest.split_once(':')) {
            if !id.is_empty() {
                if let Some((_, make)) = PROJECT_SCOPED.iter().find(|(name, _)| *name == action) {
                    return Ok(make(id.to_string()));
                }
            }
        }

        Err(BotError::not_found(format!("Unknown button: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ids_parse_and_format() {
        for (name, component) in FIXED.iter() {
            assert_eq!(&name.parse::<ComponentId>().unwrap(), component);
            assert_eq!(component.to_string(), *name);
        }
    }

    #[test]
    fn test_project_scoped_ids() {
        let id: ComponentId = "project:view:proj_004".parse().unwrap();
        assert_eq!(id, ComponentId::ProjectView("proj_004".to_string()));
        assert_eq!(id.to_string(), "project:view:proj_004");

        let id: ComponentId = "project:delete:proj_010".parse().unwrap();
        assert_eq!(id.to_string(), "project:delete:proj_010");
    }

    #[test]
    fn test_unknown_ids_rejected() {
        assert!("panel:nope".parse::<ComponentId>().is_err());
        assert!("project:view:".parse::<ComponentId>().is_err());
        assert!("project:launch:proj_001".parse::<ComponentId>().is_err());
    }

    #[test]
    fn test_actions() {
        assert_eq!(ComponentId::BoardRefresh.action(), Action::Run(Command::Projects));
        assert_eq!(ComponentId::PanelSchedule.action(), Action::Run(Command::Week));
        assert_eq!(ComponentId::ServerStatus.action(), Action::Run(Command::Status));
        assert_eq!(
            "server:sizeworld".parse::<ComponentId>().unwrap().action(),
            Action::Run(Command::SizeWorld)
        );
        assert_eq!(
            ComponentId::ProjectView("proj_001".into()).action(),
            Action::Run(Command::Project { id: "proj_001".into() })
        );

        match ComponentId::ProjectProgress("proj_002".into()).action() {
            Action::Prompt(text) => assert!(text.contains("!progress proj_002")),
            other => panic!("expected prompt, got {:?}", other),
        }
    }
}
