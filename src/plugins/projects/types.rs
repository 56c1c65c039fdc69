use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::shared::errors::BotError;

pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Planning,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    OnHold,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Planning,
        ProjectStatus::InProgress,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Planning",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::OnHold => "On Hold",
            ProjectStatus::Completed => "Completed",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "📋",
            ProjectStatus::InProgress => "⚡",
            ProjectStatus::OnHold => "⏸️",
            ProjectStatus::Completed => "✅",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProjectStatus {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.label().to_lowercase() == wanted)
            .ok_or_else(|| {
                BotError::validation("Status must be one of: Planning, In Progress, On Hold, Completed")
            })
    }
}

/// Older documents stored free-text statuses; unknown ones read as Planning.
fn lenient_status<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<ProjectStatus, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectNote {
    pub timestamp: NaiveDateTime,
    pub user: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub dimensions: String,
    pub coordinates: String,
    pub estimated_time: String,
    pub creator: String,
    pub creator_id: u64,
    #[serde(default)]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: ProjectStatus,
    #[serde(default)]
    pub progress: u8,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub started_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub notes: Vec<ProjectNote>,
}

/// Fields supplied when creating a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub dimensions: Option<String>,
    pub coordinates: Option<String>,
    pub estimated_time: Option<String>,
}

/// Who is acting on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: u64,
    pub name: String,
}

/// Projects keyed by id, plus the last sequence number handed out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProjectDocument")]
pub struct ProjectBook {
    pub last_seq: u64,
    pub projects: BTreeMap<String, Project>,
}

impl ProjectBook {
    pub fn next_id(&mut self) -> String {
        self.last_seq += 1;
        format_project_id(self.last_seq)
    }
}

pub fn format_project_id(seq: u64) -> String {
    format!("proj_{:03}", seq)
}

fn parse_project_seq(id: &str) -> Option<u64> {
    id.strip_prefix("proj_")?.parse().ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ProjectDocument {
    Current {
        last_seq: u64,
        #[serde(default)]
        projects: BTreeMap<String, Project>,
    },
    Legacy(BTreeMap<String, Project>),
}

impl From<ProjectDocument> for ProjectBook {
    fn from(doc: ProjectDocument) -> Self {
        let (last_seq, projects) = match doc {
            ProjectDocument::Current { last_seq, projects } => (last_seq, projects),
            ProjectDocument::Legacy(projects) => (0, projects),
        };
        let max_seq = projects
            .keys()
            .filter_map(|id| parse_project_seq(id))
            .max()
            .unwrap_or(0);
        ProjectBook {
            last_seq: last_seq.max(max_seq),
            projects,
        }
    }
}
