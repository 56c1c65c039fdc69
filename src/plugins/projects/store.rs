use chrono::NaiveDateTime;

use super::types::{Member, NewProject, Project, ProjectNote, ProjectStatus, NOT_SPECIFIED};
use super::ProjectStore;
use crate::shared::errors::{BotError, BotResult};

const NAME_MAX: usize = 50;
const DESCRIPTION_MAX: usize = 500;
const DETAIL_MAX: usize = 100;
const NOTE_MAX: usize = 500;

fn required(value: &str, what: &str, max: usize) -> BotResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BotError::validation(format!("{} is required", what)));
    }
    if value.chars().count() > max {
        return Err(BotError::validation(format!("{} must be at most {} characters", what, max)));
    }
    Ok(value.to_string())
}

fn optional(value: Option<&str>, what: &str) -> BotResult<String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => required(v, what, DETAIL_MAX),
        None => Ok(NOT_SPECIFIED.to_string()),
    }
}

/// Parses user-entered progress, which must be an integer in [0, 100].
pub fn parse_progress(input: &str) -> BotResult<u8> {
    let value: i64 = input
        .trim()
        .parse()
        .map_err(|_| BotError::validation("Progress must be a number!"))?;
    if !(0..=100).contains(&value) {
        return Err(BotError::validation("Progress must be between 0 and 100!"));
    }
    Ok(value as u8)
}

fn project_mut<'a>(
    projects: &'a mut std::collections::BTreeMap<String, Project>,
    id: &str,
) -> BotResult<&'a mut Project> {
    projects
        .get_mut(id)
        .ok_or_else(|| BotError::not_found("Project not found!"))
}

impl ProjectStore {
    pub fn create(&self, new: NewProject, creator: &Member, now: NaiveDateTime) -> BotResult<Project> {
        let name = required(&new.name, "Project name", NAME_MAX)?;
        let description = required(&new.description, "Description", DESCRIPTION_MAX)?;
        let dimensions = optional(new.dimensions.as_deref(), "Dimensions")?;
        let coordinates = optional(new.coordinates.as_deref(), "Coordinates")?;
        let estimated_time = optional(new.estimated_time.as_deref(), "Estimated time")?;

        let project = self.0.mutate(|book| {
            let id = book.next_id();
            let project = Project {
                id: id.clone(),
                name,
                description,
                dimensions,
                coordinates,
                estimated_time,
                creator: creator.name.clone(),
                creator_id: creator.id,
                collaborators: Vec::new(),
                materials: Vec::new(),
                status: ProjectStatus::Planning,
                progress: 0,
                created_at: now,
                started_at: None,
                completed_at: None,
                notes: Vec::new(),
            };
            book.projects.insert(id, project.clone());
            Ok::<_, BotError>(project)
        })?;

        tracing::info!(target: "projects", id = %project.id, creator = %creator.name, "Project created");
        Ok(project)
    }

    pub fn get(&self, id: &str) -> BotResult<Project> {
        self.0
            .read()
            .projects
            .get(id.trim())
            .cloned()
            .ok_or_else(|| BotError::not_found("Project not found!"))
    }

    /// All projects in id order.
    pub fn list(&self) -> Vec<Project> {
        self.0.read().projects.values().cloned().collect()
    }

    pub fn created_by(&self, user_id: u64) -> Vec<Project> {
        self.0
            .read()
            .projects
            .values()
            .filter(|p| p.creator_id == user_id)
            .cloned()
            .collect()
    }

    /// Records a progress update.
    ///
    /// `Completed` always forces progress to 100. `started_at` and
    /// `completed_at` are stamped only on the first transition into their
    /// status and never overwritten.
    pub fn update_progress(
        &self,
        id: &str,
        progress: &str,
        status: &str,
        note: Option<&str>,
        user: &Member,
        now: NaiveDateTime,
    ) -> BotResult<Project> {
        let progress = parse_progress(progress)?;
        let status: ProjectStatus = status.parse()?;
        let note = match note.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => Some(required(n, "Note", NOTE_MAX)?),
            None => None,
        };

        let project = self.0.mutate(|book| {
            let project = project_mut(&mut book.projects, id.trim())?;

            project.status = status;
            project.progress = if status == ProjectStatus::Completed { 100 } else { progress };

            match status {
                ProjectStatus::InProgress if project.started_at.is_none() => {
                    project.started_at = Some(now);
                }
                ProjectStatus::Completed if project.completed_at.is_none() => {
                    project.completed_at = Some(now);
                }
                _ => {}
            }

            if let Some(note) = note {
                project.notes.push(ProjectNote {
                    timestamp: now,
                    user: user.name.clone(),
                    note,
                });
            }
            Ok::<_, BotError>(project.clone())
        })?;

        tracing::info!(
            target: "projects",
            id = %project.id,
            status = %project.status,
            progress = project.progress,
            "Project progress updated"
        );
        Ok(project)
    }

    /// Replaces the materials list with one entry per non-blank line.
    pub fn set_materials(&self, id: &str, text: &str) -> BotResult<Vec<String>> {
        let materials: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if materials.is_empty() {
            return Err(BotError::validation("Enter at least one material"));
        }

        self.0.mutate(|book| {
            let project = project_mut(&mut book.projects, id.trim())?;
            project.materials = materials.clone();
            Ok(materials)
        })
    }

    pub fn add_collaborator(&self, id: &str, username: &str) -> BotResult<Project> {
        let username = required(username, "Username", NAME_MAX)?;

        self.0.mutate(|book| {
            let project = project_mut(&mut book.projects, id.trim())?;
            if project.collaborators.contains(&username) {
                return Err(BotError::validation(format!(
                    "**{}** is already a collaborator on this project!",
                    username
                )));
            }
            project.collaborators.push(username);
            Ok(project.clone())
        })
    }

    pub fn add_note(&self, id: &str, user: &Member, note: &str, now: NaiveDateTime) -> BotResult<Project> {
        let note = required(note, "Note", NOTE_MAX)?;

        self.0.mutate(|book| {
            let project = project_mut(&mut book.projects, id.trim())?;
            project.notes.push(ProjectNote {
                timestamp: now,
                user: user.name.clone(),
                note,
            });
            Ok(project.clone())
        })
    }

    /// Deletes a project. Only its creator may do so.
    pub fn delete(&self, id: &str, caller: &Member) -> BotResult<Project> {
        let removed = self.0.mutate(|book| {
            let project = book
                .projects
                .get(id.trim())
                .ok_or_else(|| BotError::not_found("Project not found!"))?;
            if project.creator_id != caller.id {
                return Err(BotError::permission_denied(
                    "Only the project creator can delete this project!",
                ));
            }
            book.projects
                .remove(id.trim())
                .ok_or_else(|| BotError::not_found("Project not found!"))
        })?;

        tracing::info!(target: "projects", id = %removed.id, "Project deleted");
        Ok(removed)
    }
}
