//! Text rendering for the project board and project detail cards.

use super::types::Project;

/// How many project buttons fit next to the create/refresh buttons.
pub const BOARD_BUTTON_LIMIT: usize = 21;

const MATERIALS_SHOWN: usize = 10;
const NOTES_SHOWN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Low,
    Medium,
    High,
    Completed,
}

impl Tier {
    pub fn of(progress: u8) -> Tier {
        match progress {
            100.. => Tier::Completed,
            75..=99 => Tier::High,
            50..=74 => Tier::Medium,
            _ => Tier::Low,
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Tier::Low => "🟢 Low Progress (<50%)",
            Tier::Medium => "🟠 Medium Progress (50–74%)",
            Tier::High => "🔴 High Priority (75–99%)",
            Tier::Completed => "⬛ Completed Projects",
        }
    }
}

/// Ten-cell bar, one cell per full 10%.
pub fn progress_bar(progress: u8) -> String {
    let filled = (progress.min(100) / 10) as usize;
    format!(
        "[{}{}] {}%",
        "█".repeat(filled),
        "░".repeat(10 - filled),
        progress
    )
}

/// Non-empty tiers in display order.
pub fn group_by_tier(projects: &[Project]) -> Vec<(Tier, Vec<&Project>)> {
    [Tier::Low, Tier::Medium, Tier::High, Tier::Completed]
        .into_iter()
        .map(|tier| {
            let members: Vec<&Project> = projects
                .iter()
                .filter(|p| Tier::of(p.progress) == tier)
                .collect();
            (tier, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}

pub fn render_board(projects: &[Project]) -> String {
    let mut out = String::from("🗂️ **Minecraft Project Board**\n");

    if projects.is_empty() {
        out.push_str("No projects yet. Use `!newproject` to get started!\n");
        return out;
    }

    for (tier, members) in group_by_tier(projects) {
        out.push_str(&format!("\n__{}__\n", tier.heading()));
        for project in members {
            out.push_str(&format!(
                "{} **{}** ({}) 👤 {} · {} · `{}`\n",
                project.status.emoji(),
                project.name,
                project.id,
                project.creator,
                project.status,
                progress_bar(project.progress)
            ));
        }
    }

    out.push_str(&format!("\nTotal Projects: {}", projects.len()));
    out
}

pub fn render_detail(project: &Project) -> String {
    let mut out = format!(
        "🏗️ **{}** ({})\n{}\n📊 Status: {}\n📈 Progress: {}%\n👤 Creator: {}\n📏 Dimensions: {}\n📍 Coordinates: {}\n⏰ Estimated Time: {}\n",
        project.name,
        project.id,
        project.description,
        project.status,
        project.progress,
        project.creator,
        project.dimensions,
        project.coordinates,
        project.estimated_time
    );

    if !project.collaborators.is_empty() {
        out.push_str(&format!("👥 Collaborators: {}\n", project.collaborators.join(", ")));
    }

    if !project.materials.is_empty() {
        out.push_str("🧱 Materials Needed:\n");
        for material in project.materials.iter().take(MATERIALS_SHOWN) {
            out.push_str(&format!("• {}\n", material));
        }
        if project.materials.len() > MATERIALS_SHOWN {
            out.push_str(&format!(
                "... and {} more\n",
                project.materials.len() - MATERIALS_SHOWN
            ));
        }
    }

    if !project.notes.is_empty() {
        out.push_str("📝 Recent Notes:\n");
        let skip = project.notes.len().saturating_sub(NOTES_SHOWN);
        for note in project.notes.iter().skip(skip) {
            out.push_str(&format!(
                "**{}** - {}: {}\n",
                note.timestamp.format("%m/%d %H:%M"),
                note.user,
                note.note
            ));
        }
    }

    out.push_str(&format!("Created: {}", project.created_at.format("%Y-%m-%d %H:%M")));
    out
}
