use chrono::NaiveDateTime;

use super::board::{progress_bar, render_board, render_detail, BOARD_BUTTON_LIMIT};
use super::types::{Member, NewProject};
use super::ProjectStore;
use crate::commands::components::ComponentId;
use crate::commands::Reply;
use crate::shared::errors::BotResult;

/// `!projects`: the board, a create and refresh button, and one button per
/// project up to the board limit.
pub fn board(store: &ProjectStore) -> Reply {
    let projects = store.list();
    let mut reply = Reply::text(render_board(&projects))
        .with_button("➕ Create Project", ComponentId::BoardCreate)
        .with_button("🔄 Refresh", ComponentId::BoardRefresh);

    for project in projects.iter().take(BOARD_BUTTON_LIMIT) {
        reply = reply.with_button(
            format!("{} {}", project.status.emoji(), project.name),
            ComponentId::ProjectView(project.id.clone()),
        );
    }
    reply
}

pub fn view(store: &ProjectStore, caller: &Member, id: &str) -> BotResult<Reply> {
    let project = store.get(id)?;
    let id = project.id.clone();

    let mut reply = Reply::text(render_detail(&project))
        .with_button("📊 Update Progress", ComponentId::ProjectProgress(id.clone()))
        .with_button("🧱 Add Materials", ComponentId::ProjectMaterials(id.clone()))
        .with_button("👥 Add Collaborator", ComponentId::ProjectCollab(id.clone()))
        .with_button("📝 Add Note", ComponentId::ProjectNote(id.clone()));
    if project.creator_id == caller.id {
        reply = reply.with_button("🗑️ Delete", ComponentId::ProjectDelete(id));
    }
    Ok(reply)
}

pub fn mine(store: &ProjectStore, caller: &Member) -> Reply {
    let projects = store.created_by(caller.id);
    if projects.is_empty() {
        return Reply::text("📋 You haven't created any projects yet!");
    }

    let mut body = format!("📋 **{}'s Projects**\n", caller.name);
    for project in &projects {
        body.push_str(&format!(
            "{} **{}** ({}) · {} · `{}`\n",
            project.status.emoji(),
            project.name,
            project.id,
            project.status,
            progress_bar(project.progress)
        ));
    }
    Reply::text(body.trim_end())
}

pub fn create(store: &ProjectStore, caller: &Member, new: NewProject, now: NaiveDateTime) -> BotResult<Reply> {
    let project = store.create(new, caller, now)?;
    Ok(Reply::text(format!(
        "✅ Project **{}** created successfully! ID: `{}`",
        project.name, project.id
    ))
    .with_button("View", ComponentId::ProjectView(project.id)))
}

pub fn progress(
    store: &ProjectStore,
    caller: &Member,
    id: &str,
    progress: &str,
    status: &str,
    note: Option<&str>,
    now: NaiveDateTime,
) -> BotResult<Reply> {
    let project = store.update_progress(id, progress, status, note, caller, now)?;
    Ok(Reply::text(format!(
        "✅ Updated **{}**: {} {} · {}",
        project.name,
        project.status.emoji(),
        project.status,
        progress_bar(project.progress)
    )))
}

pub fn materials(store: &ProjectStore, id: &str, list: &str) -> BotResult<Reply> {
    let materials = store.set_materials(id, list)?;
    Ok(Reply::text(format!("✅ Materials list updated! ({} items)", materials.len())))
}

pub fn collab(store: &ProjectStore, id: &str, username: &str) -> BotResult<Reply> {
    let project = store.add_collaborator(id, username)?;
    Ok(Reply::text(format!(
        "✅ Added **{}** as a collaborator on **{}**!",
        username.trim(),
        project.name
    )))
}

pub fn note(store: &ProjectStore, caller: &Member, id: &str, note: &str, now: NaiveDateTime) -> BotResult<Reply> {
    let project = store.add_note(id, caller, note, now)?;
    Ok(Reply::text(format!("✅ Note added to **{}**!", project.name)))
}

pub fn delete(store: &ProjectStore, caller: &Member, id: &str) -> BotResult<Reply> {
    let project = store.delete(id, caller)?;
    Ok(Reply::text(format!("🗑️ Project **{}** has been deleted!", project.name)))
}

#[cfg(test)]
mod tests {
    use super::super::init_project_store;
    use super::*;
    use crate::shared::errors::BotError;
    use crate::shared::time::parse_datetime;

    fn member(id: u64, name: &str) -> Member {
        Member {
            id,
            name: name.to_string(),
        }
    }

    fn new_project(name: &str) -> NewProject {
        NewProject {
            name: name.to_string(),
            description: "A build".to_string(),
            ..NewProject::default()
        }
    }

    #[test]
    fn test_board_buttons_are_capped() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_project_store(tmp.path());
        let alex = member(1, "alex");
        let now = parse_datetime("2025-07-01 10:00").unwrap();
        for i in 0..25 {
            store.create(new_project(&format!("Build {}", i)), &alex, now).unwrap();
        }

        let reply = board(&store);
        assert_eq!(reply.buttons.len(), 2 + BOARD_BUTTON_LIMIT);
        assert_eq!(reply.buttons[0].id, ComponentId::BoardCreate);
        assert_eq!(reply.buttons[2].id, ComponentId::ProjectView("proj_001".into()));
        assert!(reply.body.contains("Total Projects: 25"));
    }

    #[test]
    fn test_delete_button_only_for_creator() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_project_store(tmp.path());
        let alex = member(1, "alex");
        let sam = member(2, "sam");
        let now = parse_datetime("2025-07-01 10:00").unwrap();
        store.create(new_project("Tower"), &alex, now).unwrap();

        let own = view(&store, &alex, "proj_001").unwrap();
        assert!(own.buttons.iter().any(|b| b.id == ComponentId::ProjectDelete("proj_001".into())));

        let other = view(&store, &sam, "proj_001").unwrap();
        assert!(!other.buttons.iter().any(|b| matches!(b.id, ComponentId::ProjectDelete(_))));

        assert!(matches!(delete(&store, &sam, "proj_001"), Err(BotError::PermissionDenied(_))));
    }

    #[test]
    fn test_mine_filters_by_creator() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_project_store(tmp.path());
        let alex = member(1, "alex");
        let sam = member(2, "sam");
        let now = parse_datetime("2025-07-01 10:00").unwrap();
        store.create(new_project("Tower"), &alex, now).unwrap();
        store.create(new_project("Farm"), &sam, now).unwrap();

        let body = mine(&store, &alex).body;
        assert!(body.contains("Tower"));
        assert!(!body.contains("Farm"));
        assert_eq!(mine(&store, &member(3, "kim")).body, "📋 You haven't created any projects yet!");
    }
}
