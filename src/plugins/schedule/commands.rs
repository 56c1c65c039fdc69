use chrono::NaiveDate;

use super::types::{DateBuckets, Task};
use super::ScheduleStore;
use crate::commands::components::ComponentId;
use crate::commands::Reply;
use crate::shared::errors::BotResult;

const WEEK_DAYS: u32 = 3;

/// Numbered task lines with indented subtasks.
pub fn format_tasks(tasks: &[Task], indent: &str) -> String {
    let mut out = String::new();
    for (i, task) in tasks.iter().enumerate() {
        out.push_str(&format!("{}{}. {}\n", indent, i + 1, task.description));
        for (si, subtask) in task.subtasks.iter().enumerate() {
            out.push_str(&format!("{}    - {}. {}\n", indent, si + 1, subtask));
        }
    }
    out
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn add_task(store: &ScheduleStore, category: &str, date: &str, description: &str) -> BotResult<Reply> {
    store.add_task(category, date, description)?;
    Ok(Reply::text(format!(
        "✅ Added task to **{}** on **{}**: {}",
        category.trim().to_lowercase(),
        date.trim(),
        description.trim()
    )))
}

pub fn add_subtask(
    store: &ScheduleStore,
    category: &str,
    date: &str,
    number: i64,
    subtask: &str,
) -> BotResult<Reply> {
    store.add_subtask(category, date, number, subtask)?;
    Ok(Reply::text(format!(
        "✅ Added subtask to task #{} in **{}** on **{}**: {}",
        number,
        category.trim().to_lowercase(),
        date.trim(),
        subtask.trim()
    )))
}

pub fn edit_task(
    store: &ScheduleStore,
    category: &str,
    date: &str,
    number: i64,
    description: &str,
) -> BotResult<Reply> {
    let old = store.edit_task(category, date, number, description)?;
    Ok(Reply::text(format!(
        "✅ Updated task #{} on **{}**/**{}**:\n- Old: {}\n- New: {}",
        number,
        category.trim().to_lowercase(),
        date.trim(),
        old,
        description.trim()
    )))
}

pub fn remove_task(store: &ScheduleStore, category: &str, date: &str, number: i64) -> BotResult<Reply> {
    let removed = store.remove_task(category, date, number)?;
    Ok(Reply::text(format!(
        "🗑️ Removed task #{} from **{}** on **{}**: {}",
        number,
        category.trim().to_lowercase(),
        date.trim(),
        removed.description
    )))
}

fn format_dates(dates: &DateBuckets, indent: &str) -> String {
    let mut out = String::new();
    for (date, tasks) in dates {
        out.push_str(&format!("{}__{}__\n", indent, date));
        out.push_str(&format_tasks(tasks, indent));
    }
    out
}

/// `!schedule`: everything, one category, or one category on one date.
pub fn view(store: &ScheduleStore, category: Option<&str>, date: Option<&str>) -> BotResult<Reply> {
    let reply = match (category, date) {
        (Some(category), Some(date)) => {
            let dates = store.list(category, Some(date))?;
            let mut body = format!(
                "**{} tasks on {}:**\n",
                title_case(&category.trim().to_lowercase()),
                date.trim()
            );
            for tasks in dates.values() {
                body.push_str(&format_tasks(tasks, ""));
            }
            Reply::text(body.trim_end())
        }
        (Some(category), None) => {
            let dates = store.list(category, None)?;
            let body = format!(
                "**All tasks in category {}:**\n{}",
                category.trim().to_lowercase(),
                format_dates(&dates, "")
            );
            Reply::text(body.trim_end())
        }
        (None, _) => {
            let all = store.all();
            if all.is_empty() {
                return Ok(Reply::text("📅 Your schedule is empty."));
            }
            let mut body = String::from("**Full Schedule:**\n");
            for (category, dates) in &all {
                body.push_str(&format!("__Category: {}__\n", title_case(category)));
                body.push_str(&format_dates(dates, "  "));
            }
            Reply::text(body.trim_end()).with_button("Refresh", ComponentId::PanelSchedule)
        }
    };
    Ok(reply)
}

/// `!week`: today plus the next two days.
pub fn week(store: &ScheduleStore, today: NaiveDate) -> Reply {
    let mut body = String::from("📅 **Next 3 Days:**\n");
    for day in store.upcoming(today, WEEK_DAYS) {
        body.push_str(&format!("\n__{}__\n", day.date));
        if day.entries.is_empty() {
            body.push_str("No tasks.\n");
            continue;
        }
        for (category, task) in &day.entries {
            body.push_str(&format!("[{}] {}\n", title_case(category), task.description));
            for subtask in &task.subtasks {
                body.push_str(&format!("    - {}\n", subtask));
            }
        }
    }
    Reply::text(body.trim_end())
}
