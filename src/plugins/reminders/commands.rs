use chrono::NaiveDateTime;

use super::types::Reminder;
use super::ReminderStore;
use crate::commands::Reply;
use crate::shared::errors::BotResult;
use crate::shared::time::DATETIME_FORMAT;

pub fn set_reminder(store: &ReminderStore, due: &str, message: &str, now: NaiveDateTime) -> BotResult<Reply> {
    let reminder = store.set(due, message, now)?;
    Ok(Reply::text(format!(
        "⏰ Reminder #{} set for **{}**: {}",
        reminder.id,
        reminder.due.format(DATETIME_FORMAT),
        reminder.message
    )))
}

pub fn list_reminders(store: &ReminderStore) -> Reply {
    let reminders = store.list();
    if reminders.is_empty() {
        return Reply::text("⏰ No active reminders.");
    }

    let mut body = String::from("**Active Reminders:**\n");
    for r in &reminders {
        body.push_str(&format!(
            "{}. **{}** - {}\n",
            r.id,
            r.due.format(DATETIME_FORMAT),
            r.message
        ));
    }
    Reply::text(body.trim_end())
}

pub fn cancel_reminder(store: &ReminderStore, id: u64) -> BotResult<Reply> {
    store.cancel(id)?;
    Ok(Reply::text(format!("❌ Cancelled reminder #{}", id)))
}

/// Message delivered when a reminder fires.
pub fn fired_message(reminder: &Reminder) -> String {
    format!("⏰ **Reminder!** {}", reminder.message)
}

#[cfg(test)]
mod tests {
    use super::super::init_reminder_store;
    use super::*;
    use crate::shared::errors::BotError;
    use crate::shared::time::parse_datetime;

    #[test]
    fn test_set_and_list() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_reminder_store(tmp.path());
        let now = parse_datetime("2025-07-01 09:00").unwrap();

        let reply = set_reminder(&store, "2025-07-10 14:30", "Dentist", now).unwrap();
        assert_eq!(reply.body, "⏰ Reminder #1 set for **2025-07-10 14:30**: Dentist");
        assert_eq!(
            list_reminders(&store).body,
            "**Active Reminders:**\n1. **2025-07-10 14:30** - Dentist"
        );
    }

    #[test]
    fn test_cancel_unknown_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_reminder_store(tmp.path());

        assert!(matches!(cancel_reminder(&store, 9), Err(BotError::NotFound(_))));
        assert_eq!(list_reminders(&store).body, "⏰ No active reminders.");
    }
}
