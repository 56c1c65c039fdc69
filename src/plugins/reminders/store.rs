use chrono::{NaiveDate, NaiveDateTime};

use super::types::Reminder;
use super::ReminderStore;
use crate::shared::errors::{BotError, BotResult};
use crate::shared::time::parse_datetime;

impl ReminderStore {
    /// Schedules a reminder. `due` must be strictly after `now`.
    pub fn set(&self, due: &str, message: &str, now: NaiveDateTime) -> BotResult<Reminder> {
        let due = parse_datetime(due)?;
        if due <= now {
            return Err(BotError::validation("Reminder time must be in the future!"));
        }
        let message = message.trim();
        if message.is_empty() {
            return Err(BotError::validation("Reminder message cannot be empty"));
        }

        let reminder = self.0.mutate(|book| {
            let reminder = Reminder {
                id: book.next_id(),
                due,
                message: message.to_string(),
                created: now,
            };
            book.reminders.push(reminder.clone());
            Ok::<_, BotError>(reminder)
        })?;

        tracing::info!(target: "reminders", id = reminder.id, due = %reminder.due, "Reminder set");
        Ok(reminder)
    }

    pub fn list(&self) -> Vec<Reminder> {
        self.0.read().reminders.clone()
    }

    pub fn len(&self) -> usize {
        self.0.read().reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().reminders.is_empty()
    }

    pub fn cancel(&self, id: u64) -> BotResult<Reminder> {
        let removed = self.0.mutate(|book| {
            let index = book
                .reminders
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| BotError::not_found(format!("Reminder #{} not found.", id)))?;
            Ok::<_, BotError>(book.reminders.remove(index))
        })?;

        tracing::info!(target: "reminders", id, "Reminder cancelled");
        Ok(removed)
    }

    /// Removes and returns every reminder whose time has come.
    ///
    /// Each reminder is returned by exactly one call; nothing is written when
    /// none are due.
    pub fn take_due(&self, now: NaiveDateTime) -> BotResult<Vec<Reminder>> {
        let due = self.0.mutate_if(|book| {
            let (due, pending): (Vec<_>, Vec<_>) =
                book.reminders.drain(..).partition(|r| r.due <= now);
            book.reminders = pending;
            Ok::<_, BotError>(if due.is_empty() { None } else { Some(due) })
        })?;

        let due = due.unwrap_or_default();
        if !due.is_empty() {
            tracing::info!(target: "reminders", count = due.len(), "Reminders fired");
        }
        Ok(due)
    }

    /// Reminders falling on `date`, in list order.
    pub fn due_on(&self, date: NaiveDate) -> Vec<Reminder> {
        self.0
            .read()
            .reminders
            .iter()
            .filter(|r| r.due.date() == date)
            .cloned()
            .collect()
    }
}
