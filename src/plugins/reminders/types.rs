use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::shared::time::minute_format;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: u64,
    #[serde(rename = "datetime", with = "minute_format")]
    pub due: NaiveDateTime,
    pub message: String,
    pub created: NaiveDateTime,
}

/// Reminders plus the last id handed out.
///
/// Ids come from `last_id` and are never derived from the list length, so a
/// cancelled reminder's id is not reissued.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReminderDocument")]
pub struct ReminderBook {
    pub last_id: u64,
    pub reminders: Vec<Reminder>,
}

impl ReminderBook {
    pub fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }
}

/// On-disk shapes: the current object, or the older bare list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReminderDocument {
    Current {
        #[serde(default)]
        last_id: u64,
        #[serde(default)]
        reminders: Vec<Reminder>,
    },
    Legacy(Vec<Reminder>),
}

impl From<ReminderDocument> for ReminderBook {
    fn from(doc: ReminderDocument) -> Self {
        let (last_id, reminders) = match doc {
            ReminderDocument::Current { last_id, reminders } => (last_id, reminders),
            ReminderDocument::Legacy(reminders) => (0, reminders),
        };
        let max_id = reminders.iter().map(|r| r.id).max().unwrap_or(0);
        ReminderBook {
            last_id: last_id.max(max_id),
            reminders,
        }
    }
}
