use chrono::{Duration, NaiveDate};

use super::helpers::{find_bucket, find_bucket_mut, normalize_category, task_index};
use super::types::{DateBuckets, DayPlan, Task};
use super::ScheduleStore;
use crate::shared::errors::{BotError, BotResult};
use crate::shared::time::{date_key, parse_date};

fn require_text(text: &str, what: &str) -> BotResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(BotError::validation(format!("{} cannot be empty", what)));
    }
    Ok(text.to_string())
}

impl ScheduleStore {
    /// Appends a task to the (category, date) bucket and returns its 1-based number.
    pub fn add_task(&self, category: &str, date: &str, description: &str) -> BotResult<usize> {
        let category = normalize_category(category)?;
        let date = date_key(parse_date(date)?);
        let description = require_text(description, "Task")?;

        let number = self.0.mutate(|data| {
            let bucket = data
                .categories
                .entry(category.clone())
                .or_default()
                .entry(date.clone())
                .or_default();
            bucket.push(Task::new(description));
            Ok::<_, BotError>(bucket.len())
        })?;

        tracing::info!(target: "schedule", category = %category, date = %date, number, "Task added");
        Ok(number)
    }

    pub fn add_subtask(
        &self,
        category: &str,
        date: &str,
        number: i64,
        subtask: &str,
    ) -> BotResult<usize> {
        let category = normalize_category(category)?;
        let date = date_key(parse_date(date)?);
        let subtask = require_text(subtask, "Subtask")?;

        self.0.mutate(|data| {
            let bucket = find_bucket_mut(data, &category, &date)?;
            let index = task_index(number, bucket.len())?;
            let task = &mut bucket[index];
            task.subtasks.push(subtask);
            Ok(task.subtasks.len())
        })
    }

    /// Replaces a task's description and returns the previous one.
    pub fn edit_task(
        &self,
        category: &str,
        date: &str,
        number: i64,
        description: &str,
    ) -> BotResult<String> {
        let category = normalize_category(category)?;
        let date = date_key(parse_date(date)?);
        let description = require_text(description, "Task")?;

        self.0.mutate(|data| {
            let bucket = find_bucket_mut(data, &category, &date)?;
            let index = task_index(number, bucket.len())?;
            Ok(std::mem::replace(&mut bucket[index].description, description))
        })
    }

    /// Removes a task, pruning the date bucket and category once they are empty.
    pub fn remove_task(&self, category: &str, date: &str, number: i64) -> BotResult<Task> {
        let category = normalize_category(category)?;
        let date = date_key(parse_date(date)?);

        let removed = self.0.mutate(|data| {
            let bucket = find_bucket_mut(data, &category, &date)?;
            let index = task_index(number, bucket.len())?;
            let removed = bucket.remove(index);

            if bucket.is_empty() {
                if let Some(dates) = data.categories.get_mut(&category) {
                    dates.remove(&date);
                    if dates.is_empty() {
                        data.categories.remove(&category);
                    }
                }
            }
            Ok::<_, BotError>(removed)
        })?;

        tracing::info!(target: "schedule", category = %category, date = %date, number, "Task removed");
        Ok(removed)
    }

    /// Tasks of one category, optionally narrowed to a single date.
    pub fn list(&self, category: &str, date: Option<&str>) -> BotResult<DateBuckets> {
        let category = normalize_category(category)?;
        let data = self.0.read();
        let dates = data.categories.get(&category).ok_or_else(|| {
            BotError::not_found(format!("No tasks found under category **{}**.", category))
        })?;

        match date {
            None => Ok(dates.clone()),
            Some(date) => {
                let date = date_key(parse_date(date)?);
                let tasks = find_bucket(&data, &category, &date).ok_or_else(|| {
                    BotError::not_found(format!("No tasks for **{}** on **{}**.", category, date))
                })?;
                Ok(DateBuckets::from([(date, tasks.clone())]))
            }
        }
    }

    /// Every category with its full date buckets.
    pub fn all(&self) -> Vec<(String, DateBuckets)> {
        self.0
            .read()
            .categories
            .iter()
            .map(|(category, dates)| (category.clone(), dates.clone()))
            .collect()
    }

    /// Tasks scheduled on `date`, grouped by category.
    pub fn tasks_on(&self, date: NaiveDate) -> Vec<(String, Vec<Task>)> {
        let key = date_key(date);
        self.0
            .read()
            .categories
            .iter()
            .filter_map(|(category, dates)| {
                dates.get(&key).map(|tasks| (category.clone(), tasks.clone()))
            })
            .collect()
    }

    /// Consecutive day plans starting at `from`.
    pub fn upcoming(&self, from: NaiveDate, days: u32) -> Vec<DayPlan> {
        (0..days)
            .map(|offset| {
                let date = from + Duration::days(offset as i64);
                let entries = self
                    .tasks_on(date)
                    .into_iter()
                    .flat_map(|(category, tasks)| {
                        tasks.into_iter().map(move |task| (category.clone(), task))
                    })
                    .collect();
                DayPlan {
                    date: date_key(date),
                    entries,
                }
            })
            .collect()
    }

    pub fn total_tasks(&self) -> usize {
        self.0
            .read()
            .categories
            .values()
            .flat_map(|dates| dates.values())
            .map(Vec::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::super::init_schedule_store;
    use super::*;

    fn store() -> (tempfile::TempDir, ScheduleStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = init_schedule_store(tmp.path());
        (tmp, store)
    }

    #[test]
    fn test_add_task_lands_at_highest_index() {
        let (_tmp, store) = store();
        store.add_task("Work", "2025-07-10", "First").unwrap();
        let number = store.add_task("work", "2025-07-10", "Second").unwrap();

        assert_eq!(number, 2);
        let buckets = store.list("WORK", Some("2025-07-10")).unwrap();
        let tasks = &buckets["2025-07-10"];
        assert_eq!(tasks.last().unwrap().description, "Second");
    }

    #[test]
    fn test_add_task_rejects_bad_date_without_writing() {
        let (_tmp, store) = store();
        let result = store.add_task("work", "07/10/2025", "Oops");

        assert!(matches!(result, Err(BotError::Validation(_))));
        assert_eq!(store.total_tasks(), 0);
        assert!(!store.0.path().exists());
    }

    #[test]
    fn test_remove_reindexes_following_tasks() {
        let (_tmp, store) = store();
        for name in ["a", "b", "c"] {
            store.add_task("work", "2025-07-10", name).unwrap();
        }

        let removed = store.remove_task("work", "2025-07-10", 1).unwrap();
        assert_eq!(removed.description, "a");

        let tasks = store.list("work", Some("2025-07-10")).unwrap()["2025-07-10"].clone();
        let names: Vec<_> = tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_remove_last_task_prunes_bucket_and_category() {
        let (_tmp, store) = store();
        store.add_task("work", "2025-07-10", "a").unwrap();
        store.add_task("work", "2025-07-11", "b").unwrap();

        store.remove_task("work", "2025-07-10", 1).unwrap();
        let dates = store.list("work", None).unwrap();
        assert!(!dates.contains_key("2025-07-10"));
        assert!(dates.contains_key("2025-07-11"));

        store.remove_task("work", "2025-07-11", 1).unwrap();
        assert!(matches!(store.list("work", None), Err(BotError::NotFound(_))));
        assert!(store.0.read().categories.is_empty());
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let (_tmp, store) = store();
        store.add_task("work", "2025-07-10", "a").unwrap();

        assert!(matches!(
            store.remove_task("work", "2025-07-10", 2),
            Err(BotError::Validation(_))
        ));
        assert!(matches!(
            store.edit_task("work", "2025-07-10", 0, "x"),
            Err(BotError::Validation(_))
        ));
        assert!(matches!(
            store.add_subtask("home", "2025-07-10", 1, "x"),
            Err(BotError::NotFound(_))
        ));
        assert_eq!(store.total_tasks(), 1);
    }

    #[test]
    fn test_edit_and_subtask_round_trip_through_disk() {
        let (tmp, store) = store();
        store.add_task("work", "2025-07-10", "Draft").unwrap();

        let old = store.edit_task("work", "2025-07-10", 1, "Final").unwrap();
        assert_eq!(old, "Draft");
        assert_eq!(store.add_subtask("work", "2025-07-10", 1, "Intro").unwrap(), 1);

        let reloaded = init_schedule_store(tmp.path());
        assert_eq!(*reloaded.0.read(), *store.0.read());
        let task = &reloaded.list("work", None).unwrap()["2025-07-10"][0];
        assert_eq!(task.description, "Final");
        assert_eq!(task.subtasks, vec!["Intro".to_string()]);
    }

    #[test]
    fn test_document_uses_task_field_name() {
        let (_tmp, store) = store();
        store.add_task("work", "2025-07-10", "Report").unwrap();

        let raw = std::fs::read_to_string(store.0.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["work"]["2025-07-10"][0]["task"], "Report");
        assert_eq!(json["work"]["2025-07-10"][0]["subtasks"], serde_json::json!([]));
    }

    #[test]
    fn test_upcoming_collects_three_days_across_categories() {
        let (_tmp, store) = store();
        store.add_task("work", "2025-07-10", "Report").unwrap();
        store.add_task("home", "2025-07-11", "Laundry").unwrap();
        store.add_task("home", "2025-07-20", "Later").unwrap();

        let from = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
        let plans = store.upcoming(from, 3);

        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].entries.len(), 1);
        assert_eq!(plans[1].entries[0].0, "home");
        assert!(plans[2].entries.is_empty());
    }
}
