use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "task")]
    pub description: String,
    #[serde(default)]
    pub subtasks: Vec<String>,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            subtasks: Vec::new(),
        }
    }
}

/// ISO date → tasks in insertion order.
pub type DateBuckets = BTreeMap<String, Vec<Task>>;

/// Invariant: no empty category and no empty date bucket is ever stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    pub categories: BTreeMap<String, DateBuckets>,
}

/// One day of the multi-day view.
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan {
    pub date: String,
    pub entries: Vec<(String, Task)>,
}
