use super::types::{Schedule, Task};
use crate::shared::errors::{BotError, BotResult};

pub fn normalize_category(category: &str) -> BotResult<String> {
    let category = category.trim().to_lowercase();
    if category.is_empty() {
        return Err(BotError::validation("Category cannot be empty"));
    }
    Ok(category)
}

/// Converts a 1-based task number into a vector index, rejecting anything out of range.
pub fn task_index(number: i64, len: usize) -> BotResult<usize> {
    if number < 1 || number as u64 > len as u64 {
        return Err(BotError::validation("Invalid task number."));
    }
    Ok((number - 1) as usize)
}

pub fn find_bucket<'a>(data: &'a Schedule, category: &str, date: &str) -> Option<&'a Vec<Task>> {
    data.categories.get(category).and_then(|dates| dates.get(date))
}

pub fn find_bucket_mut<'a>(
    data: &'a mut Schedule,
    category: &str,
    date: &str,
) -> BotResult<&'a mut Vec<Task>> {
    data.categories
        .get_mut(category)
        .and_then(|dates| dates.get_mut(date))
        .ok_or_else(|| BotError::not_found("Task or category not found."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_index_bounds() {
        assert_eq!(task_index(1, 3).unwrap(), 0);
        assert_eq!(task_index(3, 3).unwrap(), 2);
        assert!(task_index(0, 3).is_err());
        assert!(task_index(4, 3).is_err());
        assert!(task_index(-1, 3).is_err());
        assert!(task_index(1, 0).is_err());
    }

    #[test]
    fn test_normalize_category_lowercases() {
        assert_eq!(normalize_category("  Work ").unwrap(), "work");
        assert!(normalize_category("   ").is_err());
    }
}
