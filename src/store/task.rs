//! Task records and the shapes used to query and change them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque unique identifier, never changed after creation.
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed_at: Option<DateTime<Utc>>,
    /// Set once at insert.
    pub created_at: DateTime<Utc>,
    /// Refreshed by every successful update.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Build a new task with a fresh UUID v4 and `created_at == updated_at == now`.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        completed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            completed_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Text value of a searchable field.
    pub fn field(&self, field: TaskField) -> &str {
        match field {
            TaskField::Title => &self.title,
            TaskField::Description => &self.description,
        }
    }

    /// Merge `patch` into this task. The id is never touched.
    pub(crate) fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
        self.updated_at = patch.updated_at;
    }
}

/// Text fields a filter can look into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskField {
    Title,
    Description,
}

/// Case-insensitive substring filter, OR-ed across its terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    terms: Vec<(TaskField, String)>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `needle` against both title and description.
    pub fn search(needle: &str) -> Self {
        Self::new()
            .with(TaskField::Title, needle)
            .with(TaskField::Description, needle)
    }

    /// Add a term. Empty needles are kept but never match.
    pub fn with(mut self, field: TaskField, needle: &str) -> Self {
        self.terms.push((field, needle.to_lowercase()));
        self
    }

    /// True if at least one term's field contains its needle.
    pub fn matches(&self, task: &Task) -> bool {
        self.terms.iter().any(|(field, needle)| {
            !needle.is_empty() && task.field(*field).to_lowercase().contains(needle.as_str())
        })
    }
}

/// Full replacement of the mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: String,
    pub description: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Partial change: only `Some` fields override.
///
/// `completed_at` is doubly optional: `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
    pub updated_at: DateTime<Utc>,
}

impl TaskPatch {
    /// An empty patch that only refreshes `updated_at`.
    pub fn new(updated_at: DateTime<Utc>) -> Self {
        Self {
            title: None,
            description: None,
            completed_at: None,
            updated_at,
        }
    }
}

impl From<TaskUpdate> for TaskPatch {
    fn from(update: TaskUpdate) -> Self {
        Self {
            title: Some(update.title),
            description: Some(update.description),
            completed_at: Some(update.completed_at),
            updated_at: update.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Task {
        Task::new("Buy milk", "From the corner store", None, Utc::now())
    }

    #[test]
    fn test_new_task_timestamps() {
        let now = Utc::now();
        let task = Task::new("a", "b", None, now);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(task.completed_at, None);
        assert!(Uuid::parse_str(&task.id).is_ok());
        assert_ne!(task.id, Task::new("a", "b", None, now).id);
    }

    #[test]
    fn test_filter_is_or_across_fields() {
        let task = sample();

        assert!(TaskFilter::search("MILK").matches(&task)); // title only
        assert!(TaskFilter::search("corner").matches(&task)); // description only
        assert!(!TaskFilter::search("bread").matches(&task));

        let filter = TaskFilter::new()
            .with(TaskField::Title, "nothing")
            .with(TaskField::Description, "STORE");
        assert!(filter.matches(&task));
    }

    #[test]
    fn test_empty_needles_never_match() {
        let task = sample();
        assert!(!TaskFilter::search("").matches(&task));
        assert!(!TaskFilter::new().matches(&task));
    }

    #[test]
    fn test_patch_only_overrides_present_fields() {
        let mut task = sample();
        let original = task.clone();
        let later = task.updated_at + Duration::seconds(5);

        let mut patch = TaskPatch::new(later);
        patch.title = Some("Buy oat milk".into());
        task.apply(patch);

        assert_eq!(task.id, original.id);
        assert_eq!(task.title, "Buy oat milk");
        assert_eq!(task.description, original.description);
        assert_eq!(task.completed_at, original.completed_at);
        assert_eq!(task.created_at, original.created_at);
        assert_eq!(task.updated_at, later);
    }

    #[test]
    fn test_update_clears_completion() {
        let mut task = sample();
        task.completed_at = Some(Utc::now());

        task.apply(
            TaskUpdate {
                title: "t".into(),
                description: "d".into(),
                completed_at: None,
                updated_at: Utc::now(),
            }
            .into(),
        );
        assert_eq!(task.completed_at, None);
        assert_eq!(task.title, "t");
    }
}
