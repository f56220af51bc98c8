use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server-assigned task identifier.
pub type TaskId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "in progress", alias = "in_progress", alias = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// Value sent over the wire and used by form controls.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Completed => "completed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0:?} (expected pending, in_progress or completed)")]
pub struct ParseStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in progress" | "in_progress" | "in-progress" | "inprogress" => {
                Ok(TaskStatus::InProgress)
            }
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A task as the server represents it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    #[serde(rename = "_id", alias = "id")]
    pub id: TaskId,

    pub title: String,

    pub description: String,

    #[serde(default)]
    pub status: TaskStatus,

    /// Server fields the client does not interpret (timestamps, version keys).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Task {
    pub fn new(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        description: impl Into<String>,
        status: TaskStatus,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            status,
            extra: BTreeMap::new(),
        }
    }
}

/// The editable fields of a task; the body of POST and PUT requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

impl TaskDraft {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        status: TaskStatus,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status,
        }
    }

    /// Both text fields are required before a draft may be submitted.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.description.trim().is_empty()
    }
}

impl From<&Task> for TaskDraft {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_backend_ids_and_keeps_unknown_fields() {
        let task: Task = serde_json::from_value(json!({
            "_id": "66b1",
            "title": "Buy milk",
            "description": "2%",
            "status": "in progress",
            "__v": 0
        }))
        .expect("decode task");

        assert_eq!(task.id, "66b1");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.extra.get("__v"), Some(&json!(0)));

        let back = serde_json::to_value(&task).expect("encode task");
        assert_eq!(back["_id"], json!("66b1"));
        assert_eq!(back["status"], json!("in progress"));
        assert_eq!(back["__v"], json!(0));
    }

    #[test]
    fn plain_id_key_is_accepted() {
        let task: Task = serde_json::from_value(json!({
            "id": "9",
            "title": "A",
            "description": "B",
            "status": "in_progress"
        }))
        .expect("decode task");

        assert_eq!(task, Task::new("9", "A", "B", TaskStatus::InProgress));
    }

    #[test]
    fn status_parsing_accepts_spellings() {
        assert_eq!("Pending".parse::<TaskStatus>(), Ok(TaskStatus::Pending));
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!(" completed ".parse::<TaskStatus>(), Ok(TaskStatus::Completed));
        assert!("later".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn draft_requires_title_and_description() {
        assert!(!TaskDraft::default().is_complete());
        assert!(!TaskDraft::new("title", "  ", TaskStatus::Pending).is_complete());
        assert!(TaskDraft::new("title", "body", TaskStatus::Pending).is_complete());

        let draft = serde_json::to_value(TaskDraft::default()).expect("encode draft");
        assert_eq!(
            draft,
            json!({ "title": "", "description": "", "status": "pending" })
        );
    }
}
