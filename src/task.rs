//! To-do tasks ("cards"), each one scoped to a single calendar day

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::category::{Category, CategoryId};

/// The server-assigned identifier of a [`Task`]
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId {
    content: String,
}

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl From<String> for TaskId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for TaskId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}


/// How urgent a task is. There is no ordering between levels apart from the way they are displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// The value used on the wire
    pub fn as_number(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// The label displayed to the user
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Basse",
            Priority::Medium => "Moyenne",
            Priority::High => "Haute",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(format!("Invalid priority level {}", other)),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.label())
    }
}

/// Used to support serde
impl Serialize for Priority {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_number())
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Priority, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Priority::try_from(value).map_err(serde::de::Error::custom)
    }
}


/// The category a task points to, as sent by the server.
///
/// Depending on the route, the server either populates the category or only sends its id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskCategory {
    Populated(Category),
    Reference(CategoryId),
}

impl TaskCategory {
    pub fn id(&self) -> &CategoryId {
        match self {
            TaskCategory::Populated(c) => c.id(),
            TaskCategory::Reference(id) => id,
        }
    }

    /// The name embedded in the server response, if it has been populated
    pub fn name(&self) -> Option<&str> {
        match self {
            TaskCategory::Populated(c) => Some(c.name()),
            TaskCategory::Reference(_) => None,
        }
    }
}


/// A to-do task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    id: TaskId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(with = "calendar_day")]
    date: NaiveDate,
    /// `None` when the category has been deleted server-side
    #[serde(default)]
    category: Option<TaskCategory>,
    priority: Priority,
    #[serde(default)]
    is_completed: bool,
}

impl Task {
    /// Build a task the way the server would return it
    pub fn new(id: TaskId, draft: TaskDraft, category: Option<TaskCategory>, is_completed: bool) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            date: draft.date,
            category,
            priority: draft.priority,
            is_completed,
        }
    }

    pub fn id(&self) -> &TaskId              { &self.id          }
    pub fn title(&self) -> &str              { &self.title       }
    pub fn description(&self) -> &str        { &self.description }
    pub fn date(&self) -> NaiveDate          { self.date         }
    pub fn priority(&self) -> Priority       { self.priority     }
    pub fn completed(&self) -> bool          { self.is_completed }
    pub fn category(&self) -> Option<&TaskCategory> { self.category.as_ref() }
    pub fn category_id(&self) -> Option<&CategoryId> { self.category.as_ref().map(|c| c.id()) }

    /// Set the completion status, as reported by the server
    pub fn set_completed(&mut self, completed: bool) {
        self.is_completed = completed;
    }

    /// Set the category, as reported by the server
    pub fn set_category(&mut self, category: Option<TaskCategory>) {
        self.category = category;
    }

    /// Returns the editable fields of this task
    pub fn to_draft(&self) -> Option<TaskDraft> {
        let category = self.category_id()?.clone();
        Some(TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            category,
            priority: self.priority,
        })
    }
}


/// The fields a user sets when creating or editing a task.
///
/// This is also the body of update requests.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    #[serde(with = "calendar_day")]
    pub date: NaiveDate,
    pub category: CategoryId,
    pub priority: Priority,
}


/// (De)serializes a calendar day as `YYYY-MM-DD`.
///
/// The server may also send full ISO timestamps, whose time part is dropped.
pub mod calendar_day {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }

    pub fn parse(text: &str) -> Result<NaiveDate, String> {
        let day_part = match text.get(..10) {
            Some(d) => d,
            None => text,
        };
        NaiveDate::parse_from_str(day_part, FORMAT)
            .map_err(|err| format!("Invalid date {:?}: {}", text, err))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_wire_formats() {
        let populated = r#"{
            "_id": "t1", "title": "Groceries", "description": "Buy milk",
            "date": "2024-03-15T00:00:00.000Z",
            "category": {"_id": "c1", "name": "Home"},
            "priority": 3, "isCompleted": false, "__v": 0
        }"#;
        let task: Task = serde_json::from_str(populated).unwrap();
        assert_eq!(task.id().as_str(), "t1");
        assert_eq!(task.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(task.priority(), Priority::High);
        assert_eq!(task.category_id().map(|c| c.as_str()), Some("c1"));
        assert_eq!(task.category().and_then(|c| c.name()), Some("Home"));

        let bare = r#"{"_id": "t2", "title": "Run", "description": "5k",
            "date": "2024-03-16", "category": "c2", "priority": 1}"#;
        let task: Task = serde_json::from_str(bare).unwrap();
        assert_eq!(task.category_id().map(|c| c.as_str()), Some("c2"));
        assert_eq!(task.category().and_then(|c| c.name()), None);
        assert_eq!(task.completed(), false);

        let orphan = r#"{"_id": "t3", "title": "Old", "description": "x",
            "date": "2024-03-16", "category": null, "priority": 2, "isCompleted": true}"#;
        let task: Task = serde_json::from_str(orphan).unwrap();
        assert!(task.category().is_none());
        assert!(task.to_draft().is_none());
        assert!(task.completed());
    }

    #[test]
    fn invalid_priority_is_rejected() {
        let json = r#"{"_id": "t1", "title": "a", "description": "b",
            "date": "2024-03-15", "category": "c1", "priority": 7}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn draft_body() {
        let draft = TaskDraft {
            title: "Groceries".to_string(),
            description: "Buy milk".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            category: CategoryId::from("c1"),
            priority: Priority::Medium,
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value, serde_json::json!({
            "title": "Groceries",
            "description": "Buy milk",
            "date": "2024-03-05",
            "category": "c1",
            "priority": 2,
        }));
    }
}
