use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

macro_rules! numeric_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident = $value:literal => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl TryFrom<u8> for $name {
            type Error = ParseEnumError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError { kind: $kind, value: value.to_string() }),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value as u8
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        /// Accepts the numeric value or the label, ignoring case, spaces, `-` and `_`.
        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if let Ok(value) = s.trim().parse::<u8>() {
                    return Self::try_from(value);
                }
                let normalized = normalize(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| normalize(variant.label()) == normalized)
                    .ok_or_else(|| ParseEnumError { kind: $kind, value: s.into() })
            }
        }
    };
}

fn normalize(s: &str) -> String {
    s.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect()
}

numeric_enum!(TaskStatus, "task status" {
    Todo = 1 => "To Do",
    InProgress = 2 => "In Progress",
    Completed = 3 => "Completed",
    Cancelled = 4 => "Cancelled",
});

numeric_enum!(TaskPriority, "task priority" {
    Low = 1 => "Low",
    Medium = 2 => "Medium",
    High = 3 => "High",
});

numeric_enum!(TaskCategory, "task category" {
    Work = 1 => "Work",
    Personal = 2 => "Personal",
    Shopping = 3 => "Shopping",
});

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<String>,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub status: TaskStatus,
    #[serde(default)]
    pub user_id: String,
    pub created_at: String,
    #[serde(default)]
    pub last_modified_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: TaskPriority,
    pub category: TaskCategory,
}

/// A partial update; absent fields are left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Title,
    DueDate,
    Priority,
    Status,
    CreatedAt,
}

impl FromStr for SortBy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "title" => Ok(Self::Title),
            "duedate" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "status" => Ok(Self::Status),
            "createdat" => Ok(Self::CreatedAt),
            _ => Err(ParseEnumError { kind: "sort key", value: s.into() }),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Query parameters of the task list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilterParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,
    #[serde(skip_serializing_if = "is_blank")]
    pub search_term: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub due_date_from: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub due_date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortBy>,
    pub sort_descending: bool,
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for TaskFilterParams {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            category: None,
            search_term: None,
            due_date_from: None,
            due_date_to: None,
            sort_by: None,
            sort_descending: false,
            page_number: 1,
            page_size: 100,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedTaskRequest {
    pub title: String,
    pub description: String,
    pub due_date: Option<String>,
    pub priority: TaskPriority,
    pub category: TaskCategory,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateFromExtractionRequest {
    pub extractions: Vec<ExtractedTaskRequest>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedTaskResponse {
    pub created_tasks: Vec<TaskItem>,
    #[serde(default)]
    pub errors: Vec<ExtractedTaskError>,
    pub summary: ExtractedTaskSummary,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedTaskError {
    pub error_message: String,
    pub index: u32,
    pub task_title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedTaskSummary {
    pub completed_at: String,
    pub processing_time_ms: u64,
    pub total_created: u32,
    pub total_failed: u32,
    pub total_submitted: u32,
}

/// Parses the date formats the backend emits: RFC 3339, a naive date-time, or a bare date.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.and_time(Default::default())))
        .ok()
}
