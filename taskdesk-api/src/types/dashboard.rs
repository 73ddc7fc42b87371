use super::tasks::TaskItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The AI-generated overview shown on the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub summary: String,
    pub metrics: Metrics,
    #[serde(default)]
    pub tasks_today: Vec<TaskItem>,
    #[serde(default)]
    pub upcoming_tasks: Vec<TaskItem>,
    pub generated_at: String,
}

/// Counters over the user's tasks. The breakdowns are keyed by enum name
/// (`"Todo"`, `"High"`, `"Work"`, ...) and omit empty buckets.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_tasks: u32,
    pub due_today: u32,
    pub due_this_week: u32,
    pub overdue: u32,
    #[serde(default)]
    pub by_status: BTreeMap<String, u32>,
    #[serde(default)]
    pub by_priority: BTreeMap<String, u32>,
    #[serde(default)]
    pub by_category: BTreeMap<String, u32>,
}
