use std::cmp::Ordering;
use taskdesk_api::types::tasks::{parse_date, SortBy, TaskFilterParams, TaskItem};

fn bound(value: &Option<String>) -> Option<chrono::NaiveDateTime> {
    value.as_deref().filter(|s| !s.trim().is_empty()).and_then(parse_date)
}

fn compare(a: &TaskItem, b: &TaskItem, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Title => {
            a.title.to_lowercase().cmp(&b.title.to_lowercase()).then_with(|| a.title.cmp(&b.title))
        }
        SortBy::DueDate => {
            a.due_date.as_deref().unwrap_or_default().cmp(b.due_date.as_deref().unwrap_or_default())
        }
        SortBy::Priority => u8::from(a.priority).cmp(&u8::from(b.priority)),
        SortBy::Status => u8::from(a.status).cmp(&u8::from(b.status)),
        SortBy::CreatedAt => parse_date(&a.created_at).cmp(&parse_date(&b.created_at)),
    }
}

/// Applies `params` to `tasks` locally, without asking the backend.
///
/// Tasks without a parseable due date never match a due date bound. A bound
/// that cannot be parsed is ignored. Sorting is stable.
pub fn apply(tasks: &[TaskItem], params: &TaskFilterParams) -> Vec<TaskItem> {
    let search = params
        .search_term
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    let (from, to) = (bound(&params.due_date_from), bound(&params.due_date_to));
    let mut filtered = tasks
        .iter()
        .filter(|task| params.status.map_or(true, |status| task.status == status))
        .filter(|task| params.priority.map_or(true, |priority| task.priority == priority))
        .filter(|task| params.category.map_or(true, |category| task.category == category))
        .filter(|task| {
            search.as_deref().map_or(true, |search| {
                task.title.to_lowercase().contains(search)
                    || task.description.to_lowercase().contains(search)
            })
        })
        .filter(|task| {
            if from.is_none() && to.is_none() {
                return true;
            }
            let Some(due) = task.due_date.as_deref().and_then(parse_date) else {
                return false;
            };
            from.map_or(true, |from| due >= from) && to.map_or(true, |to| due <= to)
        })
        .cloned()
        .collect::<Vec<_>>();
    if let Some(sort_by) = params.sort_by {
        filtered.sort_by(|a, b| {
            let ordering = compare(a, b, sort_by);
            if params.sort_descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
    filtered
}
