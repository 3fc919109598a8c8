use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Swatches offered by the task and note forms
pub const COLOR_OPTIONS: [&str; 6] = [
    "#3b82f6", // Blue
    "#10b981", // Green
    "#ef4444", // Red
    "#f59e0b", // Orange
    "#8b5cf6", // Purple
    "#ec4899", // Pink
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    #[default]
    Planned,
    AllDay,
    Inbox,
}

impl TaskType {
    pub fn all() -> [TaskType; 3] {
        [TaskType::Planned, TaskType::AllDay, TaskType::Inbox]
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskType::Planned => "Planned",
            TaskType::AllDay => "All-day",
            TaskType::Inbox => "Inbox",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn toggled(&self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatOption {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Minutes
    pub duration: Option<u32>,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub color: Option<String>,
    pub emoji: Option<String>,
    pub repeat: RepeatOption,
    pub notes: Option<String>,
}

/// Everything the add-task form collects; the store assigns the id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub duration: Option<u32>,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub color: Option<String>,
    pub emoji: Option<String>,
    pub repeat: RepeatOption,
    pub notes: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::validation("Task title is required"));
        }
        Ok(())
    }
}

/// Parse a minutes field the way the form does: anything non-numeric is simply absent
pub fn parse_duration(input: &str) -> Option<u32> {
    input.trim().parse().ok()
}

/// In-memory, insertion-ordered task collection
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_data() -> Self {
        let date = NaiveDate::from_ymd_opt(2025, 6, 6).unwrap_or_default();
        let tasks = vec![
            Task {
                id: "1".to_string(),
                title: "Review project proposal".to_string(),
                description: Some("Go through the new project requirements".to_string()),
                date,
                start_time: Some("10:00".to_string()),
                end_time: Some("11:00".to_string()),
                duration: Some(60),
                task_type: TaskType::Planned,
                status: TaskStatus::Pending,
                color: Some("#3b82f6".to_string()),
                emoji: None,
                repeat: RepeatOption::None,
                notes: None,
            },
            Task {
                id: "2".to_string(),
                title: "Team meeting".to_string(),
                description: Some("Weekly sync with the development team".to_string()),
                date,
                start_time: Some("14:00".to_string()),
                end_time: Some("15:00".to_string()),
                duration: Some(60),
                task_type: TaskType::Planned,
                status: TaskStatus::Pending,
                color: Some("#10b981".to_string()),
                emoji: None,
                repeat: RepeatOption::Weekly,
                notes: None,
            },
        ];
        Self { tasks }
    }

    pub fn add(&mut self, new_task: NewTask) -> Result<&Task> {
        new_task.validate()?;

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: new_task.title,
            description: new_task.description,
            date: new_task.date,
            start_time: new_task.start_time,
            end_time: new_task.end_time,
            duration: new_task.duration,
            task_type: new_task.task_type,
            status: new_task.status,
            color: new_task.color,
            emoji: new_task.emoji,
            repeat: new_task.repeat,
            notes: new_task.notes,
        };
        tracing::debug!(id = %task.id, date = %task.date, "task added");
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Replace the stored task that shares `task.id`
    pub fn update(&mut self, task: Task) -> Result<()> {
        if task.title.trim().is_empty() {
            return Err(CoreError::validation("Task title is required"));
        }
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| CoreError::not_found("Task", task.id.clone()))?;
        tracing::debug!(id = %task.id, "task updated");
        *slot = task;
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            tracing::debug!(id, "task deleted");
        }
        removed
    }

    pub fn toggle_status(&mut self, id: &str) -> Option<TaskStatus> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.status = task.status.toggled();
        Some(task.status)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks whose date falls on the same calendar day, in insertion order
    pub fn tasks_by_date(&self, date: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| same_day(t.date, date))
            .collect()
    }

    pub fn pending_on(&self, date: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| same_day(t.date, date) && t.status == TaskStatus::Pending)
            .collect()
    }

    pub fn has_tasks_on(&self, date: NaiveDate) -> bool {
        self.tasks.iter().any(|t| same_day(t.date, date))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

/// "14:00" -> "2:00 PM"
pub fn format_time(time: &str) -> String {
    let parsed = time.split_once(':').and_then(|(h, m)| {
        let hours: u32 = h.trim().parse().ok()?;
        let minutes: u32 = m.trim().parse().ok()?;
        Some((hours, minutes))
    });

    match parsed {
        Some((hours, minutes)) => {
            let period = if hours >= 12 { "PM" } else { "AM" };
            let hour = match hours % 12 {
                0 => 12,
                h => h,
            };
            format!("{}:{:02} {}", hour, minutes, period)
        }
        None => time.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub weekday: Weekday,
}

/// Every day of the given month, first to last
pub fn month_days(year: i32, month: u32) -> Vec<CalendarDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| CalendarDay {
            date,
            weekday: date.weekday(),
        })
        .collect()
}

/// Move `date` by whole months, clamping the day to the target month's length
pub fn shift_month(date: NaiveDate, months: i32) -> NaiveDate {
    let step = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        date.checked_add_months(step)
    } else {
        date.checked_sub_months(step)
    };
    shifted.unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let mut store = TaskStore::new();
        let a = store.add(NewTask::new("One", day(2025, 6, 6))).unwrap().id.clone();
        let b = store.add(NewTask::new("Two", day(2025, 6, 6))).unwrap().id.clone();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&a).unwrap().status, TaskStatus::Pending);
        assert_eq!(store.get(&a).unwrap().repeat, RepeatOption::None);
    }

    #[test]
    fn test_add_rejects_blank_title() {
        let mut store = TaskStore::new();
        let err = store.add(NewTask::new("   ", day(2025, 6, 6))).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_tasks_by_date_compares_calendar_day() {
        let store = TaskStore::with_sample_data();
        assert_eq!(store.tasks_by_date(day(2025, 6, 6)).len(), 2);
        assert!(store.tasks_by_date(day(2025, 6, 7)).is_empty());
        assert!(store.tasks_by_date(day(2024, 6, 6)).is_empty());
        assert!(store.has_tasks_on(day(2025, 6, 6)));
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut store = TaskStore::with_sample_data();
        let mut task = store.get("1").unwrap().clone();
        task.title = "Review final proposal".to_string();
        task.notes = Some("bring printouts".to_string());
        store.update(task).unwrap();

        let stored = store.get("1").unwrap();
        assert_eq!(stored.title, "Review final proposal");
        assert_eq!(stored.notes.as_deref(), Some("bring printouts"));
        assert_eq!(store.all()[0].id, "1");
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let mut store = TaskStore::with_sample_data();
        let mut task = store.get("1").unwrap().clone();
        task.id = "missing".to_string();
        let err = store.update(task).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { entity: "Task", .. }));
    }

    #[test]
    fn test_toggle_status_and_pending_filter() {
        let mut store = TaskStore::with_sample_data();
        assert_eq!(store.toggle_status("1"), Some(TaskStatus::Completed));
        let pending = store.pending_on(day(2025, 6, 6));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "2");
        assert_eq!(store.toggle_status("1"), Some(TaskStatus::Pending));
        assert_eq!(store.toggle_status("nope"), None);
    }

    #[test]
    fn test_delete_only_task_empties_store() {
        let mut store = TaskStore::new();
        let id = store.add(NewTask::new("Only", day(2025, 1, 1))).unwrap().id.clone();
        assert!(store.delete(&id));
        assert!(store.is_empty());
        assert!(store.get(&id).is_none());
        assert!(!store.delete(&id));
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time("14:00"), "2:00 PM");
        assert_eq!(format_time("00:05"), "12:05 AM");
        assert_eq!(format_time("12:30"), "12:30 PM");
        assert_eq!(format_time("9:07"), "9:07 AM");
        assert_eq!(format_time("soon"), "soon");
    }

    #[test]
    fn test_parse_duration_is_lenient() {
        assert_eq!(parse_duration(" 15 "), Some(15));
        assert_eq!(parse_duration("abc"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_month_days() {
        let june = month_days(2025, 6);
        assert_eq!(june.len(), 30);
        assert_eq!(june[0].weekday, Weekday::Sun);
        assert_eq!(month_days(2024, 2).len(), 29);
        assert!(month_days(2024, 13).is_empty());
    }

    #[test]
    fn test_shift_month_clamps_day() {
        assert_eq!(shift_month(day(2025, 1, 31), 1), day(2025, 2, 28));
        assert_eq!(shift_month(day(2025, 3, 31), -1), day(2025, 2, 28));
        assert_eq!(shift_month(day(2025, 12, 15), 1), day(2026, 1, 15));
    }
}
