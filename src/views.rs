//! Selection and ordering of tasks for the day, week and overdue views.
//!
//! Everything here is a pure function over a snapshot of the task
//! collection. Dates are compared as calendar dates after parsing; a task
//! whose date does not parse is left out of every date-sensitive result.

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::dates;
use crate::models::Task;

/// Direction of the secondary (date) sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    Ascending,
    /// Most recent first; used by the overdue view
    Descending,
}

/// Order by priority tier (High, Medium, Low, other), then by date.
///
/// The sort is stable: tasks that tie on both keys keep their input order.
/// Unparsable dates go after parseable ones within the same tier.
pub fn sort_tasks(tasks: &mut [Task], order: DateOrder) {
    tasks.sort_by(|a, b| compare_tasks(a, b, order));
}

fn compare_tasks(a: &Task, b: &Task, order: DateOrder) -> Ordering {
    a.priority
        .rank()
        .cmp(&b.priority.rank())
        .then_with(|| compare_dates(a.calendar_date(), b.calendar_date(), order))
}

fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>, order: DateOrder) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => match order {
            DateOrder::Ascending => a.cmp(&b),
            DateOrder::Descending => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Tasks dated exactly `date`
pub fn tasks_on(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.calendar_date() == Some(date))
        .cloned()
        .collect()
}

/// Tasks dated strictly before `today`
pub fn overdue(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| matches!(task.calendar_date(), Some(date) if date < today))
        .cloned()
        .collect()
}

/// Per-day task counts for the seven days starting at `monday`
pub fn week_counts(tasks: &[Task], monday: NaiveDate) -> [usize; 7] {
    let days = dates::week_days(monday);
    let mut counts = [0usize; 7];
    for date in tasks.iter().filter_map(Task::calendar_date) {
        if let Some(slot) = days.iter().position(|day| *day == date) {
            counts[slot] += 1;
        }
    }
    counts
}

/// One row of the weekly overview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub count: usize,
}

/// Weekly overview for the week containing `today`
pub fn week_overview(tasks: &[Task], today: NaiveDate) -> Vec<WeekDay> {
    let monday = dates::week_start(today);
    let counts = week_counts(tasks, monday);
    dates::week_days(monday)
        .into_iter()
        .zip(counts)
        .map(|(date, count)| WeekDay { date, count })
        .collect()
}

/// Tasks for one day, highest priority first
pub fn day_view(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    let mut selected = tasks_on(tasks, date);
    sort_tasks(&mut selected, DateOrder::Ascending);
    selected
}

/// Overdue tasks, highest priority first and most recently overdue first within a tier
pub fn overdue_view(tasks: &[Task], today: NaiveDate) -> Vec<Task> {
    let mut selected = overdue(tasks, today);
    sort_tasks(&mut selected, DateOrder::Descending);
    selected
}

/// Plain-text summary of a day's tasks, suitable for sharing
pub fn share_text(tasks: &[Task], date: NaiveDate) -> String {
    let day = dates::weekday_name(date);
    let selected = day_view(tasks, date);
    if selected.is_empty() {
        return format!("No tasks for {day}.");
    }

    let mut text = format!("{day}'s Tasks:");
    for task in &selected {
        text.push_str(&format!("\n• {} ({}) - {}", task.title, task.priority, task.time));
    }
    text
}
