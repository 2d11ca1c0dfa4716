use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::Config;
use crate::database::{Database, DatabaseError};
use crate::dates;
use crate::models::{Task, TaskDraft, ValidationError};
use crate::reminder::{Reminder, ReminderKind, TerminalNotifier};
use crate::store::TaskStore;
use crate::views;

#[derive(Parser)]
#[command(name = "taskmaster")]
#[command(about = "Personal task manager with day, week and overdue views")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    /// Database file to use instead of the configured one
    #[arg(long, env = "TASKMASTER_DATABASE")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Add a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long, short)]
        description: String,
        /// Due date (DD/MM/YYYY)
        #[arg(long)]
        date: String,
        /// Due time (HH:MM, 24-hour)
        #[arg(long)]
        time: String,
        /// High, Medium or Low
        #[arg(long, short, default_value = "High")]
        priority: String,
        /// Optional tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Change fields of an existing task
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
        #[arg(long, short)]
        priority: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Mark a task as completed
    Done { id: i64 },
    /// Mark a task as not completed
    Undone { id: i64 },
    /// Delete a task
    Delete { id: i64 },
    /// Delete every task
    Clear {
        /// Confirm deleting all tasks
        #[arg(long)]
        yes: bool,
    },
    /// Show today's tasks
    Today {
        #[arg(long)]
        json: bool,
    },
    /// Show the tasks of one day
    Day {
        /// Date (DD/MM/YYYY)
        date: String,
        #[arg(long)]
        json: bool,
    },
    /// Show task counts for each day of a week
    Week {
        /// Any date inside the week (defaults to today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show tasks whose date has passed
    Overdue {
        #[arg(long)]
        json: bool,
    },
    /// Print a shareable summary of a day's tasks
    Share {
        /// Date (DD/MM/YYYY), defaults to today
        date: Option<String>,
    },
    /// Send the high-priority reminder
    Remind {
        /// Look at yesterday's unfinished tasks instead of today's
        #[arg(long)]
        catch_up: bool,
        /// Keep running and remind once a day at the configured time
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Invalid task: {0}")]
    ValidationError(#[from] ValidationError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Task {0} not found")]
    NotFound(i64),
    #[error("Failed to serialize output: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn parse_date_arg(date: &str) -> Result<NaiveDate, CliError> {
    dates::parse_task_date(date)
        .ok_or_else(|| CliError::DateParseError(format!("Invalid date '{}', expected DD/MM/YYYY", date)))
}

/// One line of a task listing
pub fn format_task_line(task: &Task) -> String {
    let status = if task.is_completed { "✓" } else { "○" };
    let id = task.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "{:>4} {} {} [{} {}] ({})",
        id, status, task.title, task.date, task.time, task.priority
    );
    if !task.tag.is_empty() {
        line.push_str(&format!(" #{}", task.tag));
    }
    line
}

fn print_tasks(tasks: &[Task], json: bool, empty_message: &str) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
    } else if tasks.is_empty() {
        println!("{}", empty_message);
    } else {
        for task in tasks {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

/// Handle the add command
pub fn handle_add(draft: TaskDraft, db: &Database) -> Result<(), CliError> {
    let task = draft.validate()?;
    let id = db.insert(&task)?;
    println!("Task created successfully (ID: {})", id);
    Ok(())
}

/// Fields given on the command line for `edit`; unset fields keep their value
#[derive(Debug, Default)]
pub struct TaskEdits {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub priority: Option<String>,
    pub tag: Option<String>,
}

/// Handle the edit command
pub fn handle_edit(id: i64, edits: TaskEdits, db: &Database) -> Result<(), CliError> {
    let existing = db.get_task(id)?.ok_or(CliError::NotFound(id))?;

    let mut draft = TaskDraft::from_task(&existing);
    if let Some(title) = edits.title {
        draft.title = title;
    }
    if let Some(description) = edits.description {
        draft.description = description;
    }
    if let Some(date) = edits.date {
        draft.date = date;
    }
    if let Some(time) = edits.time {
        draft.time = time;
    }
    if let Some(priority) = edits.priority {
        draft.priority = priority;
    }
    if let Some(tag) = edits.tag {
        draft.tag = tag;
    }

    let mut task = draft.validate()?;
    task.id = Some(id);
    task.is_completed = existing.is_completed;

    if db.update(&task)? == 0 {
        return Err(CliError::NotFound(id));
    }
    println!("Task {} updated", id);
    Ok(())
}

/// Handle the done/undone commands
pub fn handle_set_completed(id: i64, completed: bool, db: &Database) -> Result<(), CliError> {
    if db.set_completed(id, completed)? == 0 {
        return Err(CliError::NotFound(id));
    }
    let state = if completed { "completed" } else { "not completed" };
    println!("Task {} marked {}", id, state);
    Ok(())
}

/// Handle the delete command
pub fn handle_delete(id: i64, db: &Database) -> Result<(), CliError> {
    let removed = db.delete_by_id(id)?;
    println!("Deleted {} task(s)", removed);
    Ok(())
}

/// Handle the clear command
pub fn handle_clear(confirmed: bool, db: &Database) -> Result<(), CliError> {
    if !confirmed {
        let count = db.all_tasks()?.len();
        println!("This would delete {} task(s); pass --yes to confirm", count);
        return Ok(());
    }
    let removed = db.delete_all()?;
    println!("Deleted {} task(s)", removed);
    Ok(())
}

/// Handle the today/day commands
pub fn handle_day(date: Option<&str>, json: bool, db: &Database) -> Result<(), CliError> {
    let date = match date {
        Some(date) => parse_date_arg(date)?,
        None => dates::today(),
    };
    let tasks = views::day_view(&db.all_tasks()?, date);
    let empty = format!("No tasks for {}", dates::format_task_date(date));
    print_tasks(&tasks, json, &empty)
}

#[derive(Serialize)]
struct WeekRow {
    date: String,
    weekday: String,
    count: usize,
}

/// Handle the week command
pub fn handle_week(date: Option<&str>, json: bool, db: &Database) -> Result<(), CliError> {
    let anchor = match date {
        Some(date) => parse_date_arg(date)?,
        None => dates::today(),
    };
    let rows: Vec<WeekRow> = views::week_overview(&db.all_tasks()?, anchor)
        .into_iter()
        .map(|day| WeekRow {
            date: dates::format_task_date(day.date),
            weekday: dates::weekday_name(day.date),
            count: day.count,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!("{:<10} {}  {} task(s)", row.weekday, row.date, row.count);
        }
    }
    Ok(())
}

/// Handle the overdue command
pub fn handle_overdue(json: bool, db: &Database) -> Result<(), CliError> {
    let tasks = views::overdue_view(&db.all_tasks()?, dates::today());
    print_tasks(&tasks, json, "No overdue tasks!")
}

/// Handle the share command
pub fn handle_share(date: Option<&str>, db: &Database) -> Result<(), CliError> {
    let date = match date {
        Some(date) => parse_date_arg(date)?,
        None => dates::today(),
    };
    println!("{}", views::share_text(&db.all_tasks()?, date));
    Ok(())
}

/// Handle the remind command
pub fn handle_remind(catch_up: bool, watch: bool, config: &Config, db: &Database) -> Result<(), CliError> {
    let kind = if catch_up || config.reminder.catch_up {
        ReminderKind::CatchUp
    } else {
        ReminderKind::SameDay
    };
    let reminder = Reminder::new(kind);
    let mut notifier = TerminalNotifier;

    if watch {
        reminder.watch(db, &mut notifier, config.reminder.time_of_day());
    } else if reminder.run(db, &mut notifier, dates::today())?.is_none() {
        tracing::info!(?kind, "no high priority tasks to remind about");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    #[test]
    fn task_line_shows_status_and_tag() {
        let mut task = Task {
            id: Some(3),
            title: "Call mum".to_string(),
            description: "Sunday call".to_string(),
            date: "18/05/2025".to_string(),
            time: "17:00".to_string(),
            priority: Priority::Medium,
            is_completed: true,
            tag: "family".to_string(),
        };
        assert_eq!(
            format_task_line(&task),
            "   3 ✓ Call mum [18/05/2025 17:00] (Medium) #family"
        );
        task.tag.clear();
        task.is_completed = false;
        assert!(format_task_line(&task).ends_with("(Medium)"));
        assert!(format_task_line(&task).contains('○'));
    }

    #[test]
    fn edit_keeps_unchanged_fields_and_completion() {
        let db = Database::open_in_memory().unwrap();
        let draft = TaskDraft {
            title: "Old".to_string(),
            description: "desc".to_string(),
            date: "10/05/2025".to_string(),
            time: "08:00".to_string(),
            priority: "Low".to_string(),
            tag: String::new(),
        };
        let id = db.insert(&draft.validate().unwrap()).unwrap();
        db.set_completed(id, true).unwrap();

        let edits = TaskEdits {
            title: Some("New".to_string()),
            priority: Some("Mid".to_string()),
            ..TaskEdits::default()
        };
        handle_edit(id, edits, &db).unwrap();

        let task = db.get_task(id).unwrap().unwrap();
        assert_eq!(task.title, "New");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.description, "desc");
        assert!(task.is_completed);
    }

    #[test]
    fn edit_unknown_id_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let result = handle_edit(99, TaskEdits::default(), &db);
        assert!(matches!(result, Err(CliError::NotFound(99))));
    }

    #[test]
    fn add_rejects_invalid_draft_before_store() {
        let db = Database::open_in_memory().unwrap();
        let draft = TaskDraft {
            title: "No description".to_string(),
            date: "10/05/2025".to_string(),
            time: "08:00".to_string(),
            ..TaskDraft::default()
        };
        assert!(matches!(handle_add(draft, &db), Err(CliError::ValidationError(_))));
        assert!(db.all_tasks().unwrap().is_empty());
    }
}
