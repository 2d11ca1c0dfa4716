use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::dates;

/// Task priority tier.
///
/// `Mid` is accepted as a synonym for `Medium` when parsing. Values outside
/// the three known tiers are kept verbatim in `Other` so legacy rows survive
/// a load/save cycle; they always sort after `Low`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    #[default]
    High,
    Medium,
    Low,
    Other(String),
}

impl Priority {
    /// Sort rank: High=0, Medium=1, Low=2, anything else=3
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
            Priority::Other(_) => 3,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Priority::Other(_))
    }

    /// The selectable tiers, in the order the form cycles through them
    pub const CHOICES: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Next tier in form order (wraps around; unknown values jump to High)
    pub fn next(&self) -> Priority {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low | Priority::Other(_) => Priority::High,
        }
    }

    pub fn previous(&self) -> Priority {
        match self {
            Priority::High | Priority::Other(_) => Priority::Low,
            Priority::Medium => Priority::High,
            Priority::Low => Priority::Medium,
        }
    }
}

impl FromStr for Priority {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let priority = match s.trim().to_ascii_lowercase().as_str() {
            "high" => Priority::High,
            "medium" | "mid" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Other(s.to_string()),
        };
        Ok(priority)
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(priority) => priority,
            Err(never) => match never {},
        }
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub date: String, // DD/MM/YYYY
    pub time: String, // HH:MM
    pub priority: Priority,
    pub is_completed: bool,
    #[serde(default)]
    pub tag: String,
}

impl Task {
    pub fn new(title: String, date: NaiveDate, time: NaiveTime, priority: Priority) -> Self {
        Self {
            id: None,
            title,
            description: String::new(),
            date: dates::format_task_date(date),
            time: dates::format_task_time(time),
            priority,
            is_completed: false,
            tag: String::new(),
        }
    }

    /// The task's date as a calendar date, `None` if the stored string is malformed
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        dates::parse_task_date(&self.date)
    }

    pub fn clock_time(&self) -> Option<NaiveTime> {
        dates::parse_task_time(&self.time)
    }

    /// Copy of this task without its identity, ready to be inserted again
    pub fn detached(&self) -> Task {
        Task {
            id: None,
            ..self.clone()
        }
    }

    /// Canonical date/time encoding where the stored strings parse
    pub fn normalized(mut self) -> Task {
        self.date = dates::normalize_task_date(&self.date);
        self.time = dates::normalize_task_time(&self.time);
        self
    }

    /// True when every field except `id` matches
    pub fn same_content(&self, other: &Task) -> bool {
        self.detached() == other.detached()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Date must be in DD/MM/YYYY format (got '{0}')")]
    InvalidDate(String),
    #[error("Time must be in HH:MM format (got '{0}')")]
    InvalidTime(String),
    #[error("Priority must be High, Medium or Low (got '{0}')")]
    InvalidPriority(String),
}

/// Unvalidated task input as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub priority: String,
    pub tag: String,
}

impl TaskDraft {
    /// Prefill a draft from an existing task (edit flow)
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            date: task.date.clone(),
            time: task.time.clone(),
            priority: task.priority.to_string(),
            tag: task.tag.clone(),
        }
    }

    /// Check the draft and build a storable task.
    ///
    /// Title, description, date and time are all required; date and time
    /// must parse, and the priority must be one of the known tiers (an empty
    /// priority defaults to High).
    pub fn validate(&self) -> Result<Task, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingField("Title"));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::MissingField("Description"));
        }
        let date_str = self.date.trim();
        if date_str.is_empty() {
            return Err(ValidationError::MissingField("Date"));
        }
        let time_str = self.time.trim();
        if time_str.is_empty() {
            return Err(ValidationError::MissingField("Time"));
        }

        let date = dates::parse_task_date(date_str)
            .ok_or_else(|| ValidationError::InvalidDate(date_str.to_string()))?;
        let time = dates::parse_task_time(time_str)
            .ok_or_else(|| ValidationError::InvalidTime(time_str.to_string()))?;

        let priority = if self.priority.trim().is_empty() {
            Priority::default()
        } else {
            Priority::from(self.priority.clone())
        };
        if !priority.is_known() {
            return Err(ValidationError::InvalidPriority(self.priority.trim().to_string()));
        }

        let mut task = Task::new(title.to_string(), date, time, priority);
        task.description = description.to_string();
        task.tag = self.tag.trim().to_string();
        Ok(task)
    }
}
