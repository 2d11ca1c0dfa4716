//! Daily reminder for high-priority tasks.
//!
//! Once per day the scheduler asks the store for the target day's tasks,
//! keeps the incomplete High-priority ones and, if there are any, sends a
//! single notification carrying their count. A run that is missed is not
//! replayed.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::database::DatabaseError;
use crate::models::{Priority, Task};
use crate::store::TaskStore;

/// Which day a reminder run looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderKind {
    /// Tasks due today
    SameDay,
    /// Tasks that were due yesterday and are still open
    CatchUp,
}

impl ReminderKind {
    pub fn target_date(self, today: NaiveDate) -> NaiveDate {
        match self {
            ReminderKind::SameDay => today,
            ReminderKind::CatchUp => today - Duration::days(1),
        }
    }

    fn notification(self, count: usize) -> Notification {
        match self {
            ReminderKind::SameDay => Notification {
                title: "High Priority Tasks Today".to_string(),
                message: format!("You have {count} important task(s) to complete!"),
            },
            ReminderKind::CatchUp => Notification {
                title: "High Priority Tasks From Yesterday".to_string(),
                message: format!("You left {count} important task(s) unfinished yesterday."),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// Receives reminder notifications. Delivery is fire-and-forget.
pub trait Notifier {
    fn notify(&mut self, notification: &Notification);
}

/// Prints notifications to stdout
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notification: &Notification) {
        tracing::info!(title = %notification.title, "sending reminder");
        println!("{}\n{}", notification.title, notification.message);
    }
}

/// Incomplete High-priority tasks dated `target`
pub fn select_reminder_tasks(tasks: &[Task], target: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| {
            task.priority == Priority::High
                && !task.is_completed
                && task.calendar_date() == Some(target)
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reminder {
    pub kind: ReminderKind,
}

impl Reminder {
    pub fn new(kind: ReminderKind) -> Self {
        Self { kind }
    }

    /// The notification to send for this snapshot, if any
    pub fn evaluate(&self, tasks: &[Task], today: NaiveDate) -> Option<Notification> {
        let target = self.kind.target_date(today);
        let selected = select_reminder_tasks(tasks, target);
        tracing::debug!(kind = ?self.kind, %target, matches = selected.len(), "evaluated reminder");
        if selected.is_empty() {
            None
        } else {
            Some(self.kind.notification(selected.len()))
        }
    }

    /// Read the store once and notify if anything qualifies.
    /// Returns the notification that was sent.
    pub fn run<S, N>(&self, store: &S, notifier: &mut N, today: NaiveDate) -> Result<Option<Notification>, DatabaseError>
    where
        S: TaskStore + ?Sized,
        N: Notifier + ?Sized,
    {
        let tasks = store.tasks_for_date(self.kind.target_date(today))?;
        let notification = self.evaluate(&tasks, today);
        if let Some(ref notification) = notification {
            notifier.notify(notification);
        }
        Ok(notification)
    }

    /// One scheduled run. A store failure skips this day's reminder and is logged.
    pub fn run_scheduled<S, N>(&self, store: &S, notifier: &mut N, today: NaiveDate) -> Option<Notification>
    where
        S: TaskStore + ?Sized,
        N: Notifier + ?Sized,
    {
        match self.run(store, notifier, today) {
            Ok(notification) => notification,
            Err(e) => {
                tracing::warn!(error = %e, %today, "reminder run failed, skipping");
                None
            }
        }
    }

    /// Run every day at `at` local time, forever.
    ///
    /// Each cycle sleeps until the next occurrence of `at` and then runs
    /// once; if the process was suspended past a trigger, or the run fails,
    /// that day is simply skipped.
    pub fn watch<S, N>(&self, store: &S, notifier: &mut N, at: NaiveTime)
    where
        S: TaskStore + ?Sized,
        N: Notifier + ?Sized,
    {
        loop {
            let delay = next_run_delay(chrono::Local::now().naive_local(), at);
            tracing::info!(seconds = delay.as_secs(), "waiting for next reminder run");
            std::thread::sleep(delay);
            self.run_scheduled(store, notifier, crate::dates::today());
        }
    }
}

/// Time until the next occurrence of `at`; a trigger time that has
/// already passed today (or is exactly now) moves to tomorrow.
pub fn next_run_delay(now: NaiveDateTime, at: NaiveTime) -> std::time::Duration {
    let mut next = now.date().and_time(at);
    if next <= now {
        next += Duration::days(1);
    }
    (next - now).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(date: &str, priority: Priority, done: bool) -> Task {
        Task {
            id: None,
            title: format!("{priority} on {date}"),
            description: "d".to_string(),
            date: date.to_string(),
            time: "10:00".to_string(),
            priority,
            is_completed: done,
            tag: String::new(),
        }
    }

    #[derive(Default)]
    struct Recording(Vec<Notification>);

    impl Notifier for Recording {
        fn notify(&mut self, notification: &Notification) {
            self.0.push(notification.clone());
        }
    }

    #[test]
    fn selects_only_open_high_priority_for_target_day() {
        let tasks = vec![
            task("15/05/2025", Priority::High, false),
            task("15-05-2025", Priority::High, false),
            task("15/05/2025", Priority::High, true),
            task("15/05/2025", Priority::Medium, false),
            task("14/05/2025", Priority::High, false),
            task("bogus", Priority::High, false),
        ];
        assert_eq!(select_reminder_tasks(&tasks, ymd(2025, 5, 15)).len(), 2);
    }

    #[test]
    fn same_day_notification_carries_count() {
        let tasks = vec![
            task("15/05/2025", Priority::High, false),
            task("15/05/2025", Priority::High, false),
        ];
        let note = Reminder::new(ReminderKind::SameDay)
            .evaluate(&tasks, ymd(2025, 5, 15))
            .unwrap();
        assert_eq!(note.title, "High Priority Tasks Today");
        assert_eq!(note.message, "You have 2 important task(s) to complete!");
    }

    #[test]
    fn nothing_qualifies_means_no_notification() {
        let tasks = vec![task("15/05/2025", Priority::Low, false)];
        assert!(Reminder::new(ReminderKind::SameDay).evaluate(&tasks, ymd(2025, 5, 15)).is_none());
        assert!(Reminder::new(ReminderKind::SameDay).evaluate(&[], ymd(2025, 5, 15)).is_none());
    }

    #[test]
    fn catch_up_targets_yesterday() {
        let tasks = vec![task("14/05/2025", Priority::High, false)];
        let catch_up = Reminder::new(ReminderKind::CatchUp);
        assert_eq!(ReminderKind::CatchUp.target_date(ymd(2025, 3, 1)), ymd(2025, 2, 28));
        assert!(catch_up.evaluate(&tasks, ymd(2025, 5, 15)).is_some());
        assert!(catch_up.evaluate(&tasks, ymd(2025, 5, 14)).is_none());
    }

    #[test]
    fn run_notifies_once_from_store_snapshot() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&task("15/05/2025", Priority::High, false)).unwrap();
        db.insert(&task("15/05/2025", Priority::High, false)).unwrap();
        db.insert(&task("15/05/2025", Priority::Low, false)).unwrap();

        let mut notifier = Recording::default();
        let reminder = Reminder::new(ReminderKind::SameDay);
        let sent = reminder.run(&db, &mut notifier, ymd(2025, 5, 15)).unwrap();
        assert!(sent.is_some());
        assert_eq!(notifier.0.len(), 1);
        assert!(notifier.0[0].message.contains('2'));

        reminder.run(&db, &mut notifier, ymd(2025, 5, 16)).unwrap();
        assert_eq!(notifier.0.len(), 1);
    }

    #[test]
    fn failed_scheduled_run_does_not_stop_later_runs() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&task("15/05/2025", Priority::High, false)).unwrap();
        db.insert(&task("16/05/2025", Priority::High, false)).unwrap();
        let mut notifier = Recording::default();
        let reminder = Reminder::new(ReminderKind::SameDay);

        db.conn().execute("ALTER TABLE tasks RENAME TO tasks_offline", []).unwrap();
        assert!(reminder.run_scheduled(&db, &mut notifier, ymd(2025, 5, 15)).is_none());
        assert!(notifier.0.is_empty());

        db.conn().execute("ALTER TABLE tasks_offline RENAME TO tasks", []).unwrap();
        assert!(reminder.run_scheduled(&db, &mut notifier, ymd(2025, 5, 16)).is_some());
        assert_eq!(notifier.0.len(), 1);
    }

    #[test]
    fn next_run_is_later_today_or_tomorrow() {
        let six = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let before = ymd(2025, 5, 15).and_hms_opt(5, 30, 0).unwrap();
        assert_eq!(next_run_delay(before, six).as_secs(), 30 * 60);

        let after = ymd(2025, 5, 15).and_hms_opt(7, 0, 0).unwrap();
        assert_eq!(next_run_delay(after, six).as_secs(), 23 * 3600);

        let exactly = ymd(2025, 5, 15).and_hms_opt(6, 0, 0).unwrap();
        assert_eq!(next_run_delay(exactly, six).as_secs(), 24 * 3600);
    }
}
