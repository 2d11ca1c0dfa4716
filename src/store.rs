use chrono::NaiveDate;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::database::DatabaseError;
use crate::models::Task;

/// Durable keyed collection of tasks.
///
/// Implementations serialize their own mutations. `update` and `delete_by_id`
/// report the number of rows they touched; an unknown id is `Ok(0)`, not an
/// error. After every successful mutation the full collection is published
/// to subscribers.
pub trait TaskStore {
    /// Insert a task (its `id` is ignored) and return the assigned id
    fn insert(&self, task: &Task) -> Result<i64, DatabaseError>;

    /// Replace every field of the task with the same id
    fn update(&self, task: &Task) -> Result<usize, DatabaseError>;

    fn delete_by_id(&self, id: i64) -> Result<usize, DatabaseError>;

    /// Remove every task, returning how many were removed
    fn delete_all(&self) -> Result<usize, DatabaseError>;

    fn all_tasks(&self) -> Result<Vec<Task>, DatabaseError>;

    /// Tasks whose date is the given calendar day, whichever delimiter they were stored with
    fn tasks_for_date(&self, date: NaiveDate) -> Result<Vec<Task>, DatabaseError> {
        Ok(crate::views::tasks_on(&self.all_tasks()?, date))
    }

    /// Receive a full snapshot after each mutation
    fn subscribe(&self) -> Receiver<Vec<Task>>;
}

/// Fan-out of task snapshots to any number of receivers
#[derive(Debug, Default)]
pub struct Subscribers {
    senders: Mutex<Vec<Sender<Vec<Task>>>>,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<Vec<Task>> {
        let (tx, rx) = mpsc::channel();
        self.lock().push(tx);
        rx
    }

    /// Send `snapshot` to every live receiver; receivers that hung up are dropped
    pub fn publish(&self, snapshot: &[Task]) {
        let mut senders = self.lock();
        senders.retain(|tx| tx.send(snapshot.to_vec()).is_ok());
        tracing::trace!(subscribers = senders.len(), tasks = snapshot.len(), "published snapshot");
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<Vec<Task>>>> {
        // Sender list stays valid even if a holder panicked
        self.senders.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
