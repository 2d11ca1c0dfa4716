use std::time::{Duration, Instant};

use crate::database::DatabaseError;
use crate::models::Task;
use crate::store::TaskStore;

/// Default time the undo prompt stays available after a delete
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoState {
    Empty,
    Holding { task: Task, deleted_at: Instant },
}

/// Single-slot memory of the most recently deleted task.
///
/// Deleting always goes straight to the store; the buffer only remembers
/// the task so it can be re-inserted while the window is open. A newer
/// delete replaces whatever was held before.
#[derive(Debug, Clone)]
pub struct UndoBuffer {
    state: UndoState,
    window: Duration,
}

impl Default for UndoBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_WINDOW)
    }
}

impl UndoBuffer {
    pub fn new(window: Duration) -> Self {
        Self {
            state: UndoState::Empty,
            window,
        }
    }

    pub fn state(&self) -> &UndoState {
        &self.state
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Delete `task` from the store and hold it for undo.
    /// Returns the number of rows the store removed.
    pub fn delete<S>(&mut self, store: &S, task: Task, now: Instant) -> Result<usize, DatabaseError>
    where
        S: TaskStore + ?Sized,
    {
        let id = task.id.ok_or(DatabaseError::MissingId)?;
        let removed = store.delete_by_id(id)?;
        self.hold(task, now);
        Ok(removed)
    }

    /// Remember `task` as the last deleted one, replacing any earlier entry
    pub fn hold(&mut self, task: Task, now: Instant) {
        if let UndoState::Holding { task: previous, .. } = &self.state {
            tracing::debug!(previous = ?previous.id, "undo slot overwritten");
        }
        self.state = UndoState::Holding { task, deleted_at: now };
    }

    /// Re-insert the held task if the window is still open.
    /// Returns the id the store assigned to the restored copy.
    pub fn undo<S>(&mut self, store: &S, now: Instant) -> Result<Option<i64>, DatabaseError>
    where
        S: TaskStore + ?Sized,
    {
        self.expire(now);
        let Some(task) = self.pending(now).cloned() else {
            return Ok(None);
        };
        // Slot is only cleared once the copy is back in the store
        let id = store.insert(&task.detached())?;
        self.state = UndoState::Empty;
        tracing::info!(old_id = ?task.id, new_id = id, "restored deleted task");
        Ok(Some(id))
    }

    /// Drop the held task without restoring it
    pub fn dismiss(&mut self) {
        self.state = UndoState::Empty;
    }

    /// Clear the slot once the window has elapsed. Returns true if it expired now.
    pub fn expire(&mut self, now: Instant) -> bool {
        if let UndoState::Holding { deleted_at, .. } = &self.state {
            if now.saturating_duration_since(*deleted_at) >= self.window {
                tracing::debug!("undo window elapsed");
                self.state = UndoState::Empty;
                return true;
            }
        }
        false
    }

    /// The held task while the window is open
    pub fn pending(&self, now: Instant) -> Option<&Task> {
        match &self.state {
            UndoState::Holding { task, deleted_at }
                if now.saturating_duration_since(*deleted_at) < self.window =>
            {
                Some(task)
            }
            _ => None,
        }
    }

    /// Time left to undo, if anything is held
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match &self.state {
            UndoState::Holding { deleted_at, .. } => {
                self.window.checked_sub(now.saturating_duration_since(*deleted_at))
                    .filter(|left| !left.is_zero())
            }
            UndoState::Empty => None,
        }
    }
}
