use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use thiserror::Error;

use crate::models::{Priority, Task};
use crate::store::{Subscribers, TaskStore};

/// Schema version written to `PRAGMA user_version` once all migrations ran
pub const SCHEMA_VERSION: i64 = 4;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Task has no ID")]
    MissingId,
}

const TASK_COLUMNS: &str = "id, title, description, date, time, priority, is_completed, tag";

pub struct Database {
    conn: Connection,
    subscribers: Subscribers,
}

impl Database {
    /// Create a new database connection and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        tracing::debug!(path = %db_path.display(), "opened task database");
        Self::from_connection(conn)
    }

    /// Private database that lives only as long as the handle
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DatabaseError> {
        let db = Database {
            conn,
            subscribers: Subscribers::new(),
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize the database schema (table, indexes, migrations)
    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        // Version 3 layout; later versions are applied as migrations below
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                date            TEXT NOT NULL,
                time            TEXT NOT NULL,
                priority        TEXT NOT NULL DEFAULT 'Low',
                is_completed    INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_date ON tasks(date)",
            [],
        )?;

        self.migrate_add_tag()?;

        self.conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(())
    }

    /// Version 3 -> 4: add the `tag` column, keeping existing rows
    fn migrate_add_tag(&self) -> Result<(), DatabaseError> {
        fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DatabaseError> {
            let mut stmt = conn.prepare(
                "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2"
            )?;
            let count: i64 = stmt.query_row(rusqlite::params![table, column], |row| row.get(0))?;
            Ok(count > 0)
        }

        if !column_exists(&self.conn, "tasks", "tag")? {
            self.conn.execute(
                "ALTER TABLE tasks ADD COLUMN tag TEXT NOT NULL DEFAULT ''",
                [],
            )?;
            tracing::info!("migrated tasks table: added tag column");
        }

        Ok(())
    }

    /// Schema version recorded in the database file
    pub fn schema_version(&self) -> Result<i64, DatabaseError> {
        let version = self.conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Helper function to map a row to a Task
    fn row_to_task(row: &rusqlite::Row) -> Result<Task, rusqlite::Error> {
        Ok(Task {
            id: Some(row.get(0)?),
            title: row.get(1)?,
            description: row.get(2)?,
            date: row.get(3)?,
            time: row.get(4)?,
            priority: Priority::from(row.get::<_, String>(5)?),
            is_completed: row.get::<_, i64>(6)? != 0,
            tag: row.get(7)?,
        })
    }

    /// Get a single task by ID
    pub fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"
        ))?;

        match stmt.query_row(rusqlite::params![id], Self::row_to_task) {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DatabaseError::from(e)),
        }
    }

    /// Mark a task done or not done
    pub fn set_completed(&self, id: i64, completed: bool) -> Result<usize, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE tasks SET is_completed = ?1 WHERE id = ?2",
            rusqlite::params![if completed { 1 } else { 0 }, id],
        )?;
        tx.commit()?;
        tracing::debug!(id, completed, changed, "set task completion");
        if changed > 0 {
            self.notify_changed();
        }
        Ok(changed)
    }

    /// Push the current collection to subscribers.
    /// The write has already committed, so a failed snapshot read is only logged.
    fn notify_changed(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        match self.all_tasks() {
            Ok(snapshot) => self.subscribers.publish(&snapshot),
            Err(e) => tracing::warn!(error = %e, "could not read snapshot for subscribers"),
        }
    }
}

impl TaskStore for Database {
    fn insert(&self, task: &Task) -> Result<i64, DatabaseError> {
        let task = task.clone().normalized();
        self.conn.execute(
            "INSERT INTO tasks (title, description, date, time, priority, is_completed, tag)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                task.title,
                task.description,
                task.date,
                task.time,
                task.priority.as_str(),
                if task.is_completed { 1 } else { 0 },
                task.tag
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, title = %task.title, "inserted task");
        self.notify_changed();
        Ok(id)
    }

    fn update(&self, task: &Task) -> Result<usize, DatabaseError> {
        let id = task.id.ok_or(DatabaseError::MissingId)?;
        let task = task.clone().normalized();

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE tasks SET title = ?1, description = ?2, date = ?3, time = ?4,
             priority = ?5, is_completed = ?6, tag = ?7 WHERE id = ?8",
            rusqlite::params![
                task.title,
                task.description,
                task.date,
                task.time,
                task.priority.as_str(),
                if task.is_completed { 1 } else { 0 },
                task.tag,
                id
            ],
        )?;
        tx.commit()?;
        tracing::debug!(id, changed, "updated task");
        if changed > 0 {
            self.notify_changed();
        }
        Ok(changed)
    }

    fn delete_by_id(&self, id: i64) -> Result<usize, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM tasks WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        tracing::debug!(id, removed, "deleted task");
        if removed > 0 {
            self.notify_changed();
        }
        Ok(removed)
    }

    fn delete_all(&self) -> Result<usize, DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute("DELETE FROM tasks", [])?;
        tx.commit()?;
        tracing::info!(removed, "cleared all tasks");
        self.notify_changed();
        Ok(removed)
    }

    fn all_tasks(&self) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"
        ))?;
        let tasks = stmt.query_map([], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    fn subscribe(&self) -> Receiver<Vec<Task>> {
        self.subscribers.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn sample(title: &str, date: &str, priority: Priority) -> Task {
        let mut task = Task::new(
            title.to_string(),
            NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            priority,
        );
        task.description = format!("{title} description");
        task.date = date.to_string();
        task
    }

    #[test]
    fn insert_then_delete_removes_one_row() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert(&sample("Test Task", "14/05/2025", Priority::High)).unwrap();
        assert_eq!(db.all_tasks().unwrap().len(), 1);

        assert_eq!(db.delete_by_id(id).unwrap(), 1);
        assert!(db.all_tasks().unwrap().iter().all(|t| t.id != Some(id)));
        assert_eq!(db.delete_by_id(id).unwrap(), 0);
    }

    #[test]
    fn update_missing_id_reports_zero_rows() {
        let db = Database::open_in_memory().unwrap();
        let mut task = sample("Ghost", "10/05/2025", Priority::Low);
        task.id = Some(4242);
        assert_eq!(db.update(&task).unwrap(), 0);

        task.id = None;
        assert!(matches!(db.update(&task), Err(DatabaseError::MissingId)));
    }

    #[test]
    fn update_replaces_every_field_but_id() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert(&sample("Draft", "10/05/2025", Priority::Low)).unwrap();

        let mut task = db.get_task(id).unwrap().unwrap();
        task.title = "Final".to_string();
        task.priority = Priority::High;
        task.is_completed = true;
        task.tag = "work".to_string();
        assert_eq!(db.update(&task).unwrap(), 1);

        let stored = db.get_task(id).unwrap().unwrap();
        assert_eq!(stored, task);
    }

    #[test]
    fn insert_normalizes_legacy_dates() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert(&sample("Legacy", "14-05-2025", Priority::Low)).unwrap();
        assert_eq!(db.get_task(id).unwrap().unwrap().date, "14/05/2025");
    }

    #[test]
    fn mid_priority_rows_load_as_medium() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO tasks (title, description, date, time, priority) VALUES ('a', 'b', '10/05/2025', '08:00', 'Mid')",
                [],
            )
            .unwrap();
        let tasks = db.all_tasks().unwrap();
        assert_eq!(tasks[0].priority, Priority::Medium);
    }

    #[test]
    fn tasks_for_date_matches_either_delimiter() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&sample("slash", "10/05/2025", Priority::High)).unwrap();
        db.conn()
            .execute(
                "INSERT INTO tasks (title, description, date, time, priority) VALUES ('dash', 'd', '10-05-2025', '08:00', 'High')",
                [],
            )
            .unwrap();
        db.insert(&sample("other day", "11/05/2025", Priority::High)).unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let titles: Vec<_> = db.tasks_for_date(day).unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["slash", "dash"]);
    }

    #[test]
    fn delete_all_clears_table() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&sample("a", "10/05/2025", Priority::High)).unwrap();
        db.insert(&sample("b", "10/05/2025", Priority::Low)).unwrap();
        assert_eq!(db.delete_all().unwrap(), 2);
        assert!(db.all_tasks().unwrap().is_empty());
    }

    #[test]
    fn subscribers_see_snapshot_after_each_mutation() {
        let db = Database::open_in_memory().unwrap();
        let rx = db.subscribe();

        let id = db.insert(&sample("watched", "10/05/2025", Priority::High)).unwrap();
        assert_eq!(rx.try_recv().unwrap().len(), 1);

        db.set_completed(id, true).unwrap();
        assert!(rx.try_recv().unwrap()[0].is_completed);

        db.delete_by_id(id).unwrap();
        assert!(rx.try_recv().unwrap().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn completing_unknown_id_publishes_nothing() {
        let db = Database::open_in_memory().unwrap();
        let rx = db.subscribe();
        assert_eq!(db.set_completed(42, true).unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn committed_write_reports_success_when_snapshot_read_fails() {
        let db = Database::open_in_memory().unwrap();
        let rx = db.subscribe();
        let id = db.insert(&sample("fine", "10/05/2025", Priority::High)).unwrap();
        rx.try_recv().unwrap();

        // A BLOB title cannot be read back as text, so full snapshots fail
        db.conn()
            .execute(
                "INSERT INTO tasks (title, description, date, time, priority, is_completed, tag)
                 VALUES (X'01', 'd', '10/05/2025', '09:00', 'High', 0, '')",
                [],
            )
            .unwrap();
        assert!(db.all_tasks().is_err());

        assert_eq!(db.delete_by_id(id).unwrap(), 1);
        assert!(rx.try_recv().is_err());
        assert!(db.get_task(id).unwrap().is_none());
    }

    #[test]
    fn fresh_database_is_at_current_schema_version() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
    }
}
