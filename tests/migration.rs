use rusqlite::Connection;
use tempfile::tempdir;

use taskmaster::models::Priority;
use taskmaster::{Database, TaskStore};

/// Lay down a database the way version 3 left it: no `tag` column
fn seed_v3(path: &std::path::Path) -> rusqlite::Result<()> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE tasks (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            date            TEXT NOT NULL,
            time            TEXT NOT NULL,
            priority        TEXT NOT NULL DEFAULT 'Low',
            is_completed    INTEGER NOT NULL DEFAULT 0
        );
        INSERT INTO tasks (title, description, date, time, priority, is_completed)
            VALUES ('Water plants', 'balcony', '12/05/2025', '08:00', 'High', 0);
        INSERT INTO tasks (title, description, date, time, priority, is_completed)
            VALUES ('Book flights', 'summer', '12-05-2025', '19:15', 'Mid', 1);
        PRAGMA user_version = 3;",
    )
}

#[test]
fn upgrade_keeps_rows_and_adds_empty_tags() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("tasks.db");
    seed_v3(&path)?;

    let db = Database::new(path.to_str().ok_or("non-utf8 temp path")?)?;
    assert_eq!(db.schema_version()?, 4);

    let tasks = db.all_tasks()?;
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|task| task.tag.is_empty()));

    let flights = db.get_task(2)?.ok_or("missing migrated row")?;
    assert_eq!(flights.title, "Book flights");
    assert_eq!(flights.priority, Priority::Medium);
    assert!(flights.is_completed);

    // Both delimiter styles resolve to the same day
    let date = chrono::NaiveDate::from_ymd_opt(2025, 5, 12).ok_or("bad date")?;
    assert_eq!(db.tasks_for_date(date)?.len(), 2);
    Ok(())
}

#[test]
fn reopening_a_migrated_database_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("tasks.db");
    seed_v3(&path)?;
    let path_str = path.to_str().ok_or("non-utf8 temp path")?;

    {
        let db = Database::new(path_str)?;
        let mut task = db.get_task(1)?.ok_or("missing row")?;
        task.tag = "garden".to_string();
        assert_eq!(db.update(&task)?, 1);
    }

    let db = Database::new(path_str)?;
    assert_eq!(db.schema_version()?, 4);
    assert_eq!(db.all_tasks()?.len(), 2);
    assert_eq!(db.get_task(1)?.ok_or("missing row")?.tag, "garden");

    let tag_columns: i64 = db.conn().query_row(
        "SELECT COUNT(*) FROM pragma_table_info('tasks') WHERE name = 'tag'",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(tag_columns, 1);
    Ok(())
}

#[test]
fn fresh_database_starts_at_current_version() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("tasks.db");
    let db = Database::new(path.to_str().ok_or("non-utf8 temp path")?)?;
    assert_eq!(db.schema_version()?, 4);
    assert!(db.all_tasks()?.is_empty());
    assert!(path.exists());
    Ok(())
}
