#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Scratch config + database so tests never touch the user's real files
pub struct TestHome {
    dir: TempDir,
}

impl TestHome {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("data").join("tasks.db")
    }

    /// The binary pointed at this home's config and database
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskmaster").expect("taskmaster binary");
        cmd.env_remove("TASKMASTER_DATABASE")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.config_path())
            .arg("--database")
            .arg(self.db_path());
        cmd
    }
}

/// Today's date the way the CLI expects it
pub fn today_str() -> String {
    taskmaster::dates::format_task_date(taskmaster::dates::today())
}
