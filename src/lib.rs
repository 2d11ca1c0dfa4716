pub mod cli;
pub mod config;
pub mod database;
pub mod dates;
pub mod logging;
pub mod models;
pub mod reminder;
pub mod store;
pub mod tui;
pub mod undo;
pub mod utils;
pub mod views;

pub use config::Config;
pub use database::Database;
pub use models::{Priority, Task, TaskDraft};
pub use store::TaskStore;
pub use utils::Profile;
