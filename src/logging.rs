use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when RUST_LOG is unset or unusable
const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to stderr (one-shot CLI commands)
pub fn init_stderr() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter())
        .try_init();
}

/// Log to a file so the terminal UI is not drawn over.
/// Falls back to discarding output if the file cannot be opened.
pub fn init_file(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter())
                .try_init();
        }
        Err(_) => {
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::sink))
                .with(EnvFilter::new("off"))
                .try_init();
        }
    }
}
