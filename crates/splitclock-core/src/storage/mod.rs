mod config;
pub mod database;
mod history;

pub use config::{Config, CountdownConfig, DisplayConfig, FeedbackConfig, Preset};
pub use database::Database;
pub use history::{HistoryLog, MemoryHistory, WorkoutRecord, HISTORY_LIMIT};

use std::path::PathBuf;

/// Returns the data directory holding `config.toml` and `splitclock.db`.
///
/// `SPLITCLOCK_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/splitclock[-dev]/`, with `SPLITCLOCK_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("SPLITCLOCK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SPLITCLOCK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("splitclock-dev")
            } else {
                base_dir.join("splitclock")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
