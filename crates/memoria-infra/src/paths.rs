//! Data directory layout.

use std::path::{Path, PathBuf};

/// File name of the SQLite database inside the data directory.
pub const DATABASE_FILE: &str = "memoria.db";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `MEMORIA_DATA_DIR` environment variable
/// 2. `~/.memoria`
/// 3. `.memoria` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MEMORIA_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".memoria");
    }

    PathBuf::from(".memoria")
}

/// SQLite connection URL for the database under `data_dir`.
///
/// `mode=rwc` creates the file on first open.
pub fn database_url(data_dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", data_dir.join(DATABASE_FILE).display())
}
