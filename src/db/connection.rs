use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use rusqlite::Connection;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".sound-mixer";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "sounds.sqlite";
/// Subdirectory of the data directory that collects captured audio files.
const RECORDINGS_DIR_NAME: &str = "recordings";

/// Ensure the database file exists at its default location, create the
/// schema if it is missing, and return a live connection.
pub fn ensure_schema() -> Result<Connection> {
    ensure_schema_at(&data_dir()?.join(DB_FILE_NAME))
}

/// Same as [`ensure_schema`] but against an explicit database path. Used by
/// the `--database` override and by tests that point at a scratch file.
pub fn ensure_schema_at(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(db_path).context("failed to open SQLite database")?;
    apply_schema(&conn)?;
    Ok(conn)
}

/// Run the idempotent schema creation. Split out so in-memory connections in
/// tests go through the exact statements production uses.
pub(crate) fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sounds (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT,
            soundUri TEXT
        )",
        [],
    )
    .context("failed to create sounds table")?;
    Ok(())
}

/// Resolve the application data directory inside the user's home.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Resolve (and create on demand) the directory new recordings are saved to.
pub fn recordings_dir() -> Result<PathBuf> {
    let dir = data_dir()?.join(RECORDINGS_DIR_NAME);
    fs::create_dir_all(&dir).context("failed to create recordings directory")?;
    Ok(dir)
}
