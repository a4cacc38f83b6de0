//! Binary entry point that glues the SQLite-backed sound library to the TUI.
//! The bootstrapping pipeline: parse the command line, point diagnostics at
//! the log file, bring up the database, restore the recorded-sounds list,
//! and drive the Ratatui event loop until the user exits.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use sound_mixer::{
    data_dir, ensure_schema, ensure_schema_at, fetch_recordings, preloaded_sounds,
    recordings_dir, run_app, App,
};

/// File name of the diagnostic log inside the application data directory.
const LOG_FILE_NAME: &str = "sound-mixer.log";

/// Terminal sound mixer: play bundled clips, record new ones through the
/// microphone, and keep recordings in a local library.
#[derive(Parser, Debug)]
#[command(name = "sound-mixer", version)]
struct Cli {
    /// Use this SQLite file instead of the default library location
    #[arg(long, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Start with an empty recorded-sounds list (rows already in the
    /// database are left untouched)
    #[arg(long)]
    skip_restore: bool,
}

/// Initialize persistence, restore cached data, and launch the event loop.
///
/// Returning a `Result` bubbles up fatal initialization problems (for
/// example an unwritable data directory) to the terminal instead of
/// crashing silently.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let conn = match &cli.database {
        Some(path) => ensure_schema_at(path)?,
        None => ensure_schema()?,
    };

    let recorded = if cli.skip_restore {
        Vec::new()
    } else {
        fetch_recordings(&conn)?
    };

    let mut app = App::new(conn, preloaded_sounds(), recorded, recordings_dir()?);
    run_app(&mut app)
}

/// Route diagnostics to a log file under the data directory. Writing them to
/// stderr would scribble over the alternate screen, so the subscriber gets a
/// plain-text file writer instead.
fn init_logging() -> Result<()> {
    let dir = data_dir()?;
    fs::create_dir_all(&dir).context("failed to create data directory")?;
    let file = File::create(dir.join(LOG_FILE_NAME)).context("failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .init();
    Ok(())
}
