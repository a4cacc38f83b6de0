//! Core library surface for the Sound Mixer TUI application.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces: the persistence gateway, the domain models, the audio adapters,
//! and the interactive application itself.

pub mod audio;
pub mod db;
pub mod models;
pub mod ui;

/// Convenience re-exports for the persistence layer. These functions are
/// typically used by `main.rs` to initialize the embedded SQLite store and
/// restore the recorded-sounds list.
pub use db::{data_dir, ensure_schema, ensure_schema_at, fetch_recordings, recordings_dir};

/// The two domain types that other layers manipulate, plus the bundled-clip
/// catalog assembled at process start.
pub use models::{preloaded_sounds, PreloadedSound, RecordedSound};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
