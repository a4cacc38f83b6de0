//! Persistence module split across logical submodules.

mod connection;
mod sounds;

pub use connection::{data_dir, ensure_schema, ensure_schema_at, recordings_dir};
pub use sounds::{delete_recording, fetch_recordings, insert_recording};

#[cfg(test)]
pub(crate) use connection::apply_schema;
