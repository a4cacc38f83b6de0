//! Terminal user interface split across logical submodules: the central
//! state container, screen-scoped selection state, layout helpers, and the
//! Crossterm event loop.

mod app;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
