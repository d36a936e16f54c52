//! Terminal user interface

pub mod conversation;
pub mod header;
pub mod render;
pub mod tui;

pub use tui::run;
