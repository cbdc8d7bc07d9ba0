pub mod config;
pub mod editor;
pub mod editor_display;
pub mod highlights_file;
pub mod loader;
pub mod logging;
pub mod render;
pub mod theme;
