mod app;
pub mod components;
pub mod format;
pub mod state;
pub mod theme;

pub use app::ChatApp;
