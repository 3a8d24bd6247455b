//! UI layer for the desktop GUI: app shell, table, forms, and toasts.

pub mod app;

pub use app::DirectoryGuiApp;
