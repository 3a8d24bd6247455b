//! Bridge between the egui event loop and the async backend worker.

pub mod commands;
pub mod runtime;
