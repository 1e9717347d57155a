// Presentation layer - Terminal pages and command handling
pub mod app;
pub mod commands;
pub mod render;
