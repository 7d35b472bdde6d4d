//! toolrun-cli library - exposes modules for unit tests

pub mod app;
pub mod commands;
pub mod exit;
pub mod render;
pub mod utils;
