//! Runs an external language tool as `<tool> <language> <path>...` and
//! captures what it prints.

pub mod api;
pub mod config;
pub mod error;
pub mod input;
pub mod runner;
pub mod util;
