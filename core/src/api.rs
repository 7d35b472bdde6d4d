//! Stable re-exports for consumers (`cli` and external crates).
//!
//! Prefer importing from `toolrun_core::api` instead of reaching into internal modules.

pub use crate::config::{
    load_default, load_from_path, AppConfig, ControlConfig, LoggingConfig, RunnerSettings,
};
pub use crate::error::{CliError, RunnerError};
pub use crate::input::InputParser;
pub use crate::runner::{
    build_args, invoke, invoke_with, InvokeOptions, Output, ProcessToolRunner, RunnerConfig,
    SourceFile, ToolRunner,
};
pub use tokio_util::sync::CancellationToken;
