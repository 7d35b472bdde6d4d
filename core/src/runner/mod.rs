mod args;
mod invoke;
mod io_pump;
mod traits;
pub mod types;

pub use args::build_args;
pub use invoke::{invoke, invoke_with};
pub use traits::{ProcessToolRunner, ToolRunner};
pub use types::{
    InvokeOptions, Output, RunnerConfig, SourceFile, DEFAULT_CAPTURE_BYTES, DEFAULT_KILL_GRACE,
};
