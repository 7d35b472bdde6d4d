use thiserror::Error;

use crate::runner::Output;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("runner failed: {0}")]
    Runner(#[from] RunnerError),
    #[error("config error: {0}")]
    Config(String),
    #[error("input error: {0}")]
    Input(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Failure of a single tool invocation.
///
/// Variants that fire after the child started carry whatever output was
/// captured up to that point, so callers can surface it as diagnostics.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("config error: {0}")]
    Config(String),

    #[error("tool not found: {tool}")]
    NotFound { tool: String },

    #[error("spawn failed for {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("{}", describe_exit(.code))]
    NonZeroExit { code: Option<i32>, output: Output },

    #[error("tool run cancelled")]
    Cancelled { output: Output },

    #[error("tool run timed out after {after_ms}ms")]
    TimedOut { after_ms: u64, output: Output },

    #[error("stream io error: {stream} {source}")]
    StreamIo {
        stream: &'static str,
        source: std::io::Error,
    },

    #[error("wait failed: {0}")]
    Wait(std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("tool exited with status {c}"),
        None => "tool terminated by signal".to_string(),
    }
}

impl RunnerError {
    /// Stable machine-readable name, used in logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::NotFound { .. } => "not_found",
            Self::Spawn { .. } => "spawn",
            Self::NonZeroExit { .. } => "non_zero_exit",
            Self::Cancelled { .. } => "cancelled",
            Self::TimedOut { .. } => "timed_out",
            Self::StreamIo { .. } => "stream_io",
            Self::Wait(_) => "wait",
        }
    }

    /// Output captured before the failure, if the child got far enough to
    /// produce any.
    pub fn partial_output(&self) -> Option<&Output> {
        match self {
            Self::NonZeroExit { output, .. }
            | Self::Cancelled { output }
            | Self::TimedOut { output, .. } => Some(output),
            _ => None,
        }
    }
}
