use toolrun_core::error::{CliError, RunnerError};

// 0: success
// 11: config / input error
// 20: tool start / IO error
// 30: timeout
// 50: internal/uncategorized
// 130: cancelled (Ctrl-C)
// otherwise: the tool's own non-zero exit code (1 if killed by a signal)
pub fn exit_code_for_error(e: &CliError) -> i32 {
    match e {
        CliError::Config(_) | CliError::Input(_) => 11,
        CliError::Runner(re) => exit_code_for_runner(re),
        CliError::Io(_) => 20,
        CliError::Anyhow(_) => 50,
    }
}

pub fn exit_code_for_runner(e: &RunnerError) -> i32 {
    match e {
        RunnerError::Config(_) => 11,
        RunnerError::NotFound { .. } | RunnerError::Spawn { .. } => 20,
        RunnerError::StreamIo { .. } | RunnerError::Wait(_) => 20,
        RunnerError::NonZeroExit { code, .. } => code.filter(|c| *c != 0).unwrap_or(1),
        RunnerError::TimedOut { .. } => 30,
        RunnerError::Cancelled { .. } => 130,
    }
}
