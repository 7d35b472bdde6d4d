//! Single tool invocation: spawn `<tool> <language> <path>...`, capture both
//! streams, and race the child's exit against cancellation and the optional
//! timeout. Cancellation and timeout kill the child before returning.
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::RunnerError;
use crate::util::CaptureBuffer;

use super::args::build_args;
use super::io_pump;
use super::types::{InvokeOptions, Output, RunnerConfig, SourceFile};

/// Runs the tool once with default options.
pub async fn invoke(
    cancel: &CancellationToken,
    config: &RunnerConfig,
    input: &[SourceFile],
) -> Result<Output, RunnerError> {
    invoke_with(cancel, config, input, &InvokeOptions::default()).await
}

#[tracing::instrument(
    name = "runner.invoke",
    skip_all,
    fields(
        run_id = %uuid::Uuid::new_v4(),
        tool = %config.tool_path,
        language = %config.language,
        files = input.len()
    )
)]
pub async fn invoke_with(
    cancel: &CancellationToken,
    config: &RunnerConfig,
    input: &[SourceFile],
    options: &InvokeOptions,
) -> Result<Output, RunnerError> {
    config.validate()?;

    if cancel.is_cancelled() {
        tracing::debug!("cancelled before start, not spawning");
        return Err(RunnerError::Cancelled {
            output: Output::default(),
        });
    }

    let mut cmd = Command::new(&config.tool_path);
    cmd.args(build_args(&config.language, input))
        .envs(&options.envs)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &options.working_dir {
        cmd.current_dir(dir);
    }

    let started_at = Instant::now();
    let deadline = options.timeout.map(|t| tokio::time::Instant::now() + t);

    let mut child = cmd.spawn().map_err(|e| spawn_error(&config.tool_path, e))?;
    tracing::debug!(pid = ?child.id(), "tool started");

    let mut pumps = Pumps::start(&mut child, options.capture_bytes)?;

    let ended = tokio::select! {
        res = child.wait() => Ended::Exited(res),
        _ = cancel.cancelled() => Ended::Cancelled,
        _ = sleep_until(deadline) => Ended::TimedOut,
    };

    let status = match ended {
        Ended::Exited(Ok(status)) => status,
        Ended::Exited(Err(e)) => {
            tracing::error!(error.kind = "runner.wait", error.message = %e);
            terminate(&mut child).await;
            pumps.abort();
            return Err(RunnerError::Wait(e));
        }
        Ended::Cancelled => {
            terminate(&mut child).await;
            let output = pumps.drain_within(options.kill_grace).await;
            tracing::warn!(error.kind = "runner.cancelled", elapsed_ms = elapsed_ms(started_at));
            return Err(RunnerError::Cancelled { output });
        }
        Ended::TimedOut => {
            terminate(&mut child).await;
            let output = pumps.drain_within(options.kill_grace).await;
            let after_ms = elapsed_ms(started_at);
            tracing::warn!(error.kind = "runner.timeout", after_ms);
            return Err(RunnerError::TimedOut { after_ms, output });
        }
    };

    // A grandchild may still hold the pipes open after the child exits, so
    // keep honouring cancellation and the deadline while draining.
    let drained = tokio::select! {
        res = pumps.wait() => Drained::Done(res),
        _ = cancel.cancelled() => Drained::Cancelled,
        _ = sleep_until(deadline) => Drained::TimedOut,
    };
    match drained {
        Drained::Done(res) => res?,
        Drained::Cancelled => {
            pumps.abort();
            return Err(RunnerError::Cancelled {
                output: pumps.output(),
            });
        }
        Drained::TimedOut => {
            pumps.abort();
            return Err(RunnerError::TimedOut {
                after_ms: elapsed_ms(started_at),
                output: pumps.output(),
            });
        }
    }

    let output = pumps.output();
    let duration_ms = elapsed_ms(started_at);

    if status.success() {
        tracing::debug!(
            duration_ms,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            "tool finished"
        );
        Ok(output)
    } else {
        tracing::warn!(
            error.kind = "runner.exit",
            exit_code = ?status.code(),
            duration_ms,
            "tool exited unsuccessfully"
        );
        Err(RunnerError::NonZeroExit {
            code: status.code(),
            output,
        })
    }
}

enum Ended {
    Exited(std::io::Result<std::process::ExitStatus>),
    Cancelled,
    TimedOut,
}

enum Drained {
    Done(Result<(), RunnerError>),
    Cancelled,
    TimedOut,
}

struct Pumps {
    out_buf: Arc<CaptureBuffer>,
    err_buf: Arc<CaptureBuffer>,
    out_task: JoinHandle<Result<u64, RunnerError>>,
    err_task: JoinHandle<Result<u64, RunnerError>>,
}

impl Pumps {
    fn start(child: &mut Child, capture_bytes: usize) -> Result<Self, RunnerError> {
        let stdout = child.stdout.take().ok_or_else(|| RunnerError::StreamIo {
            stream: "stdout",
            source: std::io::Error::other("stdout not piped"),
        })?;
        let stderr = child.stderr.take().ok_or_else(|| RunnerError::StreamIo {
            stream: "stderr",
            source: std::io::Error::other("stderr not piped"),
        })?;

        let out_buf = CaptureBuffer::new(capture_bytes);
        let err_buf = CaptureBuffer::new(capture_bytes);
        let out_task = io_pump::pump_stdout(stdout, out_buf.clone());
        let err_task = io_pump::pump_stderr(stderr, err_buf.clone());

        Ok(Self {
            out_buf,
            err_buf,
            out_task,
            err_task,
        })
    }

    async fn wait(&mut self) -> Result<(), RunnerError> {
        let (out, err) = tokio::join!(&mut self.out_task, &mut self.err_task);
        joined(out, "stdout")?;
        joined(err, "stderr")?;
        Ok(())
    }

    /// Best-effort drain after the child was killed. Whatever arrived before
    /// the grace period ran out is kept.
    async fn drain_within(&mut self, grace: std::time::Duration) -> Output {
        match tokio::time::timeout(grace, self.wait()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(error.kind = "runner.drain", error.message = %e);
            }
            Err(_) => {
                tracing::debug!(
                    grace_ms = grace.as_millis() as u64,
                    "pipes still open after kill, abandoning readers"
                );
                self.abort();
            }
        }
        self.output()
    }

    fn abort(&self) {
        self.out_task.abort();
        self.err_task.abort();
    }

    fn output(&self) -> Output {
        Output {
            stdout: self.out_buf.to_string_lossy(),
            stderr: self.err_buf.to_string_lossy(),
        }
    }
}

fn joined(
    res: Result<Result<u64, RunnerError>, tokio::task::JoinError>,
    stream: &'static str,
) -> Result<u64, RunnerError> {
    res.map_err(|e| RunnerError::StreamIo {
        stream,
        source: std::io::Error::other(e.to_string()),
    })?
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Kill and reap the child so it is gone by the time the caller sees the
/// error.
async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        tracing::debug!(error.kind = "runner.kill", error.message = %e);
    }
}

fn spawn_error(tool: &str, e: std::io::Error) -> RunnerError {
    tracing::error!(error.kind = "runner.spawn", tool = %tool, error.message = %e);
    if e.kind() == std::io::ErrorKind::NotFound {
        RunnerError::NotFound {
            tool: tool.to_string(),
        }
    } else {
        RunnerError::Spawn {
            tool: tool.to_string(),
            source: e,
        }
    }
}

fn elapsed_ms(started_at: Instant) -> u64 {
    started_at.elapsed().as_millis() as u64
}
