//! Renders a finished run for the terminal or as a single JSON object.
use std::io::Write;

use serde::Serialize;
use toolrun_core::error::RunnerError;
use toolrun_core::runner::Output;

use crate::commands::cli::OutputFormat;

#[derive(Debug, Serialize)]
struct Report<'a> {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorReport>,
    stdout: &'a str,
    stderr: &'a str,
}

#[derive(Debug, Serialize)]
struct ErrorReport {
    kind: &'static str,
    message: String,
}

pub fn render_success<O, E>(
    format: OutputFormat,
    output: &Output,
    out: &mut O,
    err: &mut E,
) -> std::io::Result<()>
where
    O: Write,
    E: Write,
{
    match format {
        OutputFormat::Text => forward(output, out, err),
        OutputFormat::Json => write_json(
            out,
            &Report {
                ok: true,
                error: None,
                stdout: &output.stdout,
                stderr: &output.stderr,
            },
        ),
    }
}

/// Partial output, if the tool produced any, is forwarded before the error.
pub fn render_failure<O, E>(
    format: OutputFormat,
    error: &RunnerError,
    out: &mut O,
    err: &mut E,
) -> std::io::Result<()>
where
    O: Write,
    E: Write,
{
    let empty = Output::default();
    let partial = error.partial_output().unwrap_or(&empty);

    match format {
        OutputFormat::Text => {
            forward(partial, out, err)?;
            if !partial.stderr.is_empty() && !partial.stderr.ends_with('\n') {
                writeln!(err)?;
            }
            writeln!(err, "toolrun: {error}")?;
            err.flush()
        }
        OutputFormat::Json => write_json(
            out,
            &Report {
                ok: false,
                error: Some(ErrorReport {
                    kind: error.kind(),
                    message: error.to_string(),
                }),
                stdout: &partial.stdout,
                stderr: &partial.stderr,
            },
        ),
    }
}

fn forward<O: Write, E: Write>(output: &Output, out: &mut O, err: &mut E) -> std::io::Result<()> {
    out.write_all(output.stdout.as_bytes())?;
    out.flush()?;
    err.write_all(output.stderr.as_bytes())?;
    err.flush()
}

fn write_json<O: Write>(out: &mut O, report: &Report<'_>) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, report)?;
    writeln!(out)?;
    out.flush()
}
