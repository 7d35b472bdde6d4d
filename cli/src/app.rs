//! CLI assembly: merges flag overrides into the loaded config, collects the
//! input files and runs the tool once.
use std::io::Read;

use tokio_util::sync::CancellationToken;
use toolrun_core::api::{AppConfig, CliError, InputParser, ProcessToolRunner, SourceFile, ToolRunner};

use crate::commands::cli::RunArgs;
use crate::exit::exit_code_for_runner;
use crate::render;
use crate::utils::parse_env_pair;

pub fn apply_run_overrides(cfg: &mut AppConfig, ra: &RunArgs) -> Result<(), CliError> {
    if let Some(tool) = &ra.tool {
        cfg.runner.tool_path = tool.clone();
    }
    if let Some(language) = &ra.language {
        cfg.runner.language = language.clone();
    }
    if let Some(ms) = ra.timeout_ms {
        cfg.control.timeout_ms = ms;
    }
    if let Some(bytes) = ra.capture_bytes {
        cfg.control.capture_bytes = bytes;
    }
    if let Some(cwd) = &ra.cwd {
        cfg.control.working_dir = Some(cwd.clone());
    }
    for raw in &ra.env {
        let (k, v) = parse_env_pair(raw)?;
        cfg.control.env.insert(k, v);
    }
    Ok(())
}

/// Files from `--files-from` first, then positional paths.
pub fn collect_input(ra: &RunArgs) -> Result<Vec<SourceFile>, CliError> {
    let mut files = match ra.files_from.as_deref() {
        Some("-") => {
            let mut s = String::new();
            std::io::stdin().read_to_string(&mut s)?;
            InputParser::parse_change_set(&s)?
        }
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .map_err(|e| CliError::Input(format!("read change-set {path}: {e}")))?;
            InputParser::parse_change_set(&s)?
        }
        None => Vec::new(),
    };
    files.extend(InputParser::from_paths(ra.files.iter().cloned()));
    Ok(files)
}

#[tracing::instrument(name = "cli.run", skip_all)]
pub async fn run(
    mut cfg: AppConfig,
    ra: RunArgs,
    cancel: CancellationToken,
) -> Result<i32, CliError> {
    apply_run_overrides(&mut cfg, &ra)?;

    let runner_cfg = cfg.runner.to_runner_config();
    runner_cfg
        .validate()
        .map_err(|e| CliError::Config(format!("{e} (set it in [runner] or pass --tool/--language)")))?;

    let files = collect_input(&ra)?;
    tracing::info!(
        tool = %runner_cfg.tool_path,
        language = %runner_cfg.language,
        files = files.len(),
        "invoking tool"
    );

    let runner = ProcessToolRunner::with_options(runner_cfg, cfg.control.to_invoke_options());
    let result = runner.run(&cancel, &files).await;

    let mut out = std::io::stdout().lock();
    let mut err = std::io::stderr().lock();
    match result {
        Ok(output) => {
            render::render_success(ra.format, &output, &mut out, &mut err)?;
            Ok(0)
        }
        Err(e) => {
            tracing::debug!(error.kind = e.kind(), "run failed");
            render::render_failure(ra.format, &e, &mut out, &mut err)?;
            Ok(exit_code_for_runner(&e))
        }
    }
}

pub fn show_config(cfg: &AppConfig) -> Result<i32, CliError> {
    let s = toml::to_string_pretty(cfg)
        .map_err(|e| CliError::Config(format!("serialize config: {e}")))?;
    print!("{s}");
    Ok(0)
}
