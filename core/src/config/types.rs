use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::runner::{InvokeOptions, RunnerConfig, DEFAULT_CAPTURE_BYTES};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub runner: RunnerSettings,

    #[serde(default)]
    pub control: ControlConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[runner]`: which executable to run and the language it is told about.
/// Both may be left empty here and supplied on the command line instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerSettings {
    #[serde(default)]
    pub tool_path: String,

    #[serde(default)]
    pub language: String,
}

impl RunnerSettings {
    pub fn to_runner_config(&self) -> RunnerConfig {
        RunnerConfig::new(self.tool_path.trim(), self.language.trim())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Wall-clock limit for one run. 0 disables the timeout.
    #[serde(default)]
    pub timeout_ms: u64,

    /// Per-stream capture limit in bytes.
    #[serde(default = "default_capture_bytes")]
    pub capture_bytes: usize,

    /// How long to wait for pipes to drain after the child is killed.
    #[serde(default = "default_kill_grace_ms")]
    pub kill_grace_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    /// Extra environment variables for the child process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_capture_bytes() -> usize {
    DEFAULT_CAPTURE_BYTES
}

fn default_kill_grace_ms() -> u64 {
    2000
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 0,
            capture_bytes: default_capture_bytes(),
            kill_grace_ms: default_kill_grace_ms(),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }
}

impl ControlConfig {
    pub fn to_invoke_options(&self) -> InvokeOptions {
        InvokeOptions {
            timeout: (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)),
            capture_bytes: self.capture_bytes,
            working_dir: self
                .working_dir
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            envs: self.env.clone(),
            kill_grace: Duration::from_millis(self.kill_grace_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (`~/.toolrun/logs` once loaded).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "toolrun_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}
