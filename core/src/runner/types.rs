use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RunnerError;

/// Default per-stream capture limit (10 MiB).
pub const DEFAULT_CAPTURE_BYTES: usize = 10 * 1024 * 1024;

/// Default time allowed for pipe readers to drain after the child is killed.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(2000);

/// Executable plus the language identifier passed as its first argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub tool_path: String,
    pub language: String,
}

impl RunnerConfig {
    pub fn new(tool_path: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            tool_path: tool_path.into(),
            language: language.into(),
        }
    }

    pub fn validate(&self) -> Result<(), RunnerError> {
        if self.tool_path.trim().is_empty() {
            return Err(RunnerError::Config("tool_path is empty".into()));
        }
        if self.language.trim().is_empty() {
            return Err(RunnerError::Config("language is empty".into()));
        }
        Ok(())
    }
}

/// One input file handed to the tool.
///
/// Deserializes from either a bare path string or an object with a `path`
/// field; other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl<'de> Deserialize<'de> for SourceFile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(PathBuf),
            Record { path: PathBuf },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bare(path) | Repr::Record { path } => SourceFile { path },
        })
    }
}

/// Captured stdout/stderr of a finished tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

/// Optional knobs for a single invocation. `Default` gives plain behaviour:
/// no timeout, inherited cwd and environment.
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    pub timeout: Option<Duration>,
    pub capture_bytes: usize,
    pub working_dir: Option<PathBuf>,
    pub envs: BTreeMap<String, String>,
    pub kill_grace: Duration,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            capture_bytes: DEFAULT_CAPTURE_BYTES,
            working_dir: None,
            envs: BTreeMap::new(),
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }
}
