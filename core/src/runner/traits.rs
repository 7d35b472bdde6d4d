use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::RunnerError;

use super::invoke::invoke_with;
use super::types::{InvokeOptions, Output, RunnerConfig, SourceFile};

#[async_trait]
pub trait ToolRunner: Send + Sync {
    fn name(&self) -> &str;
    async fn run(
        &self,
        cancel: &CancellationToken,
        files: &[SourceFile],
    ) -> Result<Output, RunnerError>;
}

/// Runs the configured executable as a child process.
pub struct ProcessToolRunner {
    config: RunnerConfig,
    options: InvokeOptions,
}

impl ProcessToolRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self::with_options(config, InvokeOptions::default())
    }

    pub fn with_options(config: RunnerConfig, options: InvokeOptions) -> Self {
        Self { config, options }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn options(&self) -> &InvokeOptions {
        &self.options
    }
}

#[async_trait]
impl ToolRunner for ProcessToolRunner {
    fn name(&self) -> &str {
        "process"
    }

    async fn run(
        &self,
        cancel: &CancellationToken,
        files: &[SourceFile],
    ) -> Result<Output, RunnerError> {
        invoke_with(cancel, &self.config, files, &self.options).await
    }
}
