use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "toolrun", version, about = "Run a language tool over a set of files")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.toolrun/config.toml or ./toolrun.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RunArgs {
    /// Tool executable; overrides `runner.tool_path`.
    #[arg(long)]
    pub tool: Option<String>,

    /// Language identifier passed as the first argument; overrides `runner.language`.
    #[arg(long)]
    pub language: Option<String>,

    /// Read input paths from a change-set file (`-` for stdin).
    /// Accepts one path per line or a JSON array.
    #[arg(long)]
    pub files_from: Option<String>,

    /// Kill the tool after this many milliseconds (0 disables).
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Per-stream capture limit in bytes.
    #[arg(long)]
    pub capture_bytes: Option<usize>,

    /// Working directory for the tool.
    #[arg(long)]
    pub cwd: Option<String>,

    /// Extra environment variables to pass to the tool (KEY=VALUE).
    /// Can be specified multiple times.
    #[arg(long = "env", action = clap::ArgAction::Append)]
    pub env: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Input paths, appended after any read from --files-from.
    pub files: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Invoke the tool once and print what it wrote.
    Run(RunArgs),
    /// Print the effective configuration as TOML.
    Config,
}
