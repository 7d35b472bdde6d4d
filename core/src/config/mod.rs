mod load;
mod types;

pub use load::{
    apply_data_dir_defaults, apply_env_overrides, get_toolrun_data_dir, load_default, load_from_path, ENV_LANGUAGE,
    ENV_TIMEOUT_MS, ENV_TOOL_PATH,
};
pub use types::{AppConfig, ControlConfig, LoggingConfig, RunnerSettings};
