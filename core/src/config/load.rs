use std::path::{Path, PathBuf};

use anyhow::Context;

use super::types::AppConfig;

pub const ENV_TOOL_PATH: &str = "TOOLRUN_TOOL_PATH";
pub const ENV_LANGUAGE: &str = "TOOLRUN_LANGUAGE";
pub const ENV_TIMEOUT_MS: &str = "TOOLRUN_TIMEOUT_MS";

/// Get the default toolrun data directory: ~/.toolrun
pub fn get_toolrun_data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".toolrun"))
}

pub fn load_from_path(path: &Path) -> anyhow::Result<AppConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg = toml::from_str::<AppConfig>(&s)
        .with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

pub fn load_default() -> anyhow::Result<AppConfig> {
    // Priority 1: ~/.toolrun/config.toml
    let home_config = get_toolrun_data_dir()
        .ok()
        .map(|dir| dir.join("config.toml"));

    // Priority 2: ./toolrun.toml
    let local_config = Path::new("toolrun.toml");

    let mut cfg = match home_config.as_deref() {
        Some(path) if path.exists() => load_from_path(path)?,
        _ if local_config.exists() => load_from_path(local_config)?,
        _ => AppConfig::default(),
    };

    if let Ok(dir) = get_toolrun_data_dir() {
        apply_data_dir_defaults(&mut cfg, &dir);
    }

    // Environment variable overrides (Priority 0: highest)
    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;

    Ok(cfg)
}

/// Points an unset or blank logging directory at `<data_dir>/logs`.
pub fn apply_data_dir_defaults(cfg: &mut AppConfig, data_dir: &Path) {
    let unset = cfg
        .logging
        .directory
        .as_deref()
        .map(|s| s.trim().is_empty())
        .unwrap_or(true);
    if unset {
        cfg.logging.directory = Some(data_dir.join("logs").to_string_lossy().to_string());
    }
}

pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = non_blank(ENV_TOOL_PATH) {
        cfg.runner.tool_path = v;
    }
    if let Some(v) = non_blank(ENV_LANGUAGE) {
        cfg.runner.language = v;
    }
    if let Some(v) = non_blank(ENV_TIMEOUT_MS) {
        cfg.control.timeout_ms = v
            .trim()
            .parse()
            .with_context(|| format!("{ENV_TIMEOUT_MS} is not a number: {v}"))?;
    }

    Ok(())
}
