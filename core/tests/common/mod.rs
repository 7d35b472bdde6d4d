use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use toolrun_core::runner::RunnerConfig;

pub const PIDFILE_ENV: &str = "TOOLRUN_TEST_PIDFILE";

/// Fake tools shared by every test in the binary.
///
/// All scripts are written before any test spawns a process: a fork that
/// happens while another thread still holds a script open for writing makes
/// exec fail with ETXTBSY.
pub struct Tools {
    _dir: tempfile::TempDir,
    pub echo_args: PathBuf,
    pub a_and_b: PathBuf,
    pub fail: PathBuf,
    pub sleeper: PathBuf,
    pub flood: PathBuf,
    pub env_and_cwd: PathBuf,
    pub leaves_background_child: PathBuf,
    pub runs_with_background_child: PathBuf,
    pub not_executable: PathBuf,
}

pub fn tools() -> &'static Tools {
    static TOOLS: OnceLock<Tools> = OnceLock::new();
    TOOLS.get_or_init(|| {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().to_path_buf();
        Tools {
            echo_args: script(&root, "echo_args", r#"printf '%s\n' "$@""#),
            a_and_b: script(&root, "a_and_b", "printf A\nprintf B >&2"),
            fail: script(&root, "fail", "printf out\nprintf err >&2\nexit 3"),
            sleeper: script(
                &root,
                "sleeper",
                &format!(
                    "printf started\necho $$ > \"${env}.tmp\"\nmv \"${env}.tmp\" \"${env}\"\nexec sleep 30",
                    env = PIDFILE_ENV
                ),
            ),
            flood: script(&root, "flood", "yes x | head -c 200000"),
            env_and_cwd: script(&root, "env_and_cwd", "printf '%s|' \"$LINT_MODE\"\npwd"),
            leaves_background_child: script(&root, "leaves_background_child", "sleep 5 &\nprintf hi"),
            runs_with_background_child: script(
                &root,
                "runs_with_background_child",
                "sleep 5 &\nexec sleep 5",
            ),
            not_executable: {
                let path = root.join("not_executable");
                std::fs::write(&path, "#!/bin/sh\nexit 0\n").expect("write script");
                path
            },
            _dir: dir,
        }
    })
}

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

pub fn config(tool: &Path, language: &str) -> RunnerConfig {
    RunnerConfig::new(tool.to_string_lossy(), language)
}

/// Polls until `path` exists and returns its trimmed contents.
pub async fn wait_for_file(path: &Path, limit: Duration) -> String {
    let started = std::time::Instant::now();
    loop {
        if let Ok(s) = std::fs::read_to_string(path) {
            if !s.trim().is_empty() {
                return s.trim().to_string();
            }
        }
        assert!(started.elapsed() < limit, "timed out waiting for {}", path.display());
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

pub fn process_alive(pid: &str) -> bool {
    Path::new("/proc").join(pid).exists()
}
