#![cfg(unix)]

mod common;

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use toolrun_core::error::RunnerError;
use toolrun_core::input::InputParser;
use toolrun_core::runner::{
    invoke, invoke_with, InvokeOptions, Output, ProcessToolRunner, ToolRunner,
    DEFAULT_CAPTURE_BYTES,
};

use common::{config, process_alive, tools, wait_for_file, PIDFILE_ENV};

#[tokio::test]
async fn empty_input_passes_only_language() {
    let t = tools();
    let out = invoke(&CancellationToken::new(), &config(&t.echo_args, "rust"), &[])
        .await
        .unwrap();
    assert_eq!(out.stdout, "rust\n");
    assert_eq!(out.stderr, "");
}

#[tokio::test]
async fn paths_follow_language_in_input_order() {
    let t = tools();
    let files = InputParser::from_paths(["src/z.rs", "src/a b.rs", "src/z.rs"]);
    let out = invoke(&CancellationToken::new(), &config(&t.echo_args, "rust"), &files)
        .await
        .unwrap();
    assert_eq!(out.stdout, "rust\nsrc/z.rs\nsrc/a b.rs\nsrc/z.rs\n");
}

#[tokio::test]
async fn success_captures_both_streams() {
    let t = tools();
    let out = invoke(&CancellationToken::new(), &config(&t.a_and_b, "go"), &[])
        .await
        .unwrap();
    assert_eq!(
        out,
        Output {
            stdout: "A".into(),
            stderr: "B".into(),
        }
    );
}

#[tokio::test]
async fn non_zero_exit_is_an_error_with_partial_output() {
    let t = tools();
    let err = invoke(&CancellationToken::new(), &config(&t.fail, "go"), &[])
        .await
        .unwrap_err();

    match err {
        RunnerError::NonZeroExit { code, output } => {
            assert_eq!(code, Some(3));
            assert_eq!(output.stdout, "out");
            assert_eq!(output.stderr, "err");
        }
        other => panic!("expected NonZeroExit, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_tool_is_not_found() {
    tools();
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-tool");
    let err = invoke(&CancellationToken::new(), &config(&missing, "go"), &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "not_found");
}

#[tokio::test]
async fn non_executable_tool_is_spawn_error() {
    let t = tools();
    let err = invoke(&CancellationToken::new(), &config(&t.not_executable, "go"), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::Spawn { .. }), "got {err:?}");
}

#[tokio::test]
async fn cancellation_kills_the_child() {
    let t = tools();
    let dir = tempfile::tempdir().unwrap();
    let pidfile = dir.path().join("pid");

    let mut opts = InvokeOptions::default();
    opts.envs
        .insert(PIDFILE_ENV.to_string(), pidfile.to_string_lossy().into_owned());

    let cancel = CancellationToken::new();
    let canceller = {
        let cancel = cancel.clone();
        let pidfile = pidfile.clone();
        tokio::spawn(async move {
            let pid = wait_for_file(&pidfile, Duration::from_secs(10)).await;
            cancel.cancel();
            pid
        })
    };

    let started = Instant::now();
    let err = invoke_with(&cancel, &config(&t.sleeper, "sh"), &[], &opts)
        .await
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(15));

    match err {
        RunnerError::Cancelled { output } => assert_eq!(output.stdout, "started"),
        other => panic!("expected Cancelled, got {other:?}"),
    }

    let pid = canceller.await.unwrap();
    if cfg!(target_os = "linux") {
        assert!(!process_alive(&pid), "child {pid} still running after cancel");
    }
}

#[tokio::test]
async fn timeout_kills_the_child() {
    let t = tools();
    let dir = tempfile::tempdir().unwrap();
    let pidfile = dir.path().join("pid");

    // Long enough for the script to record its pid before it is killed.
    let mut opts = InvokeOptions {
        timeout: Some(Duration::from_millis(1000)),
        ..InvokeOptions::default()
    };
    opts.envs
        .insert(PIDFILE_ENV.to_string(), pidfile.to_string_lossy().into_owned());

    let err = invoke_with(&CancellationToken::new(), &config(&t.sleeper, "sh"), &[], &opts)
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::TimedOut { .. }), "got {err:?}");

    let pid = wait_for_file(&pidfile, Duration::from_secs(1)).await;
    if cfg!(target_os = "linux") {
        assert!(!process_alive(&pid), "child {pid} still running after timeout");
    }
}

fn cancel_after(cancel: &CancellationToken, delay: Duration) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        cancel.cancel();
    });
}

#[tokio::test]
async fn background_child_holding_pipes_does_not_block_cancel_after_exit() {
    let t = tools();
    let cancel = CancellationToken::new();
    cancel_after(&cancel, Duration::from_millis(300));

    let started = Instant::now();
    let err = invoke(&cancel, &config(&t.leaves_background_child, "sh"), &[])
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    match err {
        RunnerError::Cancelled { output } => assert_eq!(output.stdout, "hi"),
        other => panic!("expected Cancelled, got {other:?}"),
    }
    assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
}

#[tokio::test]
async fn background_child_holding_pipes_is_abandoned_after_kill_grace() {
    let t = tools();
    let opts = InvokeOptions {
        kill_grace: Duration::from_millis(200),
        ..InvokeOptions::default()
    };
    let cancel = CancellationToken::new();
    cancel_after(&cancel, Duration::from_millis(300));

    let started = Instant::now();
    let err = invoke_with(&cancel, &config(&t.runs_with_background_child, "sh"), &[], &opts)
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, RunnerError::Cancelled { .. }), "got {err:?}");
    assert!(elapsed >= Duration::from_millis(450), "took {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
}

#[tokio::test]
async fn capture_limit_truncates_without_blocking_the_child() {
    let t = tools();
    let opts = InvokeOptions {
        capture_bytes: 10,
        ..InvokeOptions::default()
    };
    let out = invoke_with(&CancellationToken::new(), &config(&t.flood, "txt"), &[], &opts)
        .await
        .unwrap();
    assert_eq!(out.stdout, "x\nx\nx\nx\nx\n");
}

#[tokio::test]
async fn env_and_working_dir_are_applied() {
    let t = tools();
    let dir = tempfile::tempdir().unwrap();
    let cwd = dir.path().canonicalize().unwrap();

    let mut opts = InvokeOptions {
        working_dir: Some(cwd.clone()),
        ..InvokeOptions::default()
    };
    opts.envs.insert("LINT_MODE".into(), "strict".into());

    let out = invoke_with(&CancellationToken::new(), &config(&t.env_and_cwd, "py"), &[], &opts)
        .await
        .unwrap();
    assert_eq!(out.stdout, format!("strict|{}\n", cwd.display()));
}

#[tokio::test]
async fn process_runner_delegates_to_invoker() {
    let t = tools();
    let process = ProcessToolRunner::new(config(&t.echo_args, "js"));
    assert_eq!(process.config().language, "js");
    assert_eq!(process.options().timeout, None);
    assert_eq!(process.options().capture_bytes, DEFAULT_CAPTURE_BYTES);

    let runner: Box<dyn ToolRunner> = Box::new(process);
    assert_eq!(runner.name(), "process");

    let out = runner
        .run(&CancellationToken::new(), &InputParser::from_paths(["index.js"]))
        .await
        .unwrap();
    assert_eq!(out.stdout, "js\nindex.js\n");
}
