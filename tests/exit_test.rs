//! Process-level exit behavior of the binary.

use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_gtfs-rt-validator"))
        .args(args)
        .env("RUST_LOG", "gtfs_rt_validator=info")
        .output()
        .unwrap()
}

#[test]
fn test_startup_failure_is_reported_once_and_exits_nonzero() {
    let output = run(&["-port", "abc"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    let reports = stdout.matches("invalid value 'abc' for -port").count()
        + stderr.matches("invalid value 'abc' for -port").count();
    assert_eq!(reports, 1, "stdout: {stdout}\nstderr: {stderr}");
    assert!(!stderr.contains("Error:"), "{stderr}");
}

#[test]
fn test_missing_batch_target_exits_nonzero() {
    let missing = tempfile::TempDir::new().unwrap();
    let target = missing.path().join("absent");

    let output = run(&["-batch", target.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_usage_error_uses_clap_exit_code() {
    let output = run(&["-unknown"]);
    assert_eq!(output.status.code(), Some(2));
}
