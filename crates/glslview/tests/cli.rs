use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn glslview() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_glslview"));
    command.env("RUST_LOG", "info").env_remove("GLSLVIEW_SCREENSHOT_DIR");
    command
}

fn run_with_stdin(bytes: &[u8]) -> Output {
    let mut child = glslview()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn glslview");
    {
        let mut stdin = child.stdin.take().expect("stdin is piped");
        // The viewer may stop reading once the limit is exceeded.
        let _ = stdin.write_all(bytes);
    }
    child.wait_with_output().expect("failed to wait for glslview")
}

#[test]
fn missing_shader_file_is_reported() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("nowhere.frag");

    let output = glslview()
        .arg(&path)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run glslview");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nowhere.frag"), "stderr: {stderr}");
}

#[test]
fn more_than_one_shader_is_a_usage_error() {
    let output = glslview()
        .args(["a.frag", "b.frag"])
        .stdin(Stdio::null())
        .output()
        .expect("failed to run glslview");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn help_lists_flags_and_controls() {
    let output = glslview()
        .arg("--help")
        .output()
        .expect("failed to run glslview --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--screenshot-dir"));
    assert!(stdout.contains("Esc quits"));
}

#[test]
fn oversized_stdin_is_rejected() {
    let output = run_with_stdin(&vec![b' '; (1 << 20) + 1]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("larger than"), "stderr: {stderr}");
}

#[test]
fn non_utf8_stdin_is_rejected() {
    let output = run_with_stdin(&[0xff, 0xfe, 0x00, 0x80]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not valid UTF-8"), "stderr: {stderr}");
}
