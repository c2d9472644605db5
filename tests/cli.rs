use std::process::Command;

fn reader() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rs232-reader"));
    // No COM5 device node lives in the crate directory.
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn missing_port_fails_without_output() {
    let output = reader().output().expect("failed to run rs232-reader");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("COM5"), "stderr was: {}", stderr);
}

#[test]
fn single_mode_also_fails_on_missing_port() {
    let output = reader()
        .arg("--single")
        .output()
        .expect("failed to run rs232-reader");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn version_flag_succeeds() {
    let output = reader()
        .arg("--version")
        .output()
        .expect("failed to run rs232-reader");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("rs232-reader"));
}
