//! Several processes appending to one log file through the CLI binary.

use std::collections::HashSet;
use std::fs;
use std::process::{Command, Stdio};

use tempfile::TempDir;

#[test]
fn processes_sharing_a_file_never_interleave() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_dir = temp_dir.path().join("logs");
    let payload = "p".repeat(2048);

    let children: Vec<_> = (0..4)
        .map(|proc_id| {
            let messages: Vec<String> = (0..25)
                .map(|i| format!("proc{proc_id}-msg{i}-{payload}"))
                .collect();
            Command::new(env!("CARGO_BIN_EXE_logdumper"))
                .current_dir(temp_dir.path())
                .arg("--dir")
                .arg(&log_dir)
                .args(["--app", "shared", "info"])
                .args(&messages)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .expect("Failed to spawn logdumper")
        })
        .collect();

    for mut child in children {
        let status = child.wait().expect("Failed to wait for logdumper");
        assert!(status.success());
    }

    let content = fs::read_to_string(log_dir.join("shared.log")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 100);

    let mut seen = HashSet::new();
    for line in lines {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 4, "malformed line");
        assert_eq!(fields[1], "shared");
        assert_eq!(fields[2], "INFO");
        assert!(fields[3].ends_with(&payload));
        seen.insert(fields[3].to_string());
    }
    assert_eq!(seen.len(), 100);
}

#[test]
fn bad_name_exits_non_zero() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let status = Command::new(env!("CARGO_BIN_EXE_logdumper"))
        .current_dir(temp_dir.path())
        .arg("--dir")
        .arg(temp_dir.path())
        .args(["--app", "../evil", "error", "x"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("Failed to run logdumper");

    assert!(!status.success());
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}
