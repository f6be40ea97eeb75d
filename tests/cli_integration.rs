//! Integration tests for the command-line interface: exit codes, output-file
//! policy, and dry-run behavior.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// A workspace holding one compact dts document.
fn setup_model(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let model = dir.path().join("model.dts");
    fs::write(&model, content).unwrap();
    (dir, model)
}

fn run_cli(args: &[&str]) -> Output {
    Command::new("cargo")
        .args(["run", "--quiet", "--"])
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn apply_writes_default_output_on_success() {
    let (_dir, model) = setup_model("/{k=\"old\";};");

    let output = run_cli(&["apply", model.to_str().unwrap(), "--set", "/k=\"new\""]);

    assert!(output.status.success());
    let out_path = model.with_extension("dts.out");
    let written = fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("k = \"new\";"));
    assert!(!written.contains("old"));
}

#[test]
fn fully_failing_batch_exits_nonzero_and_writes_nothing() {
    let (_dir, model) = setup_model("/{k=\"old\";};");

    let output = run_cli(&["apply", model.to_str().unwrap(), "--set", "/missing=<9>"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("path not found"));
    assert!(!model.with_extension("dts.out").exists());
}

#[test]
fn partially_failing_batch_exits_nonzero_but_writes_applied_patches() {
    let (_dir, model) = setup_model("/{k=\"old\";};");

    let output = run_cli(&[
        "apply",
        model.to_str().unwrap(),
        "--set",
        "/k=\"new\"",
        "--set",
        "/missing=<9>",
    ]);

    assert!(!output.status.success());
    let out_path = model.with_extension("dts.out");
    let written = fs::read_to_string(&out_path).unwrap();
    assert!(written.contains("k = \"new\";"));
}

#[test]
fn dry_run_writes_no_output_file() {
    let (_dir, model) = setup_model("/{k=\"old\";};");

    let output = run_cli(&[
        "apply",
        model.to_str().unwrap(),
        "--set",
        "/k=\"new\"",
        "--dry-run",
    ]);

    assert!(output.status.success());
    assert!(!model.with_extension("dts.out").exists());
}

#[test]
fn paths_lists_indexed_paths() {
    let (_dir, model) = setup_model("/{a{k=<1>;};};");

    let output = run_cli(&["paths", model.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("/a/k"));
}
