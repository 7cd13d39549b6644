use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn tri_demo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tri-demo"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tri-demo")
}

fn write_policy(dir: &Path, yaml: &str) -> String {
    let path = dir.join("policy.yml");
    fs::write(&path, yaml).expect("failed to write policy");
    path.to_str().unwrap().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_sample_declaration() {
    let out = tri_demo(&["check"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("pod 0.1.1-alpha: declaration is valid (2 commands)"));
}

#[test]
fn check_fails_under_strict_policy() {
    let dir = tempfile::tempdir().unwrap();
    // "pod" and "ctl" are too short for this policy.
    let policy = write_policy(dir.path(), "min_name_len: 4\n");

    let out = tri_demo(&["--policy", &policy, "check"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.starts_with("error: invalid declaration:"), "stderr: {err}");
    assert!(err.contains("pod"), "stderr: {err}");
    assert!(stdout(&out).is_empty());
}

#[test]
fn check_fails_when_text_limit_is_lowered() {
    let dir = tempfile::tempdir().unwrap();
    let policy = write_policy(dir.path(), "max_text_len: 10\n");

    let out = tri_demo(&["check", "--policy", &policy]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Brief"), "stderr: {}", stderr(&out));
}

#[test]
fn missing_policy_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yml");

    let out = tri_demo(&["--policy", missing.to_str().unwrap(), "check"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("failed to load policy"));
}

#[test]
fn malformed_policy_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let policy = write_policy(dir.path(), "min_name_len: lots\n");

    let out = tri_demo(&["--policy", &policy, "check"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("YAML error"));
}

#[test]
fn unsatisfiable_policy_is_rejected_before_validation() {
    let dir = tempfile::tempdir().unwrap();
    let policy = write_policy(dir.path(), "min_name_len: 0\n");

    let out = tri_demo(&["--policy", &policy, "check"]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("invalid policy: min_name_len"), "stderr: {err}");
    assert!(!err.contains("invalid declaration"), "stderr: {err}");
}

// ---------------------------------------------------------------------------
// outline / defaults
// ---------------------------------------------------------------------------

#[test]
fn outline_json_describes_tree() {
    let out = tri_demo(&["outline", "--format", "json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["name"], "pod");
    assert_eq!(json["version"], "0.1.1-alpha");
    assert_eq!(json["default_command"], "ctl");
    assert_eq!(json["commands"][0]["name"], "ctl");
    assert_eq!(json["commands"][0]["is_default"], true);
    assert_eq!(json["commands"][0]["vars"][0]["targets"], 2);
    assert_eq!(json["commands"][1]["vars"][2]["value_type"], "integer");
}

#[test]
fn outline_yaml_is_produced() {
    let out = tri_demo(&["outline", "--format", "yaml"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("name: pod"));
    assert!(text.contains("default_command: ctl"));
}

#[test]
fn defaults_resolve_settings() {
    let out = tri_demo(&["defaults"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["datadir"], "~/.pod");
    assert_eq!(json["ctl_datadir"], "~/.pod");
    assert_eq!(json["timeout"], "30s");
    assert_eq!(json["rpcport"], 8334);
    assert_eq!(json["peers"][1], "127.0.0.1:8333");
    assert_eq!(json["threads"], 4);
    assert_eq!(json["debug"], false);
}

#[test]
fn defaults_are_not_applied_to_invalid_tree() {
    let dir = tempfile::tempdir().unwrap();
    let policy = write_policy(dir.path(), "max_version_component: 0\n");

    let out = tri_demo(&["defaults", "--policy", &policy]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("Version"), "stderr: {}", stderr(&out));
}

// ---------------------------------------------------------------------------
// policy / run
// ---------------------------------------------------------------------------

#[test]
fn policy_prints_effective_limits() {
    let dir = tempfile::tempdir().unwrap();
    let policy = write_policy(dir.path(), "max_snippet_len: 60\n");

    let out = tri_demo(&["policy", "--policy", &policy]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("min_name_len: 3"));
    assert!(text.contains("max_snippet_len: 60"));
}

#[test]
fn policy_written_to_file_can_be_loaded_again() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("written.yml");

    let out = tri_demo(&["policy", "--output", path.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(path.exists());

    let out = tri_demo(&["--policy", path.to_str().unwrap(), "check"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
}

#[test]
fn run_uses_default_command() {
    let out = tri_demo(&["run"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim(), "ctl: datadir=~/.pod rpcport=8334");
}

#[test]
fn run_named_command() {
    let out = tri_demo(&["run", "node"]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out).trim(),
        "node: peers=seed.example.org,127.0.0.1:8333 threads=4"
    );
}

#[test]
fn run_unknown_command_fails() {
    let out = tri_demo(&["run", "wallet"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("unknown command 'wallet'"));
}
