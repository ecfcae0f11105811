//! CLI integration tests
//!
//! Drive the `buildscope` binary against throwaway git repositories and check
//! the emitted `key=value` lines and exit codes.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn buildscope_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_buildscope"))
}

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn git(repo: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=buildscope",
            "-c",
            "user.email=buildscope@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(repo)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write(repo: &Path, rel: &str, content: &str) {
    let path = repo.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Two commits: the second edits `web`, drops its worker sidecar and removes
/// the `old` app entirely.
fn create_monorepo(dir: &TempDir) -> PathBuf {
    let repo = dir.path().to_path_buf();
    git(&repo, &["init", "-q"]);

    write(&repo, "README.md", "# monorepo\n");
    write(&repo, "apps/web/app.yaml", "name: web\n");
    write(&repo, "apps/web/Dockerfile", "FROM alpine\n");
    write(&repo, "apps/web/Dockerfile.worker", "FROM alpine\n");
    write(&repo, "apps/api/app.yaml", "name: api\n");
    write(&repo, "apps/api/Dockerfile", "FROM alpine\n");
    write(&repo, "apps/old/app.yaml", "name: old\n");
    write(&repo, "apps/old/Dockerfile", "FROM alpine\n");
    git(&repo, &["add", "-A"]);
    git(&repo, &["commit", "-q", "-m", "initial"]);

    write(&repo, "apps/web/app.yaml", "name: web\nreplicas: 2\n");
    fs::remove_file(repo.join("apps/web/Dockerfile.worker")).unwrap();
    fs::remove_dir_all(repo.join("apps/old")).unwrap();
    git(&repo, &["add", "-A"]);
    git(&repo, &["commit", "-q", "-m", "update"]);

    repo
}

fn run_analyze(repo: &Path, extra: &[&str]) -> Output {
    Command::new(buildscope_bin())
        .arg("analyze")
        .arg("--root-path")
        .arg(repo)
        .args(extra)
        .env_remove("GITHUB_OUTPUT")
        .env_remove("GITHUB_WORKSPACE")
        .env_remove("GITHUB_BASE_REF")
        .env_remove("BUILDSCOPE_REQUIRE_APP_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute buildscope")
}

fn parse_outputs(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn json_value(outputs: &HashMap<String, String>, key: &str) -> Value {
    serde_json::from_str(&outputs[key]).unwrap()
}

#[test]
fn test_cli_help() {
    let output = Command::new(buildscope_bin())
        .arg("--help")
        .output()
        .expect("Failed to execute buildscope");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("release-notes"));
}

#[test]
fn test_push_reports_changes_and_deletions() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let repo = create_monorepo(&temp);

    let output = run_analyze(
        &repo,
        &["--event", "push", "--include-pattern", "apps/*", "-q"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let outputs = parse_outputs(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(outputs["ref"], "HEAD~1");
    assert_eq!(outputs["has_changes"], "true");
    assert_eq!(outputs["has_deletions"], "true");

    let matrix = json_value(&outputs, "matrix");
    let include = matrix["include"].as_array().unwrap();
    assert_eq!(include.len(), 1);
    assert_eq!(include[0]["app_name"], json!("web"));
    assert_eq!(include[0]["app_config"], json!("apps/web/app.yaml"));
    assert_eq!(include[0]["changed_files"], json!(["apps/web/app.yaml"]));
    assert_eq!(
        include[0]["dockerfiles"],
        json!([{"path": "apps/web/Dockerfile", "name": "Dockerfile", "suffix": ""}])
    );

    let all_apps = json_value(&outputs, "all_apps");
    let names: Vec<&str> = all_apps["include"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["app_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["api", "web"]);

    assert_eq!(
        json_value(&outputs, "deleted_apps"),
        json!([{"path": "apps/old", "app_name": "old", "deleted_config": "folder_deleted"}])
    );
    assert_eq!(
        json_value(&outputs, "deleted_containers"),
        json!([
            {
                "app_name": "old",
                "container_name": "old",
                "dockerfile": "apps/old/Dockerfile",
                "image_name": "old"
            },
            {
                "app_name": "web",
                "container_name": "web-worker",
                "dockerfile": "apps/web/Dockerfile.worker",
                "image_name": "web-worker"
            }
        ])
    );
}

#[test]
fn test_outputs_are_appended_to_github_output_file() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    let repo = create_monorepo(&temp);
    let out_dir = TempDir::new().unwrap();
    let out_file = out_dir.path().join("github_output");
    fs::write(&out_file, "earlier=1\n").unwrap();

    let output = Command::new(buildscope_bin())
        .args(["analyze", "--event", "push", "-q", "--root-path"])
        .arg(&repo)
        .env("GITHUB_OUTPUT", &out_file)
        .env_remove("GITHUB_WORKSPACE")
        .env_remove("BUILDSCOPE_REQUIRE_APP_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute buildscope");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).trim().is_empty());

    let content = fs::read_to_string(&out_file).unwrap();
    assert!(content.starts_with("earlier=1\nmatrix="));
    let outputs = parse_outputs(&content);
    assert_eq!(outputs["has_changes"], "true");
}

#[test]
fn test_manual_dispatch_outside_git() {
    let temp = TempDir::new().unwrap();
    let repo = temp.path();
    write(repo, "apps/web/app.yaml", "name: web\n");
    write(repo, "apps/web/Dockerfile", "FROM alpine\n");
    write(repo, "apps/docs/README.md", "docs\n");

    let output = run_analyze(
        repo,
        &[
            "--event",
            "workflow_dispatch",
            "--include-pattern",
            "apps/*",
            "-q",
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let outputs = parse_outputs(&String::from_utf8_lossy(&output.stdout));
    assert_eq!(outputs["ref"], "");
    assert_eq!(outputs["matrix"], r#"{"include":[]}"#);
    assert_eq!(outputs["deleted_apps"], "[]");
    assert_eq!(outputs["deleted_containers"], "[]");
    assert_eq!(outputs["has_changes"], "false");
    assert_eq!(outputs["has_deletions"], "false");

    let all_apps = json_value(&outputs, "all_apps");
    assert_eq!(all_apps["include"].as_array().unwrap().len(), 1);
    assert_eq!(all_apps["include"][0]["path"], json!("apps/web"));
}

#[test]
fn test_push_outside_git_fails() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let temp = TempDir::new().unwrap();
    write(temp.path(), "apps/web/Dockerfile", "FROM alpine\n");

    let output = run_analyze(temp.path(), &["--event", "push", "-q"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).trim().is_empty());
    assert!(!String::from_utf8_lossy(&output.stderr).is_empty());
}

#[test]
fn test_invalid_include_pattern_fails() {
    let temp = TempDir::new().unwrap();

    let output = run_analyze(
        temp.path(),
        &["--event", "workflow_dispatch", "--include-pattern", "apps/[x"],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("apps/[x"));
}

#[test]
fn test_json_format() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "apps/web/app.yaml", "name: web\n");
    write(temp.path(), "apps/web/Dockerfile", "FROM alpine\n");

    let output = run_analyze(
        temp.path(),
        &["--event", "workflow_dispatch", "--format", "json", "-q"],
    );
    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["ref"], json!(""));
    assert_eq!(value["has_changes"], json!(false));
    assert_eq!(value["matrix"], json!({"include": []}));
}
