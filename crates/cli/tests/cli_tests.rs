//! CLI integration tests

use serde_json::{json, Value};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run the `kse` binary with an isolated home directory
fn kse(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kse"))
        .args(args)
        .env("HOME", home)
        .env_remove("KSE_SNAPSHOT")
        .env_remove("KSE_API_URL")
        .output()
        .expect("Failed to execute command")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Temp dir holding a two-pod, one-job snapshot
fn snapshot_fixture() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let payload = json!({
        "data": {
            "podList": {
                "items": [
                    {
                        "metadata": {"name": "a", "namespace": "ns1"},
                        "spec": {
                            "nodeSelector": {"disk": "ssd"},
                            "containers": [{"name": "app", "resources": {"requests": {"cpu": "100m"}}}]
                        },
                        "status": {"phase": "Running"}
                    },
                    {
                        "metadata": {"name": "b", "namespace": "ns2"},
                        "spec": {"containers": [{"name": "app"}]},
                        "status": {"phase": "Pending"}
                    }
                ]
            },
            "jobList": {"items": [{"metadata": {"name": "j", "namespace": "ns1"}, "spec": {}}]}
        }
    });
    std::fs::write(&path, payload.to_string()).unwrap();
    let path = path.to_string_lossy().into_owned();
    (dir, path)
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let home = tempfile::tempdir().unwrap();
    let output = kse(home.path(), &["--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Explore Kubernetes cluster snapshots"));
    for command in ["counts", "sections", "list", "search", "report", "best-practices", "node-pods"] {
        assert!(stdout.contains(command), "Should show {} command", command);
    }
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let home = tempfile::tempdir().unwrap();
    let output = kse(home.path(), &["--version"]);

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("kse"), "Should show binary name");
}

#[test]
fn test_missing_source_fails() {
    let home = tempfile::tempdir().unwrap();
    let output = kse(home.path(), &["counts"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No snapshot source"));
}

#[test]
fn test_counts_json() {
    let (dir, snapshot) = snapshot_fixture();
    let output = kse(dir.path(), &["--snapshot", &snapshot, "--format", "json", "counts"]);

    assert!(output.status.success());
    let counts = stdout_json(&output);
    assert_eq!(counts["pods"], 2);
    assert_eq!(counts["jobs"], 1);
    assert_eq!(counts["services"], 0);
}

#[test]
fn test_list_with_namespace_filter() {
    let (dir, snapshot) = snapshot_fixture();
    let output = kse(
        dir.path(),
        &["--snapshot", &snapshot, "--format", "json", "list", "pods", "--namespace", "ns2"],
    );

    assert!(output.status.success());
    let items = stdout_json(&output);
    assert_eq!(items.as_array().unwrap().len(), 1);
    assert_eq!(items[0]["metadata"]["name"], "b");
}

#[test]
fn test_list_unknown_kind_fails() {
    let (dir, snapshot) = snapshot_fixture();
    let output = kse(dir.path(), &["--snapshot", &snapshot, "list", "widgets"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("widgets"));
}

#[test]
fn test_search_include_and_exclude() {
    let (dir, snapshot) = snapshot_fixture();
    let base = ["--snapshot", snapshot.as_str(), "--format", "json", "search", "-c", "nodeSelector", "-k", "pods"];

    let output = kse(dir.path(), &base);
    assert!(output.status.success());
    let result = stdout_json(&output);
    assert_eq!(result["matchCount"], 1);
    assert_eq!(result["totalResources"], 2);
    assert_eq!(result["matches"][0]["name"], "a");

    let mut exclude = base.to_vec();
    exclude.push("--exclude");
    let output = kse(dir.path(), &exclude);
    assert!(output.status.success());
    let result = stdout_json(&output);
    assert_eq!(result["matchCount"], 1);
    assert_eq!(result["matches"][0]["name"], "b");
}

#[test]
fn test_report_json_shape() {
    let (dir, snapshot) = snapshot_fixture();
    let output = kse(
        dir.path(),
        &[
            "--snapshot", &snapshot, "--format", "json", "report",
            "-c", "nodeSelector", "-c", "resources.requests", "-k", "pods", "-k", "jobs",
        ],
    );

    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output),
        json!({
            "pods": {"total_resources": 2, "nodeSelector": 1, "resources.requests": 1},
            "jobs": {"total_resources": 1, "nodeSelector": 0, "resources.requests": 0}
        })
    );
}

#[test]
fn test_report_table_shows_shares() {
    let (dir, snapshot) = snapshot_fixture();
    let output = kse(
        dir.path(),
        &["--snapshot", &snapshot, "report", "-c", "nodeSelector", "-k", "pods"],
    );

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("1 (50%)"));
}

#[test]
fn test_report_table_ignores_repeated_selections() {
    let (dir, snapshot) = snapshot_fixture();
    let output = kse(
        dir.path(),
        &[
            "--snapshot", &snapshot, "report",
            "-c", "nodeSelector", "-c", "nodeSelector", "-k", "pods", "-k", "pods",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("1 (50%)").count(), 1);
    assert_eq!(stdout.matches("Node Selector").count(), 1);
}

#[test]
fn test_best_practices_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("best-practices.json");
    std::fs::write(
        &path,
        json!({
            "overall_score": 72.5,
            "categories": {
                "security": {
                    "score": 50.0,
                    "checks": [
                        {"name": "Run as non-root", "passed": false, "recommendation": "Set runAsNonRoot"},
                        {"name": "Read-only root fs", "passed": true}
                    ]
                }
            }
        })
        .to_string(),
    )
    .unwrap();

    let output = kse(dir.path(), &["best-practices", path.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Needs Improvement"));
    assert!(stdout.contains("Run as non-root"));
    assert!(stdout.contains("Set runAsNonRoot"));
}

#[test]
fn test_node_pods_report_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("node-pods.json");
    std::fs::write(
        &path,
        json!({
            "node-1": [{"metadata": {"name": "p1", "namespace": "default"}, "spec": {}}],
            "node-2": []
        })
        .to_string(),
    )
    .unwrap();

    let output = kse(dir.path(), &["--format", "json", "node-pods", path.to_str().unwrap()]);

    assert!(output.status.success());
    let report = stdout_json(&output);
    assert_eq!(report["node-1"][0]["metadata"]["name"], "p1");
    assert_eq!(report["node-2"], json!([]));
}

#[test]
fn test_kinds_json_lists_catalog() {
    let home = tempfile::tempdir().unwrap();
    let output = kse(home.path(), &["--format", "json", "kinds"]);

    assert!(output.status.success());
    let kinds = stdout_json(&output);
    let ids: Vec<_> = kinds
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["id"].as_str().unwrap().to_string())
        .collect();
    assert!(ids.contains(&"pods".to_string()));
    assert!(ids.contains(&"poddisruptionbudgets".to_string()));
}
