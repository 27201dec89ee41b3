//! Tests for the armctl binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";

/// `armctl` running in an empty directory with no ambient configuration.
fn armctl(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("armctl").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("ARMCTL_CONFIG")
        .env_remove("AZURE_SUBSCRIPTION_ID")
        .env_remove("AZURE_ACCESS_TOKEN")
        .env_remove("ARMCTL_ENDPOINT")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn write_tasks(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("tasks.yml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    armctl(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list-modules"));
}

#[test]
fn test_list_modules() {
    let dir = TempDir::new().unwrap();
    armctl(&dir)
        .arg("list-modules")
        .assert()
        .success()
        .stdout(predicate::str::contains("azure_rm_manageddisk"))
        .stdout(predicate::str::contains("azure_rm_dnsrecordset_info"))
        .stdout(predicate::str::contains("azure_rm_expressroute"));
}

#[test]
fn test_list_modules_filter() {
    let dir = TempDir::new().unwrap();
    armctl(&dir)
        .args(["list-modules", "snapshot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("azure_rm_snapshot"))
        .stdout(predicate::str::contains("azure_rm_manageddisk").not());
}

#[test]
fn test_describe_lists_parameters() {
    let dir = TempDir::new().unwrap();
    armctl(&dir)
        .args(["describe", "azure_rm_manageddisk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("disk_size_gb"))
        .stdout(predicate::str::contains("Premium_LRS"))
        .stdout(predicate::str::contains("present"));
}

#[test]
fn test_unknown_module_is_parameter_error() {
    let dir = TempDir::new().unwrap();
    armctl(&dir)
        .args(["module", "azure_rm_nothing", "--simulate"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Unknown module"));
}

#[test]
fn test_module_creates_in_simulation() {
    let dir = TempDir::new().unwrap();
    armctl(&dir)
        .args([
            "--simulate",
            "--subscription",
            SUBSCRIPTION,
            "module",
            "azure_rm_manageddisk",
            "-a",
            "resource_group=rg1",
            "-a",
            "name=d1",
            "-a",
            "location=westeurope",
            "-a",
            "disk_size_gb=64",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created managed disk 'd1'"));
}

#[test]
fn test_module_check_mode_message() {
    let dir = TempDir::new().unwrap();
    armctl(&dir)
        .args([
            "--simulate",
            "--check",
            "--subscription",
            SUBSCRIPTION,
            "module",
            "azure_rm_manageddisk",
            "--args-json",
            r#"{"resource_group": "rg1", "name": "d1", "location": "westeurope"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would create managed disk 'd1'"));
}

#[test]
fn test_module_json_output() {
    let dir = TempDir::new().unwrap();
    let output = armctl(&dir)
        .args([
            "--simulate",
            "--output",
            "json",
            "--subscription",
            SUBSCRIPTION,
            "module",
            "azure_rm_manageddisk",
            "-a",
            "resource_group=rg1",
            "-a",
            "name=d1",
            "-a",
            "location=westeurope",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let event: serde_json::Value = stdout
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .find(|v: &serde_json::Value| v["type"] == "result")
        .expect("a result event");
    assert_eq!(event["result"]["changed"], true);
    assert_eq!(event["result"]["data"]["action"], "create");
}

#[test]
fn test_missing_subscription_exits_with_parameter_error() {
    let dir = TempDir::new().unwrap();
    armctl(&dir)
        .args([
            "--simulate",
            "module",
            "azure_rm_manageddisk",
            "-a",
            "resource_group=rg1",
            "-a",
            "name=d1",
            "-a",
            "location=westeurope",
        ])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("subscription_id"));
}

#[test]
fn test_missing_config_file_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    armctl(&dir)
        .args(["--config", "does-not-exist.toml", "list-modules"])
        .assert()
        .code(5);
}

#[test]
fn test_config_file_supplies_subscription() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("armctl.toml"),
        format!("[azure]\nsubscription_id = \"{}\"\n", SUBSCRIPTION),
    )
    .unwrap();

    armctl(&dir)
        .args([
            "--simulate",
            "module",
            "azure_rm_manageddisk_info",
            "-a",
            "resource_group=rg1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 0 managed disk(s)"));
}

#[test]
fn test_run_second_task_is_unchanged() {
    let dir = TempDir::new().unwrap();
    let tasks = write_tasks(
        &dir,
        r#"
- name: create record
  azure_rm_dnsrecordset:
    resource_group: rg1
    zone_name: example.com
    record_type: A
    relative_name: www
    ttl: 300
    a_records:
      - ipv4_address: 10.0.0.4
- name: create record again
  azure_rm_dnsrecordset:
    resource_group: rg1
    zone_name: example.com
    record_type: A
    relative_name: www
    ttl: 300
    a_records:
      - ipv4_address: 10.0.0.4
- name: list records
  azure_rm_dnsrecordset_info:
    resource_group: rg1
    zone_name: example.com
"#,
    );

    armctl(&dir)
        .args(["--simulate", "--subscription", SUBSCRIPTION, "run"])
        .arg(&tasks)
        .assert()
        .success()
        .stdout(predicate::str::contains("changed: [create record]"))
        .stdout(predicate::str::contains("ok: [create record again]"))
        .stdout(predicate::str::contains("Found 1 DNS record set(s)"))
        .stdout(predicate::str::contains("changed=1"));
}

#[test]
fn test_run_stops_at_failed_task() {
    let dir = TempDir::new().unwrap();
    let tasks = write_tasks(
        &dir,
        r#"
- name: bad sku
  azure_rm_manageddisk:
    resource_group: rg1
    name: d1
    location: westeurope
    sku: Gold_LRS
- name: never runs
  azure_rm_manageddisk:
    resource_group: rg1
    name: d2
    location: westeurope
"#,
    );

    armctl(&dir)
        .args(["--simulate", "--subscription", SUBSCRIPTION, "run"])
        .arg(&tasks)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("failed: [bad sku]"))
        .stdout(predicate::str::contains("never runs").not());
}

#[test]
fn test_run_ignore_errors_continues() {
    let dir = TempDir::new().unwrap();
    let tasks = write_tasks(
        &dir,
        r#"
- name: bad sku
  ignore_errors: true
  azure_rm_manageddisk:
    resource_group: rg1
    name: d1
    location: westeurope
    sku: Gold_LRS
- name: good disk
  azure_rm_manageddisk:
    resource_group: rg1
    name: d2
    location: westeurope
"#,
    );

    armctl(&dir)
        .args(["--simulate", "--subscription", SUBSCRIPTION, "run"])
        .arg(&tasks)
        .assert()
        .success()
        .stdout(predicate::str::contains("ignored: [bad sku]"))
        .stdout(predicate::str::contains("changed: [good disk]"));
}

#[test]
fn test_run_unknown_module_runs_nothing() {
    let dir = TempDir::new().unwrap();
    let tasks = write_tasks(
        &dir,
        r#"
- azure_rm_manageddisk:
    resource_group: rg1
    name: d1
    location: westeurope
- azure_rm_teleporter:
    name: t1
"#,
    );

    armctl(&dir)
        .args(["--simulate", "--subscription", SUBSCRIPTION, "run"])
        .arg(&tasks)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("azure_rm_teleporter"))
        .stdout(predicate::str::contains("Created").not());
}

#[test]
fn test_run_missing_task_file() {
    let dir = TempDir::new().unwrap();
    armctl(&dir)
        .args(["run", "nowhere.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Task file not found"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_transient_read_failure_prints_hint() {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": {"code": "ServerBusy", "message": "try later"}
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut cmd = armctl(&dir);
    cmd.env("ARMCTL_ENDPOINT", server.uri())
        .env("AZURE_ACCESS_TOKEN", "test-token")
        .args([
            "--subscription",
            SUBSCRIPTION,
            "module",
            "azure_rm_manageddisk",
            "-a",
            "resource_group=rg1",
            "-a",
            "name=d1",
            "-a",
            "location=westeurope",
        ]);

    let assert = tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap();
    assert
        .code(2)
        .stderr(predicate::str::contains("ServerBusy").or(predicate::str::contains("try later")))
        .stderr(predicate::str::contains("transient"));
}

