//! Integration tests for the `sitewatch` CLI binary.
//!
//! Parsing, help output, completions and error exit codes run without a
//! backend. The end-to-end cases stand one up with wiremock.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const NO_CONFIG: &str = "/tmp/sitewatch-cli-test-nonexistent/config.toml";

/// Build a [`Command`] for the `sitewatch` binary with env isolation.
///
/// Clears all `SITEWATCH_*` env vars and points the config file at a
/// nonexistent path so tests never touch the user's real configuration.
fn sitewatch_cmd() -> assert_cmd::Command {
    sitewatch_cmd_with_config(Path::new(NO_CONFIG))
}

fn sitewatch_cmd_with_config(config: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sitewatch");
    cmd.env("HOME", "/tmp/sitewatch-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/sitewatch-cli-test-nonexistent")
        .env("SITEWATCH_CONFIG", config)
        .env("NO_COLOR", "1")
        .env_remove("SITEWATCH_PROFILE")
        .env_remove("SITEWATCH_BACKEND")
        .env_remove("SITEWATCH_OUTPUT")
        .env_remove("SITEWATCH_INSECURE")
        .env_remove("SITEWATCH_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A loopback URL whose port was just released, so connects are refused.
fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = sitewatch_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    sitewatch_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("reachability")
            .and(predicate::str::contains("sites"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    sitewatch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sitewatch"));
}

#[test]
fn test_sites_help_lists_subcommands() {
    sitewatch_cmd().args(["sites", "--help"]).assert().success().stdout(
        predicate::str::contains("add")
            .and(predicate::str::contains("interval"))
            .and(predicate::str::contains("check"))
            .and(predicate::str::contains("delete")),
    );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    sitewatch_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    sitewatch_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sitewatch"));
}

// ── Error exit codes ────────────────────────────────────────────────

#[test]
fn test_sites_list_without_config_fails() {
    let output = sitewatch_cmd().args(["sites", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("config"), "Expected config hint in:\n{text}");
}

#[test]
fn test_unknown_profile_is_usage_error() {
    let output = sitewatch_cmd()
        .args(["--profile", "nope", "sites", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("nope"));
}

#[test]
fn test_add_with_empty_name_is_validation_error() {
    let output = sitewatch_cmd()
        .args(["--backend", &closed_port_uri()])
        .args(["sites", "add", "   ", "https://example.com"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_add_with_ftp_site_url_is_validation_error() {
    let output = sitewatch_cmd()
        .args(["--backend", &closed_port_uri()])
        .args(["sites", "add", "files", "ftp://example.com"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_non_http_backend_is_validation_error() {
    let output = sitewatch_cmd()
        .args(["--backend", "ftp://example.com", "sites", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unreachable_backend_exits_with_connection_code() {
    let output = sitewatch_cmd()
        .args(["--backend", &closed_port_uri(), "sites", "list"])
        .output()
        .unwrap();
    assert_eq!(
        output.status.code(),
        Some(7),
        "{}",
        combined_output(&output)
    );
}

#[test]
fn test_delete_without_yes_refuses_when_not_interactive() {
    let output = sitewatch_cmd()
        .args(["--backend", &closed_port_uri(), "sites", "delete", "1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

#[test]
fn test_zero_interval_is_validation_error() {
    let output = sitewatch_cmd()
        .args(["--backend", &closed_port_uri(), "sites", "interval", "1", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_path_honors_env_override() {
    sitewatch_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(NO_CONFIG));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nested").join("config.toml");

    sitewatch_cmd_with_config(&config)
        .args(["--backend", "http://monitor.local:8000", "config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    let output = sitewatch_cmd_with_config(&config)
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["default_profile"], "default");
    assert_eq!(
        shown["profiles"]["default"]["backend"],
        "http://monitor.local:8000"
    );
}

#[test]
fn test_config_init_rejects_bad_backend() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let output = sitewatch_cmd_with_config(&config)
        .args(["--backend", "not a url", "config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(!config.exists());
}

#[test]
fn test_config_use_unknown_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    sitewatch_cmd_with_config(&config)
        .args(["--backend", "http://monitor.local:8000", "config", "init"])
        .assert()
        .success();

    let output = sitewatch_cmd_with_config(&config)
        .args(["config", "use", "staging"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("default"));
}

// ── End to end against a mock backend ───────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_sites_list_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/monitored_sites/fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "site_name": "A",
                "site_url": "http://a",
                "intervals": [{"id": 1, "time_interval": 30}],
                "statuses": [{"id": 1, "status": true}]
            },
            {
                "id": 2,
                "site_name": "B",
                "site_url": "http://b",
                "intervals": null,
                "statuses": null
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let output = tokio::task::spawn_blocking(move || {
        sitewatch_cmd()
            .args(["--backend", &uri, "sites", "list", "-o", "json"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let sites: Value = serde_json::from_slice(&output.stdout).unwrap();
    let sites = sites.as_array().unwrap();
    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0]["site_name"], "A");
    assert_eq!(sites[1]["intervals"], json!([]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sites_add_registers_and_records_status() {
    let server = MockServer::start().await;
    let site_url = format!("{}/health", server.uri());

    Mock::given(method("POST"))
        .and(path("/monitored_sites/create"))
        .and(body_json(json!({"site_url": site_url, "site_name": "Mock"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "site_name": "Mock", "site_url": site_url
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/site_check_intervals/create"))
        .and(body_json(json!({"site_url_id": 1, "time_interval": 30})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "site_url_id": 1, "time_interval": 30
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/site_status/create"))
        .and(body_json(json!({"site_url_id": 1, "status": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9, "site_url_id": 1, "status": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/monitored_sites/fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "site_name": "Mock",
            "site_url": site_url,
            "intervals": [{"id": 5, "time_interval": 30}],
            "statuses": [{"id": 9, "status": true}]
        }])))
        .mount(&server)
        .await;

    let uri = server.uri();
    let target = site_url.clone();
    let output = tokio::task::spawn_blocking(move || {
        sitewatch_cmd()
            .args(["--backend", &uri, "-o", "json"])
            .args(["sites", "add", "Mock", &target, "--interval", "30"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let reg: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reg["site"]["id"], 1);
    assert_eq!(reg["reachability"], "up");
    assert_eq!(reg["interval"]["time_interval"], 30);
    assert_eq!(reg["status"]["status"], true);
}
