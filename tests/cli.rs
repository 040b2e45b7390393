use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const TWO_TARGET_REPORT: &str = r#"[
  { "Target": "alpine:3.10 (alpine 3.10.9)", "Class": "os-pkgs", "Vulnerabilities": null },
  { "Target": "app/package-lock.json", "Class": "lang-pkgs", "Vulnerabilities": [{ "VulnerabilityID": "CVE-2021-23337", "Severity": "HIGH" }] }
]"#;

fn write_config(dir: &Path, uri: Option<&str>) -> PathBuf {
    let path = dir.join("config.yaml");
    let mut contents = String::from("name: ci\n");
    if let Some(uri) = uri {
        contents.push_str(&format!("endpoint_uri: {uri}\n"));
    }
    fs::write(&path, contents).expect("failed to write config");
    path
}

fn publisher(dir: &Path, config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("trivy-publisher"));
    cmd.arg("--config")
        .arg(config)
        .arg("--credentials")
        .arg(dir.join("credentials.yaml"))
        .env_remove("TRIVY_PUBLISHER_CONFIG")
        .env_remove("TRIVY_PUBLISHER_CREDENTIALS")
        .env_remove("TRIVY_PUBLISHER_FORMAT")
        .env_remove("WORKSPACE")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn status_uses_custom_config_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), Some("https://es.example.com:9243/scans"));

    let assert = publisher(temp.path(), &config_path)
        .arg("status")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains(&config_path.to_string_lossy().to_string()));
    assert!(stdout.contains("Name: ci"));
    assert!(stdout.contains("es.example.com:9243"));
    assert!(stdout.contains("scans"));

    Ok(())
}

#[test]
fn status_reports_missing_config() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = temp.path().join("absent.yaml");

    publisher(temp.path(), &config_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration not found"));

    Ok(())
}

#[test]
fn config_set_rejects_blank_name() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), None);

    publisher(temp.path(), &config_path)
        .args(["config", "set", "--name", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Name must not be empty"));

    let contents = fs::read_to_string(&config_path)?;
    assert!(contents.contains("name: ci"));

    Ok(())
}

#[test]
fn config_set_rejects_invalid_uri() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), None);

    publisher(temp.path(), &config_path)
        .args(["config", "set", "--name", "renamed", "--uri", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL"));

    // Rejected updates change nothing, including the valid name.
    let contents = fs::read_to_string(&config_path)?;
    assert!(contents.contains("name: ci"));
    assert!(!contents.contains("renamed"));

    Ok(())
}

#[test]
fn config_set_then_show_json() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = temp.path().join("config.yaml");

    publisher(temp.path(), &config_path)
        .args(["config", "set", "--name", "prod", "--uri", "http://localhost"])
        .assert()
        .success();

    let assert = publisher(temp.path(), &config_path)
        .args(["--format", "json", "config", "show"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout)?;
    let data = &value["data"];
    assert_eq!(data["name"], "prod");
    assert_eq!(data["scheme"], "http");
    assert_eq!(data["host"], "localhost");
    assert_eq!(data["port"], 80);
    assert_eq!(data["index"], "trivy-scanning-result");

    Ok(())
}

#[test]
fn config_set_blank_uri_clears_endpoint() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), Some("https://es.example.com/scans"));

    publisher(temp.path(), &config_path)
        .args(["config", "set", "--uri", ""])
        .assert()
        .success();

    let contents = fs::read_to_string(&config_path)?;
    assert!(contents.contains("name: ci"));
    assert!(!contents.contains("endpoint_uri"));

    Ok(())
}

#[test]
fn credential_list_never_prints_password() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), None);

    publisher(temp.path(), &config_path)
        .args([
            "credential",
            "add",
            "es-writer",
            "--username",
            "elastic",
            "--password",
            "hunter2-secret",
        ])
        .assert()
        .success();

    publisher(temp.path(), &config_path)
        .args(["credential", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("es-writer"))
        .stdout(predicate::str::contains("elastic"))
        .stdout(predicate::str::contains("hunter2-secret").not());

    publisher(temp.path(), &config_path)
        .args(["config", "set", "--credential", "es-writer"])
        .assert()
        .success();

    Ok(())
}

#[test]
fn config_set_rejects_unknown_credential() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), None);

    publisher(temp.path(), &config_path)
        .args(["config", "set", "--credential", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Cannot find currently selected credentials",
        ));

    Ok(())
}

#[test]
fn test_connection_fails_on_blank_fields() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), None);

    publisher(temp.path(), &config_path)
        .args(["config", "test-connection", "--uri", "http://localhost:9200"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("URI or Credential is blank"));

    publisher(temp.path(), &config_path)
        .args([
            "config",
            "test-connection",
            "--uri",
            "http://localhost:9200",
            "--credential",
            "any",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Connection is verified successfully"));

    Ok(())
}

#[test]
fn publish_empty_report_is_a_no_op() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), None);
    fs::write(temp.path().join("trivy.json"), "[]")?;

    publisher(temp.path(), &config_path)
        .arg("publish")
        .arg("trivy.json")
        .arg("--workspace")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Host:  port: 9200 scheme: "));

    Ok(())
}

#[test]
fn publish_empty_report_ignores_dangling_credential() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = temp.path().join("config.yaml");
    fs::write(
        &config_path,
        "name: ci\nendpoint_uri: http://127.0.0.1:1/trivy\ncredential_id: removed\n",
    )?;
    fs::write(temp.path().join("trivy.json"), "[]")?;

    publisher(temp.path(), &config_path)
        .arg("publish")
        .arg("trivy.json")
        .arg("--workspace")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Host: 127.0.0.1 port: 1 scheme: http",
        ));

    // With targets to index, the missing credential is reported.
    fs::write(temp.path().join("trivy.json"), TWO_TARGET_REPORT)?;
    publisher(temp.path(), &config_path)
        .arg("publish")
        .arg("trivy.json")
        .arg("--workspace")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Credential 'removed' not found"));

    Ok(())
}

#[test]
fn publish_fails_on_malformed_report() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), Some("http://127.0.0.1:1/trivy"));
    fs::write(temp.path().join("trivy.json"), r#"[{"Target": "a""#)?;

    publisher(temp.path(), &config_path)
        .arg("publish")
        .arg("trivy.json")
        .arg("--workspace")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));

    Ok(())
}

#[test]
fn publish_fails_on_missing_report() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), Some("http://127.0.0.1:1/trivy"));

    publisher(temp.path(), &config_path)
        .arg("publish")
        .arg("missing.json")
        .arg("--workspace")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot open report"))
        .stderr(predicate::str::contains("missing.json"));

    Ok(())
}

#[test]
fn publish_without_endpoint_fails_when_report_has_targets() -> Result<(), Box<dyn std::error::Error>>
{
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), None);
    fs::write(temp.path().join("trivy.json"), TWO_TARGET_REPORT)?;

    publisher(temp.path(), &config_path)
        .arg("publish")
        .arg("trivy.json")
        .arg("--workspace")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Endpoint not configured"));

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn publish_indexes_last_target() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let uri = format!("{}/trivy", server.url());

    let index = server
        .mock("POST", "/trivy/_doc")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "Target": "app/package-lock.json",
            "Class": "lang-pkgs",
            "Vulnerabilities": [{ "VulnerabilityID": "CVE-2021-23337", "Severity": "HIGH" }]
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "_index": "trivy",
                "_id": "Xw1a",
                "_version": 1,
                "result": "created",
                "_shards": { "total": 2, "successful": 1, "failed": 0 },
                "_seq_no": 0,
                "_primary_term": 1
            }"#,
        )
        .expect(1)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), Some(&uri));
    fs::write(temp.path().join("trivy.json"), TWO_TARGET_REPORT)?;

    let assert = publisher(temp.path(), &config_path)
        .arg("publish")
        .arg("trivy.json")
        .arg("--workspace")
        .arg(temp.path())
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("Host: 127.0.0.1"));
    assert!(stdout.contains("IndexResponse[index=trivy,id=Xw1a,version=1,result=created"));
    index.assert();

    Ok(())
}

#[cfg_attr(not(feature = "http-tests"), ignore)]
#[test]
fn publish_all_targets_indexes_each() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let uri = format!("{}/trivy", server.url());

    let index = server
        .mock("POST", "/trivy/_doc")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"_index":"trivy","_id":"doc","_version":1,"result":"created"}"#)
        .expect(2)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), Some(&uri));
    fs::write(temp.path().join("trivy.json"), TWO_TARGET_REPORT)?;

    let assert = publisher(temp.path(), &config_path)
        .args(["--format", "json", "publish", "trivy.json", "--all-targets"])
        .arg("--workspace")
        .arg(temp.path())
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout)?;
    assert_eq!(value["data"]["targets_read"], 2);
    assert_eq!(value["data"]["documents"].as_array().map(Vec::len), Some(2));
    index.assert();

    Ok(())
}
