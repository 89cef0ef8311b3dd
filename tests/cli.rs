use assert_cmd::prelude::*;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use mockito::Matcher;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

const CLASSIFICATIONS: &str = r"^/ccgf-metadata-discovery/api/v1/classifications(\?.*)?$";

fn future_timestamp() -> String {
    (Utc::now() + chrono::Duration::hours(1)).to_rfc3339()
}

/// Config with credentials and a cached, unexpired session
fn write_config(dir: &Path, cdgc_url: &str) -> PathBuf {
    let path = dir.join("config.yaml");
    let contents = format!(
        "username: jdoe\npassword: secret\ncdgc_api_url: {cdgc_url}\nsession:\n  token: dummy\n  expires_at: {}\n  org_id: org-1\n  org_name: Acme\n  user_id: user-1\n  username: jdoe\npreferences:\n  page_size: 50\n",
        future_timestamp()
    );
    fs::write(&path, contents).expect("failed to write config");
    path
}

/// `mccop` with a clean environment, run from `dir` so no stray `.env` is read
fn mccop(dir: &Path, config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mccop"));
    cmd.current_dir(dir)
        .arg("--config")
        .arg(config)
        .env_remove("MCCOP_CONFIG")
        .env_remove("MCCOP_FORMAT")
        .env_remove("INFORMATICA_USERNAME")
        .env_remove("INFORMATICA_PASSWORD")
        .env_remove("INFORMATICA_LOGIN_URL")
        .env_remove("INFORMATICA_POD_API_URL")
        .env_remove("INFORMATICA_CDGC_API_URL");
    cmd
}

#[test]
fn status_uses_custom_config_path() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "http://localhost:1");

    let assert = mccop(temp.path(), &config_path)
        .arg("status")
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("Username: jdoe"));
    assert!(stdout.contains("Organization: Acme (org-1)"));
    assert!(stdout.contains(&config_path.to_string_lossy().to_string()));

    Ok(())
}

#[test]
fn status_reports_unreadable_config() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = temp.path().join("config.yaml");
    fs::write(&config_path, "username: [unclosed\n")?;

    mccop(temp.path(), &config_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Could not read configuration"))
        .stdout(predicate::str::contains("Configuration not found").not());

    Ok(())
}

#[test]
fn version_prints_package_version() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = temp.path().join("config.yaml");

    mccop(temp.path(), &config_path)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));

    Ok(())
}

#[test]
fn missing_credentials_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = temp.path().join("absent.yaml");

    mccop(temp.path(), &config_path)
        .args(["classification", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("INFORMATICA_USERNAME"));

    Ok(())
}

#[test]
fn scanner_run_requires_a_capability() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let config_path = write_config(temp.path(), "http://localhost:1");

    mccop(temp.path(), &config_path)
        .args(["scanner", "run", "--name", "Snowflake"])
        .assert()
        .failure()
        .code(2);

    Ok(())
}

#[test]
fn scanner_unknown_source_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let search = server
        .mock("POST", Matcher::Regex(r"^/data360/search/v1/assets".to_string()))
        .match_header("authorization", "Bearer dummy")
        .match_header("x-infa-org-id", "org-1")
        .with_status(200)
        .with_body(r#"{ "summary": { "total_hits": 0 }, "hits": [] }"#)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());

    mccop(temp.path(), &config_path)
        .args(["scanner", "run", "--name", "Snowflake", "--metadata-extraction"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Catalog source not found: Snowflake"));

    search.assert();
    Ok(())
}

#[test]
fn scanner_no_wait_prints_job_json() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _search = server
        .mock("POST", Matcher::Regex(r"^/data360/search/v1/assets".to_string()))
        .with_status(200)
        .with_body(
            r#"{
                "summary": { "total_hits": "1" },
                "hits": [{
                    "summary": { "core.name": "Snowflake" },
                    "systemAttributes": { "core.origin": "src-42" }
                }]
            }"#,
        )
        .create();
    let run = server
        .mock("POST", "/data360/catalog/v1/catalogsources/src-42/jobs")
        .match_body(Matcher::Json(serde_json::json!({
            "capabilities": ["Metadata Extraction", "Data Profiling"]
        })))
        .with_status(200)
        .with_body(r#"{ "jobId": "job-7", "jobUri": "/jobs/job-7" }"#)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());

    mccop(temp.path(), &config_path)
        .args([
            "scanner",
            "run",
            "--name",
            "snowflake",
            "--metadata-extraction",
            "--data-profiling",
            "--no-wait",
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"jobId\": \"job-7\""));

    run.assert();
    Ok(())
}

#[test]
fn import_creates_each_record() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _list = server
        .mock("GET", Matcher::Regex(CLASSIFICATIONS.to_string()))
        .with_status(200)
        .with_body(r#"{ "classifications": [], "total": 0 }"#)
        .create();
    let create = server
        .mock("POST", "/ccgf-metadata-discovery/api/v1/classifications")
        .with_status(201)
        .with_body(r#"{ "id": "new" }"#)
        .expect(2)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());
    let file = temp.path().join("batch.json");
    fs::write(&file, r#"[{ "name": "PII" }, { "name": "Restricted" }]"#)?;

    mccop(temp.path(), &config_path)
        .args(["classification", "import", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created: 2"));

    create.assert();
    Ok(())
}

#[test]
fn import_reports_malformed_record_and_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _list = server
        .mock("GET", Matcher::Regex(CLASSIFICATIONS.to_string()))
        .with_status(200)
        .with_body(r#"{ "classifications": [], "total": 0 }"#)
        .create();
    let create = server
        .mock("POST", "/ccgf-metadata-discovery/api/v1/classifications")
        .with_status(201)
        .expect(1)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());
    let file = temp.path().join("batch.json");
    fs::write(&file, r#"[{ "name": "PII" }, { "description": "no name" }]"#)?;

    mccop(temp.path(), &config_path)
        .args(["classification", "import", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("record 2"))
        .stderr(predicate::str::contains("1 of 2"));

    create.assert();
    Ok(())
}

#[test]
fn export_all_writes_single_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _list = server
        .mock("GET", Matcher::Regex(CLASSIFICATIONS.to_string()))
        .with_status(200)
        .with_body(
            r#"{ "classifications": [
                { "id": "cls-1", "name": "PII" },
                { "id": "cls-2", "name": "Restricted" }
            ], "total": 2 }"#,
        )
        .create();
    let _first = server
        .mock("GET", "/ccgf-metadata-discovery/api/v1/classifications/cls-1")
        .with_status(200)
        .with_body(r#"{ "id": "cls-1", "name": "PII", "rules": ["ssn"] }"#)
        .create();
    let _second = server
        .mock("GET", "/ccgf-metadata-discovery/api/v1/classifications/cls-2")
        .with_status(200)
        .with_body(r#"{ "id": "cls-2", "name": "Restricted" }"#)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());
    let out_dir = temp.path().join("out");

    mccop(temp.path(), &config_path)
        .args(["classification", "export", "--all", "--output", "all.json", "--output-dir"])
        .arg(&out_dir)
        .assert()
        .success();

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("all.json"))?)?;
    let records = exported.as_array().expect("array of classifications");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "PII");
    assert_eq!(records[0]["export_org"], "Acme");
    assert_eq!(records[1]["export_user"], "user-1");

    Ok(())
}

#[test]
fn import_directory_stop_mode_aborts_at_unreadable_file() -> Result<(), Box<dyn std::error::Error>>
{
    let mut server = mockito::Server::new();
    let _list = server
        .mock("GET", Matcher::Regex(CLASSIFICATIONS.to_string()))
        .with_status(200)
        .with_body(r#"{ "classifications": [], "total": 0 }"#)
        .create();
    let create = server
        .mock("POST", "/ccgf-metadata-discovery/api/v1/classifications")
        .with_status(201)
        .with_body(r#"{ "id": "new" }"#)
        .expect(1)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());
    let data = temp.path().join("data");
    fs::create_dir(&data)?;
    fs::write(data.join("a.json"), r#"{ "name": "PII" }"#)?;
    fs::write(data.join("b.json"), "{ broken")?;
    fs::write(data.join("c.json"), r#"{ "name": "Restricted" }"#)?;

    mccop(temp.path(), &config_path)
        .args(["classification", "import", "--on-error", "stop", "--directory"])
        .arg(&data)
        .assert()
        .failure()
        .stderr(predicate::str::contains("b.json"));

    create.assert();
    Ok(())
}

#[test]
fn export_all_writes_one_file_per_record() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _list = server
        .mock("GET", Matcher::Regex(CLASSIFICATIONS.to_string()))
        .with_status(200)
        .with_body(
            r#"{ "classifications": [
                { "id": "cls-1", "name": "PII/Data" },
                { "id": "cls-2", "name": "PII Data" }
            ], "total": 2 }"#,
        )
        .create();
    let _first = server
        .mock("GET", "/ccgf-metadata-discovery/api/v1/classifications/cls-1")
        .with_status(200)
        .with_body(r#"{ "id": "cls-1", "name": "PII/Data" }"#)
        .create();
    let _second = server
        .mock("GET", "/ccgf-metadata-discovery/api/v1/classifications/cls-2")
        .with_status(200)
        .with_body(r#"{ "id": "cls-2", "name": "PII Data" }"#)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());
    let out_dir = temp.path().join("out");

    mccop(temp.path(), &config_path)
        .args(["classification", "export", "--all", "--output-dir"])
        .arg(&out_dir)
        .assert()
        .success();

    let mut names = Vec::new();
    for entry in fs::read_dir(&out_dir)? {
        let record: serde_json::Value = serde_json::from_str(&fs::read_to_string(entry?.path())?)?;
        names.push(record["name"].as_str().unwrap_or_default().to_string());
    }
    names.sort();
    assert_eq!(names, vec!["PII Data", "PII/Data"]);

    Ok(())
}

#[test]
fn export_unknown_name_fails() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let _list = server
        .mock("GET", Matcher::Regex(CLASSIFICATIONS.to_string()))
        .with_status(200)
        .with_body(r#"{ "classifications": [{ "id": "cls-1", "name": "PII" }], "total": 1 }"#)
        .create();

    let temp = tempdir()?;
    let config_path = write_config(temp.path(), &server.url());

    mccop(temp.path(), &config_path)
        .args(["classification", "export", "--name", "Secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Classification not found: Secret"));

    Ok(())
}

#[test]
fn login_flow_caches_session() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = mockito::Server::new();
    let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
    let jwt = format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#),
        URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#))
    );

    let login = server
        .mock("POST", "/saas/public/core/v3/login")
        .match_body(Matcher::PartialJson(serde_json::json!({ "username": "jdoe" })))
        .with_status(200)
        .with_body(
            r#"{
                "products": [{ "name": "Integration Cloud", "baseApiUrl": "https://example" }],
                "userInfo": {
                    "sessionId": "sess-1",
                    "id": "user-9",
                    "name": "jdoe",
                    "orgId": "org-9",
                    "orgName": "Fresh Org"
                }
            }"#,
        )
        .create();
    let token = server
        .mock("GET", Matcher::Regex(r"^/identity-service/api/v1/jwt/Token".to_string()))
        .match_header("ids-session-id", "sess-1")
        .with_status(200)
        .with_body(format!(r#"{{ "jwt_token": "{jwt}" }}"#))
        .create();
    let list = server
        .mock("GET", Matcher::Regex(CLASSIFICATIONS.to_string()))
        .match_header("x-infa-org-id", "org-9")
        .with_status(200)
        .with_body(r#"{ "classifications": [{ "id": "cls-1", "name": "PII" }], "total": 1 }"#)
        .create();

    let temp = tempdir()?;
    let config_path = temp.path().join("config.yaml");
    fs::write(&config_path, "username: jdoe\npassword: secret\n")?;

    mccop(temp.path(), &config_path)
        .args(["--format", "json", "classification", "list"])
        .env("INFORMATICA_LOGIN_URL", server.url())
        .env("INFORMATICA_POD_API_URL", server.url())
        .env("INFORMATICA_CDGC_API_URL", server.url())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"PII\""));

    login.assert();
    token.assert();
    list.assert();

    let saved = fs::read_to_string(&config_path)?;
    assert!(saved.contains("org_id: org-9"));
    assert!(saved.contains(&jwt));

    Ok(())
}
