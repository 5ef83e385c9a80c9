//! E2E tests for the budgetexec commands
//!
//! These run the built binary and check output, exit codes and the files
//! written by `export`.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn budgetexec_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_budgetexec"))
}

/// Run a command and return (exit_code, stdout, stderr)
fn run(args: &[&str]) -> (i32, String, String) {
    let output = Command::new(budgetexec_binary())
        .args(args)
        .env_remove("BUDGETEXEC_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute budgetexec");

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (exit_code, stdout, stderr)
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let mut all = vec!["--json"];
    all.extend_from_slice(args);
    let (code, stdout, stderr) = run(&all);
    assert_eq!(code, 0, "stderr: {stderr}");
    serde_json::from_str(&stdout).expect("stdout should be JSON")
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn login_accepts_any_credentials() {
    let (code, stdout, _) = run(&["login", "--email", "nobody@nowhere.ru", "--password", "x"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Иванов Иван"), "should sign in as the first user");
    assert!(stdout.contains("[ИИ]"));
    assert!(stdout.contains("Администрация"));
}

#[test]
fn login_requires_both_fields() {
    let (code, _, _) = run(&["login", "--email", "a@b.ru"]);
    assert_ne!(code, 0);
}

// =============================================================================
// Listing
// =============================================================================

#[test]
fn users_filtered_by_role() {
    let (code, stdout, _) = run(&["users", "--role", "grbs"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Петрова Мария"));
    assert!(stdout.contains("Сидоров Петр"));
    assert!(!stdout.contains("Иванов Иван"));
}

#[test]
fn users_unknown_role_fails() {
    let (code, _, stderr) = run(&["users", "--role", "owner"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown role"));
}

#[test]
fn indicators_json_for_q1() {
    let rows = run_json(&["indicators", "--period", "Q1 2024"]);
    let ids: Vec<u64> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["indicator"]["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 5]);
    assert_eq!(rows[0]["severity"], "watch");
    assert_eq!(rows[0]["execution"], "94.4");
}

#[test]
fn indicators_table_in_english() {
    let (code, stdout, _) = run(&["indicators", "--locale", "en", "--period", "Q2 2024"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("RUB 380,000,000"));
    assert!(stdout.contains("99.5%"));
    assert!(stdout.contains("On track"));
    assert!(!stdout.contains("Q1 2024"));
}

#[test]
fn facets_in_first_occurrence_order() {
    let facets = run_json(&["facets"]);
    assert_eq!(
        facets["periods"],
        serde_json::json!(["Q1 2024", "Q2 2024", "Q3 2024"])
    );
    assert_eq!(facets["roles"], serde_json::json!(["admin", "grbs"]));
}

#[test]
fn summary_of_sample() {
    let summary = run_json(&["summary"]);
    assert_eq!(summary["indicator_count"], 6);
    assert_eq!(summary["overall_execution"]["percent"], "97.2");
    assert_eq!(summary["grbs_count"], 2);
}

#[test]
fn settings_defaults() {
    let (code, stdout, _) = run(&["settings"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Министерство финансов"));
    assert!(stdout.contains("2024"));
}

// =============================================================================
// Export
// =============================================================================

#[test]
fn export_filtered_indicators() {
    let dir = tempdir().unwrap();
    let out = dir.path().to_str().unwrap();
    let (code, stdout, stderr) = run(&[
        "export",
        "indicators",
        "--period",
        "Q1 2024",
        "--out-dir",
        out,
        "--date",
        "01-02-2024",
    ]);
    assert_eq!(code, 0, "stderr: {stderr}");

    let expected = dir.path().join("Финансовые_показатели_01-02-2024.xlsx");
    assert!(expected.exists(), "workbook should be written");
    assert!(stdout.contains("Exported:"));
    assert_eq!(&fs::read(&expected).unwrap()[0..2], b"PK");
}

#[test]
fn export_dashboard_reports_sheets() {
    let dir = tempdir().unwrap();
    let result = run_json(&[
        "export",
        "dashboard",
        "--out-dir",
        dir.path().to_str().unwrap(),
        "--date",
        "15-06-2024",
    ]);
    assert_eq!(
        result["sheets"],
        serde_json::json!([["Динамика бюджета", 7], ["Распределение", 6]])
    );
    assert!(dir.path().join("Отчет_Dashboard_15-06-2024.xlsx").exists());
}

#[test]
fn export_failure_is_reported() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let (code, _, stderr) = run(&["export", "users", "--out-dir", blocker.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("failed to export"));
}

#[test]
fn export_rejects_bad_date() {
    let (code, _, stderr) = run(&["export", "users", "--date", "2024-06-15"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("DD-MM-YYYY"));
}

// =============================================================================
// Configuration and data
// =============================================================================

#[test]
fn config_file_sets_locale_and_output_dir() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("reports");
    let config = dir.path().join("budgetexec.toml");
    fs::write(
        &config,
        format!(
            "locale = \"en\"\noutput_dir = {:?}\n\n[settings]\norganization = \"City Treasury\"\n",
            out.to_str().unwrap()
        ),
    )
    .unwrap();

    let config_arg = config.to_str().unwrap();
    let (code, _, stderr) = run(&["--config", config_arg, "export", "users", "--date", "02-01-2025"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(out.join("Users_02-01-2025.xlsx").exists());

    let (_, stdout, _) = run(&["--config", config_arg, "settings"]);
    assert!(stdout.contains("City Treasury"));
}

#[test]
fn data_file_replaces_sample() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("store.json");
    fs::write(
        &data,
        r#"{
            "users": [
                {"id": 7, "name": "Орлова Анна", "email": "orlova@grbs.ru", "role": "viewer", "department": "Культура"}
            ],
            "indicators": [
                {"id": 1, "name": "Резерв", "planned": "0", "actual": "0", "period": "Q4 2024",
                 "responsible": "Орлова А.", "department": "Отдел казначейства"}
            ]
        }"#,
    )
    .unwrap();
    let data_arg = data.to_str().unwrap();

    let (code, stdout, _) = run(&["--data", data_arg, "login", "--email", "x@y.z", "--password", "p"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Орлова Анна"));

    let rows = run_json(&["--data", data_arg, "indicators"]);
    assert_eq!(rows[0]["execution"], serde_json::Value::Null);
    assert_eq!(rows[0]["severity"], serde_json::Value::Null);
}

#[test]
fn config_data_path_is_relative_to_config_file() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("store.json"),
        r#"{"users": [{"id": 1, "name": "Кузнецова Ольга", "email": "kuz@grbs.ru",
                       "role": "grbs", "department": "Спорт"}]}"#,
    )
    .unwrap();
    let config = dir.path().join("budgetexec.toml");
    fs::write(&config, "data = \"store.json\"\ntable_gap = 4\n").unwrap();

    let (code, stdout, stderr) = run(&["--config", config.to_str().unwrap(), "users", "--locale", "en"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("КО    Кузнецова Ольга"));
}

#[test]
fn plain_export_with_number_format() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("budgetexec.toml");
    fs::write(&config, "number_format = \"0.00\"\n").unwrap();

    let (code, _, stderr) = run(&[
        "--config",
        config.to_str().unwrap(),
        "export",
        "dashboard",
        "--plain",
        "--out-dir",
        dir.path().to_str().unwrap(),
        "--date",
        "01-07-2024",
    ]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(dir.path().join("Отчет_Dashboard_01-07-2024.xlsx").exists());
}

#[test]
fn invalid_data_file_fails() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("broken.json");
    fs::write(&data, "{ not json").unwrap();

    let (code, _, stderr) = run(&["--data", data.to_str().unwrap(), "users"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("failed to load record store"));
}
