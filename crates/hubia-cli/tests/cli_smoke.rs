use assert_cmd::Command;
use predicates::prelude::*;
use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    Connection::open(dir.path().join("fecomdb.db"))
        .unwrap()
        .execute_batch(
            "CREATE TABLE ipca_7060_recife (mes TEXT, valor REAL);
             CREATE TABLE pms_rn (setor TEXT, volume REAL);",
        )
        .unwrap();
    dir
}

fn hubia(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hubia").unwrap();
    cmd.current_dir(dir)
        .env("HUBIA_DB", dir.join("fecomdb.db"))
        .env("MODEL_NAME", "llama3")
        .env("HUBIA_PROVIDER", "ollama")
        .env("HUBIA_HISTORY_DB", dir.join("history.db"))
        .env("CACHE_DB_PATH", dir.join("cache.db"))
        .env("HUBIA_LOG", "warn");
    cmd
}

#[test]
fn tables_lists_every_table() {
    let dir = workspace();
    hubia(dir.path())
        .arg("tables")
        .assert()
        .success()
        .stdout(predicate::str::contains("ipca_7060_recife"))
        .stdout(predicate::str::contains("pms_rn"));
}

#[test]
fn tables_as_json() {
    let dir = workspace();
    let out = hubia(dir.path())
        .args(["--format", "json", "tables"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let tables: Vec<String> = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(tables, vec!["ipca_7060_recife", "pms_rn"]);
}

#[test]
fn describe_prints_columns_and_rejects_bad_names() {
    let dir = workspace();
    hubia(dir.path())
        .args(["describe", "ipca_7060_recife"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- valor (REAL)"));

    hubia(dir.path())
        .args(["describe", "pms_rn;DROP"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid identifier"));
}

#[test]
fn catalog_question_needs_no_model() {
    let dir = workspace();
    hubia(dir.path())
        .args(["ask", "Quais tabelas existem?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Catálogo do banco de dados"))
        .stdout(predicate::str::contains("pms_rn"));
}

#[test]
fn interpretive_question_without_history_fails_with_code_1() {
    let dir = workspace();
    hubia(dir.path())
        .args(["--format", "json", "ask", "Por que esse valor subiu?"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("E_NO_PRIOR_CONTEXT"));
}

#[test]
fn history_starts_empty_and_records_questions() {
    let dir = workspace();
    hubia(dir.path()).args(["ask", "list tables"]).assert().success();
    hubia(dir.path())
        .args(["history", "--limit", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user: list tables"));
}

#[test]
fn missing_database_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("hubia")
        .unwrap()
        .current_dir(dir.path())
        .env("HUBIA_DB", dir.path().join("absent.db"))
        .env("MODEL_NAME", "llama3")
        .arg("tables")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("HUBIA_DB"));
}

#[test]
fn missing_model_name_is_a_config_error() {
    let dir = workspace();
    Command::cargo_bin("hubia")
        .unwrap()
        .current_dir(dir.path())
        .env("HUBIA_DB", dir.path().join("fecomdb.db"))
        .env_remove("MODEL_NAME")
        .arg("tables")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("MODEL_NAME"));
}
