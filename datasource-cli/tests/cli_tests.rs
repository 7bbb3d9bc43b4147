//! Integration tests for the datasource CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get the datasource binary
#[allow(deprecated)]
fn datasource_cmd() -> Command {
    Command::cargo_bin("datasource").unwrap()
}

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("datasource.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_help_command() {
    datasource_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Datasource CLI"))
        .stdout(predicate::str::contains("Usage: datasource <COMMAND>"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("drivers"));
}

#[test]
fn test_version_command() {
    datasource_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("mem, fs"))
        .stdout(predicate::str::contains("14 prefixes"));
}

#[test]
fn test_drivers_lists_table() {
    datasource_cmd()
        .arg("drivers")
        .assert()
        .success()
        .stdout(predicate::str::contains("jdbc:h2:"))
        .stdout(predicate::str::contains("org.postgresql.ds.PGSimpleDataSource"))
        .stdout(predicate::str::contains("net.sourceforge.jtds.jdbcx.JtdsDataSource"));
}

#[test]
fn test_drivers_json() {
    let output = datasource_cmd().args(["drivers", "--json"]).output().unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 14);
    assert_eq!(rows[0]["prefix"], "jdbc:h2:");
    assert_eq!(rows[0]["driver_class"], "org.h2.jdbcx.JdbcDataSource");
}

#[test]
fn test_resolve_mysql_table() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_config(
        &temp_dir,
        r#"
        [db]
        url = "jdbc:mysql://localhost/shop"
        user = "shop"
        password = "secret"
        cachePrepStmts = false

        [hikari]
        maximumPoolSize = 4
        "#,
    );

    datasource_cmd()
        .arg("resolve")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("mysql.shop"))
        .stdout(predicate::str::contains("com.mysql.jdbc.jdbc2.optional.MysqlDataSource"))
        .stdout(predicate::str::contains("dataSource.prepStmtCacheSize"))
        .stdout(predicate::str::contains("secret").not());
}

#[test]
fn test_resolve_json_with_overrides() {
    let temp_dir = TempDir::new().unwrap();

    let output = datasource_cmd()
        .current_dir(temp_dir.path())
        .args([
            "resolve",
            "--set",
            "db=jdbc:postgresql://server/warehouse",
            "--set",
            "hikari.maximumPoolSize=5",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "warehouse");
    assert_eq!(json["descriptor"]["pool_name"], "postgresql.warehouse");
    assert_eq!(json["properties"]["poolName"], "postgresql.warehouse");
    assert_eq!(json["properties"]["maximumPoolSize"], "5");
    assert_eq!(json["config"]["maximumPoolSize"], 5);
    assert_eq!(
        json["config"]["dataSourceClassName"],
        "org.postgresql.ds.PGSimpleDataSource"
    );
}

#[test]
fn test_resolve_connection_string() {
    let temp_dir = TempDir::new().unwrap();

    let output = datasource_cmd()
        .current_dir(temp_dir.path())
        .args(["resolve", "--name", "jdbc:derby:testdb", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["properties"].get("dataSource.url").is_none());
    assert_eq!(json["config"]["dataSourceProperties"]["url"], "jdbc:derby:testdb");
}

#[test]
fn test_resolve_unknown_vendor_fails() {
    let temp_dir = TempDir::new().unwrap();

    datasource_cmd()
        .current_dir(temp_dir.path())
        .args(["resolve", "--set", "db=jdbc:custom:testdb"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("databases.custom.dataSourceClassName"));
}

#[test]
fn test_resolve_malformed_pool_size_fails() {
    let temp_dir = TempDir::new().unwrap();

    datasource_cmd()
        .current_dir(temp_dir.path())
        .args([
            "resolve",
            "--set",
            "db=mem",
            "--set",
            "hikari.maximumPoolSize=lots",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("maximumPoolSize"));
}

#[test]
fn test_resolve_missing_config_file() {
    datasource_cmd()
        .args(["resolve", "--config", "/nonexistent/datasource.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_resolve_without_database_fails() {
    let temp_dir = TempDir::new().unwrap();

    datasource_cmd()
        .current_dir(temp_dir.path())
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No database configured"));
}
