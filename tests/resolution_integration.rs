//! Integration tests for descriptor resolution and property layering.

mod common;

use common::test_host;
use datasource::{Config, Database, NamedPool, PoolProperties};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn prepare(config: &Config) -> NamedPool {
    Database::default().prepare(config, &test_host()).unwrap()
}

fn prepare_url(url: &str) -> NamedPool {
    prepare(&Config::new().with_value("db", url))
}

#[test]
fn test_vendor_urls() {
    let cases = [
        ("jdbc:derby:testdb", "org.apache.derby.jdbc.ClientDataSource", "derby.testdb"),
        ("jdbc:db2://127.0.0.1:50000/SAMPLE", "com.ibm.db2.jcc.DB2SimpleDataSource", "db2.SAMPLE"),
        ("jdbc:hsqldb:file", "org.hsqldb.jdbc.JDBCDataSource", "hsqldb.file"),
        ("jdbc:mariadb://localhost/db", "org.mariadb.jdbc.MySQLDataSource", "mariadb.db"),
        (
            "jdbc:sqlserver://localhost:1433;databaseName=AdventureWorks;integratedSecurity=true;",
            "com.microsoft.sqlserver.jdbc.SQLServerDataSource",
            "sqlserver.AdventureWorks",
        ),
        ("jdbc:oracle:thin:@myhost:1521:orcl", "oracle.jdbc.pool.OracleDataSource", "oracle.orcl"),
        ("jdbc:pgsql://server/database", "com.impossibl.postgres.jdbc.PGDataSource", "pgsql.database"),
        (
            "jdbc:postgresql://server/database",
            "org.postgresql.ds.PGSimpleDataSource",
            "postgresql.database",
        ),
        ("jdbc:jtds:sybase://server/database", "com.sybase.jdbcx.SybDataSource", "sybase.database"),
        ("jdbc:firebirdsql:host:mydb", "org.firebirdsql.pool.FBSimpleDataSource", "firebirdsql.mydb"),
        ("jdbc:sqlite:testdb", "org.sqlite.SQLiteDataSource", "sqlite.testdb"),
    ];

    for (url, class, pool_name) in cases {
        let pool = prepare_url(url);
        let props = pool.properties();
        assert_eq!(props.get("dataSourceClassName"), Some(class), "{}", url);
        assert_eq!(props.get("poolName"), Some(pool_name), "{}", url);
        assert_eq!(props.get("dataSource.url"), Some(url), "{}", url);
        assert!(!props.contains_key("dataSource.dataSourceClassName"), "{}", url);
        assert!(!props.contains_key("dataSource.user"), "{}", url);
    }
}

#[test]
fn test_mysql_table() {
    let config = Config::new()
        .with_value("db.url", "jdbc:mysql://localhost/db")
        .with_value("db.user", "foo")
        .with_value("db.password", "bar");

    let expected: PoolProperties = [
        ("dataSource.user", "foo"),
        ("dataSource.password", "bar"),
        ("dataSource.url", "jdbc:mysql://localhost/db"),
        ("dataSource.cachePrepStmts", "true"),
        ("dataSource.prepStmtCacheSize", "250"),
        ("dataSource.prepStmtCacheSqlLimit", "2048"),
        ("dataSource.useServerPrepStmts", "true"),
        ("dataSource.encoding", "UTF-8"),
        ("dataSourceClassName", "com.mysql.jdbc.jdbc2.optional.MysqlDataSource"),
        ("poolName", "mysql.db"),
    ]
    .into_iter()
    .collect();

    assert_eq!(prepare(&config).properties(), &expected);
}

#[test]
fn test_mysql_override_beats_default() {
    let config = Config::new()
        .with_value("db.url", "jdbc:mysql://localhost/db")
        .with_value("db.cachePrepStmts", false);

    let pool = prepare(&config);
    assert_eq!(pool.properties().get("dataSource.cachePrepStmts"), Some("false"));
    assert_eq!(pool.properties().get("dataSource.useServerPrepStmts"), Some("true"));
}

#[test]
fn test_mysql_encoding_follows_charset() {
    let config = Config::new()
        .with_value("db", "jdbc:mysql://localhost/db")
        .with_value("application.charset", "latin1");

    let pool = prepare(&config);
    assert_eq!(pool.properties().get("dataSource.encoding"), Some("latin1"));
}

#[test]
fn test_query_string_is_not_part_of_the_name() {
    let pool = prepare_url("jdbc:mysql://localhost/db?useEncoding=true&characterEncoding=UTF-8");
    assert_eq!(pool.properties().get("poolName"), Some("mysql.db"));
}

#[test]
fn test_unknown_vendor() {
    let err = Database::default()
        .prepare(&Config::new().with_value("db", "jdbc:custom:testdb"), &test_host())
        .unwrap_err();
    assert!(err.is_configuration());

    let config = Config::new()
        .with_value("db", "jdbc:custom:testdb")
        .with_value("databases.custom.dataSourceClassName", "custom.DS");
    let pool = prepare(&config);
    assert_eq!(pool.properties().get("dataSourceClassName"), Some("custom.DS"));
    assert_eq!(pool.properties().get("poolName"), Some("custom.testdb"));
}

#[test]
fn test_user_vendor_defaults() {
    let config = Config::new()
        .with_value("db", "jdbc:postgresql://server/database")
        .with_value("databases.postgresql.dataSource.sslmode", "require");

    let pool = prepare(&config);
    assert_eq!(pool.properties().get("dataSource.sslmode"), Some("require"));
}

#[test]
fn test_environment_substitution() {
    let host = datasource::Host::new()
        .with_env(datasource::config::MapEnvSource::new().set("DB_HOST", "db.internal"));
    let config = Config::new().with_value("db", "jdbc:postgresql://${DB_HOST}/orders");

    let pool = Database::default().prepare(&config, &host).unwrap();
    assert_eq!(pool.descriptor().url(), "jdbc:postgresql://db.internal/orders");
    assert_eq!(pool.properties().get("poolName"), Some("postgresql.orders"));

    let err = Database::default().prepare(&config, &test_host()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_preparing_twice_is_stable() {
    let config = Config::new()
        .with_value("db", "fs")
        .with_value("hikari.maximumPoolSize", 10i64);

    assert_eq!(prepare(&config), prepare(&config));
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("datasource.toml");
    std::fs::write(
        &path,
        r#"
        [application]
        name = "orders"
        tmpdir = "data"

        [db]
        audit = "fs"
        "#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    let pool = Database::new("db.audit")
        .unwrap()
        .prepare(&config, &test_host())
        .unwrap();
    assert_eq!(pool.descriptor().url(), "jdbc:h2:data/orders");
}
