use hubia_core::catalog::{Database, SchemaInspector};
use hubia_core::errors::QueryError;
use rusqlite::Connection;
use std::path::Path;
use tempfile::tempdir;

fn seed(path: &Path) -> anyhow::Result<()> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE pms_rn (setor TEXT, mes TEXT, volume REAL);
         CREATE TABLE ipca_7060_recife (mes TEXT, valor real, variacao_mensal REAL);
         CREATE TABLE \"bad name\" (x INTEGER);
         INSERT INTO ipca_7060_recife VALUES ('2024-01', 4.5, 0.3);",
    )?;
    Ok(())
}

#[test]
fn every_listed_table_can_be_described() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("hubia.db");
    seed(&path)?;

    let inspector = SchemaInspector::new(Database::open_read_only(&path)?);
    let tables = inspector.list_tables()?;
    assert_eq!(tables, vec!["ipca_7060_recife", "pms_rn"]);

    for t in &tables {
        assert!(!inspector.describe_table(t)?.is_empty());
    }

    let cols = inspector.describe_table("ipca_7060_recife")?;
    let pairs: Vec<_> = cols
        .iter()
        .map(|c| (c.name.as_str(), c.data_type.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("mes", "TEXT"), ("valor", "REAL"), ("variacao_mensal", "REAL")]
    );
    Ok(())
}

#[test]
fn injection_shaped_names_are_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("hubia.db");
    seed(&path)?;
    let inspector = SchemaInspector::new(Database::open_read_only(&path)?);

    match inspector.describe_table("pms_rn; DROP TABLE pms_rn") {
        Err(QueryError::InvalidIdentifier(name)) => assert!(name.contains("DROP")),
        other => panic!("expected InvalidIdentifier, got {:?}", other),
    }
    assert!(inspector.describe_table("desconhecida")?.is_empty());
    Ok(())
}

#[test]
fn snapshot_is_cached_until_invalidated() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("hubia.db");
    seed(&path)?;
    let inspector = SchemaInspector::new(Database::open_read_only(&path)?);
    assert_eq!(inspector.list_tables()?.len(), 2);

    Connection::open(&path)?.execute_batch("CREATE TABLE caged_pe (saldo INTEGER);")?;
    assert_eq!(inspector.list_tables()?.len(), 2);

    inspector.invalidate();
    assert_eq!(
        inspector.list_tables()?,
        vec!["caged_pe", "ipca_7060_recife", "pms_rn"]
    );
    Ok(())
}

#[test]
fn execution_is_read_only() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("hubia.db");
    seed(&path)?;
    let db = Database::open_read_only(&path)?;

    let result = db.run_query("SELECT mes, valor FROM ipca_7060_recife")?;
    assert_eq!(result.columns, vec!["mes", "valor"]);
    assert_eq!(result.rows.len(), 1);
    assert_eq!(result.rows[0][0], serde_json::json!("2024-01"));

    match db.run_query("DELETE FROM ipca_7060_recife") {
        Err(QueryError::QueryExecution { sql, .. }) => {
            assert_eq!(sql, "DELETE FROM ipca_7060_recife")
        }
        other => panic!("expected QueryExecution, got {:?}", other),
    }
    match db.run_query("SELECT nope FROM ipca_7060_recife") {
        Err(QueryError::QueryExecution { message, .. }) => assert!(message.contains("nope")),
        other => panic!("expected QueryExecution, got {:?}", other),
    }
    Ok(())
}
