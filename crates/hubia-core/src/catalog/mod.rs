//! Read-only access to the analytical database and its catalog.

use crate::errors::QueryError;
use crate::model::QueryResult;
use anyhow::Context;
use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

pub mod inspector;

pub use inspector::SchemaInspector;

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\w+$").expect("static regex"))
}

/// Word characters only. Anything else could smuggle SQL into an
/// interpolated identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    identifier_re().is_match(name)
}

pub fn ensure_identifier(name: &str) -> Result<(), QueryError> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(QueryError::InvalidIdentifier(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

/// Snapshot of table -> ordered columns, sorted by table name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<TableInfo>,
}

impl Schema {
    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    pub fn table(&self, name: &str) -> Option<&TableInfo> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Union of every table name and every column name.
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for t in &self.tables {
            out.insert(t.name.clone());
            for c in &t.columns {
                out.insert(c.name.clone());
            }
        }
        out
    }
}

/// Handle on the target database. Opened read-only; `query_only` is set as
/// a second guard.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    pub fn open_read_only(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open database {}", path.display()))?;
        conn.execute_batch("PRAGMA query_only = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name shown to the model, e.g. `fecomdb.db`.
    pub fn label(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Executes a single read-only statement. Driver errors come back as
    /// `QueryExecution` with the attempted SQL attached.
    pub fn run_query(&self, sql: &str) -> Result<QueryResult, QueryError> {
        let exec_err = |message: String| QueryError::QueryExecution {
            sql: sql.to_string(),
            message,
        };

        let conn = self.conn.lock().map_err(|e| exec_err(e.to_string()))?;
        let mut stmt = conn.prepare(sql).map_err(|e| exec_err(e.to_string()))?;
        if !stmt.readonly() {
            return Err(exec_err("statement would modify the database".into()));
        }

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();
        let mut rows = stmt.query([]).map_err(|e| exec_err(e.to_string()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| exec_err(e.to_string()))? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                let v = row.get_ref(i).map_err(|e| exec_err(e.to_string()))?;
                values.push(value_to_json(v));
            }
            out.push(values);
        }

        Ok(QueryResult { columns, rows: out })
    }

    pub(crate) fn table_names(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type='table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Caller must have validated `table` with `ensure_identifier`.
    pub(crate) fn table_columns(&self, table: &str) -> anyhow::Result<Vec<ColumnInfo>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
        let cols = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get(1)?,
                    data_type: row.get::<_, String>(2)?.to_uppercase(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cols)
    }
}

fn value_to_json(v: ValueRef<'_>) -> serde_json::Value {
    match v {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::json!(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_shape() {
        assert!(is_valid_identifier("ipca_7060_recife"));
        assert!(is_valid_identifier("variação"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("ipca\"; DROP TABLE x; --"));
        assert!(!is_valid_identifier("two words"));
        assert!(matches!(
            ensure_identifier("a-b"),
            Err(QueryError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn schema_identifiers_union() {
        let s = Schema {
            tables: vec![TableInfo {
                name: "ipca".into(),
                columns: vec![
                    ColumnInfo { name: "mes".into(), data_type: "TEXT".into() },
                    ColumnInfo { name: "valor".into(), data_type: "REAL".into() },
                ],
            }],
        };
        let ids: Vec<_> = s.identifiers().into_iter().collect();
        assert_eq!(ids, vec!["ipca", "mes", "valor"]);
    }
}
