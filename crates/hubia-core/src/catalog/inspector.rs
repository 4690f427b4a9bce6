use super::{ensure_identifier, is_valid_identifier, ColumnInfo, Database, Schema, TableInfo};
use crate::errors::QueryError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Cached view of the target database's tables and columns.
///
/// The snapshot is loaded on first use and kept until `invalidate` is
/// called; the schema is assumed static for the life of a session.
pub struct SchemaInspector {
    db: Database,
    snapshot: RwLock<Option<Arc<Schema>>>,
    generation: AtomicU64,
}

impl SchemaInspector {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            snapshot: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn schema(&self) -> Result<Arc<Schema>, QueryError> {
        if let Some(s) = self.snapshot.read().unwrap().as_ref() {
            return Ok(s.clone());
        }

        let loaded = Arc::new(self.load()?);
        let mut guard = self.snapshot.write().unwrap();
        // Another caller may have loaded it meanwhile; keep whichever landed first.
        let current = guard.get_or_insert_with(|| loaded.clone()).clone();
        Ok(current)
    }

    pub fn list_tables(&self) -> Result<Vec<String>, QueryError> {
        Ok(self.schema()?.table_names())
    }

    /// Ordered `(column, TYPE)` pairs. Unknown tables yield an empty list.
    pub fn describe_table(&self, name: &str) -> Result<Vec<ColumnInfo>, QueryError> {
        ensure_identifier(name)?;
        let schema = self.schema()?;
        Ok(schema
            .table(name)
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    /// Bumped by every `invalidate`.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Drops the snapshot; the next read goes back to the catalog.
    pub fn invalidate(&self) {
        *self.snapshot.write().unwrap() = None;
        self.generation.fetch_add(1, Ordering::SeqCst);
        tracing::info!(event = "schema_invalidated");
    }

    fn load(&self) -> Result<Schema, QueryError> {
        let mut tables = Vec::new();
        for name in self.db.table_names()? {
            if !is_valid_identifier(&name) {
                tracing::warn!(event = "schema_table_skipped", table = %name, reason = "non-word identifier");
                continue;
            }
            let columns = self
                .db
                .table_columns(&name)?
                .into_iter()
                .filter(|c| {
                    let ok = is_valid_identifier(&c.name);
                    if !ok {
                        tracing::warn!(event = "schema_column_skipped", table = %name, column = %c.name);
                    }
                    ok
                })
                .collect();
            tables.push(TableInfo { name, columns });
        }
        tracing::debug!(event = "schema_loaded", tables = tables.len());
        Ok(Schema { tables })
    }
}
