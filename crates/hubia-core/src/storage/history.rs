use crate::model::{HistoryEntry, Role};
use crate::storage::Store;
use rusqlite::params;

/// Append-only log of conversation turns. There is no update or delete.
#[derive(Clone)]
pub struct HistoryStore {
    store: Store,
}

impl HistoryStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn append(&self, role: Role, content: &str) -> anyhow::Result<i64> {
        let conn = self.store.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO memory (role, content) VALUES (?1, ?2)",
            params![role.as_str(), content],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Last `limit` entries, oldest first.
    pub fn recent(&self, limit: u32) -> anyhow::Result<Vec<HistoryEntry>> {
        let conn = self.store.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, role, content, COALESCE(timestamp, '')
             FROM memory ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for r in rows {
            let (id, role, content, timestamp) = r?;
            // The CHECK constraint keeps anything else out of the table.
            let role = Role::parse(&role).map_err(|e| anyhow::anyhow!(e))?;
            out.push(HistoryEntry {
                id,
                role,
                content,
                timestamp,
            });
        }
        out.reverse();
        Ok(out)
    }

    /// Most recent assistant turn among the last `window` entries that is
    /// itself a SELECT/WITH statement.
    pub fn last_sql(&self, window: u32) -> anyhow::Result<Option<String>> {
        Ok(self.sql_candidates(window)?.into_iter().next())
    }

    /// Every SELECT/WITH assistant turn among the last `window` entries,
    /// newest first.
    pub fn sql_candidates(&self, window: u32) -> anyhow::Result<Vec<String>> {
        let entries = self.recent(window)?;
        Ok(entries
            .into_iter()
            .rev()
            .filter(|e| e.role == Role::Assistant && crate::validate::is_well_formed(&e.content))
            .map(|e| e.content)
            .collect())
    }
}
