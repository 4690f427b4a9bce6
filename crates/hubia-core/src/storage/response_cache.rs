use crate::storage::Store;
use rusqlite::params;

/// Exact-text question -> final answer. Latest write wins.
#[derive(Clone)]
pub struct ResponseCache {
    store: Store,
}

impl ResponseCache {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// No normalization: "ipca" and "IPCA" are different keys.
    pub fn lookup(&self, question: &str) -> anyhow::Result<Option<String>> {
        let conn = self.store.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT answer FROM response_cache WHERE question = ?1")?;
        let mut rows = stmt.query(params![question])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn store(&self, question: &str, answer: &str) -> anyhow::Result<()> {
        let conn = self.store.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO response_cache (question, answer, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(question) DO UPDATE SET
                answer=excluded.answer,
                updated_at=excluded.updated_at",
            params![question, answer, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn count(&self) -> anyhow::Result<u64> {
        let conn = self.store.conn.lock().unwrap();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM response_cache", [], |r| r.get(0))?;
        Ok(n as u64)
    }
}
