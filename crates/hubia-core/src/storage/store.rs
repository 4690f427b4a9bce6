use anyhow::Context;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Durable SQLite file backing the history and response cache.
///
/// One connection per store behind a mutex: writers in this process are
/// serialized here, and WAL mode lets other processes keep reading a
/// consistent snapshot while a write is in flight.
#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

pub struct StoreStats {
    pub history_entries: Option<u64>,
    pub cached_answers: Option<u64>,
    pub last_entry_at: Option<String>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        // journal_mode returns a row, so it cannot go through execute().
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    /// Opens and initializes in one step.
    pub fn open_initialized(path: &Path) -> anyhow::Result<Self> {
        let store = Self::open(path)?;
        store.init_schema()?;
        Ok(store)
    }

    pub fn stats_best_effort(&self) -> anyhow::Result<StoreStats> {
        let conn = self.conn.lock().unwrap();

        let history_entries: Option<u64> = conn
            .query_row("SELECT COUNT(*) FROM memory", [], |r| {
                r.get::<_, i64>(0).map(|x| x as u64)
            })
            .ok();
        let cached_answers: Option<u64> = conn
            .query_row("SELECT COUNT(*) FROM response_cache", [], |r| {
                r.get::<_, i64>(0).map(|x| x as u64)
            })
            .ok();
        let last_entry_at: Option<String> = conn
            .query_row(
                "SELECT timestamp FROM memory ORDER BY id DESC LIMIT 1",
                [],
                |r| r.get(0),
            )
            .ok();

        Ok(StoreStats {
            history_entries,
            cached_answers,
            last_entry_at,
        })
    }
}
