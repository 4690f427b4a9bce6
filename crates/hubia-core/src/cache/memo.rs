use moka::policy::EvictionPolicy;
use moka::sync::Cache;

pub const DEFAULT_MEMO_ENTRIES: u64 = 64;

/// Bounded in-process memo of generated SQL, least-recently-used eviction.
/// Lives as long as the generator that owns it.
#[derive(Clone)]
pub struct GenerationMemo {
    inner: Cache<String, String>,
    capacity: u64,
}

impl GenerationMemo {
    pub fn new(capacity: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: String, sql: String) {
        self.inner.insert(key, sql);
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Entry count after pending evictions have been applied.
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

impl Default for GenerationMemo {
    fn default() -> Self {
        Self::new(DEFAULT_MEMO_ENTRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_after_insert() {
        let memo = GenerationMemo::new(4);
        assert!(memo.get("k").is_none());
        memo.insert("k".into(), "SELECT 1".into());
        assert_eq!(memo.get("k").as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn never_grows_past_capacity() {
        let memo = GenerationMemo::new(8);
        for i in 0..100 {
            memo.insert(format!("k{i}"), format!("SELECT {i}"));
        }
        assert!(memo.len() <= 8);
    }
}
