use std::{
    collections::HashMap,
    sync::RwLock,
    time::{Duration, Instant},
};

use crate::executor::AggregationRow;

/// Injected store for backend results, keyed by the canonical request.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<AggregationRow>>;

    fn put(&self, key: &str, rows: Vec<AggregationRow>, ttl: Duration);
}

/// In-process cache. Expired entries are dropped on lookup and swept on every
/// insert, so keys that are never read again do not accumulate.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (Instant, Vec<AggregationRow>)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    pub fn purge_expired(&self) {
        if let Ok(mut entries) = self.entries.write() {
            sweep(&mut entries, Instant::now());
        }
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<AggregationRow>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().ok()?;
            match entries.get(key) {
                Some((expires_at, rows)) if *expires_at > now => return Some(rows.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // expired
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
        None
    }

    fn put(&self, key: &str, rows: Vec<AggregationRow>, ttl: Duration) {
        let Some(expires_at) = Instant::now().checked_add(ttl) else {
            return;
        };
        if let Ok(mut entries) = self.entries.write() {
            sweep(&mut entries, Instant::now());
            entries.insert(key.to_string(), (expires_at, rows));
        }
    }
}

fn sweep(entries: &mut HashMap<String, (Instant, Vec<AggregationRow>)>, now: Instant) {
    entries.retain(|_, (expires_at, _)| *expires_at > now);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_returns_rows() {
        let cache = MemoryCache::new();
        assert!(cache.get("k").is_none());
        cache.put("k", vec![AggregationRow::new("TX", 1.0, 1)], Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(vec![AggregationRow::new("TX", 1.0, 1)]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = MemoryCache::new();
        cache.put("k", vec![], Duration::ZERO);
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());

        cache.put("a", vec![], Duration::ZERO);
        cache.put("b", vec![], Duration::from_secs(60));
        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn inserts_sweep_expired_keys() {
        let cache = MemoryCache::new();
        for i in 0..1000 {
            cache.put(&format!("k{i}"), vec![], Duration::ZERO);
        }
        assert!(cache.len() <= 1);

        cache.put("live", vec![AggregationRow::new("TX", 1.0, 1)], Duration::from_secs(60));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("live").is_some());
    }
}
