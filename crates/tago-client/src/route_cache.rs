use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Terminal names for a bus route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub start_node_nm: Option<String>,
    pub end_node_nm: Option<String>,
    pub route_no: Option<String>,
}

struct CacheEntry {
    info: RouteInfo,
    seq: u64,
}

/// Bounded route-info cache keyed by (city code, route id).
///
/// Route metadata does not change during the day, so entries never expire;
/// when full, the oldest insertion is evicted. Reads are lock-free; inserts
/// are serialized so concurrent writers never push it past `capacity`.
pub struct RouteCache {
    entries: DashMap<String, CacheEntry>,
    capacity: usize,
    next_seq: AtomicU64,
    insert_lock: Mutex<()>,
}

impl RouteCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
            next_seq: AtomicU64::new(0),
            insert_lock: Mutex::new(()),
        }
    }

    fn key(city_code: &str, route_id: &str) -> String {
        format!("{}_{}", city_code, route_id)
    }

    pub fn get(&self, city_code: &str, route_id: &str) -> Option<RouteInfo> {
        self.entries
            .get(&Self::key(city_code, route_id))
            .map(|e| e.info.clone())
    }

    pub fn insert(&self, city_code: &str, route_id: &str, info: RouteInfo) {
        let key = Self::key(city_code, route_id);
        let _guard = self.insert_lock.lock().unwrap_or_else(|e| e.into_inner());
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(key, CacheEntry { info, seq });
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|e| e.value().seq)
            .map(|e| e.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
