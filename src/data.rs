//! Lock-guarded scratch storage.
//!
//! Each request gets a fresh [`Data`] (see [`Context::data`](crate::Context::data))
//! and the engine keeps one more for process-wide values (the warehouse).
//! Values are stored as `Arc<dyn Any>` under string keys and read back by type.
//!
//! The store carries its own lock. Handlers that hand work to other threads
//! should clone the `Arc<Data>` rather than share the context.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

type Item = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct Data {
    items: RwLock<HashMap<String, Item>>,
}

impl Data {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing whatever was there.
    pub fn set<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.items.write().insert(key.into(), Arc::new(value));
    }

    /// The value under `key` if it exists and has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let item = self.items.read().get(key).cloned()?;
        item.downcast::<T>().ok()
    }

    /// Like [`get`](Self::get) but clones the value out.
    pub fn value<T: Any + Send + Sync + Clone>(&self, key: &str) -> Option<T> {
        self.get::<T>(key).map(|v| T::clone(&v))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.read().contains_key(key)
    }

    pub fn remove(&self, key: &str) -> bool {
        self.items.write().remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn clear(&self) {
        self.items.write().clear();
    }
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items = self.items.read();
        let mut keys: Vec<_> = items.keys().collect();
        keys.sort();
        f.debug_struct("Data").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_round_trip() {
        let data = Data::new();
        data.set("user", String::from("ann"));
        data.set("attempts", 3u32);

        assert_eq!(data.value::<String>("user").as_deref(), Some("ann"));
        assert_eq!(data.value::<u32>("attempts"), Some(3));
        assert_eq!(data.value::<i64>("attempts"), None);
        assert_eq!(data.value::<u32>("missing"), None);
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn overwrite_remove_clear() {
        let data = Data::new();
        data.set("k", 1i32);
        data.set("k", 2i32);
        assert_eq!(data.value::<i32>("k"), Some(2));
        assert!(data.remove("k"));
        assert!(!data.contains("k"));
        data.set("a", ());
        data.clear();
        assert!(data.is_empty());
    }

    #[test]
    fn shared_across_threads() {
        let data = Arc::new(Data::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let data = Arc::clone(&data);
                std::thread::spawn(move || data.set(format!("worker-{i}"), i))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(data.len(), 4);
        assert_eq!(data.value::<i32>("worker-2"), Some(2));
    }

    #[test]
    fn atomic_counter_hands_out_unique_ids() {
        use std::sync::atomic::{AtomicI64, Ordering};

        let data = Arc::new(Data::new());
        data.set("next_id", AtomicI64::new(100));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let data = Arc::clone(&data);
                std::thread::spawn(move || {
                    let next = data.get::<AtomicI64>("next_id").unwrap();
                    (0..50).map(|_| next.fetch_add(1, Ordering::Relaxed)).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<i64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 400);
        assert_eq!(ids.first(), Some(&100));
        assert_eq!(ids.last(), Some(&499));
    }
}
