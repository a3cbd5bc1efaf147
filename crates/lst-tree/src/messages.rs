//! Type-erased message maps
//!
//! Both cursor frames and the execution context carry a string-keyed bag of
//! values. Entries are stored as `Arc<dyn Any + Send + Sync>` and handed
//! back as `Arc<T>` after a downcast, so a reader holding a value never
//! blocks writers.

use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A stored message value
pub type Message = Arc<dyn Any + Send + Sync>;

/// Thread-safe map from key to message
#[derive(Default)]
pub struct MessageMap {
    entries: Mutex<HashMap<String, Message>>,
}

impl fmt::Debug for MessageMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        let mut keys: Vec<_> = entries.keys().cloned().collect();
        keys.sort_unstable();
        f.debug_struct("MessageMap").field("keys", &keys).finish()
    }
}

impl MessageMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.put_arc(key, Arc::new(value));
    }

    pub fn put_arc(&self, key: impl Into<String>, value: Message) {
        self.entries.lock().insert(key.into(), value);
    }

    /// Value under `key`, if present and of type `T`
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let value = self.entries.lock().get(key).cloned()?;
        value.downcast::<T>().ok()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Value under `key`, inserting `init()` first if absent
    ///
    /// The check and insert happen under one lock, so concurrent callers
    /// all observe the same value. A present value of another type is
    /// replaced.
    pub fn compute_if_absent<T, F>(&self, key: &str, init: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(key).cloned() {
            if let Ok(value) = existing.downcast::<T>() {
                return value;
            }
        }
        let value = Arc::new(init());
        entries.insert(key.to_string(), value.clone());
        value
    }

    /// Remove `key`; returns whether it was present
    pub fn remove(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_get() {
        let map = MessageMap::new();
        map.put("n", 7_u32);
        assert_eq!(*map.get::<u32>("n").unwrap(), 7);
        assert!(map.get::<String>("n").is_none());
        assert!(map.get::<u32>("missing").is_none());
    }

    #[test]
    fn compute_if_absent_returns_same_arc() {
        let map = MessageMap::new();
        let first = map.compute_if_absent("acc", || Mutex::new(Vec::<u32>::new()));
        let second = map.compute_if_absent("acc", || Mutex::new(vec![99]));
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.lock().is_empty());
    }

    #[test]
    fn compute_if_absent_is_race_free() {
        let map = Arc::new(MessageMap::new());
        let values: Vec<Arc<u64>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let map = map.clone();
                    scope.spawn(move || map.compute_if_absent("k", || i))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(values.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn remove_reports_presence() {
        let map = MessageMap::new();
        map.put("k", ());
        assert!(map.remove("k"));
        assert!(!map.remove("k"));
        assert!(map.is_empty());
    }
}
