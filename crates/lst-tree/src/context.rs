//! Execution context
//!
//! One [`ExecutionContext`] is shared by every visitor in a run. It carries
//! run-scoped messages (recipe accumulators, data tables, options) and is
//! safe to use from the parallel phases of the scheduler.

use crate::messages::{Message, MessageMap};
use std::any::Any;
use std::sync::Arc;

/// Run-scoped message bag
#[derive(Debug, Default)]
pub struct ExecutionContext {
    messages: MessageMap,
}

impl ExecutionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_message<T: Any + Send + Sync>(&self, key: impl Into<String>, value: T) {
        self.messages.put(key, value);
    }

    pub fn put_message_arc(&self, key: impl Into<String>, value: Message) {
        self.messages.put_arc(key, value);
    }

    #[must_use]
    pub fn get_message<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.messages.get(key)
    }

    /// Message under `key`, created with `init` on first use
    pub fn compute_message_if_absent<T, F>(&self, key: &str, init: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        self.messages.compute_if_absent(key, init)
    }

    pub fn remove_message(&self, key: &str) -> bool {
        self.messages.remove(key)
    }

    #[must_use]
    pub fn has_message(&self, key: &str) -> bool {
        self.messages.contains(key)
    }
}
