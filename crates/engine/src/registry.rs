//! Name→instance lookup registries.
//!
//! One small generic container reused for every registry this engine needs:
//! agents, node executors (by variant tag), action handlers, tools, and
//! generic-node handlers. Registries are built explicitly at construction,
//! never populated by runtime class scanning.

use std::collections::HashMap;
use std::sync::Arc;

/// A simple name→instance map. `T` is typically a trait object
/// (`dyn Agent`, `dyn ActionHandler`, `dyn NodeExecutor`, ...).
#[derive(Clone)]
pub struct Registry<T: ?Sized> {
    entries: HashMap<String, Arc<T>>,
}

impl<T: ?Sized> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn register(&mut self, key: impl Into<String>, value: Arc<T>) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
