use crate::crawler::CrawlTask;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Thread-safe map from task identifier to task
///
/// Holds at most one task per identifier. Tasks stay until removed
/// explicitly; nothing expires.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: RwLock<HashMap<String, Arc<CrawlTask>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `task` under its identifier
    ///
    /// Returns false, leaving the registry untouched, if the identifier is
    /// already taken.
    pub fn insert(&self, task: Arc<CrawlTask>) -> bool {
        let mut tasks = self.tasks.write();
        if tasks.contains_key(task.id()) {
            return false;
        }
        tasks.insert(task.id().to_string(), task);
        true
    }

    pub fn get(&self, id: &str) -> Option<Arc<CrawlTask>> {
        self.tasks.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<CrawlTask>> {
        self.tasks.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }
}
