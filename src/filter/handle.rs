//! Shared handle for swapping the active filter.

use std::path::Path;
use std::sync::{Arc, RwLock};

use super::{ItemFilter, LoadError};

/// Cloneable handle to the active filter.
///
/// Readers take a snapshot with [`current`](FilterHandle::current) and
/// match against that; a swap replaces the snapshot in one step, so
/// in-flight matching finishes with the rule set it started with.
#[derive(Debug, Clone)]
pub struct FilterHandle {
    inner: Arc<RwLock<Arc<ItemFilter>>>,
}

impl FilterHandle {
    pub fn new(filter: ItemFilter) -> FilterHandle {
        FilterHandle {
            inner: Arc::new(RwLock::new(Arc::new(filter))),
        }
    }

    /// Snapshot of the active filter.
    pub fn current(&self) -> Arc<ItemFilter> {
        self.inner.read().expect("filter lock poisoned").clone()
    }

    /// Replace the active filter.
    pub fn swap(&self, filter: ItemFilter) {
        *self.inner.write().expect("filter lock poisoned") = Arc::new(filter);
    }

    /// Load `path` and swap it in. The active filter stays as it was if
    /// the file cannot be read.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let filter = ItemFilter::load(path)?;
        self.swap(filter);
        Ok(())
    }
}

impl Default for FilterHandle {
    fn default() -> FilterHandle {
        FilterHandle::new(ItemFilter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use std::fs;

    fn scroll() -> Item {
        Item {
            base_name: "Scroll of Wisdom".into(),
            class_name: "StackableCurrency".into(),
            stack_size: 20,
            ..Item::default()
        }
    }

    #[test]
    fn swap_does_not_disturb_existing_snapshots() {
        let handle = FilterHandle::new(ItemFilter::parse("StackSize >= 5\n"));
        let before = handle.current();

        handle.swap(ItemFilter::parse("IsCorrupted\n\nRarity == Unique\n"));

        assert_eq!(before.len(), 1);
        assert_eq!(handle.current().len(), 2);
        assert!(before.matches(&scroll()));
        assert!(!handle.current().matches(&scroll()));
    }

    #[test]
    fn reload_swaps_in_the_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loot.ifl");
        fs::write(&path, "StackSize >= 5\n").unwrap();

        let handle = FilterHandle::default();
        assert!(!handle.current().matches(&scroll()));

        handle.reload(&path).unwrap();
        assert!(handle.current().matches(&scroll()));
    }

    #[test]
    fn reload_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loot.ifl");
        fs::write(&path, "StackSize >= 5\n\nRarity == Unique\n").unwrap();

        let handle = FilterHandle::default();
        handle.reload(&path).unwrap();
        let first = handle.current();
        handle.reload(&path).unwrap();
        let second = handle.current();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.rules().iter().zip(second.rules().iter()) {
            assert_eq!(a.query(), b.query());
            assert_eq!(a.start_line(), b.start_line());
        }
        assert_eq!(first.matches(&scroll()), second.matches(&scroll()));
    }

    #[test]
    fn failed_reload_keeps_the_active_filter() {
        let handle = FilterHandle::new(ItemFilter::parse("StackSize >= 5\n"));

        let err = handle.reload("/nonexistent/loot.ifl");
        assert!(err.is_err());
        assert_eq!(handle.current().len(), 1);
        assert!(handle.current().matches(&scroll()));
    }

    #[test]
    fn handle_is_shareable_across_threads() {
        let handle = FilterHandle::new(ItemFilter::parse("StackSize >= 5\n"));
        let worker = {
            let handle = handle.clone();
            std::thread::spawn(move || handle.current().matches(&scroll()))
        };
        assert!(worker.join().unwrap());
    }
}
