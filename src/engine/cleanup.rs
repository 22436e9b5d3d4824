//! Cleanup List - one place to release everything a component acquired.
//!
//! Every registration (timer, frame, listener, child mount) hands back a
//! disposer. The owner pushes them here and runs the list once on teardown.
//! Disposers run in reverse registration order, each exactly once.
//!
//! Adding to a list that has already run releases the disposer on the
//! spot: the owner is gone, so whatever was just acquired must not outlive
//! it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::Cleanup;

/// Shared, single-shot list of disposers.
#[derive(Clone)]
pub struct CleanupList {
    inner: Rc<RefCell<Option<Vec<Cleanup>>>>,
}

impl Default for CleanupList {
    fn default() -> Self {
        Self::new()
    }
}

impl CleanupList {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Some(Vec::new()))),
        }
    }

    /// Register a disposer.
    pub fn add<F>(&self, disposer: F)
    where
        F: FnOnce() + 'static,
    {
        let rejected = {
            let mut inner = self.inner.borrow_mut();
            match inner.as_mut() {
                Some(list) => {
                    list.push(Box::new(disposer));
                    None
                }
                None => Some(disposer),
            }
        };

        if let Some(disposer) = rejected {
            disposer();
        }
    }

    /// Register an already boxed disposer.
    pub fn add_boxed(&self, disposer: Cleanup) {
        self.add(move || disposer());
    }

    /// Run every disposer. Later calls are no-ops.
    pub fn run(&self) {
        let list = self.inner.borrow_mut().take();
        if let Some(list) = list {
            for disposer in list.into_iter().rev() {
                disposer();
            }
        }
    }

    pub fn has_run(&self) -> bool {
        self.inner.borrow().is_none()
    }

    /// Number of disposers waiting to run.
    pub fn len(&self) -> usize {
        self.inner.borrow().as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_runs_each_once_in_reverse() {
        let list = CleanupList::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for i in 0..3 {
            let order = order.clone();
            list.add(move || order.borrow_mut().push(i));
        }
        assert_eq!(list.len(), 3);

        list.run();
        list.run();
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
        assert!(list.has_run());
    }

    #[test]
    fn test_add_after_run_releases_immediately() {
        let list = CleanupList::new();
        list.run();

        let released = Rc::new(Cell::new(false));
        let released_clone = released.clone();
        list.add(move || released_clone.set(true));

        assert!(released.get());
        assert!(list.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let list = CleanupList::new();
        let handle = list.clone();

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        handle.add(move || count_clone.set(count_clone.get() + 1));

        list.run();
        handle.run();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_disposer_may_add_to_same_list() {
        let list = CleanupList::new();
        let inner_ran = Rc::new(Cell::new(false));

        let list_clone = list.clone();
        let inner_clone = inner_ran.clone();
        list.add(move || {
            let flag = inner_clone.clone();
            list_clone.add(move || flag.set(true));
        });

        list.run();
        assert!(inner_ran.get());
    }
}
