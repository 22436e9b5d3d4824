//! Toast queue.
//!
//! Anyone may push a toast at any time. Toasts are handed to the attached
//! surface (the deferred toaster enhancement); until one attaches they
//! wait in the queue. If no surface ever loads they are never shown.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

type Surface = Rc<dyn Fn(Toast)>;

#[derive(Default)]
struct ToastInner {
    queued: VecDeque<Toast>,
    surface: Option<Surface>,
    generation: u64,
}

/// Shared toast queue handle.
#[derive(Clone, Default)]
pub struct ToastQueue {
    inner: Rc<RefCell<ToastInner>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show now if a surface is attached, otherwise queue.
    pub fn push(&self, toast: Toast) {
        let surface = {
            let mut inner = self.inner.borrow_mut();
            match inner.surface.clone() {
                Some(surface) => surface,
                None => {
                    inner.queued.push_back(toast);
                    return;
                }
            }
        };
        surface(toast);
    }

    /// Attach a display surface, draining anything queued into it.
    ///
    /// Returns a detach function. A later attach replaces this surface.
    pub fn attach<F>(&self, surface: F) -> impl FnOnce() + use<F>
    where
        F: Fn(Toast) + 'static,
    {
        let surface: Surface = Rc::new(surface);
        let (backlog, generation) = {
            let mut inner = self.inner.borrow_mut();
            inner.surface = Some(surface.clone());
            inner.generation += 1;
            (std::mem::take(&mut inner.queued), inner.generation)
        };
        for toast in backlog {
            surface(toast);
        }

        let inner = self.inner.clone();
        move || {
            let mut inner = inner.borrow_mut();
            if inner.generation == generation {
                inner.surface = None;
            }
        }
    }

    pub fn is_attached(&self) -> bool {
        self.inner.borrow().surface.is_some()
    }

    pub fn queued_len(&self) -> usize {
        self.inner.borrow().queued.len()
    }
}
