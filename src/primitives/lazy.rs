//! Lazy - memoized deferred loader.
//!
//! Wraps a one-shot producer (a code-split chunk, a section module).
//! The first [`Lazy::request`] schedules the producer on a microtask;
//! every later request is a no-op. The outcome is published through a
//! `Signal<LoadPhase>` so boundaries can react to it.
//!
//! A producer that returns `Err` or panics leaves the lazy `Failed` for
//! good. There is no retry.

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::engine::queue_microtask;
use crate::error::LoadError;

/// Where a lazy value is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Never requested.
    Idle,
    /// Requested, producer not yet run.
    Pending,
    Ready,
    Failed,
}

type Producer<T> = Box<dyn FnOnce() -> Result<T, LoadError>>;

struct LazyInner<T> {
    name: String,
    producer: RefCell<Option<Producer<T>>>,
    value: RefCell<Option<Rc<T>>>,
    error: RefCell<Option<LoadError>>,
    phase: Signal<LoadPhase>,
    invocations: Cell<u32>,
}

/// Memoized deferred value. Clones share one load.
pub struct Lazy<T> {
    inner: Rc<LazyInner<T>>,
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Lazy<T> {
    pub fn new<F>(name: impl Into<String>, producer: F) -> Self
    where
        F: FnOnce() -> Result<T, LoadError> + 'static,
    {
        Self {
            inner: Rc::new(LazyInner {
                name: name.into(),
                producer: RefCell::new(Some(Box::new(producer))),
                value: RefCell::new(None),
                error: RefCell::new(None),
                phase: signal(LoadPhase::Idle),
                invocations: Cell::new(0),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Start loading. Returns `true` only for the call that started it.
    pub fn request(&self) -> bool {
        if self.inner.phase.get() != LoadPhase::Idle {
            return false;
        }
        self.inner.phase.set(LoadPhase::Pending);

        let inner = self.inner.clone();
        queue_microtask(move || {
            let Some(producer) = inner.producer.borrow_mut().take() else {
                return;
            };
            inner.invocations.set(inner.invocations.get() + 1);

            let outcome = panic::catch_unwind(AssertUnwindSafe(producer))
                .unwrap_or_else(|_| Err(LoadError::Panicked { name: inner.name.clone() }));

            match outcome {
                Ok(value) => {
                    *inner.value.borrow_mut() = Some(Rc::new(value));
                    inner.phase.set(LoadPhase::Ready);
                }
                Err(err) => {
                    *inner.error.borrow_mut() = Some(err);
                    inner.phase.set(LoadPhase::Failed);
                }
            }
        });
        true
    }

    /// Current phase. Tracked when read inside an effect.
    pub fn phase(&self) -> LoadPhase {
        self.inner.phase.get()
    }

    pub fn value(&self) -> Option<Rc<T>> {
        self.inner.value.borrow().clone()
    }

    pub fn error(&self) -> Option<LoadError> {
        self.inner.error.borrow().clone()
    }

    /// How many times the producer actually ran (0 or 1).
    pub fn invocations(&self) -> u32 {
        self.inner.invocations.get()
    }
}
