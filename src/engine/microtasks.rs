//! Microtask queue - continuations that run after the current task.
//!
//! Lazy-chunk resolution lands here. Every host task (timer callback,
//! frame batch, event dispatch) drains the queue before returning, so a
//! microtask queued from inside another microtask still runs in the same
//! drain.

use std::cell::RefCell;
use std::collections::VecDeque;

type Microtask = Box<dyn FnOnce()>;

thread_local! {
    static QUEUE: RefCell<VecDeque<Microtask>> = RefCell::new(VecDeque::new());
    static DRAINING: RefCell<bool> = const { RefCell::new(false) };
}

/// Queue a continuation to run at the end of the current task.
pub fn queue_microtask<F>(task: F)
where
    F: FnOnce() + 'static,
{
    QUEUE.with(|queue| queue.borrow_mut().push_back(Box::new(task)));
}

/// Run queued microtasks until the queue is empty.
///
/// Re-entrant calls (a microtask calling `flush_microtasks`) return
/// immediately; the outer drain picks up whatever they queued.
pub fn flush_microtasks() {
    let already = DRAINING.with(|d| d.replace(true));
    if already {
        return;
    }

    loop {
        // Pop outside the callback so the task may queue more work.
        let next = QUEUE.with(|queue| queue.borrow_mut().pop_front());
        match next {
            Some(task) => task(),
            None => break,
        }
    }

    DRAINING.with(|d| *d.borrow_mut() = false);
}

/// Number of microtasks waiting to run.
pub fn pending_microtask_count() -> usize {
    QUEUE.with(|queue| queue.borrow().len())
}

/// Drop every queued microtask (for testing).
pub fn reset_microtasks() {
    QUEUE.with(|queue| queue.borrow_mut().clear());
    DRAINING.with(|d| *d.borrow_mut() = false);
}
