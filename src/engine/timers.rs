//! Timer System - Virtual clock and cancelable timeouts
//!
//! The host clock only moves when the host advances it, which keeps every
//! schedule in this crate deterministic.
//!
//! # Pattern
//!
//! - `set_timeout` returns a [`TimerId`]; `clear_timeout` cancels it
//! - `advance_time` fires due timers in deadline order (ties by creation)
//! - Each callback is followed by a microtask drain, like a browser task
//!
//! # Example
//!
//! ```ignore
//! use folio_shell::engine::timers::{set_timeout, clear_timeout, advance_time};
//!
//! let id = set_timeout(3000, || println!("idle work"));
//! advance_time(2000);
//! clear_timeout(id); // never fires
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use super::microtasks::flush_microtasks;

// =============================================================================
// TYPES
// =============================================================================

/// Handle for a scheduled timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

type TimerCallback = Box<dyn FnOnce()>;

struct TimerQueue {
    /// (deadline, id) -> callback. BTreeMap order gives deadline-then-creation order.
    entries: BTreeMap<(u64, TimerId), TimerCallback>,
    /// id -> deadline, for O(log n) cancellation.
    deadlines: HashMap<TimerId, u64>,
    next_id: u64,
}

impl TimerQueue {
    fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_id: 0,
        }
    }
}

thread_local! {
    static NOW_MS: Cell<u64> = const { Cell::new(0) };
    static TIMERS: RefCell<TimerQueue> = RefCell::new(TimerQueue::new());
}

// =============================================================================
// CLOCK
// =============================================================================

/// Current host time in milliseconds since the session started.
pub fn now_ms() -> u64 {
    NOW_MS.with(|now| now.get())
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Schedule `callback` to run once `delay_ms` has elapsed.
pub fn set_timeout<F>(delay_ms: u64, callback: F) -> TimerId
where
    F: FnOnce() + 'static,
{
    let deadline = now_ms().saturating_add(delay_ms);
    TIMERS.with(|timers| {
        let mut timers = timers.borrow_mut();
        let id = TimerId(timers.next_id);
        timers.next_id += 1;
        timers.entries.insert((deadline, id), Box::new(callback));
        timers.deadlines.insert(id, deadline);
        id
    })
}

/// Cancel a pending timeout. Unknown or already-fired ids are ignored.
pub fn clear_timeout(id: TimerId) {
    TIMERS.with(|timers| {
        let mut timers = timers.borrow_mut();
        if let Some(deadline) = timers.deadlines.remove(&id) {
            timers.entries.remove(&(deadline, id));
        }
    });
}

/// Check whether a timeout is still waiting to fire.
pub fn is_timer_pending(id: TimerId) -> bool {
    TIMERS.with(|timers| timers.borrow().deadlines.contains_key(&id))
}

/// Move the clock forward by `ms`, firing every timer that comes due.
///
/// Timers scheduled by a callback fire in the same call if their deadline
/// falls inside the advanced window.
pub fn advance_time(ms: u64) {
    let target = now_ms().saturating_add(ms);

    loop {
        let due = TIMERS.with(|timers| {
            let mut timers = timers.borrow_mut();
            let key = timers
                .entries
                .keys()
                .next()
                .copied()
                .filter(|(deadline, _)| *deadline <= target)?;
            let callback = timers.entries.remove(&key)?;
            timers.deadlines.remove(&key.1);
            Some((key.0, callback))
        });

        match due {
            Some((deadline, callback)) => {
                NOW_MS.with(|now| now.set(deadline.max(now.get())));
                callback();
                flush_microtasks();
            }
            None => break,
        }
    }

    NOW_MS.with(|now| now.set(target));
}

/// Number of timeouts still waiting to fire.
pub fn pending_timer_count() -> usize {
    TIMERS.with(|timers| timers.borrow().deadlines.len())
}

/// Reset the clock and drop all timers (for testing).
pub fn reset_timers() {
    TIMERS.with(|timers| *timers.borrow_mut() = TimerQueue::new());
    NOW_MS.with(|now| now.set(0));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn setup() {
        reset_timers();
    }

    #[test]
    fn test_fires_after_delay() {
        setup();

        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        set_timeout(100, move || fired_clone.set(true));

        advance_time(99);
        assert!(!fired.get());

        advance_time(1);
        assert!(fired.get());
        assert_eq!(now_ms(), 100);
        assert_eq!(pending_timer_count(), 0);
    }

    #[test]
    fn test_clear_prevents_fire() {
        setup();

        let fired = Rc::new(Cell::new(false));
        let fired_clone = fired.clone();
        let id = set_timeout(3000, move || fired_clone.set(true));

        advance_time(2000);
        assert!(is_timer_pending(id));
        clear_timeout(id);
        assert!(!is_timer_pending(id));

        advance_time(5000);
        assert!(!fired.get());
    }

    #[test]
    fn test_deadline_order_and_ties() {
        setup();

        let order = Rc::new(RefCell::new(Vec::new()));
        for (delay, label) in [(50, "b"), (10, "a"), (50, "c")] {
            let order = order.clone();
            set_timeout(delay, move || order.borrow_mut().push(label));
        }

        advance_time(100);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_clock_reads_deadline_inside_callback() {
        setup();

        let seen = Rc::new(Cell::new(0));
        let seen_clone = seen.clone();
        set_timeout(40, move || seen_clone.set(now_ms()));

        advance_time(1000);
        assert_eq!(seen.get(), 40);
        assert_eq!(now_ms(), 1000);
    }

    #[test]
    fn test_chained_timer_inside_window() {
        setup();

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        set_timeout(10, move || {
            count_clone.set(count_clone.get() + 1);
            let inner = count_clone.clone();
            set_timeout(10, move || inner.set(inner.get() + 1));
        });

        advance_time(25);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_clear_unknown_is_noop() {
        setup();
        let id = set_timeout(1, || {});
        advance_time(1);
        clear_timeout(id);
        assert_eq!(pending_timer_count(), 0);
    }
}
