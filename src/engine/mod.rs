//! Host Engine - single-threaded stand-in for the browser event loop.
//!
//! Everything deferred in this crate is expressed against these
//! primitives, never against wall-clock time or OS threads:
//!
//! - [`timers`] - virtual clock, `set_timeout` / `clear_timeout`
//! - [`frames`] - animation frames, [`FrameGuard`], [`FrameLoop`]
//! - [`microtasks`] - continuations drained after every task
//! - [`events`] - window listener registry and dispatch
//! - [`document`] - nodes, LCP timeline, section layout, scroll
//! - [`cleanup`] - [`CleanupList`], the single teardown path
//!
//! State is thread-local: one engine per UI thread, and each test thread
//! starts clean.

pub mod cleanup;
pub mod document;
pub mod events;
pub mod frames;
pub mod microtasks;
pub mod timers;

pub use cleanup::CleanupList;
pub use document::{Document, LcpEntry, Node, NodeRole, NodeStyle};
pub use events::{
    dispatch, listen, listener_count, on_click, on_pointer_enter, on_pointer_leave,
    on_pointer_move, on_resize, on_scroll, total_listener_count, EventKind, PointerEvent,
    WindowEvent,
};
pub use frames::{
    cancel_animation_frame, pending_frame_count, request_animation_frame, run_frame, FrameGuard,
    FrameId, FrameLoop,
};
pub use microtasks::{flush_microtasks, pending_microtask_count, queue_microtask};
pub use timers::{
    advance_time, clear_timeout, now_ms, pending_timer_count, set_timeout, TimerId,
};

/// Nominal frame interval at 60 Hz.
pub const FRAME_MS: u64 = 16;

/// One host turn: advance the clock by `ms`, then paint a frame.
pub fn tick(ms: u64) {
    timers::advance_time(ms);
    frames::run_frame();
}

/// Run `frames` consecutive 16 ms ticks.
pub fn tick_frames(frames: usize) {
    for _ in 0..frames {
        tick(FRAME_MS);
    }
}

/// Reset every engine queue and registry (for testing).
pub fn reset_engine() {
    timers::reset_timers();
    frames::reset_frames();
    microtasks::reset_microtasks();
    events::reset_events();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_tick_advances_and_paints() {
        reset_engine();

        let painted_at = Rc::new(Cell::new(None));
        let painted_clone = painted_at.clone();
        request_animation_frame(move |ts| painted_clone.set(Some(ts)));

        tick(FRAME_MS);
        assert_eq!(painted_at.get(), Some(16.0));
        assert_eq!(now_ms(), 16);
    }

    #[test]
    fn test_timer_microtasks_drain_before_next_timer() {
        reset_engine();

        let log = Rc::new(std::cell::RefCell::new(Vec::new()));
        let log_a = log.clone();
        set_timeout(10, move || {
            log_a.borrow_mut().push("timer-a");
            let log_m = log_a.clone();
            queue_microtask(move || log_m.borrow_mut().push("micro-a"));
        });
        let log_b = log.clone();
        set_timeout(10, move || log_b.borrow_mut().push("timer-b"));

        advance_time(10);
        assert_eq!(*log.borrow(), vec!["timer-a", "micro-a", "timer-b"]);
    }

    #[test]
    fn test_reset_clears_everything() {
        reset_engine();
        set_timeout(5, || {});
        request_animation_frame(|_| {});
        queue_microtask(|| {});
        let _listener = on_scroll(|| {});

        reset_engine();
        assert_eq!(pending_timer_count(), 0);
        assert_eq!(pending_frame_count(), 0);
        assert_eq!(pending_microtask_count(), 0);
        assert_eq!(total_listener_count(), 0);
    }
}
