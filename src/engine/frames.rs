//! Animation Frames - Per-frame callbacks, pending-frame guard, frame loops
//!
//! Mirrors `requestAnimationFrame`: callbacks queued now run on the next
//! `run_frame()`. Callbacks requested while a frame is running land in the
//! frame after.
//!
//! Two helpers sit on top:
//!
//! - [`FrameGuard`] - at most one queued frame per owner. High-frequency
//!   inputs (pointer move, scroll) coalesce into one update per frame.
//! - [`FrameLoop`] - a restartable per-frame task that keeps rescheduling
//!   itself until it returns `false` or is stopped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::microtasks::flush_microtasks;
use super::timers::now_ms;

// =============================================================================
// FRAME QUEUE
// =============================================================================

/// Handle for a requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

type FrameCallback = Box<dyn FnOnce(f64)>;

struct FrameQueue {
    callbacks: Vec<(FrameId, FrameCallback)>,
    next_id: u64,
    frames_run: u64,
}

thread_local! {
    static FRAMES: RefCell<FrameQueue> = RefCell::new(FrameQueue {
        callbacks: Vec::new(),
        next_id: 0,
        frames_run: 0,
    });
}

/// Request `callback` to run on the next frame. It receives the frame
/// timestamp in milliseconds.
pub fn request_animation_frame<F>(callback: F) -> FrameId
where
    F: FnOnce(f64) + 'static,
{
    FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        let id = FrameId(frames.next_id);
        frames.next_id += 1;
        frames.callbacks.push((id, Box::new(callback)));
        id
    })
}

/// Cancel a requested frame. Unknown ids are ignored.
pub fn cancel_animation_frame(id: FrameId) {
    FRAMES.with(|frames| {
        frames.borrow_mut().callbacks.retain(|(frame_id, _)| *frame_id != id);
    });
}

/// Run every callback queued before this call.
///
/// A callback cancelled by an earlier one in the same frame does not run.
pub fn run_frame() {
    let batch: Vec<FrameId> = FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        frames.frames_run += 1;
        frames.callbacks.iter().map(|(id, _)| *id).collect()
    });

    let timestamp = now_ms() as f64;
    for id in batch {
        let callback = FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            let index = frames.callbacks.iter().position(|(queued, _)| *queued == id)?;
            Some(frames.callbacks.remove(index).1)
        });
        if let Some(callback) = callback {
            callback(timestamp);
        }
    }
    flush_microtasks();
}

/// Number of frame callbacks waiting for the next frame.
pub fn pending_frame_count() -> usize {
    FRAMES.with(|frames| frames.borrow().callbacks.len())
}

/// Number of frames run so far.
pub fn frames_run() -> u64 {
    FRAMES.with(|frames| frames.borrow().frames_run)
}

/// Drop all queued frames (for testing).
pub fn reset_frames() {
    FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        frames.callbacks.clear();
        frames.frames_run = 0;
    });
}

// =============================================================================
// FRAME GUARD
// =============================================================================

/// Pending-frame guard: coalesces many requests into one frame callback.
///
/// ```ignore
/// let guard = FrameGuard::new();
/// on_scroll(move |_| guard.schedule(|_| update_progress()));
/// ```
#[derive(Clone, Default)]
pub struct FrameGuard {
    pending: Rc<Cell<Option<FrameId>>>,
}

impl FrameGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `callback` unless a frame is already pending for this guard.
    ///
    /// Returns `true` if a new frame was requested.
    pub fn schedule<F>(&self, callback: F) -> bool
    where
        F: FnOnce(f64) + 'static,
    {
        if self.pending.get().is_some() {
            return false;
        }
        let pending = self.pending.clone();
        let id = request_animation_frame(move |ts| {
            pending.set(None);
            callback(ts);
        });
        self.pending.set(Some(id));
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    /// Cancel the pending frame, if any.
    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            cancel_animation_frame(id);
        }
    }
}

// =============================================================================
// FRAME LOOP
// =============================================================================

/// A per-frame task bound to its owner's lifetime.
///
/// The step function returns `true` to keep running. `stop()` (or drop)
/// cancels the queued frame so no callback fires after teardown.
pub struct FrameLoop {
    inner: Rc<FrameLoopInner>,
}

struct FrameLoopInner {
    step: RefCell<Box<dyn FnMut(f64) -> bool>>,
    pending: Cell<Option<FrameId>>,
    running: Cell<bool>,
}

impl FrameLoop {
    /// Create a stopped loop.
    pub fn new<F>(step: F) -> Self
    where
        F: FnMut(f64) -> bool + 'static,
    {
        Self {
            inner: Rc::new(FrameLoopInner {
                step: RefCell::new(Box::new(step)),
                pending: Cell::new(None),
                running: Cell::new(false),
            }),
        }
    }

    /// Start (or restart) the loop. No-op while already running.
    pub fn start(&self) {
        if self.inner.running.replace(true) {
            return;
        }
        Self::schedule(&self.inner);
    }

    fn schedule(inner: &Rc<FrameLoopInner>) {
        let weak = Rc::downgrade(inner);
        let id = request_animation_frame(move |ts| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            inner.pending.set(None);
            if !inner.running.get() {
                return;
            }
            let keep_going = {
                let mut step = inner.step.borrow_mut();
                (*step)(ts)
            };
            if keep_going && inner.running.get() {
                Self::schedule(&inner);
            } else {
                inner.running.set(false);
            }
        });
        inner.pending.set(Some(id));
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    /// Stop the loop and cancel its queued frame.
    pub fn stop(&self) {
        self.inner.running.set(false);
        if let Some(id) = self.inner.pending.take() {
            cancel_animation_frame(id);
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// TESTS
// =============================================================================
