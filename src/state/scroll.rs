//! Scroll State - scroll-spy and scroll progress.
//!
//! Both listen to window scroll/resize and recompute at most once per
//! frame through a [`FrameGuard`].
//!
//! - **Scroll-spy**: the active section is the last one whose top is at or
//!   above a marker line `scroll_y + viewport_height * spy_fraction`.
//!   Offsets come from the document layout and are cached until section
//!   geometry or the viewport changes. Sections that are not mounted yet
//!   are skipped.
//! - **Progress**: `scroll_y / (scroll_height - viewport_height)`, or 0
//!   when nothing scrolls.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use spark_signals::{signal, Signal};

use crate::config::ScrollConfig;
use crate::engine::{dispatch, on_resize, on_scroll, CleanupList, Document, FrameGuard, WindowEvent};
use crate::layout::SectionOffset;

// =============================================================================
// SCROLL-SPY
// =============================================================================

struct SpyInner {
    document: Document,
    ids: Vec<String>,
    threshold: f64,
    fraction: f64,
    active: Signal<Option<String>>,
    scrolled: Signal<bool>,
    offsets: RefCell<Vec<SectionOffset>>,
    cached_generation: Cell<Option<u64>>,
    guard: FrameGuard,
    cleanups: CleanupList,
}

impl SpyInner {
    fn refresh_offsets(&self) {
        let generation = self.document.generation();
        if self.cached_generation.get() == Some(generation) {
            return;
        }
        let layout = self.document.layout();
        *self.offsets.borrow_mut() = self
            .ids
            .iter()
            .filter_map(|id| layout.offset_of(id).cloned())
            .collect();
        self.cached_generation.set(Some(generation));
    }

    fn update(&self) {
        self.refresh_offsets();
        let scroll_y = self.document.scroll_y();
        let marker = scroll_y + self.document.viewport().1 * self.fraction;

        let active = self
            .offsets
            .borrow()
            .iter()
            .filter(|offset| offset.top <= marker)
            .last()
            .map(|offset| offset.id.clone());
        if self.active.get() != active {
            self.active.set(active);
        }

        let scrolled = scroll_y > self.threshold;
        if self.scrolled.get() != scrolled {
            self.scrolled.set(scrolled);
        }
    }
}

/// Tracks which section the reader is in.
pub struct ScrollSpy {
    inner: Rc<SpyInner>,
}

impl ScrollSpy {
    /// Start tracking `ids` (the navigation registry, in page order).
    pub fn attach(document: Document, ids: Vec<String>, config: &ScrollConfig) -> Self {
        let inner = Rc::new(SpyInner {
            document,
            ids,
            threshold: config.scrolled_threshold,
            fraction: config.spy_fraction,
            active: signal(None),
            scrolled: signal(false),
            offsets: RefCell::new(Vec::new()),
            cached_generation: Cell::new(None),
            guard: FrameGuard::new(),
            cleanups: CleanupList::new(),
        });

        let weak = Rc::downgrade(&inner);
        inner.cleanups.add(on_scroll(move || schedule_update(&weak)));
        let weak = Rc::downgrade(&inner);
        inner.cleanups.add(on_resize(move || {
            if let Some(inner) = weak.upgrade() {
                inner.cached_generation.set(None);
                schedule_update(&weak);
            }
        }));
        let guard = inner.guard.clone();
        inner.cleanups.add(move || guard.cancel());

        inner.update();
        Self { inner }
    }

    /// Active section id. Tracked when read inside an effect.
    pub fn active(&self) -> Option<String> {
        self.inner.active.get()
    }

    pub fn active_signal(&self) -> Signal<Option<String>> {
        self.inner.active.clone()
    }

    /// Whether the page has scrolled past the threshold.
    pub fn scrolled(&self) -> bool {
        self.inner.scrolled.get()
    }

    /// Offsets of the mounted sections, in page order.
    pub fn offsets(&self) -> Vec<SectionOffset> {
        self.inner.refresh_offsets();
        self.inner.offsets.borrow().clone()
    }

    /// In-page navigation: scroll so `id` is at the top. `false` if it is
    /// not mounted (yet).
    pub fn scroll_to_section(&self, id: &str) -> bool {
        let Some(top) = self.offsets().iter().find(|o| o.id == id).map(|o| o.top) else {
            return false;
        };
        self.inner.document.scroll_to(top);
        dispatch(WindowEvent::Scroll);
        true
    }

    /// Stop listening. Idempotent.
    pub fn detach(&self) {
        self.inner.cleanups.run();
    }
}

fn schedule_update(weak: &Weak<SpyInner>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let weak = weak.clone();
    inner.guard.schedule(move |_| {
        if let Some(inner) = weak.upgrade() {
            inner.update();
        }
    });
}

// =============================================================================
// SCROLL PROGRESS
// =============================================================================

struct ProgressInner {
    document: Document,
    progress: Signal<f64>,
    guard: FrameGuard,
    cleanups: CleanupList,
}

impl ProgressInner {
    fn update(&self) {
        let range = self.document.scroll_height() - self.document.viewport().1;
        let progress = if range > 0.0 {
            (self.document.scroll_y() / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        if self.progress.get() != progress {
            self.progress.set(progress);
        }
    }
}

/// Reading progress bar value in `[0, 1]`.
pub struct ScrollProgress {
    inner: Rc<ProgressInner>,
}

impl ScrollProgress {
    pub fn attach(document: Document) -> Self {
        let inner = Rc::new(ProgressInner {
            document,
            progress: signal(0.0),
            guard: FrameGuard::new(),
            cleanups: CleanupList::new(),
        });

        let handler = |weak: Weak<ProgressInner>| {
            move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let weak = weak.clone();
                inner.guard.schedule(move |_| {
                    if let Some(inner) = weak.upgrade() {
                        inner.update();
                    }
                });
            }
        };
        inner.cleanups.add(on_scroll(handler(Rc::downgrade(&inner))));
        inner.cleanups.add(on_resize(handler(Rc::downgrade(&inner))));
        let guard = inner.guard.clone();
        inner.cleanups.add(move || guard.cancel());

        inner.update();
        Self { inner }
    }

    pub fn progress(&self) -> f64 {
        self.inner.progress.get()
    }

    pub fn progress_signal(&self) -> Signal<f64> {
        self.inner.progress.clone()
    }

    pub fn detach(&self) {
        self.inner.cleanups.run();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::frames::frames_run;
    use crate::engine::{pending_frame_count, reset_engine, run_frame, total_listener_count};

    fn setup() -> Document {
        reset_engine();
        let doc = Document::new(1280.0, 900.0);
        doc.mount_section(0, "home", 900.0);
        doc.mount_section(1, "about", 600.0);
        doc.mount_section(3, "contact", 1000.0);
        doc
    }

    fn ids() -> Vec<String> {
        ["home", "about", "projects", "contact"].iter().map(|s| s.to_string()).collect()
    }

    fn scroll(doc: &Document, y: f64) {
        doc.scroll_to(y);
        dispatch(WindowEvent::Scroll);
        run_frame();
    }

    #[test]
    fn test_spy_picks_section_under_marker_line() {
        let doc = setup();
        let spy = ScrollSpy::attach(doc.clone(), ids(), &ScrollConfig::default());
        assert_eq!(spy.active().as_deref(), Some("home"));
        assert!(!spy.scrolled());

        // marker = 600 + 300 = 900 -> about starts at 900
        scroll(&doc, 600.0);
        assert_eq!(spy.active().as_deref(), Some("about"));
        assert!(spy.scrolled());

        scroll(&doc, 599.0);
        assert_eq!(spy.active().as_deref(), Some("home"));

        // unmounted "projects" is skipped; marker = 1200 + 300 = contact's top
        scroll(&doc, 1200.0);
        assert_eq!(spy.active().as_deref(), Some("contact"));
        spy.detach();
    }

    #[test]
    fn test_spy_is_frame_throttled() {
        let doc = setup();
        let spy = ScrollSpy::attach(doc.clone(), ids(), &ScrollConfig::default());
        doc.scroll_to(700.0);
        for _ in 0..10 {
            dispatch(WindowEvent::Scroll);
        }
        assert_eq!(pending_frame_count(), 1);
        assert_eq!(spy.active().as_deref(), Some("home"));

        let before = frames_run();
        run_frame();
        assert_eq!(frames_run(), before + 1);
        assert_eq!(spy.active().as_deref(), Some("about"));
        spy.detach();
    }

    #[test]
    fn test_offsets_follow_newly_mounted_sections() {
        let doc = setup();
        let spy = ScrollSpy::attach(doc.clone(), ids(), &ScrollConfig::default());
        assert_eq!(spy.offsets().len(), 3);

        doc.mount_section(2, "projects", 400.0);
        let offsets = spy.offsets();
        assert_eq!(offsets.len(), 4);
        assert_eq!(offsets[3].top, 1900.0);
        spy.detach();
    }

    #[test]
    fn test_scroll_to_section() {
        let doc = setup();
        let spy = ScrollSpy::attach(doc.clone(), ids(), &ScrollConfig::default());
        assert!(spy.scroll_to_section("about"));
        run_frame();
        assert_eq!(doc.scroll_y(), 900.0);
        assert_eq!(spy.active().as_deref(), Some("about"));
        assert!(!spy.scroll_to_section("projects"));
        spy.detach();
    }

    #[test]
    fn test_progress() {
        let doc = setup();
        let progress = ScrollProgress::attach(doc.clone());
        assert_eq!(progress.progress(), 0.0);

        // scroll height 2500, viewport 900 -> range 1600
        scroll(&doc, 800.0);
        assert_eq!(progress.progress(), 0.5);
        scroll(&doc, 5000.0);
        assert_eq!(progress.progress(), 1.0);
        progress.detach();
    }

    #[test]
    fn test_detach_removes_listeners_and_frames() {
        let doc = setup();
        let spy = ScrollSpy::attach(doc.clone(), ids(), &ScrollConfig::default());
        let progress = ScrollProgress::attach(doc.clone());
        dispatch(WindowEvent::Scroll);
        assert_eq!(pending_frame_count(), 2);

        spy.detach();
        progress.detach();
        assert_eq!(total_listener_count(), 0);
        assert_eq!(pending_frame_count(), 0);
    }
}
