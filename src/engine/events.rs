//! Window Events - Listener registry and dispatch
//!
//! State and handler registry for the window-level events the scheduler
//! cares about: pointer movement, pointer entering/leaving the document,
//! scroll, resize, and clicks.
//!
//! # API
//!
//! - `listen(kind, handler)` - Subscribe, returns cleanup
//! - `on_pointer_move(fn)`, `on_scroll(fn)`, ... - Typed shorthands
//! - `dispatch(event)` - Deliver an event, then drain microtasks
//! - `listener_count(kind)` - Leak checks
//!
//! A handler removed while a dispatch is in progress (including a handler
//! that removes itself) is not invoked again, not even later in the same
//! dispatch.
//!
//! # Example
//!
//! ```ignore
//! use folio_shell::engine::events;
//!
//! let cleanup = events::on_pointer_move(|event| {
//!     println!("pointer at ({}, {})", event.x, event.y);
//! });
//!
//! cleanup(); // detach
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::microtasks::flush_microtasks;
use crate::types::ElementInfo;

// =============================================================================
// TYPES
// =============================================================================

/// Pointer event with its target chain (target first, root last).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub path: Vec<ElementInfo>,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            path: Vec::new(),
        }
    }

    pub fn over(mut self, path: Vec<ElementInfo>) -> Self {
        self.path = path;
        self
    }
}

/// Window-level event.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    PointerMove(PointerEvent),
    /// Pointer entered the document element.
    PointerEnter,
    /// Pointer left the document element.
    PointerLeave,
    /// Document scrolled. Read the position from the document.
    Scroll,
    /// Viewport resized. Read the size from the document.
    Resize,
    /// Click on the element with this id.
    Click { target_id: String },
}

/// Event kind, used as the registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    PointerEnter,
    PointerLeave,
    Scroll,
    Resize,
    Click,
}

impl WindowEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PointerMove(_) => EventKind::PointerMove,
            Self::PointerEnter => EventKind::PointerEnter,
            Self::PointerLeave => EventKind::PointerLeave,
            Self::Scroll => EventKind::Scroll,
            Self::Resize => EventKind::Resize,
            Self::Click { .. } => EventKind::Click,
        }
    }
}

/// Handler for window events.
pub type EventHandler = Rc<dyn Fn(&WindowEvent)>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct HandlerRegistry {
    handlers: HashMap<EventKind, Vec<(usize, EventHandler)>>,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn contains(&self, kind: EventKind, id: usize) -> bool {
        self.handlers
            .get(&kind)
            .is_some_and(|list| list.iter().any(|(handler_id, _)| *handler_id == id))
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
}

// =============================================================================
// EVENT DISPATCH
// =============================================================================

/// Dispatch an event to every handler registered for its kind.
///
/// Handlers run in registration order. Microtasks queued by handlers are
/// drained before returning.
pub fn dispatch(event: WindowEvent) {
    let kind = event.kind();

    // Snapshot so handlers can add/remove listeners while we iterate.
    let snapshot: Vec<(usize, EventHandler)> = REGISTRY.with(|reg| {
        reg.borrow()
            .handlers
            .get(&kind)
            .map(|list| list.iter().map(|(id, h)| (*id, h.clone())).collect())
            .unwrap_or_default()
    });

    for (id, handler) in snapshot {
        let still_registered = REGISTRY.with(|reg| reg.borrow().contains(kind, id));
        if still_registered {
            handler(&event);
        }
    }

    flush_microtasks();
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to one event kind.
/// Returns cleanup function.
pub fn listen<F>(kind: EventKind, handler: F) -> impl FnOnce()
where
    F: Fn(&WindowEvent) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.handlers
            .entry(kind)
            .or_default()
            .push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.handlers.get_mut(&kind) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.handlers.remove(&kind);
                }
            }
        });
    }
}

/// Subscribe to pointer movement.
pub fn on_pointer_move<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&PointerEvent) + 'static,
{
    listen(EventKind::PointerMove, move |event| {
        if let WindowEvent::PointerMove(pointer) = event {
            handler(pointer);
        }
    })
}

/// Subscribe to the pointer entering the document.
pub fn on_pointer_enter<F>(handler: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    listen(EventKind::PointerEnter, move |_| handler())
}

/// Subscribe to the pointer leaving the document.
pub fn on_pointer_leave<F>(handler: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    listen(EventKind::PointerLeave, move |_| handler())
}

/// Subscribe to scroll.
pub fn on_scroll<F>(handler: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    listen(EventKind::Scroll, move |_| handler())
}

/// Subscribe to viewport resize.
pub fn on_resize<F>(handler: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    listen(EventKind::Resize, move |_| handler())
}

/// Subscribe to clicks on the element with `target_id`.
pub fn on_click<F>(target_id: &str, handler: F) -> impl FnOnce() + use<F>
where
    F: Fn() + 'static,
{
    let target_id = target_id.to_string();
    listen(EventKind::Click, move |event| {
        if let WindowEvent::Click { target_id: clicked } = event {
            if *clicked == target_id {
                handler();
            }
        }
    })
}

/// Number of live listeners for `kind`.
pub fn listener_count(kind: EventKind) -> usize {
    REGISTRY.with(|reg| reg.borrow().handlers.get(&kind).map_or(0, Vec::len))
}

/// Number of live listeners across all kinds.
pub fn total_listener_count() -> usize {
    REGISTRY.with(|reg| reg.borrow().handlers.values().map(Vec::len).sum())
}

/// Reset event state (for testing)
pub fn reset_events() {
    REGISTRY.with(|reg| *reg.borrow_mut() = HandlerRegistry::new());
}

// =============================================================================
// TESTS
// =============================================================================
