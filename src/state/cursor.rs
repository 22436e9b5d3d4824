//! Pointer / cursor state for the cursor follower.
//!
//! ```text
//! Hidden --first move / enter (once positioned)--> Visible --leave--> Hidden
//!                                  |
//!                      Default <---+---> Pointer   (target matches the
//!                                                   interactive selector)
//! ```
//!
//! The interactive selector is
//! `a, button, [role="button"], input, textarea, select, label, [tabindex]`,
//! matched against the event target or any of its ancestors.

use crate::engine::PointerEvent;
use crate::types::ElementInfo;

/// Tags that count as interactive on their own.
const INTERACTIVE_TAGS: &[&str] = &["a", "button", "input", "textarea", "select", "label"];

/// Does this single element match the interactive selector?
pub fn is_interactive(element: &ElementInfo) -> bool {
    let tag = element.tag.to_ascii_lowercase();
    INTERACTIVE_TAGS.contains(&tag.as_str())
        || element.role.as_deref() == Some("button")
        || element.has_tabindex
}

/// Does the target (first) or any ancestor match?
pub fn path_is_interactive(path: &[ElementInfo]) -> bool {
    path.iter().any(is_interactive)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    #[default]
    Default,
    Pointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CursorState {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
    pub over_interactive: bool,
    /// Whether any move has set `x`/`y` yet.
    pub positioned: bool,
}

impl CursorState {
    /// Pointer moved. Always makes the cursor visible.
    pub fn on_move(&mut self, event: &PointerEvent) {
        self.x = event.x;
        self.y = event.y;
        self.visible = true;
        self.positioned = true;
        self.over_interactive = path_is_interactive(&event.path);
    }

    /// Pointer entered the window. Stays hidden until a move gives a position.
    pub fn on_enter(&mut self) {
        if self.positioned {
            self.visible = true;
        }
    }

    pub fn on_leave(&mut self) {
        self.visible = false;
    }

    pub fn mode(&self) -> CursorMode {
        if self.over_interactive {
            CursorMode::Pointer
        } else {
            CursorMode::Default
        }
    }
}

/// One easing step of `current` toward `target`.
///
/// Returns the new position and whether it has converged (snapped).
pub fn ease_toward(current: (f64, f64), target: (f64, f64), factor: f64, epsilon: f64) -> ((f64, f64), bool) {
    let dx = target.0 - current.0;
    let dy = target.1 - current.1;
    if dx.hypot(dy) <= epsilon {
        return (target, true);
    }
    let next = (current.0 + dx * factor, current.1 + dy * factor);
    let remaining = (target.0 - next.0).hypot(target.1 - next.1);
    if remaining <= epsilon {
        (target, true)
    } else {
        (next, false)
    }
}
