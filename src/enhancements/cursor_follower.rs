//! Cursor Follower - ring + dot overlay that trails the pointer.
//!
//! The dot tracks the pointer exactly; the ring eases toward it on a
//! frame loop that stops once it has caught up. Over interactive
//! elements the ring grows and the dot hides. Both overlays ignore the
//! pointer so they never steal clicks.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::engine::{
    on_pointer_enter, on_pointer_leave, on_pointer_move, CleanupList, Document, FrameGuard,
    FrameLoop, Node, NodeRole, NodeStyle,
};
use crate::error::LoadError;
use crate::pipeline::loader::{Enhancement, EnhancementContext};
use crate::state::cursor::{ease_toward, CursorMode, CursorState};
use crate::types::Cleanup;

pub const RING_ID: &str = "cursor-ring";
pub const DOT_ID: &str = "cursor-dot";
pub const CURSOR_Z_INDEX: i32 = 9999;

pub struct CursorFollower;

impl Enhancement for CursorFollower {
    fn mount(&self, ctx: &EnhancementContext) -> Result<Cleanup, LoadError> {
        let document = ctx.document.clone();
        let hidden = NodeStyle {
            opacity: 0.0,
            ..NodeStyle::overlay(CURSOR_Z_INDEX)
        };
        document.insert(Node::new(RING_ID, NodeRole::Overlay).with_style(hidden));
        document.insert(Node::new(DOT_ID, NodeRole::Overlay).with_style(hidden));

        let state = Rc::new(RefCell::new(CursorState::default()));
        let ring = Rc::new(Cell::new((0.0, 0.0)));
        let pointer_scale = ctx.config.cursor.pointer_scale;
        let easing = ctx.config.cursor.ring_easing;
        let epsilon = ctx.config.cursor.settle_epsilon;

        let ring_loop = {
            let document = document.clone();
            let state = state.clone();
            let ring = ring.clone();
            Rc::new(FrameLoop::new(move |_| {
                let target = {
                    let s = state.borrow();
                    (s.x, s.y)
                };
                let (next, settled) = ease_toward(ring.get(), target, easing, epsilon);
                ring.set(next);
                document.update_style(RING_ID, |style| style.translate = next);
                !settled
            }))
        };

        let guard = FrameGuard::new();
        let apply = {
            let document = document.clone();
            let state = state.clone();
            move || {
                let s = *state.borrow();
                apply_state(&document, &s, pointer_scale);
            }
        };
        let schedule_apply = {
            let guard = guard.clone();
            move || {
                let apply = apply.clone();
                guard.schedule(move |_| apply());
            }
        };

        let cleanups = CleanupList::new();
        let first_move = Rc::new(Cell::new(true));
        {
            let state = state.clone();
            let ring = ring.clone();
            let ring_loop = ring_loop.clone();
            let schedule_apply = schedule_apply.clone();
            let first_move = first_move.clone();
            cleanups.add(on_pointer_move(move |event| {
                state.borrow_mut().on_move(event);
                if first_move.replace(false) {
                    ring.set((event.x, event.y));
                }
                schedule_apply();
                ring_loop.start();
            }));
        }
        {
            let state = state.clone();
            let schedule_apply = schedule_apply.clone();
            cleanups.add(on_pointer_enter(move || {
                state.borrow_mut().on_enter();
                schedule_apply();
            }));
        }
        {
            let state = state.clone();
            let schedule_apply = schedule_apply.clone();
            cleanups.add(on_pointer_leave(move || {
                state.borrow_mut().on_leave();
                schedule_apply();
            }));
        }
        cleanups.add(move || guard.cancel());
        cleanups.add(move || ring_loop.stop());

        // The move that loaded us has already been dispatched.
        let seed = ctx.last_pointer.borrow().clone();
        if let Some(event) = seed {
            state.borrow_mut().on_move(&event);
            ring.set((event.x, event.y));
            first_move.set(false);
            document.update_style(RING_ID, |style| style.translate = (event.x, event.y));
            schedule_apply();
        }

        Ok(Box::new(move || {
            cleanups.run();
            document.remove(RING_ID);
            document.remove(DOT_ID);
        }))
    }
}

fn apply_state(document: &Document, state: &CursorState, pointer_scale: f64) {
    let visible = if state.visible { 1.0 } else { 0.0 };
    let pointer = state.mode() == CursorMode::Pointer;

    document.update_style(DOT_ID, |style| {
        style.translate = (state.x, state.y);
        style.opacity = if pointer { 0.0 } else { visible };
    });
    document.update_style(RING_ID, |style| {
        style.opacity = visible;
        style.scale = if pointer { pointer_scale } else { 1.0 };
    });
}
