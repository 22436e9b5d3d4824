//! Toast surface.
//!
//! Attaches to the shared [`ToastQueue`](crate::state::toast::ToastQueue),
//! shows each toast as an overlay node and dismisses it after the
//! configured duration.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::engine::{clear_timeout, set_timeout, Node, NodeRole, NodeStyle, TimerId};
use crate::error::LoadError;
use crate::pipeline::loader::{Enhancement, EnhancementContext};
use crate::types::Cleanup;

pub const TOAST_Z_INDEX: i32 = 100;

pub struct Toaster;

impl Enhancement for Toaster {
    fn mount(&self, ctx: &EnhancementContext) -> Result<Cleanup, LoadError> {
        let document = ctx.document.clone();
        let duration = ctx.config.toast_duration_ms;
        let live: Rc<RefCell<BTreeMap<String, TimerId>>> = Rc::new(RefCell::new(BTreeMap::new()));
        let next_id = Rc::new(Cell::new(0u64));

        let detach = {
            let document = document.clone();
            let live = live.clone();
            ctx.toasts.attach(move |toast| {
                let id = format!("toast-{}", next_id.get());
                next_id.set(next_id.get() + 1);

                let text = if toast.description.is_empty() {
                    toast.title
                } else {
                    format!("{}\n{}", toast.title, toast.description)
                };
                document.insert(
                    Node::new(id.clone(), NodeRole::Overlay)
                        .with_text(text)
                        .with_style(NodeStyle {
                            pointer_events: true,
                            ..NodeStyle::overlay(TOAST_Z_INDEX)
                        }),
                );

                let timer = {
                    let document = document.clone();
                    let live = live.clone();
                    let id = id.clone();
                    set_timeout(duration, move || {
                        live.borrow_mut().remove(&id);
                        document.remove(&id);
                    })
                };
                live.borrow_mut().insert(id, timer);
            })
        };

        Ok(Box::new(move || {
            detach();
            let remaining = std::mem::take(&mut *live.borrow_mut());
            for (id, timer) in remaining {
                clear_timeout(timer);
                document.remove(&id);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{advance_time, pending_timer_count, NodeRole};
    use crate::enhancements::test_context;
    use crate::state::toast::Toast;

    #[test]
    fn test_backlog_shown_on_mount_and_dismissed() {
        let ctx = test_context();
        ctx.toasts.push(Toast::new("Download started", "English CV"));

        let cleanup = Toaster.mount(&ctx).unwrap();
        assert_eq!(ctx.document.nodes_with_role(NodeRole::Overlay), vec!["toast-0"]);
        assert!(ctx.document.node("toast-0").unwrap().text.contains("English CV"));

        ctx.toasts.push(Toast::new("Again", ""));
        assert_eq!(ctx.document.nodes_with_role(NodeRole::Overlay).len(), 2);

        advance_time(ctx.config.toast_duration_ms);
        assert!(ctx.document.nodes_with_role(NodeRole::Overlay).is_empty());
        cleanup();
    }

    #[test]
    fn test_cleanup_clears_timers_and_detaches() {
        let ctx = test_context();
        let cleanup = Toaster.mount(&ctx).unwrap();
        ctx.toasts.push(Toast::new("Hi", ""));
        assert_eq!(pending_timer_count(), 1);

        cleanup();
        assert_eq!(pending_timer_count(), 0);
        assert!(!ctx.document.contains("toast-0"));
        assert!(!ctx.toasts.is_attached());
    }
}
