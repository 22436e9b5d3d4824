//! Language toggle button. Labelled with the language it switches to.

use spark_signals::effect;

use crate::engine::{on_click, Node, NodeRole, NodeStyle};
use crate::error::LoadError;
use crate::pipeline::loader::{Enhancement, EnhancementContext};
use crate::types::Cleanup;

pub const TOGGLE_ID: &str = "language-toggle";

pub struct LanguageToggle;

impl Enhancement for LanguageToggle {
    fn mount(&self, ctx: &EnhancementContext) -> Result<Cleanup, LoadError> {
        let document = ctx.document.clone();
        document.insert(Node::new(TOGGLE_ID, NodeRole::Overlay).with_style(NodeStyle {
            pointer_events: true,
            ..NodeStyle::overlay(50)
        }));

        let stop_label = {
            let document = document.clone();
            let locale = ctx.locale.clone();
            effect(move || {
                let label = locale.t("toggle.switch_to");
                document.update(TOGGLE_ID, |node| node.text = label);
            })
        };

        let locale = ctx.locale.clone();
        let detach_click = on_click(TOGGLE_ID, move || {
            let now = locale.toggle();
            log::debug!(target: "folio::locale", "switched to {}", now.code());
        });

        Ok(Box::new(move || {
            detach_click();
            stop_label();
            document.remove(TOGGLE_ID);
        }))
    }
}
