//! Film-grain overlay.

use crate::engine::{Node, NodeRole, NodeStyle};
use crate::error::LoadError;
use crate::pipeline::loader::{Enhancement, EnhancementContext};
use crate::types::Cleanup;

pub const NOISE_ID: &str = "noise-overlay";
pub const NOISE_OPACITY: f64 = 0.035;

pub struct NoiseOverlay;

impl Enhancement for NoiseOverlay {
    fn mount(&self, ctx: &EnhancementContext) -> Result<Cleanup, LoadError> {
        let (width, height) = ctx.document.viewport();
        ctx.document.insert(
            Node::new(NOISE_ID, NodeRole::Overlay)
                .with_area(width * height)
                .with_style(NodeStyle {
                    opacity: NOISE_OPACITY,
                    ..NodeStyle::overlay(1)
                }),
        );

        let document = ctx.document.clone();
        Ok(Box::new(move || {
            document.remove(NOISE_ID);
        }))
    }
}
