//! Primitives - deferred values and the boundaries that render them.
//!
//! - [`Lazy`] - memoized one-shot loader with a reactive phase
//! - [`suspense`] - renders a `Lazy` once resolved, swallows failures

mod control_flow;
mod lazy;

pub use control_flow::suspense;
pub use lazy::{Lazy, LoadPhase};
