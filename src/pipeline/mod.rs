//! Startup Pipeline
//!
//! How the page comes up, in the order it happens:
//!
//! ```text
//! static placeholder (host) → critical shell → bridge demote → loader start
//!                                                   → lazy sections after first frame
//! ```
//!
//! - [`critical`] - eager sections, painted synchronously
//! - [`bridge`] - demotes the static placeholder without removing it
//! - [`loader`] - deferred enhancements and their triggers
//! - [`sections`] - section registry, eager and lazy mounting
//! - [`mount`] - the orchestration above plus the single teardown path

pub mod bridge;
pub mod critical;
pub mod loader;
pub mod mount;
pub mod sections;

pub use bridge::StaticShellBridge;
pub use critical::{hero_section, paint_critical, HERO_HEADING_AREA};
pub use loader::{
    Activation, DeferredLoader, Enhancement, EnhancementContext, EnhancementDescriptor,
    FeatureStatus, Trigger,
};
pub use mount::{mount, App, MountHandle};
pub use sections::{
    default_sections, localized_text, text_section, SectionContext, SectionDescriptor,
    SectionProvider, SectionRender,
};
