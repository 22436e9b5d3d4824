//! # folio-shell
//!
//! Progressive-hydration scheduler for a single-page bilingual portfolio.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for fine-grained reactivity.
//!
//! ## Architecture
//!
//! The first viewport is painted synchronously and never waits on anything
//! optional. Everything else is deferred:
//!
//! ```text
//! static placeholder → critical shell → demote placeholder → loader.start()
//!                                                   ├─ Immediate      → load now
//!                                                   ├─ Idle(ms)       → load after timer
//!                                                   └─ FirstPointerMove → load on first move
//! first frame + settle → lazy sections (suspense boundaries, document order)
//! ```
//!
//! The browser event loop is modelled by a thread-local host [`engine`]
//! (virtual clock, animation frames, microtasks, window events, document).
//!
//! ## Modules
//!
//! - [`types`] - Cleanup, Capabilities, element and link types
//! - [`engine`] - Host event loop and document
//! - [`layout`] - Taffy page layout for section offsets
//! - [`primitives`] - Lazy values and suspense boundaries
//! - [`pipeline`] - Critical shell, bridge, loader, sections, mount
//! - [`state`] - Locale, cursor, scroll, contact, toasts, typing
//! - [`enhancements`] - Cursor follower, noise, shader, toaster, language toggle
//! - [`config`] - `ShellConfig`

pub mod config;
pub mod engine;
pub mod enhancements;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod primitives;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::ShellConfig;

pub use error::{ConfigError, LoadError, MountError, RegistryError, SectionError};

pub use engine::{
    dispatch, reset_engine, tick, tick_frames, CleanupList, Document, PointerEvent, WindowEvent,
};

pub use pipeline::{
    mount, Activation, App, DeferredLoader, Enhancement, EnhancementContext,
    EnhancementDescriptor, FeatureStatus, MountHandle, SectionDescriptor, SectionProvider,
    StaticShellBridge, Trigger,
};

pub use primitives::{suspense, Lazy, LoadPhase};

pub use state::{
    ContactForm, ContactSubmission, FormPhase, Language, Locale, MemoryStore, PreferenceStore,
    Toast, ToastQueue,
};
