//! Core types shared across the crate.
//!
//! Cleanup closures, host capabilities, event-target descriptions, and the
//! pass-through link types the page hands to the browser untouched.

use serde::{Deserialize, Serialize};

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by every registration (timer, frame, listener,
/// mounted enhancement, mounted section).
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Capabilities (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Environment capabilities, detected once at startup.
    ///
    /// Enhancements declare what they need; anything the host lacks is
    /// skipped outright instead of attempted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Capabilities: u8 {
        const NONE = 0;
        /// A hovering, fine pointer (mouse or trackpad). `(hover: none)` hosts lack it.
        const FINE_POINTER = 1 << 0;
        /// A WebGL context can be created.
        const WEBGL = 1 << 1;
        /// Motion is allowed (no reduced-motion preference).
        const MOTION = 1 << 2;
    }
}

impl Capabilities {
    /// A desktop browser with everything available.
    pub fn desktop() -> Self {
        Self::FINE_POINTER | Self::WEBGL | Self::MOTION
    }

    /// A touch device: no hover, still animates.
    pub fn touch() -> Self {
        Self::WEBGL | Self::MOTION
    }

    /// Check whether every capability in `required` is present.
    pub fn satisfies(self, required: Capabilities) -> bool {
        self.contains(required)
    }
}

// =============================================================================
// Event Targets
// =============================================================================

/// Minimal description of a DOM element as seen by an event target chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementInfo {
    /// Lowercase tag name ("a", "button", "div", ...).
    pub tag: String,
    /// ARIA role attribute, if present.
    pub role: Option<String>,
    /// Whether the element carries an explicit `tabindex`.
    pub has_tabindex: bool,
    /// Element id, if present.
    pub id: Option<String>,
}

impl ElementInfo {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_tabindex(mut self) -> Self {
        self.has_tabindex = true;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

// =============================================================================
// External Links
// =============================================================================

/// Where a navigation opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenTarget {
    /// Replace the current page.
    SameContext,
    /// A new tab/window (`target="_blank"`).
    NewContext,
}

/// A link the page hands to the browser unprocessed (live demo, source
/// repository, certificate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub url: String,
    #[serde(default = "default_link_target")]
    pub target: OpenTarget,
}

fn default_link_target() -> OpenTarget {
    OpenTarget::NewContext
}

impl ExternalLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            target: OpenTarget::NewContext,
        }
    }
}

/// Seam for opening documents and links. The browser build routes this to
/// `window.open`; tests record calls.
pub trait Opener {
    fn open(&self, url: &str, target: OpenTarget);
}

// =============================================================================
// Tests
// =============================================================================
