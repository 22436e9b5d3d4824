//! Static Shell Bridge.
//!
//! The pre-rendered hero copy is the first LCP candidate. Removing it
//! would invalidate that candidate and push LCP to whenever the app
//! repaints, so the bridge only *demotes* it: behind the live content
//! and transparent to the pointer. It stays in the document for the
//! whole session.

use crate::engine::Document;

/// Stacking order for a demoted placeholder.
pub const DEMOTED_Z_INDEX: i32 = -1;

/// Sole owner of the placeholder node after mount.
pub struct StaticShellBridge {
    document: Document,
    placeholder_id: String,
}

impl StaticShellBridge {
    pub fn new(document: Document, placeholder_id: impl Into<String>) -> Self {
        Self {
            document,
            placeholder_id: placeholder_id.into(),
        }
    }

    /// Move the placeholder behind the app and stop it taking pointer events.
    ///
    /// Idempotent. Returns `false` (and does nothing) if there is no
    /// placeholder, e.g. when the page was rendered without one.
    pub fn demote(&self) -> bool {
        let found = self.document.update_style(&self.placeholder_id, |style| {
            style.pointer_events = false;
            style.z_index = DEMOTED_Z_INDEX;
        });
        if !found {
            log::trace!(target: "folio::bridge", "no `{}` placeholder to demote", self.placeholder_id);
        }
        found
    }

    pub fn placeholder_id(&self) -> &str {
        &self.placeholder_id
    }
}
