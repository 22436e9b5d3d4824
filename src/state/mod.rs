//! State Module - the page's reactive state.
//!
//! - **Locale** - active language, lookup, persistence
//! - **Cursor** - pointer state machine for the cursor follower
//! - **Scroll** - scroll-spy and reading progress
//! - **Contact** - form validation and submit cycle
//! - **Toast** - queue feeding the deferred toast surface
//! - **Typing** - hero role ticker
//! - **Assets** - résumé selection and external links

pub mod assets;
pub mod contact;
pub mod cursor;
pub mod locale;
pub mod scroll;
pub mod toast;
pub mod typing;

pub use contact::{ContactForm, ContactSubmission, FormPhase, SubmissionSink, ValidationErrors};
pub use locale::{Dictionaries, JsonFileStore, Language, Locale, MemoryStore, PreferenceStore};
pub use scroll::{ScrollProgress, ScrollSpy};
pub use toast::{Toast, ToastQueue};
