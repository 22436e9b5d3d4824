//! Layout Module
//!
//! Page-level layout for mounted sections, computed with Taffy.

pub mod page;

pub use page::{compute_page_layout, PageLayout, SectionOffset};
