//! Section Content Provider.
//!
//! The ordered section list is both the page content and the in-page
//! navigation registry. Eager sections (the leading block, i.e. the first
//! viewport) render synchronously with the critical shell. Lazy sections
//! are requested only after the first frame has painted plus a settle
//! delay, each behind its own suspension boundary.
//!
//! Resolved sections are placed at their document-order index, so the
//! page reads top-to-bottom in registry order no matter which chunk
//! arrives first.
//!
//! # API
//!
//! - [`SectionProvider::new`] - validate a section list
//! - [`SectionProvider::ids`] - navigation registry
//! - [`SectionProvider::mount_eager`] - render the leading block now
//! - [`SectionProvider::schedule_lazy`] - request the rest after first paint
//! - [`localized_text`] - a content node that follows the active language

use std::collections::HashSet;
use std::rc::{Rc, Weak};

use spark_signals::effect;

use crate::config::ShellConfig;
use crate::engine::{
    cancel_animation_frame, clear_timeout, request_animation_frame, set_timeout, CleanupList,
    Document, Node, NodeRole,
};
use crate::error::{LoadError, SectionError};
use crate::primitives::{suspense, Lazy};
use crate::state::locale::Locale;
use crate::types::Cleanup;

use super::critical;

// =============================================================================
// Types
// =============================================================================

/// What a section's render function gets.
#[derive(Clone)]
pub struct SectionContext {
    pub id: String,
    pub document: Document,
    pub locale: Locale,
    pub config: Rc<ShellConfig>,
}

/// Renders a section's content into the document; the cleanup removes it.
pub type SectionRender = Rc<dyn Fn(&SectionContext) -> Result<Cleanup, LoadError>>;

type SectionLoad = Box<dyn FnOnce() -> Result<SectionRender, LoadError>>;

enum SectionSource {
    Eager(SectionRender),
    Lazy(SectionLoad),
}

pub struct SectionDescriptor {
    pub id: String,
    /// Layout height in px.
    pub height: f64,
    source: SectionSource,
}

impl SectionDescriptor {
    /// Part of the first viewport: rendered synchronously.
    pub fn eager<F>(id: impl Into<String>, height: f64, render: F) -> Self
    where
        F: Fn(&SectionContext) -> Result<Cleanup, LoadError> + 'static,
    {
        Self {
            id: id.into(),
            height,
            source: SectionSource::Eager(Rc::new(render)),
        }
    }

    /// Below the fold: `load` produces the renderer on demand.
    pub fn lazy<F>(id: impl Into<String>, height: f64, load: F) -> Self
    where
        F: FnOnce() -> Result<SectionRender, LoadError> + 'static,
    {
        Self {
            id: id.into(),
            height,
            source: SectionSource::Lazy(Box::new(load)),
        }
    }

    pub fn is_eager(&self) -> bool {
        matches!(self.source, SectionSource::Eager(_))
    }
}

// =============================================================================
// Provider
// =============================================================================

enum Slot {
    Eager(SectionRender),
    Lazy(Lazy<SectionRender>),
}

struct Section {
    id: String,
    height: f64,
    order: usize,
    slot: Slot,
}

struct ProviderInner {
    sections: Vec<Section>,
    document: Document,
    locale: Locale,
    config: Rc<ShellConfig>,
    cleanups: CleanupList,
}

/// Shared provider handle.
#[derive(Clone)]
pub struct SectionProvider {
    inner: Rc<ProviderInner>,
}

impl SectionProvider {
    /// Validate `descriptors` and take ownership of them.
    ///
    /// Ids must be unique, at least one section must be eager, and eager
    /// sections must form the leading block.
    pub fn new(
        descriptors: Vec<SectionDescriptor>,
        document: Document,
        locale: Locale,
        config: Rc<ShellConfig>,
    ) -> Result<Self, SectionError> {
        let mut seen = HashSet::new();
        let mut lazy_seen = false;
        for descriptor in &descriptors {
            if !seen.insert(descriptor.id.as_str()) {
                return Err(SectionError::DuplicateId(descriptor.id.clone()));
            }
            if descriptor.is_eager() {
                if lazy_seen {
                    return Err(SectionError::EagerAfterLazy(descriptor.id.clone()));
                }
            } else {
                lazy_seen = true;
            }
        }
        if !descriptors.first().is_some_and(SectionDescriptor::is_eager) {
            return Err(SectionError::NoEagerSection);
        }

        let sections = descriptors
            .into_iter()
            .enumerate()
            .map(|(order, descriptor)| Section {
                slot: match descriptor.source {
                    SectionSource::Eager(render) => Slot::Eager(render),
                    SectionSource::Lazy(load) => Slot::Lazy(Lazy::new(descriptor.id.clone(), load)),
                },
                id: descriptor.id,
                height: descriptor.height,
                order,
            })
            .collect();

        Ok(Self {
            inner: Rc::new(ProviderInner {
                sections,
                document,
                locale,
                config,
                cleanups: CleanupList::new(),
            }),
        })
    }

    /// Section ids in page order (the navigation registry).
    pub fn ids(&self) -> Vec<String> {
        self.inner.sections.iter().map(|s| s.id.clone()).collect()
    }

    pub fn eager_ids(&self) -> Vec<String> {
        self.inner
            .sections
            .iter()
            .filter(|s| matches!(s.slot, Slot::Eager(_)))
            .map(|s| s.id.clone())
            .collect()
    }

    /// Whether `id` is currently in the document.
    pub fn is_mounted(&self, id: &str) -> bool {
        self.inner.document.section_ids().iter().any(|mounted| mounted == id)
    }

    /// Render the eager block synchronously.
    pub fn mount_eager(&self) {
        for section in &self.inner.sections {
            if let Slot::Eager(render) = &section.slot {
                match mount_section(&self.inner, section, render) {
                    Ok(cleanup) => self.inner.cleanups.add_boxed(cleanup),
                    Err(err) => log::warn!(target: "folio::sections", "{err}; leaving it out"),
                }
            }
        }
    }

    /// Request every lazy section after the next frame plus `settle_ms`.
    pub fn schedule_lazy(&self, settle_ms: u64) {
        let weak = Rc::downgrade(&self.inner);
        let frame = request_animation_frame(move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.cleanups.has_run() {
                return;
            }
            let weak = Rc::downgrade(&inner);
            let timer = set_timeout(settle_ms, move || request_lazy(&weak));
            inner.cleanups.add(move || clear_timeout(timer));
        });
        self.inner.cleanups.add(move || cancel_animation_frame(frame));
    }

    /// Unmount every section and cancel pending work. Idempotent.
    pub fn teardown(&self) {
        self.inner.cleanups.run();
    }
}

fn request_lazy(weak: &Weak<ProviderInner>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    if inner.cleanups.has_run() {
        return;
    }
    log::debug!(target: "folio::sections", "requesting lazy sections");

    for (index, section) in inner.sections.iter().enumerate() {
        let Slot::Lazy(lazy) = &section.slot else {
            continue;
        };
        let weak = Rc::downgrade(&inner);
        let boundary = suspense(
            lazy,
            move |render: &SectionRender| {
                let Some(inner) = weak.upgrade() else {
                    return Ok(Box::new(|| {}) as Cleanup);
                };
                mount_section(&inner, &inner.sections[index], render)
            },
            None::<fn(&LoadError)>,
        );
        inner.cleanups.add_boxed(boundary);
    }
}

fn mount_section(inner: &ProviderInner, section: &Section, render: &SectionRender) -> Result<Cleanup, LoadError> {
    let document = inner.document.clone();
    document.mount_section(section.order, &section.id, section.height);

    let ctx = SectionContext {
        id: section.id.clone(),
        document: document.clone(),
        locale: inner.locale.clone(),
        config: inner.config.clone(),
    };
    match render(&ctx) {
        Ok(content) => {
            let id = section.id.clone();
            Ok(Box::new(move || {
                content();
                document.unmount_section(&id);
            }))
        }
        Err(err) => {
            document.unmount_section(&section.id);
            Err(err)
        }
    }
}

// =============================================================================
// Content helpers
// =============================================================================

/// Insert a content node whose text is `key` translated, kept in sync with
/// the active language.
///
/// The first run inserts (and paints) the node; language changes only
/// update its text in place.
pub fn localized_text(ctx: &SectionContext, key: &'static str, area: f64) -> Cleanup {
    let node_id = format!("{}:{key}", ctx.id);
    let document = ctx.document.clone();
    let locale = ctx.locale.clone();
    let section = ctx.id.clone();
    let id_for_effect = node_id.clone();

    let stop = effect(move || {
        let text = locale.t(key);
        let updated = document.update(&id_for_effect, |node| node.text = text.clone());
        if !updated {
            document.insert(
                Node::new(id_for_effect.clone(), NodeRole::Content)
                    .with_text(text)
                    .with_area(area)
                    .in_section(section.clone()),
            );
        }
    });

    let document = ctx.document.clone();
    Box::new(move || {
        stop();
        document.remove(&node_id);
    })
}

/// A section made of translated text blocks (title first).
pub fn text_section(keys: &'static [&'static str]) -> SectionRender {
    Rc::new(move |ctx: &SectionContext| {
        let parts: Vec<Cleanup> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| localized_text(ctx, *key, if i == 0 { 24_000.0 } else { 60_000.0 }))
            .collect();
        Ok(Box::new(move || {
            for part in parts.into_iter().rev() {
                part();
            }
        }) as Cleanup)
    })
}

/// The site's sections in page order: the hero up front, the rest lazy.
pub fn default_sections() -> Vec<SectionDescriptor> {
    vec![
        critical::hero_section(),
        SectionDescriptor::lazy("about", 900.0, || Ok(text_section(&["about.title", "about.p1", "about.p3", "about.skills"]))),
        SectionDescriptor::lazy("experience", 1100.0, || Ok(text_section(&["experience.title"]))),
        SectionDescriptor::lazy("education", 700.0, || Ok(text_section(&["education.title"]))),
        SectionDescriptor::lazy("certifications", 800.0, || {
            Ok(text_section(&["certifications.title", "certifications.view"]))
        }),
        SectionDescriptor::lazy("projects", 1200.0, || {
            Ok(text_section(&["projects.title", "projects.tab.web", "projects.tab.game"]))
        }),
        SectionDescriptor::lazy("contact", 900.0, || {
            Ok(text_section(&["contact.title", "contact.subtitle", "contact.footer"]))
        }),
    ]
}

// =============================================================================
// Tests
// =============================================================================
