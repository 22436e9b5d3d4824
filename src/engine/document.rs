//! Document - the DOM subset the scheduler touches.
//!
//! Nodes carry a role, text, a visible paint area, and a handful of style
//! properties (stacking, pointer events, opacity, transform). The document
//! also keeps:
//!
//! - the **LCP timeline**: an entry is recorded whenever a contentful node
//!   paints inside the viewport with an area strictly larger than the
//!   current candidate. Removing the candidate node invalidates it, so the
//!   next contentful paint records a fresh (later) entry.
//! - the ordered set of **mounted sections**, laid out with Taffy to give
//!   section offsets and the scroll height.
//! - the **viewport** and **scroll position**.
//!
//! `Document` is a cheap `Rc` handle; clones share one tree.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use super::timers::now_ms;
use crate::layout::{compute_page_layout, PageLayout};

// =============================================================================
// Types
// =============================================================================

/// What a node is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Pre-rendered, non-interactive copy of the hero painted before the app.
    StaticShell,
    /// A page section container.
    Section,
    /// Text or media inside a section. Contentful.
    Content,
    /// Decorative overlay (cursor, grain, shader canvas, toasts).
    Overlay,
}

impl NodeRole {
    fn is_contentful(self) -> bool {
        matches!(self, Self::StaticShell | Self::Content)
    }
}

/// Style properties the scheduler mutates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub z_index: i32,
    pub pointer_events: bool,
    pub opacity: f64,
    pub translate: (f64, f64),
    pub scale: f64,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            z_index: 0,
            pointer_events: true,
            opacity: 1.0,
            translate: (0.0, 0.0),
            scale: 1.0,
        }
    }
}

impl NodeStyle {
    /// Fixed decorative overlay: never intercepts the pointer.
    pub fn overlay(z_index: i32) -> Self {
        Self {
            z_index,
            pointer_events: false,
            ..Self::default()
        }
    }
}

/// A document node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub role: NodeRole,
    pub text: String,
    /// Rendered area in px² if painted at the top of the page.
    pub area: f64,
    /// Owning section id, for content nodes.
    pub section: Option<String>,
    pub style: NodeStyle,
}

impl Node {
    pub fn new(id: impl Into<String>, role: NodeRole) -> Self {
        Self {
            id: id.into(),
            role,
            text: String::new(),
            area: 0.0,
            section: None,
            style: NodeStyle::default(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_area(mut self, area: f64) -> Self {
        self.area = area;
        self
    }

    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

/// One entry of the largest-contentful-paint timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct LcpEntry {
    pub node_id: String,
    pub area: f64,
    pub time_ms: u64,
}

// =============================================================================
// Document
// =============================================================================

struct DocumentInner {
    nodes: HashMap<String, Node>,
    /// Current LCP candidate (node id, area).
    candidate: Option<(String, f64)>,
    lcp: Vec<LcpEntry>,
    /// Document-order index -> (section id, height).
    sections: BTreeMap<usize, (String, f64)>,
    viewport: (f64, f64),
    scroll_y: f64,
    /// Bumped whenever section geometry or the viewport changes.
    generation: u64,
    layout_cache: Option<(u64, PageLayout)>,
}

/// Shared document handle.
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Document {
    /// Empty document with the given viewport size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DocumentInner {
                nodes: HashMap::new(),
                candidate: None,
                lcp: Vec::new(),
                sections: BTreeMap::new(),
                viewport: (width, height),
                scroll_y: 0.0,
                generation: 0,
                layout_cache: None,
            })),
        }
    }

    /// Paint the static, pre-application copy of the hero.
    pub fn paint_static_shell(&self, id: &str, text: &str, area: f64) {
        self.insert(Node::new(id, NodeRole::StaticShell).with_text(text).with_area(area));
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Insert (or replace) a node and record the paint.
    pub fn insert(&self, node: Node) {
        let mut inner = self.inner.borrow_mut();
        let in_viewport = Self::node_in_viewport(&mut inner, &node);
        if node.role.is_contentful() && in_viewport {
            Self::record_paint(&mut inner, &node.id, node.area);
        }
        inner.nodes.insert(node.id.clone(), node);
    }

    fn node_in_viewport(inner: &mut DocumentInner, node: &Node) -> bool {
        let Some(section) = node.section.as_deref() else {
            return true;
        };
        let viewport_h = inner.viewport.1;
        let scroll_y = inner.scroll_y;
        let layout = Self::layout_of(inner);
        layout
            .offset_of(section)
            .is_none_or(|offset| offset.top < scroll_y + viewport_h && offset.top + offset.height > scroll_y)
    }

    fn record_paint(inner: &mut DocumentInner, id: &str, area: f64) {
        if area <= 0.0 {
            return;
        }
        let larger = inner.candidate.as_ref().is_none_or(|(_, current)| area > *current);
        if larger {
            inner.candidate = Some((id.to_string(), area));
            inner.lcp.push(LcpEntry {
                node_id: id.to_string(),
                area,
                time_ms: now_ms(),
            });
        }
    }

    /// Mutate a node in place. Returns `false` if it does not exist.
    pub fn update<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Node),
    {
        let mut inner = self.inner.borrow_mut();
        match inner.nodes.get_mut(id) {
            Some(node) => {
                f(node);
                true
            }
            None => false,
        }
    }

    /// Mutate a node's style in place. Returns `false` if it does not exist.
    pub fn update_style<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut NodeStyle),
    {
        self.update(id, |node| f(&mut node.style))
    }

    /// Detach a node. Detaching the LCP candidate invalidates it.
    pub fn remove(&self, id: &str) -> Option<Node> {
        let mut inner = self.inner.borrow_mut();
        let removed = inner.nodes.remove(id)?;
        if inner.candidate.as_ref().is_some_and(|(candidate, _)| candidate == id) {
            inner.candidate = None;
        }
        Some(removed)
    }

    pub fn node(&self, id: &str) -> Option<Node> {
        self.inner.borrow().nodes.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.borrow().nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    /// Ids of all nodes with `role`, sorted.
    pub fn nodes_with_role(&self, role: NodeRole) -> Vec<String> {
        let inner = self.inner.borrow();
        let mut ids: Vec<String> = inner
            .nodes
            .values()
            .filter(|node| node.role == role)
            .map(|node| node.id.clone())
            .collect();
        ids.sort();
        ids
    }

    // =========================================================================
    // LCP
    // =========================================================================

    /// Every LCP entry recorded so far, oldest first.
    pub fn lcp_entries(&self) -> Vec<LcpEntry> {
        self.inner.borrow().lcp.clone()
    }

    /// The final LCP entry, i.e. what the browser would report.
    pub fn largest_contentful_paint(&self) -> Option<LcpEntry> {
        self.inner.borrow().lcp.last().cloned()
    }

    // =========================================================================
    // Sections
    // =========================================================================

    /// Register a section container at its document-order position.
    pub fn mount_section(&self, order: usize, id: &str, height: f64) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.sections.insert(order, (id.to_string(), height));
            inner.generation += 1;
        }
        self.insert(Node::new(id, NodeRole::Section));
    }

    /// Remove a section container and every node inside it.
    pub fn unmount_section(&self, id: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.sections.retain(|_, (section, _)| section != id);
        inner.nodes.retain(|_, node| node.id != id && node.section.as_deref() != Some(id));
        if inner
            .candidate
            .as_ref()
            .is_some_and(|(candidate, _)| !inner.nodes.contains_key(candidate))
        {
            inner.candidate = None;
        }
        inner.generation += 1;
    }

    /// Mounted section ids in document order.
    pub fn section_ids(&self) -> Vec<String> {
        self.inner
            .borrow()
            .sections
            .values()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Layout of the mounted sections (cached per generation).
    pub fn layout(&self) -> PageLayout {
        let mut inner = self.inner.borrow_mut();
        Self::layout_of(&mut inner).clone()
    }

    fn layout_of(inner: &mut DocumentInner) -> &PageLayout {
        let stale = inner
            .layout_cache
            .as_ref()
            .is_none_or(|(generation, _)| *generation != inner.generation);
        if stale {
            inner.layout_cache = None;
        }
        let generation = inner.generation;
        let width = inner.viewport.0;
        let sections = &inner.sections;
        let (_, layout) = inner.layout_cache.get_or_insert_with(|| {
            let blocks: Vec<(String, f64)> = sections.values().cloned().collect();
            (generation, compute_page_layout(&blocks, width))
        });
        layout
    }

    /// Total scrollable height.
    pub fn scroll_height(&self) -> f64 {
        let viewport_h = self.viewport().1;
        self.layout().content_height.max(viewport_h)
    }

    /// Changes whenever section geometry or the viewport changes.
    pub fn generation(&self) -> u64 {
        self.inner.borrow().generation
    }

    // =========================================================================
    // Viewport & Scroll
    // =========================================================================

    pub fn viewport(&self) -> (f64, f64) {
        self.inner.borrow().viewport
    }

    pub fn resize(&self, width: f64, height: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.viewport = (width, height);
        inner.generation += 1;
    }

    pub fn scroll_y(&self) -> f64 {
        self.inner.borrow().scroll_y
    }

    /// Scroll to `y`, clamped to the scrollable range.
    pub fn scroll_to(&self, y: f64) {
        let max = (self.scroll_height() - self.viewport().1).max(0.0);
        self.inner.borrow_mut().scroll_y = y.clamp(0.0, max);
    }
}

// =============================================================================
// Tests
// =============================================================================
