//! Page Layout - vertical flow of mounted sections via Taffy
//!
//! Sections stack in a single flex column as wide as the viewport. Taffy
//! resolves each section's top offset and the total scroll height, which
//! the scroll-spy and the scroll-progress bar read.

use taffy::{AvailableSpace, Dimension, Display, FlexDirection, NodeId, Size, Style, TaffyTree};

// =============================================================================
// Types
// =============================================================================

/// Resolved position of one section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOffset {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// Result of laying out the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub sections: Vec<SectionOffset>,
    pub content_height: f64,
}

impl PageLayout {
    /// Offset of a section by id.
    pub fn offset_of(&self, id: &str) -> Option<&SectionOffset> {
        self.sections.iter().find(|s| s.id == id)
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Lay out `blocks` (id, height) top to bottom in a viewport of `width`.
pub fn compute_page_layout(blocks: &[(String, f64)], width: f64) -> PageLayout {
    if blocks.is_empty() {
        return PageLayout::default();
    }

    match layout_with_taffy(blocks, width) {
        Ok(layout) => layout,
        Err(err) => {
            log::warn!(target: "folio::layout", "taffy layout failed, stacking sections manually: {err}");
            stacked_layout(blocks)
        }
    }
}

fn layout_with_taffy(blocks: &[(String, f64)], width: f64) -> taffy::TaffyResult<PageLayout> {
    let mut tree: TaffyTree<()> = TaffyTree::new();

    let mut children: Vec<NodeId> = Vec::with_capacity(blocks.len());
    for (_, height) in blocks {
        let style = Style {
            size: Size {
                width: Dimension::Percent(1.0),
                height: Dimension::Length(height.max(0.0) as f32),
            },
            // Sections keep their intrinsic height; the page scrolls instead.
            flex_shrink: 0.0,
            ..Default::default()
        };
        children.push(tree.new_leaf(style)?);
    }

    let root_style = Style {
        display: Display::Flex,
        flex_direction: FlexDirection::Column,
        size: Size {
            width: Dimension::Length(width.max(0.0) as f32),
            height: Dimension::Auto,
        },
        ..Default::default()
    };
    let root = tree.new_with_children(root_style, &children)?;

    let available = Size {
        width: AvailableSpace::Definite(width.max(0.0) as f32),
        height: AvailableSpace::MaxContent,
    };
    tree.compute_layout(root, available)?;

    let mut sections = Vec::with_capacity(blocks.len());
    for ((id, _), node) in blocks.iter().zip(&children) {
        let layout = tree.layout(*node)?;
        sections.push(SectionOffset {
            id: id.clone(),
            top: layout.location.y as f64,
            height: layout.size.height as f64,
        });
    }

    let content_height = tree.layout(root)?.size.height as f64;
    Ok(PageLayout {
        sections,
        content_height,
    })
}

/// Plain running-sum layout, used only if Taffy reports an error.
fn stacked_layout(blocks: &[(String, f64)]) -> PageLayout {
    let mut top = 0.0;
    let sections = blocks
        .iter()
        .map(|(id, height)| {
            let offset = SectionOffset {
                id: id.clone(),
                top,
                height: height.max(0.0),
            };
            top += height.max(0.0);
            offset
        })
        .collect();
    PageLayout {
        sections,
        content_height: top,
    }
}
