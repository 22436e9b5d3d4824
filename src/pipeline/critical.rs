//! Critical Shell Renderer.
//!
//! Paints the first viewport synchronously: the hero with the owner's
//! name, the translated subtitle and call-to-action, and the typing role
//! line. It depends on the locale and configuration only. It never sees
//! the loader, so no deferred outcome can delay or alter it.

use spark_signals::effect;

use crate::engine::{Node, NodeRole};
use crate::error::LoadError;
use crate::state::typing::TypingTicker;
use crate::types::Cleanup;

use super::sections::{localized_text, SectionContext, SectionDescriptor, SectionProvider};

/// Paint area of the hero heading. The static placeholder is painted at
/// the same size, so the live heading never becomes a new LCP entry.
pub const HERO_HEADING_AREA: f64 = 90_000.0;

/// Height of the hero block (one full viewport on a typical laptop).
pub const HERO_HEIGHT: f64 = 800.0;

/// The hero: always eager, always first.
pub fn hero_section() -> SectionDescriptor {
    SectionDescriptor::eager("home", HERO_HEIGHT, render_hero)
}

fn render_hero(ctx: &SectionContext) -> Result<Cleanup, LoadError> {
    let name_id = format!("{}:hero.name", ctx.id);
    ctx.document.insert(
        Node::new(name_id.clone(), NodeRole::Content)
            .with_text(ctx.config.owner_name.clone())
            .with_area(HERO_HEADING_AREA)
            .in_section(ctx.id.clone()),
    );

    let available = localized_text(ctx, "hero.available", 4_000.0);
    let subtitle = localized_text(ctx, "hero.subtitle", 40_000.0);
    let cta = localized_text(ctx, "contact.cta", 6_000.0);

    let role_id = format!("{}:hero.role", ctx.id);
    ctx.document.insert(Node::new(role_id.clone(), NodeRole::Content).in_section(ctx.id.clone()));
    let ticker = TypingTicker::start(&ctx.config.typing);
    let role_text = ticker.text_signal();
    let document = ctx.document.clone();
    let role_for_effect = role_id.clone();
    let stop_role = effect(move || {
        let text = role_text.get();
        document.update(&role_for_effect, |node| node.text = text);
    });

    let document = ctx.document.clone();
    Ok(Box::new(move || {
        ticker.stop();
        stop_role();
        cta();
        subtitle();
        available();
        document.remove(&role_id);
        document.remove(&name_id);
    }))
}

/// Render the eager block. Returns the ids painted.
pub fn paint_critical(provider: &SectionProvider) -> Vec<String> {
    provider.mount_eager();
    let painted = provider.eager_ids();
    log::debug!(target: "folio::sections", "critical shell painted {painted:?}");
    painted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;
    use crate::engine::{advance_time, pending_timer_count, reset_engine, Document};
    use crate::state::locale::{Language, Locale, MemoryStore};
    use std::rc::Rc;

    fn setup() -> (SectionProvider, Document, Locale) {
        reset_engine();
        let doc = Document::new(1280.0, 800.0);
        let locale = Locale::builtin(MemoryStore::shared(), "lang", Language::En).unwrap();
        let config = Rc::new(ShellConfig {
            owner_name: "Ada Lovelace".into(),
            ..ShellConfig::default()
        });
        let provider = SectionProvider::new(vec![hero_section()], doc.clone(), locale.clone(), config).unwrap();
        (provider, doc, locale)
    }

    #[test]
    fn test_hero_paints_synchronously() {
        let (provider, doc, _) = setup();
        assert_eq!(paint_critical(&provider), vec!["home"]);

        assert_eq!(doc.section_ids(), vec!["home"]);
        assert_eq!(doc.node("home:hero.name").unwrap().text, "Ada Lovelace");
        assert!(doc.contains("home:hero.subtitle"));
    }

    #[test]
    fn test_placeholder_stays_lcp() {
        let (provider, doc, _) = setup();
        doc.paint_static_shell("static-shell", "Ada Lovelace", HERO_HEADING_AREA);
        advance_time(400);
        paint_critical(&provider);

        let lcp = doc.largest_contentful_paint().unwrap();
        assert_eq!(lcp.node_id, "static-shell");
        assert_eq!(lcp.time_ms, 0);
    }

    #[test]
    fn test_role_line_types() {
        let (provider, doc, _) = setup();
        paint_critical(&provider);
        advance_time(70);
        assert_eq!(doc.node("home:hero.role").unwrap().text, "S");
    }

    #[test]
    fn test_teardown_removes_hero_and_ticker() {
        let (provider, doc, _) = setup();
        paint_critical(&provider);
        provider.teardown();

        assert!(!doc.contains("home:hero.name"));
        assert_eq!(pending_timer_count(), 0);
    }

    #[test]
    fn test_hero_follows_language() {
        let (provider, doc, locale) = setup();
        paint_critical(&provider);
        let en = doc.node("home:hero.subtitle").unwrap().text;
        locale.toggle();
        assert_ne!(doc.node("home:hero.subtitle").unwrap().text, en);
    }
}
