//! Deferred enhancements.
//!
//! Everything here is decorative or convenience: the page is complete
//! without any of it. Each module provides one [`Enhancement`];
//! [`builtin_enhancements`] wires them to their configured triggers and
//! capability requirements.

pub mod cursor_follower;
pub mod language_toggle;
pub mod noise;
pub mod shader;
pub mod toaster;

pub use cursor_follower::CursorFollower;
pub use language_toggle::LanguageToggle;
pub use noise::NoiseOverlay;
pub use shader::{ShaderBackground, ShaderFactory, ShaderProgram};
pub use toaster::Toaster;

use crate::config::FeatureTriggers;
use crate::pipeline::loader::{Enhancement, EnhancementDescriptor};
use crate::types::Capabilities;

pub const LANGUAGE_TOGGLE: &str = "language-toggle";
pub const TOASTER: &str = "toaster";
pub const NOISE: &str = "noise";
pub const SHADER: &str = "shader";
pub const CURSOR: &str = "cursor";

/// The site's enhancements. The shader is only registered when a program
/// factory is supplied.
pub fn builtin_enhancements(
    triggers: &FeatureTriggers,
    shader: Option<ShaderFactory>,
) -> Vec<EnhancementDescriptor> {
    let mut descriptors = vec![
        EnhancementDescriptor::new(LANGUAGE_TOGGLE, triggers.language_toggle, || {
            Ok(Box::new(LanguageToggle) as Box<dyn Enhancement>)
        }),
        EnhancementDescriptor::new(TOASTER, triggers.toaster, || Ok(Box::new(Toaster) as Box<dyn Enhancement>)),
        EnhancementDescriptor::new(NOISE, triggers.noise, || Ok(Box::new(NoiseOverlay) as Box<dyn Enhancement>)),
        EnhancementDescriptor::new(CURSOR, triggers.cursor, || {
            Ok(Box::new(CursorFollower) as Box<dyn Enhancement>)
        })
        .requires(Capabilities::FINE_POINTER),
    ];

    if let Some(factory) = shader {
        descriptors.push(
            EnhancementDescriptor::new(SHADER, triggers.shader, move || {
                let program = factory()?;
                Ok(Box::new(ShaderBackground::new(program)) as Box<dyn Enhancement>)
            })
            .requires(Capabilities::WEBGL),
        );
    }
    descriptors
}

#[cfg(test)]
pub(crate) fn test_context() -> crate::pipeline::loader::EnhancementContext {
    use crate::config::ShellConfig;
    use crate::engine::{reset_engine, Document};
    use crate::state::locale::{Language, Locale, MemoryStore};
    use crate::state::toast::ToastQueue;
    use std::rc::Rc;

    reset_engine();
    let _ = env_logger::builder().is_test(true).try_init();
    crate::pipeline::loader::EnhancementContext::new(
        Document::new(1280.0, 800.0),
        Locale::builtin(MemoryStore::shared(), "lang", Language::En).expect("bundled dictionaries parse"),
        ToastQueue::new(),
        Rc::new(ShellConfig::default()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::loader::Trigger;

    #[test]
    fn test_builtin_set() {
        let triggers = FeatureTriggers::default();
        let names: Vec<String> = builtin_enhancements(&triggers, None).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec![LANGUAGE_TOGGLE, TOASTER, NOISE, CURSOR]);

        let with_shader = builtin_enhancements(&triggers, Some(Box::new(|| Err(crate::error::LoadError::failed(SHADER, "n/a")))));
        let shader = with_shader.iter().find(|d| d.name == SHADER).unwrap();
        assert_eq!(shader.trigger, Trigger::Idle(3000));
        assert_eq!(shader.requires, Capabilities::WEBGL);
    }
}
