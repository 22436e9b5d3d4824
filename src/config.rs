//! Shell configuration.
//!
//! Every field has a default matching the live site, so an empty JSON
//! object (or no file at all) is a valid configuration.
//!
//! ```ignore
//! let config = ShellConfig::from_json(r#"{ "lazy_settle_ms": 250 }"#)?;
//! assert_eq!(config.placeholder_id, "static-shell");
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pipeline::loader::Trigger;
use crate::state::locale::Language;

// =============================================================================
// Sections
// =============================================================================

/// When each built-in enhancement may start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureTriggers {
    pub language_toggle: Trigger,
    pub toaster: Trigger,
    pub noise: Trigger,
    pub shader: Trigger,
    pub cursor: Trigger,
}

impl Default for FeatureTriggers {
    fn default() -> Self {
        Self {
            language_toggle: Trigger::Immediate,
            toaster: Trigger::Idle(2000),
            noise: Trigger::Idle(1500),
            shader: Trigger::Idle(3000),
            cursor: Trigger::OnFirstPointerMove,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Simulated network latency before the sink is called.
    pub submit_delay_ms: u64,
    /// How long the "sent" confirmation stays up.
    pub sent_duration_ms: u64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: 900,
            sent_duration_ms: 5000,
        }
    }
}

/// Per-language résumé documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeConfig {
    pub en: String,
    pub fr: String,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            en: "/resume-en.pdf".into(),
            fr: "/resume-fr.pdf".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// `scrolled` flips once the page moves past this many px.
    pub scrolled_threshold: f64,
    /// Scroll-spy marker line, as a fraction of the viewport height.
    pub spy_fraction: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            scrolled_threshold: 40.0,
            spy_fraction: 1.0 / 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Fraction of the remaining distance the ring covers per frame. 0.35
    /// closes 95% of the gap in seven 60 Hz frames, a 110 ms ease-out.
    pub ring_easing: f64,
    /// Ring scale over interactive elements.
    pub pointer_scale: f64,
    /// Distance (px) under which the ring snaps and the frame loop stops.
    pub settle_epsilon: f64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            ring_easing: 0.35,
            pointer_scale: 1.6,
            settle_epsilon: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    pub roles: Vec<String>,
    pub type_ms: u64,
    pub delete_ms: u64,
    pub pause_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            roles: vec![
                "Software Developer".into(),
                "Web Developer".into(),
                "Mobile Developer".into(),
                "Game Developer".into(),
            ],
            type_ms: 70,
            delete_ms: 40,
            pause_ms: 1400,
        }
    }
}

// =============================================================================
// ShellConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shown in the hero heading.
    pub owner_name: String,
    /// Id of the pre-rendered static hero copy.
    pub placeholder_id: String,
    /// Preference key for the chosen language.
    pub storage_key: String,
    pub default_language: Language,
    /// Extra delay after the first frame before lazy sections are requested.
    pub lazy_settle_ms: u64,
    pub toast_duration_ms: u64,
    pub features: FeatureTriggers,
    pub contact: ContactConfig,
    pub resume: ResumeConfig,
    pub scroll: ScrollConfig,
    pub cursor: CursorConfig,
    pub typing: TypingConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            owner_name: "Portfolio Owner".into(),
            placeholder_id: "static-shell".into(),
            storage_key: "portfolio-language".into(),
            default_language: Language::En,
            lazy_settle_ms: 0,
            toast_duration_ms: 5000,
            features: FeatureTriggers::default(),
            contact: ContactConfig::default(),
            resume: ResumeConfig::default(),
            scroll: ScrollConfig::default(),
            cursor: CursorConfig::default(),
            typing: TypingConfig::default(),
        }
    }
}

impl ShellConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Reject values the scheduler cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.placeholder_id.trim().is_empty() {
            return Err(invalid("placeholder_id", "must not be empty"));
        }
        if self.storage_key.trim().is_empty() {
            return Err(invalid("storage_key", "must not be empty"));
        }
        if !(self.cursor.ring_easing > 0.0 && self.cursor.ring_easing <= 1.0) {
            return Err(invalid("cursor.ring_easing", "must be in (0, 1]"));
        }
        if self.cursor.settle_epsilon <= 0.0 {
            return Err(invalid("cursor.settle_epsilon", "must be positive"));
        }
        if !(self.scroll.spy_fraction >= 0.0 && self.scroll.spy_fraction <= 1.0) {
            return Err(invalid("scroll.spy_fraction", "must be in [0, 1]"));
        }
        if self.typing.type_ms == 0 || self.typing.delete_ms == 0 {
            return Err(invalid("typing", "tick intervals must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = ShellConfig::from_json("{}").unwrap();
        assert_eq!(config, ShellConfig::default());
        assert_eq!(config.contact.sent_duration_ms, 5000);
        assert_eq!(config.features.cursor, Trigger::OnFirstPointerMove);
    }

    #[test]
    fn test_partial_override() {
        let config = ShellConfig::from_json(
            r#"{
                "default_language": "fr",
                "features": { "shader": { "idle": 500 } },
                "cursor": { "ring_easing": 0.5 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.default_language, Language::Fr);
        assert_eq!(config.features.shader, Trigger::Idle(500));
        assert_eq!(config.features.noise, Trigger::Idle(1500));
        assert_eq!(config.cursor.ring_easing, 0.5);
        assert_eq!(config.cursor.pointer_scale, 1.6);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ShellConfig::from_json(r#"{ "placeholder_id": " " }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "placeholder_id", .. }));

        let err = ShellConfig::from_json(r#"{ "cursor": { "ring_easing": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cursor.ring_easing", .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = ShellConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shell.json");
        fs::write(&path, r#"{ "lazy_settle_ms": 120 }"#).unwrap();

        let config = ShellConfig::load(&path).unwrap();
        assert_eq!(config.lazy_settle_ms, 120);

        let missing = ShellConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
