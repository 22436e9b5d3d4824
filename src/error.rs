//! Error types.
//!
//! Only structural problems (bad configuration, an invalid section list,
//! a duplicate registration) surface to the caller. Load failures of
//! decorative features are logged and swallowed by the boundaries that
//! catch them; they exist as types so that boundaries can report them.

use thiserror::Error;

/// A deferred unit (enhancement chunk, lazy section) failed to load or mount.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The producer reported a failure (e.g. chunk fetch failed).
    #[error("`{name}` failed to load: {reason}")]
    Failed { name: String, reason: String },

    /// The producer panicked.
    #[error("`{name}` panicked while loading")]
    Panicked { name: String },

    /// The loaded unit could not attach itself to the page.
    #[error("`{name}` failed to mount: {reason}")]
    Mount { name: String, reason: String },
}

impl LoadError {
    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn mount(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Mount {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Enhancement registration rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("enhancement `{0}` is already registered")]
    Duplicate(String),

    #[error("enhancement `{0}` registered after the loader started")]
    AfterStart(String),
}

/// Section list rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("section id `{0}` appears more than once")]
    DuplicateId(String),

    #[error("no eager section: the initial viewport would be empty")]
    NoEagerSection,

    #[error("eager section `{0}` follows a lazy section")]
    EagerAfterLazy(String),
}

/// Configuration could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// `mount()` could not assemble the page.
#[derive(Debug, Error)]
pub enum MountError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sections(#[from] SectionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result alias for fallible setup.
pub type Result<T, E = MountError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = LoadError::failed("shader", "chunk 404");
        assert_eq!(err.to_string(), "`shader` failed to load: chunk 404");

        let err = LoadError::Panicked { name: "cursor".into() };
        assert!(err.to_string().contains("panicked"));
    }

    #[test]
    fn test_section_error_display() {
        let err = SectionError::EagerAfterLazy("home".into());
        assert!(err.to_string().contains("`home`"));
    }

    #[test]
    fn test_mount_error_from_section_error() {
        let err: MountError = SectionError::NoEagerSection.into();
        assert!(matches!(err, MountError::Sections(SectionError::NoEagerSection)));
    }

    #[test]
    fn test_config_error_from_json() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(err.to_string().starts_with("invalid JSON"));
    }
}
