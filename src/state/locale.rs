//! Locale Resolver - active language and key lookup.
//!
//! The language lives in one `Signal<Language>`. `t(key)` reads that
//! signal, so any effect that translates text re-runs when the language
//! changes; sections subscribe simply by calling `t()` while rendering.
//!
//! Dictionaries are bundled JSON, fully resident. The chosen language is
//! persisted through a [`PreferenceStore`] and restored at the next mount.
//!
//! # Example
//!
//! ```ignore
//! use folio_shell::state::locale::{Locale, Language, MemoryStore};
//!
//! let locale = Locale::builtin(MemoryStore::shared(), "portfolio-language", Language::En)?;
//! assert_eq!(locale.t("nav.about"), "About");
//!
//! locale.set_language(Language::Fr);
//! assert_eq!(locale.t("nav.about"), "À propos");
//!
//! // Unknown keys come back as-is
//! assert_eq!(locale.t("nav.nope"), "nav.nope");
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use spark_signals::{signal, Signal};

use crate::error::ConfigError;

const EN_JSON: &str = include_str!("../../locales/en.json");
const FR_JSON: &str = include_str!("../../locales/fr.json");

// =============================================================================
// Language
// =============================================================================

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }

    /// Parse an ISO code, case-insensitive.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "fr" => Some(Self::Fr),
            _ => None,
        }
    }

    /// The other language (what the toggle switches to).
    pub fn other(self) -> Self {
        match self {
            Self::En => Self::Fr,
            Self::Fr => Self::En,
        }
    }
}

// =============================================================================
// Dictionaries
// =============================================================================

/// Flat key -> string table for one language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: HashMap<String, String>,
}

impl Dictionary {
    /// Parse a flat JSON object of strings.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let entries: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Both language tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionaries {
    pub en: Dictionary,
    pub fr: Dictionary,
}

impl Dictionaries {
    /// The tables bundled with the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self {
            en: Dictionary::from_json(EN_JSON)?,
            fr: Dictionary::from_json(FR_JSON)?,
        })
    }

    pub fn for_language(&self, language: Language) -> &Dictionary {
        match language {
            Language::En => &self.en,
            Language::Fr => &self.fr,
        }
    }
}

// =============================================================================
// Preference Store
// =============================================================================

/// Persistence for small string preferences (localStorage in the browser).
pub trait PreferenceStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str);
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boxed as a shared trait object, ready for [`Locale::builtin`].
    pub fn shared() -> Rc<dyn PreferenceStore> {
        Rc::new(Self::new())
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

/// JSON-file store: one object of string values.
///
/// Read and write failures are logged and otherwise ignored; a lost
/// preference only means the default language next time.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> HashMap<String, String> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(err) => {
                log::warn!(target: "folio::locale", "cannot read {}: {err}", self.path.display());
                return HashMap::new();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|err| {
            log::warn!(target: "folio::locale", "ignoring malformed {}: {err}", self.path.display());
            HashMap::new()
        })
    }
}

impl PreferenceStore for JsonFileStore {
    fn load(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn save(&self, key: &str, value: &str) {
        let mut all = self.read_all();
        all.insert(key.to_string(), value.to_string());
        let written = serde_json::to_string_pretty(&all)
            .map_err(std::io::Error::other)
            .and_then(|json| fs::write(&self.path, json));
        if let Err(err) = written {
            log::warn!(target: "folio::locale", "cannot persist {key}: {err}");
        }
    }
}

// =============================================================================
// Locale
// =============================================================================

/// Active language plus lookup. Clones share state.
#[derive(Clone)]
pub struct Locale {
    language: Signal<Language>,
    dictionaries: Rc<Dictionaries>,
    store: Rc<dyn PreferenceStore>,
    storage_key: Rc<str>,
    reported_missing: Rc<RefCell<HashSet<(Language, String)>>>,
}

impl Locale {
    /// Restore the stored language (falling back to `default`).
    pub fn new(
        dictionaries: Dictionaries,
        store: Rc<dyn PreferenceStore>,
        storage_key: &str,
        default: Language,
    ) -> Self {
        let stored = store.load(storage_key);
        let initial = match stored.as_deref().map(Language::parse) {
            Some(Some(language)) => language,
            Some(None) => {
                log::debug!(target: "folio::locale", "ignoring unknown stored language {stored:?}");
                default
            }
            None => default,
        };

        Self {
            language: signal(initial),
            dictionaries: Rc::new(dictionaries),
            store,
            storage_key: Rc::from(storage_key),
            reported_missing: Rc::new(RefCell::new(HashSet::new())),
        }
    }

    /// Locale over the bundled dictionaries.
    pub fn builtin(
        store: Rc<dyn PreferenceStore>,
        storage_key: &str,
        default: Language,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(Dictionaries::builtin()?, store, storage_key, default))
    }

    /// Current language. Tracked when read inside an effect.
    pub fn language(&self) -> Language {
        self.language.get()
    }

    /// The underlying signal, for consumers that want to subscribe directly.
    pub fn language_signal(&self) -> Signal<Language> {
        self.language.clone()
    }

    /// Translate `key` in the current language.
    ///
    /// Unknown keys return the key itself; each miss is logged once.
    pub fn t(&self, key: &str) -> String {
        let language = self.language.get();
        match self.dictionaries.for_language(language).get(key) {
            Some(text) => text.to_string(),
            None => {
                let first_miss = self
                    .reported_missing
                    .borrow_mut()
                    .insert((language, key.to_string()));
                if first_miss {
                    log::debug!(target: "folio::locale", "missing {} translation for `{key}`", language.code());
                }
                key.to_string()
            }
        }
    }

    /// Switch language, re-render subscribers, persist the choice.
    pub fn set_language(&self, language: Language) {
        if self.language.get() != language {
            self.language.set(language);
        }
        self.store.save(&self.storage_key, language.code());
    }

    /// Switch to the other language. Returns the new language.
    pub fn toggle(&self) -> Language {
        let next = self.language.get().other();
        self.set_language(next);
        next
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::effect;
    use std::cell::Cell;

    fn locale_with(store: Rc<dyn PreferenceStore>) -> Locale {
        Locale::builtin(store, "portfolio-language", Language::En).unwrap()
    }

    #[test]
    fn test_builtin_tables_have_same_keys() {
        let dicts = Dictionaries::builtin().unwrap();
        let mut en: Vec<&str> = dicts.en.keys().collect();
        let mut fr: Vec<&str> = dicts.fr.keys().collect();
        en.sort_unstable();
        fr.sort_unstable();
        assert_eq!(en, fr);
        assert!(!dicts.en.is_empty());
    }

    #[test]
    fn test_translate_and_switch() {
        let locale = locale_with(MemoryStore::shared());
        assert_eq!(locale.language(), Language::En);
        assert_eq!(locale.t("nav.about"), "About");

        locale.set_language(Language::Fr);
        assert_eq!(locale.t("nav.about"), "À propos");
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let locale = locale_with(MemoryStore::shared());
        assert_eq!(locale.t("does.not.exist"), "does.not.exist");
        assert_eq!(locale.t("does.not.exist"), "does.not.exist");
        assert_eq!(locale.t(""), "");
        locale.set_language(Language::Fr);
        assert_eq!(locale.t("does.not.exist"), "does.not.exist");
    }

    #[test]
    fn test_round_trip_is_stable() {
        let locale = locale_with(MemoryStore::shared());
        let keys = ["nav.home", "hero.subtitle", "contact.title", "missing.key"];
        let before: Vec<String> = keys.iter().map(|k| locale.t(k)).collect();

        locale.set_language(Language::Fr);
        let french: Vec<String> = keys.iter().map(|k| locale.t(k)).collect();
        assert_ne!(before, french);

        locale.set_language(Language::En);
        let after: Vec<String> = keys.iter().map(|k| locale.t(k)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_choice_persists_across_reload() {
        let store = MemoryStore::new();
        let shared: Rc<dyn PreferenceStore> = Rc::new(store.clone());

        let first = locale_with(shared.clone());
        first.toggle();
        assert_eq!(store.load("portfolio-language").as_deref(), Some("fr"));

        let reloaded = locale_with(shared);
        assert_eq!(reloaded.language(), Language::Fr);
    }

    #[test]
    fn test_garbage_preference_uses_default() {
        let store = MemoryStore::new();
        store.save("portfolio-language", "klingon");
        let locale = locale_with(Rc::new(store));
        assert_eq!(locale.language(), Language::En);
    }

    #[test]
    fn test_subscribers_rerender_on_switch() {
        let locale = locale_with(MemoryStore::shared());
        let rendered = Rc::new(RefCell::new(String::new()));
        let runs = Rc::new(Cell::new(0));

        let locale_clone = locale.clone();
        let rendered_clone = rendered.clone();
        let runs_clone = runs.clone();
        let _stop = effect(move || {
            *rendered_clone.borrow_mut() = locale_clone.t("nav.contact");
            runs_clone.set(runs_clone.get() + 1);
        });

        assert_eq!(*rendered.borrow(), "Contact");
        locale.set_language(Language::Fr);
        assert_eq!(runs.get(), 2);
        assert_eq!(*rendered.borrow(), "Contact");

        locale.set_language(Language::Fr);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_json_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let store = JsonFileStore::new(&path);
        assert_eq!(store.load("portfolio-language"), None);

        store.save("portfolio-language", "fr");
        store.save("other", "x");
        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load("portfolio-language").as_deref(), Some("fr"));
        assert_eq!(reopened.load("other").as_deref(), Some("x"));
    }

    #[test]
    fn test_json_file_store_tolerates_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert_eq!(store.load("portfolio-language"), None);
    }

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("FR"), Some(Language::Fr));
        assert_eq!(Language::parse(" en "), Some(Language::En));
        assert_eq!(Language::parse("de"), None);
        assert_eq!(Language::En.other(), Language::Fr);
    }
}
