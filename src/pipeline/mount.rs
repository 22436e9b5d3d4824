//! Mount API - startup orchestration and the single teardown path.
//!
//! # Example
//!
//! ```ignore
//! use folio_shell::pipeline::mount::{mount, App};
//!
//! // The host has already painted the static placeholder.
//! document.paint_static_shell("static-shell", "Ada Lovelace", HERO_HEADING_AREA);
//!
//! let handle = mount(App::new(ShellConfig::default(), document))?;
//!
//! // Drive the host loop...
//! tick_frames(120);
//!
//! // Clean up
//! handle.unmount();
//! ```

use std::rc::Rc;

use crate::config::ShellConfig;
use crate::engine::{CleanupList, Document};
use crate::enhancements::{builtin_enhancements, ShaderFactory, ShaderProgram};
use crate::error::{LoadError, Result};
use crate::state::contact::{ContactForm, LogSink, SubmissionSink};
use crate::state::locale::{Language, Locale, MemoryStore, PreferenceStore};
use crate::state::scroll::{ScrollProgress, ScrollSpy};
use crate::state::toast::ToastQueue;
use crate::state::assets;
use crate::types::{Capabilities, Opener};

use super::bridge::StaticShellBridge;
use super::critical::paint_critical;
use super::loader::{DeferredLoader, EnhancementContext, EnhancementDescriptor};
use super::sections::{default_sections, SectionDescriptor, SectionProvider};

// =============================================================================
// App
// =============================================================================

/// Everything `mount()` needs. Defaults reproduce the live site.
pub struct App {
    pub config: ShellConfig,
    pub document: Document,
    pub capabilities: Capabilities,
    pub store: Rc<dyn PreferenceStore>,
    pub sections: Vec<SectionDescriptor>,
    pub enhancements: Vec<EnhancementDescriptor>,
    pub sink: Rc<dyn SubmissionSink>,
}

impl App {
    pub fn new(config: ShellConfig, document: Document) -> Self {
        let enhancements = builtin_enhancements(&config.features, None);
        Self {
            config,
            document,
            capabilities: Capabilities::desktop(),
            store: MemoryStore::shared(),
            sections: default_sections(),
            enhancements,
            sink: Rc::new(LogSink),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_store(mut self, store: Rc<dyn PreferenceStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_sections(mut self, sections: Vec<SectionDescriptor>) -> Self {
        self.sections = sections;
        self
    }

    /// Replace the built-in enhancement set.
    pub fn with_enhancements(mut self, enhancements: Vec<EnhancementDescriptor>) -> Self {
        self.enhancements = enhancements;
        self
    }

    /// Add the shader background, built by `factory` once its trigger fires.
    pub fn with_shader<F>(mut self, factory: F) -> Self
    where
        F: FnOnce() -> std::result::Result<Box<dyn ShaderProgram>, LoadError> + 'static,
    {
        let factory: ShaderFactory = Box::new(factory);
        self.enhancements.extend(
            builtin_enhancements(&self.config.features, Some(factory))
                .into_iter()
                .filter(|d| d.name == crate::enhancements::SHADER),
        );
        self
    }

    pub fn with_sink(mut self, sink: Rc<dyn SubmissionSink>) -> Self {
        self.sink = sink;
        self
    }
}

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by mount(). Dropping it unmounts.
pub struct MountHandle {
    cleanups: CleanupList,
    config: Rc<ShellConfig>,
    document: Document,
    locale: Locale,
    toasts: ToastQueue,
    loader: DeferredLoader,
    sections: SectionProvider,
    scroll_spy: Rc<ScrollSpy>,
    progress: Rc<ScrollProgress>,
    contact: Rc<ContactForm>,
}

impl MountHandle {
    /// Tear everything down: enhancements, sections, listeners, timers.
    pub fn unmount(self) {
        self.cleanups.run();
    }

    pub fn is_mounted(&self) -> bool {
        !self.cleanups.has_run()
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn loader(&self) -> &DeferredLoader {
        &self.loader
    }

    pub fn sections(&self) -> &SectionProvider {
        &self.sections
    }

    pub fn scroll_spy(&self) -> &ScrollSpy {
        &self.scroll_spy
    }

    pub fn progress(&self) -> &ScrollProgress {
        &self.progress
    }

    pub fn contact(&self) -> &ContactForm {
        &self.contact
    }

    /// In-page navigation to a section, if it is mounted.
    pub fn navigate_to(&self, section_id: &str) -> bool {
        self.scroll_spy.scroll_to_section(section_id)
    }

    /// Open the résumé for `language` and toast about it.
    pub fn download_resume(&self, language: Language, opener: &dyn Opener) {
        assets::download_resume(&self.config.resume, language, &self.locale, opener, &self.toasts);
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.cleanups.run();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Mount the page.
///
/// In order:
/// 1. Validate configuration, sections and enhancement registrations
/// 2. Paint the critical shell (eager sections)
/// 3. Demote the static placeholder
/// 4. Start the deferred loader (arms every trigger)
/// 5. Schedule lazy sections after the first frame
/// 6. Attach scroll-spy and scroll progress
///
/// Only structural problems are errors; nothing a deferred feature does
/// can make this fail.
pub fn mount(app: App) -> Result<MountHandle> {
    let App {
        config,
        document,
        capabilities,
        store,
        sections,
        enhancements,
        sink,
    } = app;

    config.validate()?;
    let config = Rc::new(config);
    let locale = Locale::builtin(store, &config.storage_key, config.default_language)?;
    let provider = SectionProvider::new(sections, document.clone(), locale.clone(), config.clone())?;

    let toasts = ToastQueue::new();
    let loader = DeferredLoader::new(EnhancementContext::new(
        document.clone(),
        locale.clone(),
        toasts.clone(),
        config.clone(),
    ));
    for descriptor in enhancements {
        loader.register(descriptor)?;
    }

    let cleanups = CleanupList::new();

    paint_critical(&provider);
    {
        let provider = provider.clone();
        cleanups.add(move || provider.teardown());
    }

    StaticShellBridge::new(document.clone(), config.placeholder_id.clone()).demote();

    loader.start(capabilities);
    {
        let loader = loader.clone();
        cleanups.add(move || loader.teardown());
    }

    provider.schedule_lazy(config.lazy_settle_ms);

    let scroll_spy = Rc::new(ScrollSpy::attach(document.clone(), provider.ids(), &config.scroll));
    let progress = Rc::new(ScrollProgress::attach(document.clone()));
    {
        let scroll_spy = scroll_spy.clone();
        let progress = progress.clone();
        cleanups.add(move || {
            progress.detach();
            scroll_spy.detach();
        });
    }

    let contact = Rc::new(ContactForm::new(sink, &config.contact));
    {
        let contact = contact.clone();
        cleanups.add(move || contact.teardown());
    }

    log::debug!(target: "folio::mount", "mounted {} sections, {} enhancements", provider.ids().len(), loader.names().len());

    Ok(MountHandle {
        cleanups,
        config,
        document,
        locale,
        toasts,
        loader,
        sections: provider,
        scroll_spy,
        progress,
        contact,
    })
}
