//! Deferred Feature Loader.
//!
//! Owns every non-essential enhancement and decides when each may start.
//! Enhancements are registered up front with a [`Trigger`]; [`start`]
//! arms the triggers and [`teardown`] disarms everything.
//!
//! # Lifecycle of one feature
//!
//! ```text
//! Pending --trigger / activate--> Loading --mount ok--> Active
//!    |                               |
//!    |                               +--load/mount error--> Unavailable
//!    +--capabilities missing at start--> Skipped
//! ```
//!
//! Activation is idempotent: the load runs at most once per session no
//! matter how many triggers fire. Any activation also disarms the
//! feature's own pending trigger (timer or pointer listener).
//!
//! Loading goes through a [`Lazy`] behind a [`suspense`] boundary, so a
//! failure never escapes the feature and teardown before resolution
//! means the feature never mounts.
//!
//! [`start`]: DeferredLoader::start
//! [`teardown`]: DeferredLoader::teardown

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use spark_signals::{signal, Signal};

use crate::config::ShellConfig;
use crate::engine::{clear_timeout, on_pointer_move, set_timeout, Document, PointerEvent};
use crate::error::{LoadError, RegistryError};
use crate::primitives::{suspense, Lazy};
use crate::state::locale::Locale;
use crate::state::toast::ToastQueue;
use crate::types::{Capabilities, Cleanup};

// =============================================================================
// Types
// =============================================================================

/// When a feature is allowed to start loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// As soon as the loader starts.
    Immediate,
    /// After this many ms of idle time following start.
    Idle(u64),
    /// On the first pointer move after start.
    OnFirstPointerMove,
}

/// What an enhancement gets to work with when it mounts.
#[derive(Clone)]
pub struct EnhancementContext {
    pub document: Document,
    pub locale: Locale,
    pub toasts: ToastQueue,
    pub config: Rc<ShellConfig>,
    /// The pointer move that fired an `OnFirstPointerMove` trigger. That
    /// move is over by the time the feature mounts, so it is kept here.
    pub last_pointer: Rc<RefCell<Option<PointerEvent>>>,
}

impl EnhancementContext {
    pub fn new(document: Document, locale: Locale, toasts: ToastQueue, config: Rc<ShellConfig>) -> Self {
        Self {
            document,
            locale,
            toasts,
            config,
            last_pointer: Rc::new(RefCell::new(None)),
        }
    }
}

/// A loaded, ready-to-mount enhancement.
pub trait Enhancement {
    /// Attach to the page. The returned cleanup must undo everything.
    fn mount(&self, ctx: &EnhancementContext) -> Result<Cleanup, LoadError>;
}

type LoadFn = Box<dyn FnOnce() -> Result<Box<dyn Enhancement>, LoadError>>;

/// Registration record for one enhancement.
pub struct EnhancementDescriptor {
    pub name: String,
    pub trigger: Trigger,
    pub requires: Capabilities,
    load: LoadFn,
}

impl EnhancementDescriptor {
    pub fn new<F>(name: impl Into<String>, trigger: Trigger, load: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn Enhancement>, LoadError> + 'static,
    {
        Self {
            name: name.into(),
            trigger,
            requires: Capabilities::NONE,
            load: Box::new(load),
        }
    }

    /// Skip this feature on hosts lacking `caps`.
    pub fn requires(mut self, caps: Capabilities) -> Self {
        self.requires = caps;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStatus {
    Pending,
    Loading,
    Active,
    Unavailable,
    Skipped,
}

/// Result of [`DeferredLoader::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// This call started the load.
    Requested,
    /// Already loading, loaded, or failed. Nothing happened.
    AlreadyRequested,
    /// The host lacks the required capabilities.
    Skipped,
    /// The loader is not running (before start or after teardown).
    Inactive,
    /// No feature by that name.
    Unknown,
}

// =============================================================================
// Loader
// =============================================================================

struct Feature {
    name: String,
    trigger: Trigger,
    requires: Capabilities,
    lazy: Lazy<Box<dyn Enhancement>>,
    status: Signal<FeatureStatus>,
    requested: bool,
    trigger_disposer: Option<Cleanup>,
    boundary: Option<Cleanup>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LoaderPhase {
    Registering,
    Running,
    TornDown,
}

struct LoaderInner {
    features: Vec<Feature>,
    phase: LoaderPhase,
    ctx: EnhancementContext,
}

impl LoaderInner {
    fn feature_mut(&mut self, name: &str) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.name == name)
    }

    fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }
}

/// Shared loader handle.
#[derive(Clone)]
pub struct DeferredLoader {
    inner: Rc<RefCell<LoaderInner>>,
}

impl DeferredLoader {
    pub fn new(ctx: EnhancementContext) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LoaderInner {
                features: Vec::new(),
                phase: LoaderPhase::Registering,
                ctx,
            })),
        }
    }

    /// Register an enhancement. Only allowed before [`start`](Self::start).
    pub fn register(&self, descriptor: EnhancementDescriptor) -> Result<(), RegistryError> {
        let mut inner = self.inner.borrow_mut();
        if inner.phase != LoaderPhase::Registering {
            return Err(RegistryError::AfterStart(descriptor.name));
        }
        if inner.feature(&descriptor.name).is_some() {
            return Err(RegistryError::Duplicate(descriptor.name));
        }

        let EnhancementDescriptor {
            name,
            trigger,
            requires,
            load,
        } = descriptor;
        inner.features.push(Feature {
            lazy: Lazy::new(name.clone(), load),
            name,
            trigger,
            requires,
            status: signal(FeatureStatus::Pending),
            requested: false,
            trigger_disposer: None,
            boundary: None,
        });
        Ok(())
    }

    /// Arm every trigger. Features the host cannot run are skipped.
    pub fn start(&self, caps: Capabilities) {
        let mut immediate = Vec::new();
        let mut skipped = Vec::new();
        {
            let mut inner = self.inner.borrow_mut();
            if inner.phase != LoaderPhase::Registering {
                log::debug!(target: "folio::loader", "start() called twice; ignoring");
                return;
            }
            inner.phase = LoaderPhase::Running;
            let last_pointer = inner.ctx.last_pointer.clone();

            for feature in inner.features.iter_mut() {
                if !caps.satisfies(feature.requires) {
                    log::debug!(target: "folio::loader", "skipping `{}`: host lacks {:?}", feature.name, feature.requires);
                    skipped.push(feature.status.clone());
                    continue;
                }
                match feature.trigger {
                    Trigger::Immediate => immediate.push(feature.name.clone()),
                    Trigger::Idle(delay_ms) => {
                        let weak = Rc::downgrade(&self.inner);
                        let name = feature.name.clone();
                        let id = set_timeout(delay_ms, move || activate_weak(&weak, &name));
                        feature.trigger_disposer = Some(Box::new(move || clear_timeout(id)));
                    }
                    Trigger::OnFirstPointerMove => {
                        let weak = Rc::downgrade(&self.inner);
                        let name = feature.name.clone();
                        let last_pointer = last_pointer.clone();
                        let detach = on_pointer_move(move |event| {
                            *last_pointer.borrow_mut() = Some(event.clone());
                            activate_weak(&weak, &name);
                        });
                        feature.trigger_disposer = Some(Box::new(detach));
                    }
                }
            }
        }

        for status in skipped {
            status.set(FeatureStatus::Skipped);
        }
        for name in immediate {
            self.activate(&name);
        }
    }

    /// Request `name`'s load now, regardless of its trigger.
    pub fn activate(&self, name: &str) -> Activation {
        let (lazy, status, ctx, trigger_disposer) = {
            let mut inner = self.inner.borrow_mut();
            if inner.phase != LoaderPhase::Running {
                return Activation::Inactive;
            }
            let ctx = inner.ctx.clone();
            let Some(feature) = inner.feature_mut(name) else {
                log::warn!(target: "folio::loader", "activate: no enhancement named `{name}`");
                return Activation::Unknown;
            };
            if feature.status.get() == FeatureStatus::Skipped {
                return Activation::Skipped;
            }
            if feature.requested {
                return Activation::AlreadyRequested;
            }
            feature.requested = true;
            (
                feature.lazy.clone(),
                feature.status.clone(),
                ctx,
                feature.trigger_disposer.take(),
            )
        };

        status.set(FeatureStatus::Loading);
        if let Some(disarm) = trigger_disposer {
            disarm();
        }

        log::debug!(target: "folio::loader", "loading `{name}`");
        let status_on_mount = status.clone();
        let mount_name = name.to_string();
        let boundary = suspense(
            &lazy,
            move |enhancement: &Box<dyn Enhancement>| {
                let cleanup = enhancement.mount(&ctx)?;
                status_on_mount.set(FeatureStatus::Active);
                log::info!(target: "folio::loader", "`{mount_name}` active");
                Ok(cleanup)
            },
            Some(move |_: &LoadError| {
                status.set(FeatureStatus::Unavailable);
            }),
        );

        let orphan = {
            let mut inner = self.inner.borrow_mut();
            let running = inner.phase == LoaderPhase::Running;
            match inner.feature_mut(name) {
                Some(feature) if running => {
                    feature.boundary = Some(boundary);
                    None
                }
                _ => Some(boundary),
            }
        };
        // Torn down while we were wiring it up.
        if let Some(boundary) = orphan {
            boundary();
        }

        Activation::Requested
    }

    pub fn status(&self, name: &str) -> Option<FeatureStatus> {
        self.inner.borrow().feature(name).map(|f| f.status.get())
    }

    /// Reactive status, for UI that wants to follow a feature.
    pub fn status_signal(&self, name: &str) -> Option<Signal<FeatureStatus>> {
        self.inner.borrow().feature(name).map(|f| f.status.clone())
    }

    /// How many times `name`'s loader actually ran (0 or 1).
    pub fn load_count(&self, name: &str) -> u32 {
        self.inner
            .borrow()
            .feature(name)
            .map_or(0, |f| f.lazy.invocations())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.inner.borrow().features.iter().map(|f| f.name.clone()).collect()
    }

    /// Disarm pending triggers, unmount active features, drop in-flight loads.
    ///
    /// Idempotent. The loader cannot be restarted.
    pub fn teardown(&self) {
        let disposers: Vec<Cleanup> = {
            let mut inner = self.inner.borrow_mut();
            if inner.phase == LoaderPhase::TornDown {
                return;
            }
            inner.phase = LoaderPhase::TornDown;
            inner
                .features
                .iter_mut()
                .flat_map(|f| [f.trigger_disposer.take(), f.boundary.take()])
                .flatten()
                .collect()
        };
        for dispose in disposers.into_iter().rev() {
            dispose();
        }
    }
}

fn activate_weak(weak: &Weak<RefCell<LoaderInner>>, name: &str) {
    if let Some(inner) = weak.upgrade() {
        DeferredLoader { inner }.activate(name);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        advance_time, dispatch, flush_microtasks, listener_count, pending_timer_count,
        reset_engine, EventKind, PointerEvent, WindowEvent,
    };
    use crate::state::locale::{Language, MemoryStore};
    use std::cell::Cell;

    struct Recorder {
        mounts: Rc<Cell<u32>>,
        unmounts: Rc<Cell<u32>>,
        fail_mount: bool,
    }

    impl Enhancement for Recorder {
        fn mount(&self, _ctx: &EnhancementContext) -> Result<Cleanup, LoadError> {
            if self.fail_mount {
                return Err(LoadError::mount("recorder", "no canvas"));
            }
            self.mounts.set(self.mounts.get() + 1);
            let unmounts = self.unmounts.clone();
            Ok(Box::new(move || unmounts.set(unmounts.get() + 1)))
        }
    }

    struct Counters {
        loads: Rc<Cell<u32>>,
        mounts: Rc<Cell<u32>>,
        unmounts: Rc<Cell<u32>>,
    }

    impl Counters {
        fn new() -> Self {
            Self {
                loads: Rc::new(Cell::new(0)),
                mounts: Rc::new(Cell::new(0)),
                unmounts: Rc::new(Cell::new(0)),
            }
        }

        fn descriptor(&self, name: &str, trigger: Trigger) -> EnhancementDescriptor {
            let loads = self.loads.clone();
            let mounts = self.mounts.clone();
            let unmounts = self.unmounts.clone();
            EnhancementDescriptor::new(name, trigger, move || {
                loads.set(loads.get() + 1);
                Ok(Box::new(Recorder {
                    mounts,
                    unmounts,
                    fail_mount: false,
                }) as Box<dyn Enhancement>)
            })
        }
    }

    fn setup() -> DeferredLoader {
        reset_engine();
        let _ = env_logger::builder().is_test(true).try_init();
        let ctx = EnhancementContext::new(
            Document::new(1280.0, 800.0),
            Locale::builtin(MemoryStore::shared(), "lang", Language::En).unwrap(),
            ToastQueue::new(),
            Rc::new(ShellConfig::default()),
        );
        DeferredLoader::new(ctx)
    }

    #[test]
    fn test_register_rejects_duplicates_and_late_registration() {
        let loader = setup();
        let counters = Counters::new();
        loader.register(counters.descriptor("noise", Trigger::Idle(10))).unwrap();

        let err = loader.register(counters.descriptor("noise", Trigger::Immediate)).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("noise".into()));

        loader.start(Capabilities::desktop());
        let err = loader.register(counters.descriptor("late", Trigger::Immediate)).unwrap_err();
        assert_eq!(err, RegistryError::AfterStart("late".into()));
    }

    #[test]
    fn test_activate_many_times_loads_once() {
        let loader = setup();
        let counters = Counters::new();
        loader.register(counters.descriptor("shader", Trigger::Idle(3000))).unwrap();
        loader.start(Capabilities::desktop());

        assert_eq!(loader.activate("shader"), Activation::Requested);
        for _ in 0..5 {
            assert_eq!(loader.activate("shader"), Activation::AlreadyRequested);
        }
        flush_microtasks();
        advance_time(5000);

        assert_eq!(counters.loads.get(), 1);
        assert_eq!(counters.mounts.get(), 1);
        assert_eq!(loader.load_count("shader"), 1);
        assert_eq!(loader.status("shader"), Some(FeatureStatus::Active));
        assert_eq!(pending_timer_count(), 0);
    }

    #[test]
    fn test_immediate_activates_on_start() {
        let loader = setup();
        let counters = Counters::new();
        loader.register(counters.descriptor("toggle", Trigger::Immediate)).unwrap();

        loader.start(Capabilities::touch());
        assert_eq!(loader.status("toggle"), Some(FeatureStatus::Loading));
        flush_microtasks();
        assert_eq!(loader.status("toggle"), Some(FeatureStatus::Active));
    }

    #[test]
    fn test_idle_trigger_fires_after_delay() {
        let loader = setup();
        let counters = Counters::new();
        loader.register(counters.descriptor("noise", Trigger::Idle(1500))).unwrap();
        loader.start(Capabilities::desktop());

        advance_time(1499);
        assert_eq!(counters.loads.get(), 0);
        advance_time(1);
        assert_eq!(counters.loads.get(), 1);
        assert_eq!(loader.status("noise"), Some(FeatureStatus::Active));
    }

    #[test]
    fn test_teardown_before_idle_never_activates() {
        let loader = setup();
        let counters = Counters::new();
        loader.register(counters.descriptor("shader", Trigger::Idle(3000))).unwrap();
        loader.start(Capabilities::desktop());

        advance_time(2000);
        loader.teardown();
        advance_time(5000);

        assert_eq!(counters.loads.get(), 0);
        assert_eq!(loader.status("shader"), Some(FeatureStatus::Pending));
        assert_eq!(pending_timer_count(), 0);
        assert_eq!(loader.activate("shader"), Activation::Inactive);
    }

    #[test]
    fn test_first_pointer_move_activates_once_and_detaches() {
        let loader = setup();
        let counters = Counters::new();
        loader.register(counters.descriptor("cursor", Trigger::OnFirstPointerMove)).unwrap();
        loader.start(Capabilities::desktop());
        assert_eq!(listener_count(EventKind::PointerMove), 1);

        dispatch(WindowEvent::PointerMove(PointerEvent::at(5.0, 5.0)));
        assert_eq!(listener_count(EventKind::PointerMove), 0);
        dispatch(WindowEvent::PointerMove(PointerEvent::at(6.0, 6.0)));

        assert_eq!(counters.loads.get(), 1);
        assert_eq!(loader.status("cursor"), Some(FeatureStatus::Active));
        // The triggering move is kept for the feature; later ones are not.
        let last = loader.inner.borrow().ctx.last_pointer.borrow().clone();
        assert_eq!(last, Some(PointerEvent::at(5.0, 5.0)));
    }

    #[test]
    fn test_manual_activation_detaches_pointer_listener() {
        let loader = setup();
        let counters = Counters::new();
        loader.register(counters.descriptor("cursor", Trigger::OnFirstPointerMove)).unwrap();
        loader.start(Capabilities::desktop());

        loader.activate("cursor");
        assert_eq!(listener_count(EventKind::PointerMove), 0);
    }

    #[test]
    fn test_missing_capability_skips() {
        let loader = setup();
        let counters = Counters::new();
        loader
            .register(counters.descriptor("cursor", Trigger::OnFirstPointerMove).requires(Capabilities::FINE_POINTER))
            .unwrap();
        loader.start(Capabilities::touch());

        assert_eq!(loader.status("cursor"), Some(FeatureStatus::Skipped));
        assert_eq!(listener_count(EventKind::PointerMove), 0);
        assert_eq!(loader.activate("cursor"), Activation::Skipped);
        flush_microtasks();
        assert_eq!(counters.loads.get(), 0);
    }

    #[test]
    fn test_failures_are_isolated() {
        let loader = setup();
        let counters = Counters::new();
        loader
            .register(EnhancementDescriptor::new("broken", Trigger::Immediate, || {
                Err(LoadError::failed("broken", "chunk 404"))
            }))
            .unwrap();
        loader
            .register(EnhancementDescriptor::new("panicky", Trigger::Immediate, || panic!("boom")))
            .unwrap();
        let mounts = counters.mounts.clone();
        loader
            .register(EnhancementDescriptor::new("bad-mount", Trigger::Immediate, move || {
                Ok(Box::new(Recorder {
                    mounts,
                    unmounts: Rc::new(Cell::new(0)),
                    fail_mount: true,
                }) as Box<dyn Enhancement>)
            }))
            .unwrap();
        loader.register(counters.descriptor("ok", Trigger::Immediate)).unwrap();

        loader.start(Capabilities::desktop());
        flush_microtasks();

        assert_eq!(loader.status("broken"), Some(FeatureStatus::Unavailable));
        assert_eq!(loader.status("panicky"), Some(FeatureStatus::Unavailable));
        assert_eq!(loader.status("bad-mount"), Some(FeatureStatus::Unavailable));
        assert_eq!(loader.status("ok"), Some(FeatureStatus::Active));
        assert_eq!(loader.activate("broken"), Activation::AlreadyRequested);
    }

    #[test]
    fn test_teardown_unmounts_active_and_drops_in_flight() {
        let loader = setup();
        let counters = Counters::new();
        loader.register(counters.descriptor("active", Trigger::Immediate)).unwrap();
        loader.start(Capabilities::desktop());
        flush_microtasks();
        assert_eq!(counters.mounts.get(), 1);

        loader.teardown();
        loader.teardown();
        assert_eq!(counters.unmounts.get(), 1);
    }

    #[test]
    fn test_teardown_while_loading_never_mounts() {
        let loader = setup();
        let counters = Counters::new();
        loader.register(counters.descriptor("slow", Trigger::Immediate)).unwrap();
        loader.start(Capabilities::desktop());

        loader.teardown();
        flush_microtasks();
        assert_eq!(counters.mounts.get(), 0);
    }

    #[test]
    fn test_unknown_name_is_reported() {
        let loader = setup();
        loader.start(Capabilities::desktop());
        assert_eq!(loader.activate("nope"), Activation::Unknown);
        assert_eq!(loader.status("nope"), None);
    }
}
