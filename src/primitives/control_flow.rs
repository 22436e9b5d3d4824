//! Control Flow Primitives - suspension and error boundaries.
//!
//! - [`suspense`] - render a [`Lazy`] value once it resolves
//!
//! # Pattern: EffectScope-based Cleanup
//!
//! 1. Create an EffectScope to own the boundary's effect
//! 2. Run the effect inside `scope.run()`
//! 3. Register the rendered branch's cleanup with `on_scope_dispose()`
//! 4. Return `Box::new(move || scope.stop())` as the Cleanup
//!
//! Stopping the scope before the value resolves means the branch is never
//! rendered, even if the load completes later.

use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use spark_signals::{effect, effect_scope, on_scope_dispose};

use super::lazy::{Lazy, LoadPhase};
use crate::error::LoadError;
use crate::types::Cleanup;

/// Render `lazy`'s value when it resolves; render nothing before that.
///
/// Mounting the boundary requests the load. A load failure, a failing
/// `render`, or a panic inside `render` is logged, passed to `on_error`
/// and otherwise swallowed: the branch simply stays empty.
///
/// # Example
///
/// ```ignore
/// let section = Lazy::new("about", load_about);
/// let cleanup = suspense(
///     &section,
///     move |about| about.mount(&doc),
///     None::<fn(&LoadError)>,
/// );
///
/// // Nothing rendered yet; the load resolves on a microtask.
/// flush_microtasks();
///
/// cleanup();
/// ```
pub fn suspense<T, R, E>(lazy: &Lazy<T>, render: R, on_error: Option<E>) -> Cleanup
where
    T: 'static,
    R: Fn(&T) -> Result<Cleanup, LoadError> + 'static,
    E: Fn(&LoadError) + 'static,
{
    let mounted: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
    let settled = Rc::new(Cell::new(false));

    let scope = effect_scope(false);

    let mounted_for_update = mounted.clone();
    let lazy_for_effect = lazy.clone();
    let report = move |err: &LoadError| {
        log::warn!(target: "folio::loader", "{err}; leaving it out");
        if let Some(on_error) = &on_error {
            on_error(err);
        }
    };

    scope.run(move || {
        let _effect_cleanup = effect(move || {
            let phase = lazy_for_effect.phase();
            if settled.get() {
                return;
            }
            match phase {
                LoadPhase::Idle | LoadPhase::Pending => {}
                LoadPhase::Failed => {
                    settled.set(true);
                    let err = lazy_for_effect
                        .error()
                        .unwrap_or_else(|| LoadError::failed(lazy_for_effect.name(), "unknown"));
                    report(&err);
                }
                LoadPhase::Ready => {
                    settled.set(true);
                    let Some(value) = lazy_for_effect.value() else {
                        return;
                    };
                    let rendered = panic::catch_unwind(AssertUnwindSafe(|| render(&value)))
                        .unwrap_or_else(|_| {
                            Err(LoadError::Panicked {
                                name: lazy_for_effect.name().to_string(),
                            })
                        });
                    match rendered {
                        Ok(cleanup) => *mounted_for_update.borrow_mut() = Some(cleanup),
                        Err(err) => report(&err),
                    }
                }
            }
        });

        on_scope_dispose(move || {
            if let Some(cleanup_fn) = mounted.borrow_mut().take() {
                cleanup_fn();
            }
        });
    });

    lazy.request();

    Box::new(move || {
        scope.stop();
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{flush_microtasks, reset_engine};

    fn setup() {
        reset_engine();
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn counting_render(
        mounts: Rc<Cell<u32>>,
        unmounts: Rc<Cell<u32>>,
    ) -> impl Fn(&u32) -> Result<Cleanup, LoadError> {
        move |_value| {
            mounts.set(mounts.get() + 1);
            let unmounts = unmounts.clone();
            Ok(Box::new(move || unmounts.set(unmounts.get() + 1)) as Cleanup)
        }
    }

    #[test]
    fn test_renders_nothing_until_resolved() {
        setup();
        let mounts = Rc::new(Cell::new(0));
        let unmounts = Rc::new(Cell::new(0));
        let lazy = Lazy::new("section", || Ok(7u32));

        let cleanup = suspense(&lazy, counting_render(mounts.clone(), unmounts.clone()), None::<fn(&LoadError)>);
        assert_eq!(mounts.get(), 0);
        assert_eq!(lazy.phase(), LoadPhase::Pending);

        flush_microtasks();
        assert_eq!(mounts.get(), 1);

        cleanup();
        assert_eq!(unmounts.get(), 1);
    }

    #[test]
    fn test_failure_is_swallowed_and_reported() {
        setup();
        let mounts = Rc::new(Cell::new(0));
        let errors = Rc::new(RefCell::new(Vec::new()));
        let lazy: Lazy<u32> = Lazy::new("shader", || Err(LoadError::failed("shader", "offline")));

        let errors_clone = errors.clone();
        let _cleanup = suspense(
            &lazy,
            counting_render(mounts.clone(), Rc::new(Cell::new(0))),
            Some(move |err: &LoadError| errors_clone.borrow_mut().push(err.clone())),
        );
        flush_microtasks();

        assert_eq!(mounts.get(), 0);
        assert_eq!(*errors.borrow(), vec![LoadError::failed("shader", "offline")]);
    }

    #[test]
    fn test_render_panic_is_contained() {
        setup();
        let failed = Rc::new(Cell::new(false));
        let lazy = Lazy::new("cursor", || Ok(1u32));

        let failed_clone = failed.clone();
        let _cleanup = suspense(
            &lazy,
            |_: &u32| -> Result<Cleanup, LoadError> { panic!("mount blew up") },
            Some(move |_: &LoadError| failed_clone.set(true)),
        );
        flush_microtasks();
        assert!(failed.get());
    }

    #[test]
    fn test_cleanup_before_resolution_prevents_mount() {
        setup();
        let mounts = Rc::new(Cell::new(0));
        let lazy = Lazy::new("late", || Ok(3u32));

        let cleanup = suspense(&lazy, counting_render(mounts.clone(), Rc::new(Cell::new(0))), None::<fn(&LoadError)>);
        cleanup();
        flush_microtasks();

        assert_eq!(lazy.phase(), LoadPhase::Ready);
        assert_eq!(mounts.get(), 0);
    }

    #[test]
    fn test_two_boundaries_share_one_load() {
        setup();
        let lazy = Lazy::new("shared", || Ok(5u32));
        let mounts = Rc::new(Cell::new(0));

        let a = suspense(&lazy, counting_render(mounts.clone(), Rc::new(Cell::new(0))), None::<fn(&LoadError)>);
        let b = suspense(&lazy, counting_render(mounts.clone(), Rc::new(Cell::new(0))), None::<fn(&LoadError)>);
        flush_microtasks();

        assert_eq!(lazy.invocations(), 1);
        assert_eq!(mounts.get(), 2);
        a();
        b();
    }
}
