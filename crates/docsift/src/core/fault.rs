//! The fault barrier.
//!
//! Collaborators run over untrusted bytes and may panic on malformed input.
//! [`contain`] turns such a panic into [`DocsiftError::Fault`] carrying the
//! panic message and a backtrace of the panicking frame.
//!
//! The backtrace is taken by a process-wide panic hook, installed on first
//! use, which chains to the previously installed hook. It only records
//! panics raised while the current thread is inside [`contain`].

use crate::error::{DocsiftError, Result};
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe, catch_unwind};
use std::sync::Once;

static INSTALL_HOOK: Once = Once::new();

thread_local! {
    static CONTAIN_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PANIC_BACKTRACE: RefCell<Option<Backtrace>> = const { RefCell::new(None) };
}

fn install_capture_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CONTAIN_DEPTH.with(Cell::get) > 0 {
                let backtrace = Backtrace::force_capture();
                PANIC_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
            }
            previous(info);
        }));
    });
}

/// Restores the depth counter even when `job` unwinds.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Self {
        CONTAIN_DEPTH.with(|depth| depth.set(depth.get() + 1));
        DepthGuard
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        CONTAIN_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Run `job`, converting a panic into a `Fault` error.
///
/// The closure is asserted unwind-safe: the state it touches (the document
/// buffer, per-call accumulators) is dropped with the failed call.
pub fn contain<T, F>(job: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    install_capture_hook();
    PANIC_BACKTRACE.with(|slot| slot.borrow_mut().take());

    let outcome = {
        let _depth = DepthGuard::enter();
        catch_unwind(AssertUnwindSafe(job))
    };

    match outcome {
        Ok(result) => result,
        Err(payload) => {
            // Payloads re-raised with `resume_unwind` skip the hook.
            let backtrace = PANIC_BACKTRACE
                .with(|slot| slot.borrow_mut().take())
                .unwrap_or_else(Backtrace::force_capture);
            Err(DocsiftError::Fault {
                message: panic_message(payload.as_ref()),
                backtrace: backtrace.to_string(),
            })
        }
    }
}

/// Text of a panic payload raised with `panic!("...")` or `panic!("{}", ..)`.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contain_passes_results_through() {
        assert_eq!(contain(|| Ok(7)).unwrap(), 7);
        let err = contain::<(), _>(|| Err(DocsiftError::NoFile)).unwrap_err();
        assert!(matches!(err, DocsiftError::NoFile));
    }

    #[test]
    fn test_contain_converts_static_panic() {
        let err = contain::<(), _>(|| panic!("corrupt structure")).unwrap_err();
        match err {
            DocsiftError::Fault { message, backtrace } => {
                assert_eq!(message, "corrupt structure");
                assert!(!backtrace.is_empty());
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_contain_converts_index_fault() {
        let data: Vec<u8> = Vec::new();
        let index = data.len() + 3;
        let err = contain(|| Ok(data[index])).unwrap_err();
        assert!(err.is_fault());
        assert!(err.to_string().contains("index out of bounds"));
    }

    #[inline(never)]
    fn rebuild_cross_reference_table(offsets: &[u64]) -> u64 {
        offsets[offsets.len() + 1]
    }

    #[test]
    fn test_backtrace_names_the_panicking_function() {
        let offsets = vec![17u64, 42];
        let err = contain(|| Ok(rebuild_cross_reference_table(&offsets))).unwrap_err();
        match err {
            DocsiftError::Fault { backtrace, .. } => {
                assert!(backtrace.contains("rebuild_cross_reference_table"), "{backtrace}");
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_contain_reports_inner_fault_once() {
        let outer = contain(|| {
            let inner = contain::<(), _>(|| panic!("inner page"));
            assert!(inner.unwrap_err().is_fault());
            Ok(1)
        });
        assert_eq!(outer.unwrap(), 1);
    }

    #[test]
    fn test_resumed_payload_still_gets_a_backtrace() {
        let err = contain::<(), _>(|| panic::resume_unwind(Box::new("re-raised"))).unwrap_err();
        match err {
            DocsiftError::Fault { message, backtrace } => {
                assert_eq!(message, "re-raised");
                assert!(!backtrace.is_empty());
            }
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn test_panic_message_unknown_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
