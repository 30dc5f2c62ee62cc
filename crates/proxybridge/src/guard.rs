//! Foreign handle ownership and invalidation
//!
//! `HandleGuard` owns one opaque foreign handle. Every read and write of the
//! handle, and every foreign call made with it, happens while the guard's
//! lock is held, so disabling the guard never interleaves with a call that
//! is still using the handle.
//!
//! The lock is reentrant: code running under `with_handle` (the foreign
//! dispatcher, or a default body invoked from the bridge) may call back into
//! the same proxy on the same thread. Other threads are serialized.

use std::cell::Cell;
use std::fmt;

use parking_lot::ReentrantMutex;

use crate::error::{BridgeError, BridgeResult};

/// Opaque handle identifying foreign-side state.
///
/// Never interpreted by the bridge; only compared against the null sentinel.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignHandle(u64);

impl ForeignHandle {
    /// The sentinel stored in a disabled guard
    pub const NULL: ForeignHandle = ForeignHandle(0);

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for ForeignHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForeignHandle({:#x})", self.0)
    }
}

/// Lifecycle state of a guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Handle present; calls reach the foreign side
    Active,
    /// Handle cleared; terminal
    Disabled,
}

/// Owner of a single foreign handle
pub struct HandleGuard {
    handle: ReentrantMutex<Cell<ForeignHandle>>,
}

impl HandleGuard {
    /// Create an active guard around `handle`
    ///
    /// # Errors
    /// `BridgeError::NullHandle` if `handle` is the null sentinel.
    pub fn new(handle: ForeignHandle) -> BridgeResult<Self> {
        if handle.is_null() {
            return Err(BridgeError::NullHandle);
        }
        Ok(Self {
            handle: ReentrantMutex::new(Cell::new(handle)),
        })
    }

    /// Run `f` with the handle while holding the lock.
    ///
    /// Returns `None` without calling `f` if the guard has been disabled.
    pub fn with_handle<R>(&self, f: impl FnOnce(ForeignHandle) -> R) -> Option<R> {
        let slot = self.handle.lock();
        let handle = slot.get();
        if handle.is_null() {
            return None;
        }
        Some(f(handle))
    }

    /// Clear the handle. Irreversible and idempotent.
    ///
    /// Blocks until any call in flight on another thread has finished.
    /// Returns `true` if this call performed the transition.
    pub fn disable(&self) -> bool {
        let slot = self.handle.lock();
        !slot.replace(ForeignHandle::NULL).is_null()
    }

    /// Current lifecycle state
    pub fn state(&self) -> GuardState {
        if self.handle.lock().get().is_null() {
            GuardState::Disabled
        } else {
            GuardState::Active
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.state() == GuardState::Disabled
    }
}

impl fmt::Debug for HandleGuard {
    // The handle itself stays private to the guard.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleGuard")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn guard(raw: u64) -> HandleGuard {
        HandleGuard::new(ForeignHandle::from_raw(raw)).unwrap()
    }

    #[test]
    fn test_null_handle_rejected() {
        assert!(matches!(
            HandleGuard::new(ForeignHandle::NULL),
            Err(BridgeError::NullHandle)
        ));
    }

    #[test]
    fn test_with_handle_passes_handle() {
        let guard = guard(42);
        assert_eq!(guard.state(), GuardState::Active);
        let seen = guard.with_handle(|h| h.as_raw());
        assert_eq!(seen, Some(42));
    }

    #[test]
    fn test_disabled_guard_skips_call() {
        let guard = guard(42);
        assert!(guard.disable());

        let calls = AtomicUsize::new(0);
        let result = guard.with_handle(|_| calls.fetch_add(1, Ordering::SeqCst));
        assert_eq!(result, None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(guard.is_disabled());
    }

    #[test]
    fn test_disable_idempotent() {
        let guard = guard(7);
        assert!(guard.disable());
        assert!(!guard.disable());
        assert!(!guard.disable());
        assert_eq!(guard.state(), GuardState::Disabled);
    }

    #[test]
    fn test_reentrant_use() {
        let guard = guard(9);
        let nested = guard.with_handle(|outer| {
            guard.with_handle(|inner| (outer.as_raw(), inner.as_raw()))
        });
        assert_eq!(nested, Some(Some((9, 9))));
    }

    #[test]
    fn test_disable_from_inside_use() {
        let guard = guard(3);
        let result = guard.with_handle(|h| {
            guard.disable();
            h.as_raw()
        });
        // The call that was already running completes with the handle it captured.
        assert_eq!(result, Some(3));
        assert_eq!(guard.with_handle(|h| h.as_raw()), None);
    }

    #[test]
    fn test_debug_hides_handle() {
        let guard = guard(0xdead);
        let text = format!("{:?}", guard);
        assert!(text.contains("Active"));
        assert!(!text.contains("dead"));
    }
}
