//! Foreign dispatch boundary
//!
//! The bridge never executes a method itself; it hands the live handle, the
//! method identity and the arguments to a `ForeignDispatch` implementation
//! owned by the embedding host. The dispatcher resolves the method by its
//! identity (not by the proxy's runtime type) and reports either a value, an
//! application error, or that it has no implementation for the method.

use crate::guard::ForeignHandle;
use crate::method::MethodId;
use crate::value::Value;

/// Error thrown by the foreign implementation of a method.
///
/// The bridge adds no interpretation; kind and message are whatever the
/// foreign side reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ForeignException {
    /// Foreign error kind (exception class, errno name, ...)
    pub kind: String,
    /// Human-readable message
    pub message: String,
}

impl ForeignException {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Outcome of a failed foreign dispatch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The foreign side has no implementation for this method identity
    #[error("method {method} is not resolvable on the foreign side")]
    MethodNotResolvable {
        /// Method identity that failed to resolve
        method: MethodId,
    },

    /// The foreign implementation ran and failed
    #[error(transparent)]
    Application(#[from] ForeignException),
}

impl DispatchError {
    /// Shorthand for `MethodNotResolvable`
    pub fn not_resolvable(method: &MethodId) -> Self {
        DispatchError::MethodNotResolvable { method: *method }
    }
}

/// Trait implemented by the foreign-side dispatcher
///
/// `dispatch` is called with the guard's lock held: it must not free the
/// handle, and it must return in bounded time. Calls made back into the same
/// proxy from inside `dispatch` on the same thread are allowed.
pub trait ForeignDispatch: Send + Sync {
    /// Invoke `method` on the foreign object identified by `handle`
    fn dispatch(
        &self,
        handle: ForeignHandle,
        method: &MethodId,
        args: &[Value],
    ) -> Result<Value, DispatchError>;
}

impl<F> ForeignDispatch for F
where
    F: Fn(ForeignHandle, &MethodId, &[Value]) -> Result<Value, DispatchError> + Send + Sync,
{
    fn dispatch(
        &self,
        handle: ForeignHandle,
        method: &MethodId,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        self(handle, method, args)
    }
}

/// A dispatcher that resolves nothing
///
/// Every call falls through to the method's default body, which makes it a
/// convenient stand-in for a foreign object that overrides no methods.
pub struct UnresolvedDispatch;

impl ForeignDispatch for UnresolvedDispatch {
    fn dispatch(
        &self,
        _handle: ForeignHandle,
        method: &MethodId,
        _args: &[Value],
    ) -> Result<Value, DispatchError> {
        Err(DispatchError::not_resolvable(method))
    }
}
