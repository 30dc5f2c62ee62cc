//! Error types for the bridge

use crate::dispatch::ForeignException;
use crate::method::MethodId;
use crate::value::ValueType;

/// Result type for bridge calls
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors surfaced by a proxy call or by proxy construction
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    /// The foreign side could not resolve the method and it has no default body
    #[error("method {method} is not implemented on the foreign side and has no default")]
    Unresolvable {
        /// Method the foreign dispatcher rejected
        method: MethodId,
    },

    /// Error raised by the foreign implementation, passed through untouched
    #[error(transparent)]
    Application(#[from] ForeignException),

    /// A proxy can only be created around a live (non-zero) handle
    #[error("cannot create a proxy around the null handle")]
    NullHandle,

    /// Method is not part of the proxy's interface contract
    #[error("method {method} is not part of this proxy's contract")]
    NotInContract {
        /// Method that was called
        method: MethodId,
    },

    /// Type mismatch during conversion
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Declared type
        expected: ValueType,
        /// Actual value type name
        got: &'static str,
    },

    /// Wrong number of arguments handed to a default body
    #[error("method {method} expects {expected} arguments, got {got}")]
    ArgumentMismatch {
        /// Method being invoked
        method: MethodId,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Arguments handed to a default body did not fit its parameters.
    ///
    /// Raised only while binding, never by the body itself.
    #[error("arguments of {method} could not be bound: {source}")]
    Binding {
        /// Method whose default body was being bound
        method: MethodId,
        /// Arity or conversion failure
        source: Box<BridgeError>,
    },

    /// The default body could not be bound to the call's arguments
    #[error("default body of {method} could not be invoked: {source}")]
    FallbackFailed {
        /// Method whose default body failed
        method: MethodId,
        /// Binding failure
        source: Box<BridgeError>,
    },
}

impl BridgeError {
    /// Whether the error was raised while binding arguments to a default body
    pub fn is_binding_failure(&self) -> bool {
        matches!(self, BridgeError::Binding { .. })
    }
}
