//! Bridge proxies and method interception
//!
//! A `BridgeProxy` stands in for a foreign object. Every call made on it goes
//! through `BridgeProxy::call`:
//!
//! 1. the method must be part of the proxy's contract;
//! 2. the guard lends the live handle to the foreign dispatcher, or reports
//!    that the proxy has been disabled (the call then resolves to the
//!    method's zero value without reaching the foreign side, whatever the
//!    arguments);
//! 3. the argument count must match the method's arity;
//! 4. if the foreign side cannot resolve the method, the interface's default
//!    body runs with this proxy as receiver; without one the call fails with
//!    `BridgeError::Unresolvable`;
//! 5. any other foreign outcome is returned unchanged.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use crate::contract::{DispatchTable, InterfaceContract};
use crate::dispatch::{DispatchError, ForeignDispatch};
use crate::error::{BridgeError, BridgeResult};
use crate::guard::{GuardState, HandleGuard};
use crate::method::{MethodDescriptor, MethodId};
use crate::options::{BridgeOptions, FallbackFailure};
use crate::value::{FromValue, IntoValue, Value};

/// Object satisfying an interface contract by forwarding to a foreign handle
///
/// Clones share the same guard: disabling one disables all of them.
#[derive(Clone)]
pub struct BridgeProxy {
    guard: Arc<HandleGuard>,
    table: Arc<DispatchTable>,
    dispatcher: Arc<dyn ForeignDispatch>,
    options: BridgeOptions,
}

impl BridgeProxy {
    pub(crate) fn new(
        guard: Arc<HandleGuard>,
        table: Arc<DispatchTable>,
        dispatcher: Arc<dyn ForeignDispatch>,
        options: BridgeOptions,
    ) -> Self {
        Self {
            guard,
            table,
            dispatcher,
            options,
        }
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    /// Call `method` through the bridge.
    ///
    /// `Ok(None)` means no value was produced (the proxy is disabled, or a
    /// default body could not be bound and the bridge is configured to
    /// degrade); callers substitute the method's zero value.
    pub fn call(&self, method: &MethodId, args: &[Value]) -> BridgeResult<Option<Value>> {
        let entry = self.entry(method)?;
        self.call_entry(entry, args)
    }

    /// Call `method` and substitute the declared zero value when no call was made
    pub fn invoke(&self, method: &MethodId, args: &[Value]) -> BridgeResult<Value> {
        let entry = self.entry(method)?;
        let returns = entry.returns;
        Ok(self
            .call_entry(entry, args)?
            .unwrap_or_else(|| returns.zero_value()))
    }

    fn entry(&self, method: &MethodId) -> BridgeResult<&MethodDescriptor> {
        self.table
            .get(method)
            .ok_or(BridgeError::NotInContract { method: *method })
    }

    fn call_entry(
        &self,
        entry: &MethodDescriptor,
        args: &[Value],
    ) -> BridgeResult<Option<Value>> {
        // A disabled proxy answers every call, well-formed or not, with the zero value.
        let outcome = self.guard.with_handle(|handle| {
            if args.len() != entry.arity {
                return Err(BridgeError::ArgumentMismatch {
                    method: entry.id,
                    expected: entry.arity,
                    got: args.len(),
                });
            }
            match self.dispatcher.dispatch(handle, &entry.id, args) {
                Ok(value) => Ok(Some(value)),
                Err(DispatchError::MethodNotResolvable { .. }) => self.fallback(entry, args),
                Err(DispatchError::Application(exception)) => {
                    Err(BridgeError::Application(exception))
                }
            }
        });

        match outcome {
            Some(result) => result,
            None => {
                trace!(
                    event = "call_unavailable",
                    method = %entry.id,
                    "Call on disabled proxy"
                );
                Ok(None)
            }
        }
    }

    /// Run the interface's default body with this proxy as receiver.
    ///
    /// Called with the guard lock held.
    fn fallback(&self, entry: &MethodDescriptor, args: &[Value]) -> BridgeResult<Option<Value>> {
        let Some(default) = entry.default else {
            error!(
                event = "unresolvable_method",
                method = %entry.id,
                "Method is not implemented on the foreign side and has no default body"
            );
            return Err(BridgeError::Unresolvable { method: entry.id });
        };

        debug!(
            event = "default_fallback",
            method = %entry.id,
            "Foreign side did not resolve method, running default body"
        );

        // Only a failure to bind this method's own arguments is subject to the
        // policy. Anything the body returns, including errors propagated from
        // nested calls, passes through unchanged.
        match default(self, args) {
            Ok(value) => Ok(Some(value)),
            Err(BridgeError::Binding { method, source }) if method == entry.id => {
                match self.options.fallback_failure {
                    FallbackFailure::Report => {
                        error!(
                            event = "fallback_failed",
                            method = %entry.id,
                            error = %source,
                            "Default body could not be invoked"
                        );
                        Err(BridgeError::FallbackFailed { method, source })
                    }
                    FallbackFailure::Degrade => {
                        warn!(
                            event = "fallback_degraded",
                            method = %entry.id,
                            error = %source,
                            "Default body could not be invoked, returning zero value"
                        );
                        Ok(None)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Disable the proxy. Every later call resolves to its zero value.
    ///
    /// Idempotent. Waits for a call in flight on another thread to finish.
    pub fn disable(&self) {
        if self.guard.disable() {
            debug!(event = "proxy_disabled", proxy = self.identity(), "Proxy disabled");
        }
    }

    pub fn state(&self) -> GuardState {
        self.guard.state()
    }

    pub fn is_disabled(&self) -> bool {
        self.guard.is_disabled()
    }

    /// Owner token that disables the proxy when dropped.
    ///
    /// The host keeps the lease next to the foreign state the handle refers
    /// to; tearing that state down drops the lease before the handle is freed.
    #[must_use = "dropping the lease disables the proxy immediately"]
    pub fn lease(&self) -> ProxyLease {
        ProxyLease {
            guard: Arc::clone(&self.guard),
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Contract this proxy satisfies
    pub fn contract(&self) -> &InterfaceContract {
        self.table.contract()
    }

    /// Whether the proxy intercepts `method`
    pub fn implements(&self, method: &MethodId) -> bool {
        self.table.contains(method)
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Identity shared by all clones of this proxy
    pub fn identity(&self) -> u64 {
        Arc::as_ptr(&self.guard) as usize as u64
    }

    /// This proxy as an object reference argument
    pub fn as_value(&self) -> Value {
        Value::Object(self.identity())
    }

    /// Whether `other` shares this proxy's guard
    pub fn same_proxy(&self, other: &BridgeProxy) -> bool {
        Arc::ptr_eq(&self.guard, &other.guard)
    }
}

impl PartialEq for BridgeProxy {
    fn eq(&self, other: &Self) -> bool {
        self.same_proxy(other)
    }
}

impl Eq for BridgeProxy {}

impl Hash for BridgeProxy {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Debug for BridgeProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeProxy")
            .field("interfaces", &self.contract().key())
            .field("state", &self.state())
            .finish()
    }
}

impl IntoValue for &BridgeProxy {
    fn into_value(self) -> Value {
        self.as_value()
    }
}

/// Disables its proxy on drop
pub struct ProxyLease {
    guard: Arc<HandleGuard>,
}

impl Drop for ProxyLease {
    fn drop(&mut self) {
        if self.guard.disable() {
            debug!(event = "proxy_disabled", reason = "lease_dropped", "Proxy disabled");
        }
    }
}

impl fmt::Debug for ProxyLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyLease")
            .field("state", &self.guard.state())
            .finish()
    }
}

/// Convert the outcome of `BridgeProxy::call` into a typed value.
///
/// A call that produced no value yields `T::default()`.
pub fn complete<T: FromValue + Default>(result: BridgeResult<Option<Value>>) -> BridgeResult<T> {
    match result? {
        Some(value) => T::from_value(value),
        None => Ok(T::default()),
    }
}

/// Typed completion for methods that cannot return an error.
///
/// # Panics
/// If the call failed: the method's signature leaves no other way to report it.
pub fn finish<T: FromValue + Default>(method: &MethodId, result: BridgeResult<Option<Value>>) -> T {
    match complete(result) {
        Ok(value) => value,
        Err(err) => panic!("call to {method} failed: {err}"),
    }
}
