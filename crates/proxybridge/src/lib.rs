//! proxybridge - interface proxies backed by foreign objects
//!
//! A proxy satisfies one or more interfaces by forwarding every call to a
//! foreign dispatcher together with an opaque handle. When the foreign side
//! has no implementation for a method, the interface's default body runs
//! with the proxy as receiver. Once disabled, a proxy stops reaching the
//! foreign side and every call resolves to the method's zero value.
//!
//! # Example
//!
//! ```ignore
//! use proxybridge::{bridge_interface, ForeignHandle, InterfaceBridge, InterfaceContract};
//!
//! #[bridge_interface]
//! pub trait Runnable {
//!     fn run(&self);
//! }
//!
//! let bridge = InterfaceBridge::new(host_dispatcher);
//! let proxy = bridge.create_proxy(handle, &InterfaceContract::of::<dyn Runnable>())?;
//! let lease = proxy.lease();
//! proxy.run();
//! drop(lease); // later calls do nothing
//! ```

extern crate self as proxybridge;

pub mod bridge;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod guard;
pub mod logging;
pub mod method;
pub mod object;
pub mod options;
pub mod proxy;
pub mod value;

pub use bridge::InterfaceBridge;
pub use contract::{DispatchTable, InterfaceContract};
pub use dispatch::{DispatchError, ForeignDispatch, ForeignException, UnresolvedDispatch};
pub use error::{BridgeError, BridgeResult};
pub use guard::{ForeignHandle, GuardState, HandleGuard};
pub use method::{DefaultMethod, Interface, InterfaceDescriptor, MethodDescriptor, MethodId};
pub use object::{ObjectMethods, OBJECT_INTERFACE};
pub use options::{BridgeOptions, FallbackFailure};
pub use proxy::{BridgeProxy, ProxyLease};
pub use value::{FromValue, IntoValue, Value, ValueType};

pub use proxybridge_macros::bridge_interface;

/// Support code for `#[bridge_interface]` expansions
#[doc(hidden)]
pub mod __private {
    use crate::error::{BridgeError, BridgeResult};
    use crate::method::MethodId;
    use crate::value::{FromValue, IntoValue, Value};

    pub use crate::proxy::{complete, finish};

    /// Typed completion for methods returning `Result<T, E>`
    pub fn finish_result<T, E>(result: BridgeResult<Option<Value>>) -> Result<T, E>
    where
        T: FromValue + Default,
        E: From<BridgeError>,
    {
        complete(result).map_err(E::from)
    }

    /// Convert one argument handed to the default body of `method`
    pub fn arg<T: FromValue>(method: &MethodId, value: &Value) -> BridgeResult<T> {
        method.bind_arg(value)
    }

    /// Wrap the value returned by a default body
    pub fn ret<T: IntoValue>(value: T) -> BridgeResult<Value> {
        Ok(value.into_value())
    }

    /// Wrap the `Result` returned by a default body
    pub fn ret_result<T, E>(result: Result<T, E>) -> BridgeResult<Value>
    where
        T: IntoValue,
        E: Into<BridgeError>,
    {
        result.map(IntoValue::into_value).map_err(Into::into)
    }
}
