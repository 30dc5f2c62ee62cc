//! Method identities and interface descriptors
//!
//! A `MethodId` names a method by declaring interface, method name and
//! signature. The foreign dispatcher resolves calls by this identity alone,
//! so two interfaces declaring a method with the same name and signature
//! still produce distinct identities.

use std::fmt;

use crate::error::{BridgeError, BridgeResult};
use crate::proxy::BridgeProxy;
use crate::value::{FromValue, Value, ValueType};

/// Identity of an interface method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId {
    /// Declaring interface
    pub interface: &'static str,
    /// Method name
    pub name: &'static str,
    /// Parameter and return signature, e.g. `"(i32, String) -> bool"`
    pub signature: &'static str,
}

impl MethodId {
    pub const fn new(interface: &'static str, name: &'static str, signature: &'static str) -> Self {
        Self {
            interface,
            name,
            signature,
        }
    }

    /// Check that `args` holds exactly `N` arguments for this method's default body
    ///
    /// # Errors
    /// `BridgeError::Binding` wrapping an `ArgumentMismatch`.
    pub fn bind<'a, const N: usize>(&self, args: &'a [Value]) -> BridgeResult<&'a [Value; N]> {
        args.try_into().map_err(|_| {
            self.binding_error(BridgeError::ArgumentMismatch {
                method: *self,
                expected: N,
                got: args.len(),
            })
        })
    }

    /// Convert one argument for this method's default body
    ///
    /// # Errors
    /// `BridgeError::Binding` wrapping the conversion failure.
    pub fn bind_arg<T: FromValue>(&self, value: &Value) -> BridgeResult<T> {
        T::from_value(value.clone()).map_err(|err| self.binding_error(err))
    }

    fn binding_error(&self, source: BridgeError) -> BridgeError {
        BridgeError::Binding {
            method: *self,
            source: Box::new(source),
        }
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}{}", self.interface, self.name, self.signature)
    }
}

/// Default body of an interface method, bound to the proxy as receiver.
///
/// Generated by `#[bridge_interface]` for every method that has a body in
/// its trait definition.
pub type DefaultMethod = fn(&BridgeProxy, &[Value]) -> BridgeResult<Value>;

/// Description of one interface method
#[derive(Debug, Clone, Copy)]
pub struct MethodDescriptor {
    /// Identity passed to the foreign dispatcher
    pub id: MethodId,
    /// Number of parameters (receiver excluded)
    pub arity: usize,
    /// Declared return type
    pub returns: ValueType,
    /// Default body, if the interface declares one
    pub default: Option<DefaultMethod>,
}

impl MethodDescriptor {
    /// Whether the interface supplies a default body
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Description of an interface: its name and every method it declares
#[derive(Debug)]
pub struct InterfaceDescriptor {
    /// Interface name (used as `MethodId::interface`)
    pub name: &'static str,
    /// Declared methods, in declaration order
    pub methods: &'static [MethodDescriptor],
    /// Interfaces this one extends. Their methods keep their own declaring interface.
    pub parents: &'static [fn() -> &'static InterfaceDescriptor],
}

impl InterfaceDescriptor {
    /// Find a method by name
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.id.name == name)
    }

    /// Number of declared methods
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Directly extended interfaces
    pub fn parents(&self) -> impl Iterator<Item = &'static InterfaceDescriptor> + '_ {
        self.parents.iter().map(|parent| parent())
    }
}

/// An interface a proxy can satisfy
///
/// Implemented by `#[bridge_interface]` for `dyn Trait`, so a contract is
/// assembled from trait objects: `InterfaceContract::new().with::<dyn Runnable>()`.
pub trait Interface {
    /// Static description of the interface
    fn descriptor() -> &'static InterfaceDescriptor;
}
