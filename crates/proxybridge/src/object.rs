//! Identity methods answered by every proxy
//!
//! `hash_code`, `equals` and `to_string` are part of every contract. They are
//! forwarded to the foreign side like any other method; when the foreign
//! object does not implement them, identity-based defaults apply.

use crate::error::BridgeResult;
use crate::method::{InterfaceDescriptor, MethodDescriptor, MethodId};
use crate::proxy::{finish, BridgeProxy};
use crate::value::{Value, ValueType};

/// Name of the built-in identity interface
pub const OBJECT: &str = "Object";

pub const HASH_CODE: MethodId = MethodId::new(OBJECT, "hash_code", "() -> i32");
pub const EQUALS: MethodId = MethodId::new(OBJECT, "equals", "(Value) -> bool");
pub const TO_STRING: MethodId = MethodId::new(OBJECT, "to_string", "() -> String");

static OBJECT_METHODS: [MethodDescriptor; 3] = [
    MethodDescriptor {
        id: HASH_CODE,
        arity: 0,
        returns: ValueType::I32,
        default: Some(default_hash_code),
    },
    MethodDescriptor {
        id: EQUALS,
        arity: 1,
        returns: ValueType::Bool,
        default: Some(default_equals),
    },
    MethodDescriptor {
        id: TO_STRING,
        arity: 0,
        returns: ValueType::Str,
        default: Some(default_to_string),
    },
];

/// Descriptor of the identity interface, included in every dispatch table
pub static OBJECT_INTERFACE: InterfaceDescriptor = InterfaceDescriptor {
    name: OBJECT,
    methods: &OBJECT_METHODS,
    parents: &[],
};

fn identity_hash(proxy: &BridgeProxy) -> i32 {
    let id = proxy.identity();
    (id ^ (id >> 32)) as i32
}

fn default_hash_code(proxy: &BridgeProxy, args: &[Value]) -> BridgeResult<Value> {
    HASH_CODE.bind::<0>(args)?;
    Ok(Value::I32(identity_hash(proxy)))
}

fn default_equals(proxy: &BridgeProxy, args: &[Value]) -> BridgeResult<Value> {
    let [other] = EQUALS.bind::<1>(args)?;
    Ok(Value::Bool(*other == proxy.as_value()))
}

fn default_to_string(proxy: &BridgeProxy, args: &[Value]) -> BridgeResult<Value> {
    TO_STRING.bind::<0>(args)?;
    let names: Vec<&str> = proxy
        .contract()
        .interfaces()
        .iter()
        .map(|i| i.name)
        .collect();
    Ok(Value::Str(format!(
        "Proxy[{}]@{:x}",
        names.join(", "),
        identity_hash(proxy) as u32
    )))
}

/// Typed access to the identity methods
pub trait ObjectMethods {
    fn hash_code(&self) -> i32;
    fn equals(&self, other: Value) -> bool;
    fn to_string(&self) -> String;
}

impl ObjectMethods for BridgeProxy {
    fn hash_code(&self) -> i32 {
        finish(&HASH_CODE, self.call(&HASH_CODE, &[]))
    }

    fn equals(&self, other: Value) -> bool {
        finish(&EQUALS, self.call(&EQUALS, &[other]))
    }

    fn to_string(&self) -> String {
        finish(&TO_STRING, self.call(&TO_STRING, &[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use crate::bridge::InterfaceBridge;
    use crate::contract::InterfaceContract;
    use crate::dispatch::{DispatchError, UnresolvedDispatch};
    use crate::guard::ForeignHandle;

    fn proxy(bridge: &InterfaceBridge, raw: u64) -> BridgeProxy {
        bridge
            .create_proxy(ForeignHandle::from_raw(raw), &InterfaceContract::new())
            .unwrap()
    }

    #[test]
    fn test_identity_defaults() {
        let bridge = InterfaceBridge::new(UnresolvedDispatch);
        let a = proxy(&bridge, 1);
        let b = proxy(&bridge, 1);

        assert!(a.equals(a.as_value()));
        assert!(a.equals(a.clone().as_value()));
        assert!(!a.equals(b.as_value()));
        assert!(!a.equals(Value::Null));
        assert_eq!(a.hash_code(), a.clone().hash_code());
        assert!(ObjectMethods::to_string(&a).starts_with("Proxy[]@"));
    }

    #[test]
    fn test_identity_methods_forwarded_first() {
        let bridge = InterfaceBridge::new(
            |_: ForeignHandle, method: &MethodId, _: &[Value]| -> Result<Value, DispatchError> {
                match *method {
                    TO_STRING => Ok(Value::Str("Runnable(native)".to_string())),
                    HASH_CODE => Ok(Value::I32(23754)),
                    _ => Err(DispatchError::not_resolvable(method)),
                }
            },
        );
        let proxy = proxy(&bridge, 9);

        assert_eq!(ObjectMethods::to_string(&proxy), "Runnable(native)");
        assert_eq!(proxy.hash_code(), 23754);
        assert!(proxy.equals(proxy.as_value()));
    }

    #[test]
    fn test_disabled_identity_methods() {
        let bridge = InterfaceBridge::new(UnresolvedDispatch);
        let proxy = proxy(&bridge, 4);
        proxy.disable();

        assert_eq!(proxy.hash_code(), 0);
        assert!(!proxy.equals(proxy.as_value()));
        assert_eq!(ObjectMethods::to_string(&proxy), "");
    }

    #[test]
    fn test_default_rejects_wrong_arity() {
        let bridge = InterfaceBridge::new(UnresolvedDispatch);
        let proxy = proxy(&bridge, 4);
        match default_equals(&proxy, &[]) {
            Err(BridgeError::Binding { method, source }) => {
                assert_eq!(method, EQUALS);
                assert!(matches!(
                    *source,
                    BridgeError::ArgumentMismatch { expected: 1, got: 0, .. }
                ));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
