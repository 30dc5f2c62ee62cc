//! Proxy factory
//!
//! `InterfaceBridge` owns the foreign dispatcher and creates proxies for
//! interface contracts. Dispatch tables are resolved once per distinct
//! contract and shared by every proxy created for it.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::contract::{ContractKey, DispatchTable, InterfaceContract};
use crate::dispatch::ForeignDispatch;
use crate::error::BridgeResult;
use crate::guard::{ForeignHandle, HandleGuard};
use crate::options::BridgeOptions;
use crate::proxy::BridgeProxy;

/// Creates proxies that forward to a foreign dispatcher
pub struct InterfaceBridge {
    dispatcher: Arc<dyn ForeignDispatch>,
    options: BridgeOptions,
    /// Contract (interface names, in order) → resolved table
    tables: DashMap<ContractKey, Arc<DispatchTable>>,
}

impl InterfaceBridge {
    /// Create a bridge with default options
    pub fn new(dispatcher: impl ForeignDispatch + 'static) -> Self {
        Self::with_options(dispatcher, BridgeOptions::default())
    }

    pub fn with_options(dispatcher: impl ForeignDispatch + 'static, options: BridgeOptions) -> Self {
        Self::from_shared(Arc::new(dispatcher), options)
    }

    /// Create a bridge around a dispatcher that is shared with other owners
    pub fn from_shared(dispatcher: Arc<dyn ForeignDispatch>, options: BridgeOptions) -> Self {
        Self {
            dispatcher,
            options,
            tables: DashMap::new(),
        }
    }

    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Create a proxy satisfying `contract` that forwards every call to `handle`.
    ///
    /// The proxy starts active and takes ownership of the handle for its
    /// whole lifetime; the handle is never freed by the bridge.
    ///
    /// # Errors
    /// `BridgeError::NullHandle` if `handle` is the null sentinel.
    pub fn create_proxy(
        &self,
        handle: ForeignHandle,
        contract: &InterfaceContract,
    ) -> BridgeResult<BridgeProxy> {
        let guard = Arc::new(HandleGuard::new(handle)?);
        let table = self.table_for(contract);
        let proxy = BridgeProxy::new(guard, table, Arc::clone(&self.dispatcher), self.options);

        debug!(
            event = "proxy_created",
            proxy = proxy.identity(),
            interfaces = ?contract.key(),
            "Proxy created"
        );
        Ok(proxy)
    }

    /// Disable `proxy` if there is one. Disabling an absent proxy is a no-op.
    pub fn disable_proxy(proxy: Option<&BridgeProxy>) {
        if let Some(proxy) = proxy {
            proxy.disable();
        }
    }

    /// Number of distinct contracts resolved so far
    pub fn cached_contracts(&self) -> usize {
        self.tables.len()
    }

    fn table_for(&self, contract: &InterfaceContract) -> Arc<DispatchTable> {
        let key = contract.key();
        if let Some(table) = self.tables.get(&key) {
            return Arc::clone(table.value());
        }
        let entry = self
            .tables
            .entry(key)
            .or_insert_with(|| Arc::new(DispatchTable::build(contract)));
        Arc::clone(entry.value())
    }
}

impl std::fmt::Debug for InterfaceBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterfaceBridge")
            .field("options", &self.options)
            .field("cached_contracts", &self.tables.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{DispatchError, UnresolvedDispatch};
    use crate::error::BridgeError;
    use crate::method::{InterfaceDescriptor, MethodDescriptor, MethodId};
    use crate::options::FallbackFailure;
    use crate::value::{Value, ValueType};

    const RUN: MethodId = MethodId::new("Runnable", "run", "()");

    static RUNNABLE_METHODS: [MethodDescriptor; 1] = [MethodDescriptor {
        id: RUN,
        arity: 0,
        returns: ValueType::Void,
        default: None,
    }];

    static RUNNABLE: InterfaceDescriptor = InterfaceDescriptor {
        name: "Runnable",
        methods: &RUNNABLE_METHODS,
        parents: &[],
    };

    fn runnable() -> InterfaceContract {
        let mut contract = InterfaceContract::new();
        contract.push(&RUNNABLE);
        contract
    }

    #[test]
    fn test_null_handle_rejected() {
        let bridge = InterfaceBridge::new(UnresolvedDispatch);
        assert!(matches!(
            bridge.create_proxy(ForeignHandle::NULL, &runnable()),
            Err(BridgeError::NullHandle)
        ));
        assert_eq!(bridge.cached_contracts(), 0);
    }

    #[test]
    fn test_tables_cached_per_contract() {
        let bridge = InterfaceBridge::new(UnresolvedDispatch);
        let a = bridge.create_proxy(ForeignHandle::from_raw(1), &runnable()).unwrap();
        let b = bridge.create_proxy(ForeignHandle::from_raw(2), &runnable()).unwrap();
        let c = bridge
            .create_proxy(ForeignHandle::from_raw(3), &InterfaceContract::new())
            .unwrap();

        assert_eq!(bridge.cached_contracts(), 2);
        assert!(a.implements(&RUN));
        assert!(b.implements(&RUN));
        assert!(!c.implements(&RUN));
        assert_ne!(a, b);
    }

    #[test]
    fn test_disable_proxy() {
        let bridge = InterfaceBridge::new(|_: ForeignHandle, _: &MethodId, _: &[Value]| {
            Ok::<_, DispatchError>(Value::Null)
        });
        let proxy = bridge.create_proxy(ForeignHandle::from_raw(5), &runnable()).unwrap();

        InterfaceBridge::disable_proxy(None);
        assert!(!proxy.is_disabled());

        InterfaceBridge::disable_proxy(Some(&proxy));
        assert!(proxy.is_disabled());
        InterfaceBridge::disable_proxy(Some(&proxy));
        assert!(proxy.is_disabled());
    }

    #[test]
    fn test_options_reach_proxies() {
        let options = BridgeOptions::default().with_fallback_failure(FallbackFailure::Degrade);
        let bridge = InterfaceBridge::with_options(UnresolvedDispatch, options);
        let proxy = bridge.create_proxy(ForeignHandle::from_raw(5), &runnable()).unwrap();

        assert_eq!(bridge.options(), &options);
        assert_eq!(proxy.options(), &options);
    }

    #[test]
    fn test_unresolved_without_default() {
        let bridge = InterfaceBridge::new(UnresolvedDispatch);
        let proxy = bridge.create_proxy(ForeignHandle::from_raw(5), &runnable()).unwrap();

        assert!(matches!(
            proxy.call(&RUN, &[]),
            Err(BridgeError::Unresolvable { method }) if method == RUN
        ));
    }
}
