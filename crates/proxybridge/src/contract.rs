//! Interface contracts and dispatch tables
//!
//! A contract is the set of interfaces a proxy satisfies. It is resolved once
//! into a `DispatchTable` mapping every method identity to its descriptor;
//! proxies created for the same contract share the table.

use rustc_hash::FxHashMap;

use crate::method::{Interface, InterfaceDescriptor, MethodDescriptor, MethodId};
use crate::object::OBJECT_INTERFACE;

/// Ordered set of interfaces, de-duplicated by name
#[derive(Debug, Clone, Default)]
pub struct InterfaceContract {
    interfaces: Vec<&'static InterfaceDescriptor>,
}

/// Cache key identifying a contract
pub(crate) type ContractKey = Vec<&'static str>;

impl InterfaceContract {
    /// Create an empty contract (the identity methods are still answered)
    pub fn new() -> Self {
        Self::default()
    }

    /// Contract containing a single interface
    pub fn of<I: Interface + ?Sized>() -> Self {
        Self::new().with::<I>()
    }

    /// Add an interface generated by `#[bridge_interface]`
    pub fn with<I: Interface + ?Sized>(mut self) -> Self {
        self.push(I::descriptor());
        self
    }

    /// Add an interface descriptor and every interface it extends.
    ///
    /// Adding the same interface twice is a no-op.
    pub fn push(&mut self, descriptor: &'static InterfaceDescriptor) {
        if self.contains(descriptor.name) {
            return;
        }
        self.interfaces.push(descriptor);
        for parent in descriptor.parents() {
            self.push(parent);
        }
    }

    /// Whether the contract includes the named interface
    pub fn contains(&self, name: &str) -> bool {
        self.interfaces.iter().any(|i| i.name == name)
    }

    /// Interfaces in the order they were added
    pub fn interfaces(&self) -> &[&'static InterfaceDescriptor] {
        &self.interfaces
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    pub(crate) fn key(&self) -> ContractKey {
        self.interfaces.iter().map(|i| i.name).collect()
    }
}

/// Method identity → descriptor, for every method a proxy intercepts
#[derive(Debug)]
pub struct DispatchTable {
    contract: InterfaceContract,
    entries: FxHashMap<MethodId, MethodDescriptor>,
}

impl DispatchTable {
    /// Resolve a contract. The identity interface is always included.
    pub fn build(contract: &InterfaceContract) -> Self {
        let mut entries = FxHashMap::default();
        let builtin = std::iter::once(&OBJECT_INTERFACE);
        for interface in builtin.chain(contract.interfaces().iter().copied()) {
            for method in interface.methods {
                entries.entry(method.id).or_insert(*method);
            }
        }
        Self {
            contract: contract.clone(),
            entries,
        }
    }

    /// Descriptor for `method`, if the contract declares it
    #[inline]
    pub fn get(&self, method: &MethodId) -> Option<&MethodDescriptor> {
        self.entries.get(method)
    }

    pub fn contains(&self, method: &MethodId) -> bool {
        self.entries.contains_key(method)
    }

    /// Contract this table was built from
    pub fn contract(&self) -> &InterfaceContract {
        &self.contract
    }

    /// Number of intercepted methods
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All intercepted methods (unordered)
    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    static RUNNABLE_METHODS: [MethodDescriptor; 1] = [MethodDescriptor {
        id: MethodId::new("Runnable", "run", "()"),
        arity: 0,
        returns: ValueType::Void,
        default: None,
    }];

    static RUNNABLE: InterfaceDescriptor = InterfaceDescriptor {
        name: "Runnable",
        methods: &RUNNABLE_METHODS,
        parents: &[],
    };

    static TASK_METHODS: [MethodDescriptor; 2] = [
        MethodDescriptor {
            id: MethodId::new("Task", "run", "()"),
            arity: 0,
            returns: ValueType::Void,
            default: None,
        },
        MethodDescriptor {
            id: MethodId::new("Task", "priority", "() -> i32"),
            arity: 0,
            returns: ValueType::I32,
            default: None,
        },
    ];

    static TASK: InterfaceDescriptor = InterfaceDescriptor {
        name: "Task",
        methods: &TASK_METHODS,
        parents: &[],
    };

    #[test]
    fn test_contract_deduplicates() {
        let mut contract = InterfaceContract::new();
        contract.push(&RUNNABLE);
        contract.push(&TASK);
        contract.push(&RUNNABLE);

        assert_eq!(contract.len(), 2);
        assert!(contract.contains("Runnable"));
        assert!(contract.contains("Task"));
        assert!(!contract.contains("Iterator"));
        assert_eq!(contract.key(), vec!["Runnable", "Task"]);
    }

    static RUNNABLE_TASK_METHODS: [MethodDescriptor; 1] = [MethodDescriptor {
        id: MethodId::new("RunnableTask", "cancel", "() -> bool"),
        arity: 0,
        returns: ValueType::Bool,
        default: None,
    }];

    fn runnable() -> &'static InterfaceDescriptor {
        &RUNNABLE
    }

    fn task() -> &'static InterfaceDescriptor {
        &TASK
    }

    static RUNNABLE_TASK: InterfaceDescriptor = InterfaceDescriptor {
        name: "RunnableTask",
        methods: &RUNNABLE_TASK_METHODS,
        parents: &[runnable, task],
    };

    #[test]
    fn test_contract_includes_extended_interfaces() {
        let mut contract = InterfaceContract::new();
        contract.push(&RUNNABLE);
        contract.push(&RUNNABLE_TASK);
        assert_eq!(contract.key(), vec!["Runnable", "RunnableTask", "Task"]);

        let table = DispatchTable::build(&contract);
        assert!(table.contains(&MethodId::new("RunnableTask", "cancel", "() -> bool")));
        assert!(table.contains(&MethodId::new("Runnable", "run", "()")));
        assert!(table.contains(&MethodId::new("Task", "priority", "() -> i32")));
    }

    #[test]
    fn test_table_covers_every_method() {
        let mut contract = InterfaceContract::new();
        contract.push(&RUNNABLE);
        contract.push(&TASK);
        let table = DispatchTable::build(&contract);

        let object_methods = OBJECT_INTERFACE.method_count();
        assert_eq!(table.len(), 3 + object_methods);
        assert!(table.contains(&MethodId::new("Runnable", "run", "()")));
        assert!(table.contains(&MethodId::new("Task", "run", "()")));
        assert_eq!(
            table
                .get(&MethodId::new("Task", "priority", "() -> i32"))
                .map(|m| m.returns),
            Some(ValueType::I32)
        );
    }

    #[test]
    fn test_empty_contract_still_has_identity_methods() {
        let table = DispatchTable::build(&InterfaceContract::new());
        assert!(!table.is_empty());
        assert!(table
            .methods()
            .all(|m| m.id.interface == OBJECT_INTERFACE.name));
    }
}
