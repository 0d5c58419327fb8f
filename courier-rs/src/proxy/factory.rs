//! Proxy factory: handler registration entry → proxy descriptor.

use std::marker::PhantomData;
use std::sync::Arc;

use courier_core::{Lifetime, ServiceCollection, ServiceDescriptor};

use super::composite::Proxy;
use crate::contracts::{Contract, ContractRole, ContractType, TypeInfo};
use crate::discovery::{OpenFactory, RegistrationEntry};
use crate::dispatch::DispatchTable;
use crate::Error;

/// Proxy type for one handler contract and the decorator contract it collects.
#[derive(Clone)]
pub struct ProxyDescriptor {
    proxy: TypeInfo,
    handler: ContractType,
    decorators: ContractType,
    installer: Arc<dyn ProxyInstaller>,
}

impl ProxyDescriptor {
    pub(crate) fn of<K: Contract>() -> Self {
        Self {
            proxy: TypeInfo::of::<Proxy<K>>(),
            handler: K::handler_contract(),
            decorators: K::decorator_contract(),
            installer: Arc::new(TypedInstaller::<K>(PhantomData)),
        }
    }

    pub fn proxy_type(&self) -> TypeInfo {
        self.proxy
    }

    pub fn handler_contract(&self) -> ContractType {
        self.handler
    }

    pub fn decorator_contract(&self) -> ContractType {
        self.decorators
    }

    /// Self-register the proxy, transient. Returns false when it is already registered.
    pub(crate) fn register(&self, services: &mut ServiceCollection) -> bool {
        self.installer.register(services)
    }

    pub(crate) fn register_dispatch(&self, table: &mut DispatchTable) {
        self.installer.register_dispatch(table)
    }

    /// Close an open decorator over this proxy's contract and register it.
    pub(crate) fn register_open_decorator(
        &self,
        services: &mut ServiceCollection,
        implementation: &'static str,
        lifetime: Lifetime,
        factory: OpenFactory,
    ) {
        self.installer
            .register_open_decorator(services, implementation, lifetime, factory)
    }
}

impl std::fmt::Debug for ProxyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyDescriptor")
            .field("proxy", &self.proxy.name())
            .field("decorators", &self.decorators.to_string())
            .finish()
    }
}

trait ProxyInstaller: Send + Sync {
    fn register(&self, services: &mut ServiceCollection) -> bool;

    fn register_dispatch(&self, table: &mut DispatchTable);

    fn register_open_decorator(
        &self,
        services: &mut ServiceCollection,
        implementation: &'static str,
        lifetime: Lifetime,
        factory: OpenFactory,
    );
}

struct TypedInstaller<K>(PhantomData<fn() -> K>);

impl<K: Contract> ProxyInstaller for TypedInstaller<K> {
    fn register(&self, services: &mut ServiceCollection) -> bool {
        services.try_add(ServiceDescriptor::injected::<Proxy<K>>(Lifetime::Transient))
    }

    fn register_dispatch(&self, table: &mut DispatchTable) {
        K::register_dispatch(table)
    }

    fn register_open_decorator(
        &self,
        services: &mut ServiceCollection,
        implementation: &'static str,
        lifetime: Lifetime,
        factory: OpenFactory,
    ) {
        services.add(ServiceDescriptor::new::<K::Decorator, _>(
            implementation,
            lifetime,
            move |scope| factory(scope).map(K::adapt),
        ));
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProxyFactory;

impl ProxyFactory {
    /// Descriptor for the proxy of `entry`'s handler contract.
    ///
    /// Rejects decorator contracts, generic definitions and bindings whose family does not
    /// match the declared contract with [`Error::UnsupportedContract`].
    pub fn build(&self, entry: &RegistrationEntry) -> Result<ProxyDescriptor, Error> {
        let contract = entry.contract();
        let unsupported = || Error::UnsupportedContract {
            contract: contract.to_string(),
        };
        if contract.role() != ContractRole::Handler || contract.is_generic_definition() {
            return Err(unsupported());
        }
        let descriptor = entry.binding().proxy().ok_or_else(unsupported)?;
        if descriptor.handler_contract() != contract {
            return Err(unsupported());
        }
        Ok(descriptor)
    }
}
