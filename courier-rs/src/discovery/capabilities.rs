//! Static capability sets: a component type declares the contracts it fulfils.
//!
//! ```ignore
//! impl Capabilities for UserHandler {
//!     fn declare(contracts: &mut ContractSet<Self>) {
//!         contracts.command_with_result::<CreateUser>().query_with_params::<GetUser>();
//!     }
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use courier_core::{ContainerError, Inject, Lifetime, Scope, ServiceDescriptor};

use crate::contracts::{
    CommandContract, CommandDecorator, CommandHandler, CommandWithResultContract,
    CommandWithResultDecorator, CommandWithResultHandler, Contract, ContractRole, ContractType,
    OpenDecorator, QueryContract, QueryDecorator, QueryHandler, QueryWithParamsContract,
    QueryWithParamsDecorator, QueryWithParamsHandler, TypeInfo,
};
use crate::messages::{Command, CommandWithResult, Query};
use crate::proxy::ProxyDescriptor;

/// Declares every handler and decorator contract a type implements.
pub trait Capabilities: Inject {
    fn declare(contracts: &mut ContractSet<Self>);
}

pub(crate) type OpenFactory =
    Arc<dyn Fn(&Scope) -> Result<Arc<dyn OpenDecorator>, ContainerError> + Send + Sync>;

type Factory<S> = Arc<dyn Fn(&Scope) -> Result<Arc<S>, ContainerError> + Send + Sync>;

/// Typed knowledge behind a contract: how to register the concrete type under it.
pub(crate) trait ErasedBinding: Send + Sync {
    /// `None` for open decorators, which are registered per closed contract by the registrar.
    fn descriptor(&self, implementation: &'static str, lifetime: Lifetime) -> Option<ServiceDescriptor>;

    fn proxy(&self) -> Option<ProxyDescriptor>;

    fn open_factory(&self) -> Option<OpenFactory>;
}

/// One declared contract of a component.
#[derive(Clone)]
pub struct Binding {
    contract: ContractType,
    inner: Arc<dyn ErasedBinding>,
}

impl Binding {
    fn new(contract: ContractType, inner: impl ErasedBinding + 'static) -> Self {
        Self {
            contract,
            inner: Arc::new(inner),
        }
    }

    pub fn contract(&self) -> ContractType {
        self.contract
    }

    pub(crate) fn descriptor(
        &self,
        implementation: &'static str,
        lifetime: Lifetime,
    ) -> Option<ServiceDescriptor> {
        self.inner.descriptor(implementation, lifetime)
    }

    pub(crate) fn proxy(&self) -> Option<ProxyDescriptor> {
        self.inner.proxy()
    }

    pub(crate) fn open_factory(&self) -> Option<OpenFactory> {
        self.inner.open_factory()
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Binding({})", self.contract)
    }
}

struct HandlerBinding<K: Contract> {
    factory: Factory<K::Handler>,
}

impl<K: Contract> ErasedBinding for HandlerBinding<K> {
    fn descriptor(&self, implementation: &'static str, lifetime: Lifetime) -> Option<ServiceDescriptor> {
        let factory = Arc::clone(&self.factory);
        Some(ServiceDescriptor::new::<K::Handler, _>(
            implementation,
            lifetime,
            move |scope| factory(scope),
        ))
    }

    fn proxy(&self) -> Option<ProxyDescriptor> {
        Some(ProxyDescriptor::of::<K>())
    }

    fn open_factory(&self) -> Option<OpenFactory> {
        None
    }
}

struct DecoratorBinding<K: Contract> {
    factory: Factory<K::Decorator>,
}

impl<K: Contract> ErasedBinding for DecoratorBinding<K> {
    fn descriptor(&self, implementation: &'static str, lifetime: Lifetime) -> Option<ServiceDescriptor> {
        let factory = Arc::clone(&self.factory);
        Some(ServiceDescriptor::new::<K::Decorator, _>(
            implementation,
            lifetime,
            move |scope| factory(scope),
        ))
    }

    fn proxy(&self) -> Option<ProxyDescriptor> {
        None
    }

    fn open_factory(&self) -> Option<OpenFactory> {
        None
    }
}

struct OpenBinding {
    factory: OpenFactory,
}

impl ErasedBinding for OpenBinding {
    fn descriptor(&self, _: &'static str, _: Lifetime) -> Option<ServiceDescriptor> {
        None
    }

    fn proxy(&self) -> Option<ProxyDescriptor> {
        None
    }

    fn open_factory(&self) -> Option<OpenFactory> {
        Some(Arc::clone(&self.factory))
    }
}

/// Contracts declared by component `T`. Each method checks at compile time that `T` implements the contract.
pub struct ContractSet<T> {
    bindings: Vec<Binding>,
    _component: PhantomData<fn() -> T>,
}

impl<T: Inject> ContractSet<T> {
    pub(crate) fn new() -> Self {
        Self {
            bindings: Vec::new(),
            _component: PhantomData,
        }
    }

    pub(crate) fn into_bindings(self) -> Vec<Binding> {
        self.bindings
    }

    fn handler<K, F>(&mut self, factory: F) -> &mut Self
    where
        K: Contract,
        F: Fn(&Scope) -> Result<Arc<K::Handler>, ContainerError> + Send + Sync + 'static,
    {
        let binding = HandlerBinding::<K> {
            factory: Arc::new(factory),
        };
        self.bindings.push(Binding::new(K::handler_contract(), binding));
        self
    }

    fn decorator<K, F>(&mut self, factory: F) -> &mut Self
    where
        K: Contract,
        F: Fn(&Scope) -> Result<Arc<K::Decorator>, ContainerError> + Send + Sync + 'static,
    {
        let binding = DecoratorBinding::<K> {
            factory: Arc::new(factory),
        };
        self.bindings.push(Binding::new(K::decorator_contract(), binding));
        self
    }

    pub fn command<C: Command>(&mut self) -> &mut Self
    where
        T: CommandHandler<C>,
    {
        self.handler::<CommandContract<C>, _>(|scope| {
            let handler: Arc<dyn CommandHandler<C>> = Arc::new(T::inject(scope)?);
            Ok(handler)
        })
    }

    pub fn command_with_result<C: CommandWithResult>(&mut self) -> &mut Self
    where
        T: CommandWithResultHandler<C>,
    {
        self.handler::<CommandWithResultContract<C>, _>(|scope| {
            let handler: Arc<dyn CommandWithResultHandler<C>> = Arc::new(T::inject(scope)?);
            Ok(handler)
        })
    }

    /// Parameterless query producing `R`.
    pub fn query<R: Send + 'static>(&mut self) -> &mut Self
    where
        T: QueryHandler<R>,
    {
        self.handler::<QueryContract<R>, _>(|scope| {
            let handler: Arc<dyn QueryHandler<R>> = Arc::new(T::inject(scope)?);
            Ok(handler)
        })
    }

    pub fn query_with_params<Q: Query>(&mut self) -> &mut Self
    where
        T: QueryWithParamsHandler<Q>,
    {
        self.handler::<QueryWithParamsContract<Q>, _>(|scope| {
            let handler: Arc<dyn QueryWithParamsHandler<Q>> = Arc::new(T::inject(scope)?);
            Ok(handler)
        })
    }

    pub fn command_decorator<C: Command>(&mut self) -> &mut Self
    where
        T: CommandDecorator<C>,
    {
        self.decorator::<CommandContract<C>, _>(|scope| {
            let decorator: Arc<dyn CommandDecorator<C>> = Arc::new(T::inject(scope)?);
            Ok(decorator)
        })
    }

    pub fn command_with_result_decorator<C: CommandWithResult>(&mut self) -> &mut Self
    where
        T: CommandWithResultDecorator<C>,
    {
        self.decorator::<CommandWithResultContract<C>, _>(|scope| {
            let decorator: Arc<dyn CommandWithResultDecorator<C>> = Arc::new(T::inject(scope)?);
            Ok(decorator)
        })
    }

    pub fn query_decorator<R: Send + 'static>(&mut self) -> &mut Self
    where
        T: QueryDecorator<R>,
    {
        self.decorator::<QueryContract<R>, _>(|scope| {
            let decorator: Arc<dyn QueryDecorator<R>> = Arc::new(T::inject(scope)?);
            Ok(decorator)
        })
    }

    pub fn query_with_params_decorator<Q: Query>(&mut self) -> &mut Self
    where
        T: QueryWithParamsDecorator<Q>,
    {
        self.decorator::<QueryWithParamsContract<Q>, _>(|scope| {
            let decorator: Arc<dyn QueryWithParamsDecorator<Q>> = Arc::new(T::inject(scope)?);
            Ok(decorator)
        })
    }
}

/// A concrete type with its declared contracts: the unit of explicit registration and of assembly scanning.
#[derive(Clone, Debug)]
pub struct Component {
    ty: TypeInfo,
    bindings: Vec<Binding>,
}

impl Component {
    pub fn of<T: Capabilities>() -> Self {
        Self::declared::<T>(T::declare)
    }

    /// Component whose contracts are declared by `declare` instead of a [`Capabilities`] impl.
    /// Useful for generic types whose contracts depend on their parameters.
    pub fn declared<T: Inject>(declare: impl FnOnce(&mut ContractSet<T>)) -> Self {
        let mut contracts = ContractSet::<T>::new();
        declare(&mut contracts);
        Self {
            ty: TypeInfo::of::<T>(),
            bindings: contracts.into_bindings(),
        }
    }

    /// Open decorator: one generic-definition binding per distinct declared shape.
    pub(crate) fn open<D: OpenDecorator + Inject>() -> Self {
        let factory: OpenFactory = Arc::new(|scope: &Scope| -> Result<_, ContainerError> {
            let decorator: Arc<dyn OpenDecorator> = Arc::new(D::inject(scope)?);
            Ok(decorator)
        });
        let mut shapes = D::shapes();
        let mut seen = HashSet::new();
        shapes.retain(|shape| seen.insert(*shape));
        let bindings = shapes
            .into_iter()
            .map(|shape| {
                Binding::new(
                    ContractType::generic_definition(ContractRole::Decorator, shape),
                    OpenBinding {
                        factory: Arc::clone(&factory),
                    },
                )
            })
            .collect();
        Self {
            ty: TypeInfo::of::<D>(),
            bindings,
        }
    }

    pub fn type_info(&self) -> TypeInfo {
        self.ty
    }

    pub fn handler_bindings(&self) -> impl Iterator<Item = &Binding> {
        self.with_role(ContractRole::Handler)
    }

    pub fn decorator_bindings(&self) -> impl Iterator<Item = &Binding> {
        self.with_role(ContractRole::Decorator)
    }

    pub fn is_handler(&self) -> bool {
        self.handler_bindings().next().is_some()
    }

    pub fn is_decorator(&self) -> bool {
        self.decorator_bindings().next().is_some()
    }

    fn with_role(&self, role: ContractRole) -> impl Iterator<Item = &Binding> {
        self.bindings
            .iter()
            .filter(move |binding| binding.contract.role() == role)
    }
}
