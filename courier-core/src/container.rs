//! DI container: register descriptors by service type, resolve one or all, with lifetimes and scopes.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("required service not registered: {service}")]
    NotRegistered { service: &'static str },
    #[error("failed to construct {service}: {source}")]
    Construction {
        service: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ContainerError {
    pub fn not_registered<S: ?Sized>() -> Self {
        ContainerError::NotRegistered {
            service: type_name::<S>(),
        }
    }

    /// For `Inject` impls whose own setup fails (bad settings, unreachable resource, ...).
    pub fn construction<S: ?Sized>(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ContainerError::Construction {
            service: type_name::<S>(),
            source: source.into(),
        }
    }
}

/// Instance sharing policy for a registration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// New instance on every resolution.
    #[default]
    Transient,
    /// One instance per [`Scope`].
    Scoped,
    /// One instance per [`ServiceProvider`].
    Singleton,
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifetime::Transient => f.write_str("transient"),
            Lifetime::Scoped => f.write_str("scoped"),
            Lifetime::Singleton => f.write_str("singleton"),
        }
    }
}

/// Constructor injection: build `Self` from services resolved out of `scope`.
/// `#[derive(Inject)]` from `courier` implements this for structs whose fields are `Arc<T>` services.
pub trait Inject: Sized + Send + Sync + 'static {
    fn inject(scope: &Scope) -> Result<Self, ContainerError>;
}

/// Resolved instance. The boxed value is always an `Arc<S>` for the registered service `S`.
type Instance = Arc<dyn Any + Send + Sync>;

type FactoryFn = Arc<dyn Fn(&Scope) -> Result<Instance, ContainerError> + Send + Sync>;

/// One registration: service key, implementation name, lifetime and factory.
#[derive(Clone)]
pub struct ServiceDescriptor {
    service: TypeId,
    service_name: &'static str,
    implementation: &'static str,
    lifetime: Lifetime,
    factory: FactoryFn,
}

impl ServiceDescriptor {
    /// Register service `S` (possibly a trait object) built by `factory`.
    pub fn new<S, F>(implementation: &'static str, lifetime: Lifetime, factory: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&Scope) -> Result<Arc<S>, ContainerError> + Send + Sync + 'static,
    {
        Self {
            service: TypeId::of::<S>(),
            service_name: type_name::<S>(),
            implementation,
            lifetime,
            factory: Arc::new(move |scope| factory(scope).map(|s| Arc::new(s) as Instance)),
        }
    }

    /// Register `T` as itself, constructed through [`Inject`].
    pub fn injected<T: Inject>(lifetime: Lifetime) -> Self {
        Self::new::<T, _>(type_name::<T>(), lifetime, |scope| T::inject(scope).map(Arc::new))
    }

    /// Register a ready-made instance as a singleton.
    pub fn instance<S>(value: Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        Self::new::<S, _>(type_name::<S>(), Lifetime::Singleton, move |_| Ok(Arc::clone(&value)))
    }

    pub fn service_name(&self) -> &'static str {
        self.service_name
    }

    pub fn implementation_name(&self) -> &'static str {
        self.implementation
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("service", &self.service_name)
            .field("implementation", &self.implementation)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Registration phase: an ordered list of descriptors. Build into a [`ServiceProvider`].
#[derive(Default, Debug)]
pub struct ServiceCollection {
    descriptors: Vec<ServiceDescriptor>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register always. Several descriptors for one service are kept in order (see [`Scope::resolve_all`]).
    pub fn add(&mut self, descriptor: ServiceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Register only if no descriptor exists for the same service. Returns whether it was added.
    pub fn try_add(&mut self, descriptor: ServiceDescriptor) -> bool {
        if self.descriptors.iter().any(|d| d.service == descriptor.service) {
            return false;
        }
        self.descriptors.push(descriptor);
        true
    }

    pub fn add_instance<S>(&mut self, value: Arc<S>) -> &mut Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.add(ServiceDescriptor::instance(value))
    }

    pub fn add_injected<T: Inject>(&mut self, lifetime: Lifetime) -> &mut Self {
        self.add(ServiceDescriptor::injected::<T>(lifetime))
    }

    pub fn contains<S: ?Sized + 'static>(&self) -> bool {
        let id = TypeId::of::<S>();
        self.descriptors.iter().any(|d| d.service == id)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn build(self) -> ServiceProvider {
        let mut by_service: HashMap<TypeId, Vec<usize>> = HashMap::new();
        for (index, descriptor) in self.descriptors.iter().enumerate() {
            by_service.entry(descriptor.service).or_default().push(index);
        }
        ServiceProvider {
            inner: Arc::new(ProviderInner {
                descriptors: self.descriptors,
                by_service,
                singletons: Mutex::new(HashMap::new()),
            }),
        }
    }
}

struct ProviderInner {
    descriptors: Vec<ServiceDescriptor>,
    by_service: HashMap<TypeId, Vec<usize>>,
    singletons: Mutex<HashMap<usize, Instance>>,
}

/// Built container. Read-only registry; singletons are cached here.
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

impl ServiceProvider {
    /// New scope: scoped instances are cached per scope, singletons are shared with the provider.
    pub fn create_scope(&self) -> Scope {
        Scope {
            provider: Arc::clone(&self.inner),
            scoped: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("descriptors", &self.inner.descriptors)
            .finish()
    }
}

/// Resolution context. Cheap to clone; clones share the scoped cache.
#[derive(Clone)]
pub struct Scope {
    provider: Arc<ProviderInner>,
    scoped: Arc<Mutex<HashMap<usize, Instance>>>,
}

impl Scope {
    /// Resolve `S`. With several registrations the last one wins.
    pub fn resolve<S>(&self) -> Result<Arc<S>, ContainerError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let index = self
            .indices::<S>()
            .and_then(|indices| indices.last().copied())
            .ok_or_else(ContainerError::not_registered::<S>)?;
        self.instantiate::<S>(index)
    }

    /// Resolve every registration of `S`, in registration order. Empty when none is registered.
    pub fn resolve_all<S>(&self) -> Result<Vec<Arc<S>>, ContainerError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.indices::<S>()
            .unwrap_or_default()
            .iter()
            .map(|&index| self.instantiate::<S>(index))
            .collect()
    }

    pub fn is_registered<S: ?Sized + 'static>(&self) -> bool {
        self.provider.by_service.contains_key(&TypeId::of::<S>())
    }

    fn indices<S: ?Sized + 'static>(&self) -> Option<&[usize]> {
        self.provider
            .by_service
            .get(&TypeId::of::<S>())
            .map(Vec::as_slice)
    }

    fn instantiate<S>(&self, index: usize) -> Result<Arc<S>, ContainerError>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let descriptor = &self.provider.descriptors[index];
        let instance = match descriptor.lifetime {
            Lifetime::Transient => (descriptor.factory)(self)?,
            Lifetime::Scoped => self.cached(&self.scoped, index, descriptor)?,
            Lifetime::Singleton => self.cached(&self.provider.singletons, index, descriptor)?,
        };
        instance
            .downcast_ref::<Arc<S>>()
            .cloned()
            .ok_or_else(ContainerError::not_registered::<S>)
    }

    // The lock is released while the factory runs: factories resolve their own dependencies.
    fn cached(
        &self,
        cache: &Mutex<HashMap<usize, Instance>>,
        index: usize,
        descriptor: &ServiceDescriptor,
    ) -> Result<Instance, ContainerError> {
        if let Some(existing) = cache.lock().get(&index) {
            return Ok(Arc::clone(existing));
        }
        tracing::trace!(
            service = descriptor.service_name,
            implementation = descriptor.implementation,
            lifetime = %descriptor.lifetime,
            "constructing cached instance"
        );
        let created = (descriptor.factory)(self)?;
        let mut guard = cache.lock();
        Ok(Arc::clone(guard.entry(index).or_insert(created)))
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("cached", &self.scoped.lock().len())
            .finish()
    }
}
