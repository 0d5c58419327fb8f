//! Configuration: builder collecting handlers, decorators, an assembly to scan and service callbacks.
//! `build()` freezes it into the [`Options`] the locators and the registrar consume.

use std::fmt;

use courier_core::{Inject, Lifetime, ServiceCollection};

use crate::contracts::OpenDecorator;
use crate::discovery::{Assembly, Capabilities, Component, ContractSet};
use crate::Error;

/// Deferred registration run by the registrar against the service collection.
pub type ServicesCallback = Box<dyn FnOnce(&mut ServiceCollection) + Send>;

/// Wiring-time configuration. Discarded once the container is built.
#[derive(Default)]
pub struct Configuration {
    handlers: Vec<(Component, Lifetime)>,
    decorators: Vec<(Component, Lifetime)>,
    assembly: Option<(Assembly, Lifetime)>,
    callbacks: Vec<ServicesCallback>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register handler type `H` under every handler contract it declares.
    pub fn add_handler<H: Capabilities>(mut self, lifetime: Lifetime) -> Self {
        self.handlers.push((Component::of::<H>(), lifetime));
        self
    }

    /// Register decorator type `D`. Decorators apply in registration order: the first one added
    /// runs innermost, the last one added runs outermost (see [`Proxy`](crate::Proxy)).
    pub fn add_decorator<D: Capabilities>(self, lifetime: Lifetime) -> Result<Self, Error> {
        self.add_decorator_component(Component::of::<D>(), lifetime)
    }

    /// Register decorator type `D` with contracts declared inline; for generic decorators.
    pub fn add_decorator_with<D: Inject>(
        self,
        lifetime: Lifetime,
        declare: impl FnOnce(&mut ContractSet<D>),
    ) -> Result<Self, Error> {
        self.add_decorator_component(Component::declared::<D>(declare), lifetime)
    }

    /// Register an open decorator, applied to every handler contract of the shapes it declares.
    pub fn add_open_decorator<D: OpenDecorator + Inject>(
        self,
        lifetime: Lifetime,
    ) -> Result<Self, Error> {
        self.add_decorator_component(Component::open::<D>(), lifetime)
    }

    /// Scan `assembly` for handler types, registered with `lifetime`.
    pub fn scan_assembly(mut self, assembly: Assembly, lifetime: Lifetime) -> Self {
        self.assembly = Some((assembly, lifetime));
        self
    }

    /// Run `callback` against the service collection during registration (validators, repositories, ...).
    pub fn register_services(
        mut self,
        callback: impl FnOnce(&mut ServiceCollection) + Send + 'static,
    ) -> Self {
        self.callbacks.push(Box::new(callback));
        self
    }

    pub fn build(self) -> Options {
        Options {
            handlers: self.handlers,
            decorators: self.decorators,
            assembly: self.assembly,
            callbacks: self.callbacks,
        }
    }

    fn add_decorator_component(
        mut self,
        component: Component,
        lifetime: Lifetime,
    ) -> Result<Self, Error> {
        if !component.is_decorator() {
            return Err(Error::InvalidDecorator {
                type_name: component.type_info().name(),
                reason: "it declares no decorator contract",
            });
        }
        self.decorators.push((component, lifetime));
        Ok(self)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("handlers", &self.handlers)
            .field("decorators", &self.decorators)
            .field("assembly", &self.assembly)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Immutable snapshot of a [`Configuration`].
pub struct Options {
    handlers: Vec<(Component, Lifetime)>,
    decorators: Vec<(Component, Lifetime)>,
    assembly: Option<(Assembly, Lifetime)>,
    callbacks: Vec<ServicesCallback>,
}

impl Options {
    pub fn handlers(&self) -> &[(Component, Lifetime)] {
        &self.handlers
    }

    pub fn decorators(&self) -> &[(Component, Lifetime)] {
        &self.decorators
    }

    pub fn assembly(&self) -> Option<(&Assembly, Lifetime)> {
        self.assembly
            .as_ref()
            .map(|(assembly, lifetime)| (assembly, *lifetime))
    }

    pub(crate) fn take_callbacks(&mut self) -> Vec<ServicesCallback> {
        std::mem::take(&mut self.callbacks)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("handlers", &self.handlers)
            .field("decorators", &self.decorators)
            .field("assembly", &self.assembly.as_ref().map(|(a, l)| (a.name(), *l)))
            .finish_non_exhaustive()
    }
}
