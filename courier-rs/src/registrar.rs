//! Registrar: installs located handlers, their proxies, decorators and the dispatcher into a
//! service collection.

use std::collections::HashSet;
use std::sync::Arc;

use courier_core::{Lifetime, ServiceCollection, ServiceDescriptor};
use serde_json::{json, Value};

use crate::config::{Configuration, Options};
use crate::contracts::ContractType;
use crate::discovery::{DecoratorLocator, HandlerLocator, RegistrationEntry};
use crate::dispatch::{DispatchTable, Dispatcher};
use crate::proxy::{ProxyDescriptor, ProxyFactory};
use crate::Error;

#[derive(Debug, Default, Clone, Copy)]
pub struct Registrar;

impl Registrar {
    /// Register everything `options` describes.
    ///
    /// Handlers are register-if-absent: when two types declare the same handler contract, the first
    /// located wins. Decorators are always added, in configuration order. Open decorators are closed
    /// over every located handler contract of a shape they declare.
    pub fn register(mut options: Options, services: &mut ServiceCollection) -> Result<(), Error> {
        let proxies = Self::register_handlers(&options, services)?;

        let mut table = DispatchTable::default();
        for proxy in &proxies {
            if proxy.register(services) {
                tracing::debug!(proxy = proxy.proxy_type().name(), "proxy registered");
            }
            proxy.register_dispatch(&mut table);
        }

        Self::register_decorators(&options, &proxies, services);

        services.add_instance(Arc::new(table));
        services.try_add(ServiceDescriptor::injected::<Dispatcher>(Lifetime::Transient));

        for callback in options.take_callbacks() {
            callback(services);
        }
        Ok(())
    }

    /// JSON description of the handler, decorator and proxy registrations `options` would produce.
    pub fn manifest(options: &Options) -> Result<Value, Error> {
        let handlers: Vec<RegistrationEntry> = HandlerLocator.locate(options).collect();
        let decorators: Vec<RegistrationEntry> = DecoratorLocator.locate(options).collect();
        let proxies = Self::distinct_proxies(&handlers)?
            .iter()
            .map(|proxy| {
                json!({
                    "proxy": proxy.proxy_type(),
                    "handler": proxy.handler_contract().to_string(),
                    "decorators": proxy.decorator_contract().to_string(),
                })
            })
            .collect::<Vec<_>>();
        Ok(json!({
            "handlers": handlers,
            "decorators": decorators,
            "proxies": proxies,
        }))
    }

    fn register_handlers(
        options: &Options,
        services: &mut ServiceCollection,
    ) -> Result<Vec<ProxyDescriptor>, Error> {
        let entries: Vec<RegistrationEntry> = HandlerLocator.locate(options).collect();
        for entry in &entries {
            let Some(descriptor) = entry.descriptor() else {
                continue;
            };
            if services.try_add(descriptor) {
                tracing::debug!(
                    contract = %entry.contract(),
                    concrete = entry.concrete().name(),
                    lifetime = %entry.lifetime(),
                    "handler registered"
                );
            } else {
                tracing::debug!(
                    contract = %entry.contract(),
                    concrete = entry.concrete().name(),
                    "handler contract already registered, skipped"
                );
            }
        }
        Self::distinct_proxies(&entries)
    }

    fn distinct_proxies(entries: &[RegistrationEntry]) -> Result<Vec<ProxyDescriptor>, Error> {
        let mut seen: HashSet<ContractType> = HashSet::new();
        let mut proxies = Vec::new();
        for entry in entries {
            if seen.insert(entry.contract()) {
                proxies.push(ProxyFactory.build(entry)?);
            }
        }
        Ok(proxies)
    }

    fn register_decorators(
        options: &Options,
        proxies: &[ProxyDescriptor],
        services: &mut ServiceCollection,
    ) {
        for entry in DecoratorLocator.locate(options) {
            if let Some(descriptor) = entry.descriptor() {
                services.add(descriptor);
                tracing::debug!(
                    contract = %entry.contract(),
                    concrete = entry.concrete().name(),
                    lifetime = %entry.lifetime(),
                    "decorator registered"
                );
                continue;
            }
            let Some(factory) = entry.binding().open_factory() else {
                continue;
            };
            let shape = entry.contract().shape();
            for proxy in proxies.iter().filter(|p| p.handler_contract().shape() == shape) {
                proxy.register_open_decorator(
                    services,
                    entry.concrete().name(),
                    entry.lifetime(),
                    Arc::clone(&factory),
                );
                tracing::debug!(
                    contract = %proxy.decorator_contract(),
                    concrete = entry.concrete().name(),
                    lifetime = %entry.lifetime(),
                    "open decorator registered"
                );
            }
        }
    }
}

/// `services.add_dispatch(config)`: build the configuration and register it.
pub trait ServiceCollectionExt {
    fn add_dispatch(&mut self, config: Configuration) -> Result<&mut Self, Error>;
}

impl ServiceCollectionExt for ServiceCollection {
    fn add_dispatch(&mut self, config: Configuration) -> Result<&mut Self, Error> {
        Registrar::register(config.build(), self)?;
        Ok(self)
    }
}
