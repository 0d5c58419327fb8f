//! Proxy: the base handler plus every decorator registered for its contract.

use std::sync::Arc;

use courier_core::{ContainerError, Inject, Scope};

use crate::contracts::Contract;

/// Base handler and decorators for contract family `K`, resolved from the container.
///
/// [`Proxy::handler`] folds the decorators over the base handler in registration order: each
/// decorator is paired with the chain built so far as its `next`. The first registered decorator
/// therefore runs innermost, closest to the base handler, and the last registered decorator runs
/// outermost, first on the way in and last on the way out. Register in reverse of the order you
/// want them to see a message.
pub struct Proxy<K: Contract> {
    handler: Arc<K::Handler>,
    decorators: Vec<Arc<K::Decorator>>,
}

impl<K: Contract> Proxy<K> {
    pub fn new(handler: Arc<K::Handler>, decorators: Vec<Arc<K::Decorator>>) -> Self {
        Self {
            handler,
            decorators,
        }
    }

    /// Effective handler. A new chain is built on every call; with no decorators this is the base handler.
    pub fn handler(&self) -> Arc<K::Handler> {
        self.decorators
            .iter()
            .fold(Arc::clone(&self.handler), |next, decorator| {
                K::link(Arc::clone(decorator), next)
            })
    }

    pub fn decorator_count(&self) -> usize {
        self.decorators.len()
    }
}

impl<K: Contract> Inject for Proxy<K> {
    fn inject(scope: &Scope) -> Result<Self, ContainerError> {
        let handler = scope.resolve::<K::Handler>()?;
        let decorators = scope.resolve_all::<K::Decorator>()?;
        Ok(Self::new(handler, decorators))
    }
}
