//! Proxy: composes base handler and decorators into one effective handler.

pub(crate) mod chain;
mod composite;
mod factory;

pub use composite::Proxy;
pub use factory::{ProxyDescriptor, ProxyFactory};
