//! Courier core: DI container and cancellation. Shared by the dispatch facade and its integrations.

pub mod cancellation;
pub mod container;

pub use cancellation::{CancellationToken, Cancelled};
pub use container::{
    ContainerError, Inject, Lifetime, Scope, ServiceCollection, ServiceDescriptor, ServiceProvider,
};
