//! Courier: command and query dispatch through decorator chains resolved from a DI container.
//!
//! Handlers and decorators declare their contracts with [`Capabilities`]; a [`Configuration`] lists
//! them (or an [`Assembly`] to scan) and [`Registrar`] installs handlers, decorators and one
//! [`Proxy`] per handler contract. [`Dispatcher`] resolves the proxy and runs its chain.

extern crate self as courier;

pub mod config;
pub mod contracts;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod instrument;
pub mod messages;
pub mod proxy;
pub mod registrar;

pub use config::{Configuration, Options};
pub use contracts::{
    CommandDecorator, CommandHandler, CommandWithResultDecorator, CommandWithResultHandler,
    ContractRole, ContractShape, ContractType, Invocation, OpenDecorator, Outcome, QueryDecorator,
    QueryHandler, QueryWithParamsDecorator, QueryWithParamsHandler, TypeInfo,
};
pub use discovery::{
    Assembly, Capabilities, Component, ContractSet, DecoratorLocator, HandlerLocator,
    RegistrationEntry,
};
pub use dispatch::{DispatchTable, Dispatcher};
pub use error::{BoxError, Error, IntoDispatchError};
pub use instrument::TracingDecorator;
pub use messages::{Command, CommandBase, CommandWithResult, Query, QueryBase};
pub use proxy::{Proxy, ProxyDescriptor, ProxyFactory};
pub use registrar::{Registrar, ServiceCollectionExt};

pub use courier_core::{
    CancellationToken, Cancelled, ContainerError, Inject, Lifetime, Scope, ServiceCollection,
    ServiceDescriptor, ServiceProvider,
};

pub use courier_rs_macros::{Command, Inject, Query};
