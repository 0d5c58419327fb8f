//! Open decorators: one implementation applied to every message of the shapes it declares.
//!
//! The registrar closes an open decorator over each discovered handler contract of a matching
//! shape, so it runs in the chain like any closed decorator. It sees the message type-erased.

use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use courier_core::CancellationToken;
use futures::future::BoxFuture;

use super::decorators::{
    CommandDecorator, CommandWithResultDecorator, QueryDecorator, QueryWithParamsDecorator,
};
use super::family::{
    CommandContract, CommandWithResultContract, Contract, QueryContract, QueryWithParamsContract,
};
use super::handlers::{CommandHandler, CommandWithResultHandler, QueryHandler, QueryWithParamsHandler};
use super::shape::{ContractShape, ContractType};
use crate::messages::{Command, CommandWithResult, Query};
use crate::Error;

/// Result of the rest of the chain, type-erased. Return it unchanged from [`OpenDecorator::handle`].
pub type Outcome = Box<dyn Any + Send>;

/// One call through an open decorator: the contract, the message and the rest of the chain.
pub struct Invocation<'a> {
    contract: ContractType,
    message: Option<&'a (dyn Any + Send + Sync)>,
    next: BoxFuture<'a, Result<Outcome, Error>>,
}

impl<'a> Invocation<'a> {
    fn new(
        contract: ContractType,
        message: Option<&'a (dyn Any + Send + Sync)>,
        next: BoxFuture<'a, Result<Outcome, Error>>,
    ) -> Self {
        Self {
            contract,
            message,
            next,
        }
    }

    /// Handler contract being invoked.
    pub fn contract(&self) -> &ContractType {
        &self.contract
    }

    /// Message type name; the result type name for parameterless queries.
    pub fn message_name(&self) -> &'static str {
        self.contract
            .message()
            .or(self.contract.result())
            .map(|t| t.name())
            .unwrap_or("_")
    }

    /// The message, if it is an `M`. `None` for parameterless queries.
    pub fn message<M: Any>(&self) -> Option<&M> {
        self.message.and_then(|m| m.downcast_ref::<M>())
    }

    /// Run the rest of the chain.
    pub async fn proceed(self) -> Result<Outcome, Error> {
        self.next.await
    }
}

#[async_trait]
pub trait OpenDecorator: Send + Sync {
    /// Shapes this decorator applies to.
    fn shapes() -> Vec<ContractShape>
    where
        Self: Sized;

    async fn handle(
        &self,
        invocation: Invocation<'_>,
        cancel: &CancellationToken,
    ) -> Result<Outcome, Error>;
}

/// An open decorator closed over contract family `K`.
pub(crate) struct OpenAdapter<K> {
    inner: Arc<dyn OpenDecorator>,
    _contract: PhantomData<fn() -> K>,
}

impl<K> OpenAdapter<K> {
    pub(crate) fn new(inner: Arc<dyn OpenDecorator>) -> Self {
        Self {
            inner,
            _contract: PhantomData,
        }
    }
}

fn erase<R: Send + 'static>(result: Result<R, Error>) -> Result<Outcome, Error> {
    result.map(|value| Box::new(value) as Outcome)
}

fn restore<R: 'static>(outcome: Outcome) -> Result<R, Error> {
    outcome
        .downcast::<R>()
        .map(|value| *value)
        .map_err(|_| Error::OutcomeMismatch {
            expected: type_name::<R>(),
        })
}

#[async_trait]
impl<C: Command> CommandDecorator<C> for OpenAdapter<CommandContract<C>> {
    async fn handle(
        &self,
        command: &C,
        next: &dyn CommandHandler<C>,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let invocation = Invocation::new(
            CommandContract::<C>::handler_contract(),
            Some(command as &(dyn Any + Send + Sync)),
            Box::pin(async move { erase(next.handle(command, cancel).await) }),
        );
        restore(self.inner.handle(invocation, cancel).await?)
    }
}

#[async_trait]
impl<C: CommandWithResult> CommandWithResultDecorator<C> for OpenAdapter<CommandWithResultContract<C>> {
    async fn handle(
        &self,
        command: &C,
        next: &dyn CommandWithResultHandler<C>,
        cancel: &CancellationToken,
    ) -> Result<C::Result, Error> {
        let invocation = Invocation::new(
            CommandWithResultContract::<C>::handler_contract(),
            Some(command as &(dyn Any + Send + Sync)),
            Box::pin(async move { erase(next.handle(command, cancel).await) }),
        );
        restore(self.inner.handle(invocation, cancel).await?)
    }
}

#[async_trait]
impl<R: Send + 'static> QueryDecorator<R> for OpenAdapter<QueryContract<R>> {
    async fn handle(&self, next: &dyn QueryHandler<R>, cancel: &CancellationToken) -> Result<R, Error> {
        let invocation = Invocation::new(
            QueryContract::<R>::handler_contract(),
            None,
            Box::pin(async move { erase(next.handle(cancel).await) }),
        );
        restore(self.inner.handle(invocation, cancel).await?)
    }
}

#[async_trait]
impl<Q: Query> QueryWithParamsDecorator<Q> for OpenAdapter<QueryWithParamsContract<Q>> {
    async fn handle(
        &self,
        query: &Q,
        next: &dyn QueryWithParamsHandler<Q>,
        cancel: &CancellationToken,
    ) -> Result<Q::Result, Error> {
        let invocation = Invocation::new(
            QueryWithParamsContract::<Q>::handler_contract(),
            Some(query as &(dyn Any + Send + Sync)),
            Box::pin(async move { erase(next.handle(query, cancel).await) }),
        );
        restore(self.inner.handle(invocation, cancel).await?)
    }
}
