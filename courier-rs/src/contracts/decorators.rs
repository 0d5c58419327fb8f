//! Decorator contracts, mirroring the handler contracts. A decorator receives the next link of the
//! chain with every call; it may run code before and after `next`, or not call it at all.

use async_trait::async_trait;
use courier_core::CancellationToken;

use super::handlers::{CommandHandler, CommandWithResultHandler, QueryHandler, QueryWithParamsHandler};
use crate::messages::{Command, CommandWithResult, Query};
use crate::Error;

#[async_trait]
pub trait CommandDecorator<C>: Send + Sync
where
    C: Command,
{
    async fn handle(
        &self,
        command: &C,
        next: &dyn CommandHandler<C>,
        cancel: &CancellationToken,
    ) -> Result<(), Error>;
}

#[async_trait]
pub trait CommandWithResultDecorator<C>: Send + Sync
where
    C: CommandWithResult,
{
    async fn handle(
        &self,
        command: &C,
        next: &dyn CommandWithResultHandler<C>,
        cancel: &CancellationToken,
    ) -> Result<C::Result, Error>;
}

#[async_trait]
pub trait QueryDecorator<R>: Send + Sync
where
    R: Send + 'static,
{
    async fn handle(&self, next: &dyn QueryHandler<R>, cancel: &CancellationToken)
        -> Result<R, Error>;
}

#[async_trait]
pub trait QueryWithParamsDecorator<Q>: Send + Sync
where
    Q: Query,
{
    async fn handle(
        &self,
        query: &Q,
        next: &dyn QueryWithParamsHandler<Q>,
        cancel: &CancellationToken,
    ) -> Result<Q::Result, Error>;
}
