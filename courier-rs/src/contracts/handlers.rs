//! Handler contracts, one per message shape. A handler type may implement several.
//! Declare them in [`Capabilities`](crate::Capabilities) so the locator finds them.

use async_trait::async_trait;
use courier_core::CancellationToken;

use crate::messages::{Command, CommandWithResult, Query};
use crate::Error;

#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, command: &C, cancel: &CancellationToken) -> Result<(), Error>;
}

#[async_trait]
pub trait CommandWithResultHandler<C>: Send + Sync
where
    C: CommandWithResult,
{
    async fn handle(&self, command: &C, cancel: &CancellationToken) -> Result<C::Result, Error>;
}

/// Parameterless query producing `R`.
#[async_trait]
pub trait QueryHandler<R>: Send + Sync
where
    R: Send + 'static,
{
    async fn handle(&self, cancel: &CancellationToken) -> Result<R, Error>;
}

#[async_trait]
pub trait QueryWithParamsHandler<Q>: Send + Sync
where
    Q: Query,
{
    async fn handle(&self, query: &Q, cancel: &CancellationToken) -> Result<Q::Result, Error>;
}
