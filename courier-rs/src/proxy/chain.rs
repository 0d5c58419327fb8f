//! Chain links: a decorator paired with the handler it wraps, exposed as a handler itself.

use std::sync::Arc;

use async_trait::async_trait;
use courier_core::CancellationToken;

use crate::contracts::{
    CommandDecorator, CommandHandler, CommandWithResultDecorator, CommandWithResultHandler,
    QueryDecorator, QueryHandler, QueryWithParamsDecorator, QueryWithParamsHandler,
};
use crate::messages::{Command, CommandWithResult, Query};
use crate::Error;

pub(crate) struct CommandLink<C: Command> {
    decorator: Arc<dyn CommandDecorator<C>>,
    next: Arc<dyn CommandHandler<C>>,
}

impl<C: Command> CommandLink<C> {
    pub(crate) fn new(decorator: Arc<dyn CommandDecorator<C>>, next: Arc<dyn CommandHandler<C>>) -> Self {
        Self { decorator, next }
    }
}

#[async_trait]
impl<C: Command> CommandHandler<C> for CommandLink<C> {
    async fn handle(&self, command: &C, cancel: &CancellationToken) -> Result<(), Error> {
        self.decorator.handle(command, self.next.as_ref(), cancel).await
    }
}

pub(crate) struct CommandWithResultLink<C: CommandWithResult> {
    decorator: Arc<dyn CommandWithResultDecorator<C>>,
    next: Arc<dyn CommandWithResultHandler<C>>,
}

impl<C: CommandWithResult> CommandWithResultLink<C> {
    pub(crate) fn new(
        decorator: Arc<dyn CommandWithResultDecorator<C>>,
        next: Arc<dyn CommandWithResultHandler<C>>,
    ) -> Self {
        Self { decorator, next }
    }
}

#[async_trait]
impl<C: CommandWithResult> CommandWithResultHandler<C> for CommandWithResultLink<C> {
    async fn handle(&self, command: &C, cancel: &CancellationToken) -> Result<C::Result, Error> {
        self.decorator.handle(command, self.next.as_ref(), cancel).await
    }
}

pub(crate) struct QueryLink<R: Send + 'static> {
    decorator: Arc<dyn QueryDecorator<R>>,
    next: Arc<dyn QueryHandler<R>>,
}

impl<R: Send + 'static> QueryLink<R> {
    pub(crate) fn new(decorator: Arc<dyn QueryDecorator<R>>, next: Arc<dyn QueryHandler<R>>) -> Self {
        Self { decorator, next }
    }
}

#[async_trait]
impl<R: Send + 'static> QueryHandler<R> for QueryLink<R> {
    async fn handle(&self, cancel: &CancellationToken) -> Result<R, Error> {
        self.decorator.handle(self.next.as_ref(), cancel).await
    }
}

pub(crate) struct QueryWithParamsLink<Q: Query> {
    decorator: Arc<dyn QueryWithParamsDecorator<Q>>,
    next: Arc<dyn QueryWithParamsHandler<Q>>,
}

impl<Q: Query> QueryWithParamsLink<Q> {
    pub(crate) fn new(
        decorator: Arc<dyn QueryWithParamsDecorator<Q>>,
        next: Arc<dyn QueryWithParamsHandler<Q>>,
    ) -> Self {
        Self { decorator, next }
    }
}

#[async_trait]
impl<Q: Query> QueryWithParamsHandler<Q> for QueryWithParamsLink<Q> {
    async fn handle(&self, query: &Q, cancel: &CancellationToken) -> Result<Q::Result, Error> {
        self.decorator.handle(query, self.next.as_ref(), cancel).await
    }
}
