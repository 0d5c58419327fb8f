//! Dispatch table: concrete message `TypeId` → monomorphised thunk calling the typed dispatch path.
//! Filled by the registrar while proxies are installed; read-only afterwards.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use courier_core::{CancellationToken, ContainerError};
use futures::future::BoxFuture;
use futures::FutureExt;

use super::dispatcher::Dispatcher;
use crate::contracts::TypeInfo;
use crate::messages::{CommandWithResult, Query};
use crate::Error;

pub(crate) type Thunk<R> = for<'a> fn(
    &'a Dispatcher,
    Box<dyn Any + Send + Sync>,
    &'a CancellationToken,
) -> BoxFuture<'a, Result<R, Error>>;

#[derive(Default)]
pub struct DispatchTable {
    commands: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    queries: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl DispatchTable {
    pub(crate) fn insert_command<C: CommandWithResult>(&mut self) {
        let thunk: Thunk<C::Result> = command_thunk::<C>;
        self.commands.insert(TypeId::of::<C>(), Box::new(thunk));
    }

    pub(crate) fn insert_query<Q: Query>(&mut self) {
        let thunk: Thunk<Q::Result> = query_thunk::<Q>;
        self.queries.insert(TypeId::of::<Q>(), Box::new(thunk));
    }

    pub(crate) fn command<R: 'static>(&self, message: TypeInfo) -> Option<Thunk<R>> {
        lookup(&self.commands, message)
    }

    pub(crate) fn query<R: 'static>(&self, message: TypeInfo) -> Option<Thunk<R>> {
        lookup(&self.queries, message)
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("commands", &self.commands.len())
            .field("queries", &self.queries.len())
            .finish()
    }
}

fn lookup<R: 'static>(
    thunks: &HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    message: TypeInfo,
) -> Option<Thunk<R>> {
    thunks
        .get(&message.id())
        .and_then(|thunk| thunk.downcast_ref::<Thunk<R>>())
        .copied()
}

fn command_thunk<'a, C: CommandWithResult>(
    dispatcher: &'a Dispatcher,
    message: Box<dyn Any + Send + Sync>,
    cancel: &'a CancellationToken,
) -> BoxFuture<'a, Result<C::Result, Error>> {
    async move {
        let command = message
            .downcast::<C>()
            .map_err(|_| ContainerError::not_registered::<C>())?;
        dispatcher.execute_command_with_result(&*command, cancel).await
    }
    .boxed()
}

fn query_thunk<'a, Q: Query>(
    dispatcher: &'a Dispatcher,
    message: Box<dyn Any + Send + Sync>,
    cancel: &'a CancellationToken,
) -> BoxFuture<'a, Result<Q::Result, Error>> {
    async move {
        let query = message
            .downcast::<Q>()
            .map_err(|_| ContainerError::not_registered::<Q>())?;
        dispatcher.execute_query_with_params(&*query, cancel).await
    }
    .boxed()
}
