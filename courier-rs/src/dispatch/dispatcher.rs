//! Dispatcher: resolves the proxy for a message's contract and invokes its effective handler.

use std::sync::Arc;

use courier_core::{CancellationToken, ContainerError, Inject, Scope};

use super::table::DispatchTable;
use crate::contracts::{
    CommandContract, CommandWithResultContract, Contract, QueryContract, QueryWithParamsContract,
};
use crate::messages::{Command, CommandBase, CommandWithResult, Query, QueryBase};
use crate::proxy::Proxy;
use crate::Error;

/// Entry point for sending commands and queries. Resolve it from a [`Scope`]; handlers and
/// decorators are resolved from that same scope on every call.
#[derive(Clone)]
pub struct Dispatcher {
    scope: Scope,
}

impl Dispatcher {
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }

    pub async fn execute_command<C: Command>(
        &self,
        command: &C,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let handler = self.effective::<CommandContract<C>>()?;
        handler.handle(command, cancel).await
    }

    pub async fn execute_command_with_result<C: CommandWithResult>(
        &self,
        command: &C,
        cancel: &CancellationToken,
    ) -> Result<C::Result, Error> {
        let handler = self.effective::<CommandWithResultContract<C>>()?;
        handler.handle(command, cancel).await
    }

    /// Dispatch a command known only by its result type. Same chain, same result as
    /// [`Dispatcher::execute_command_with_result`] on the concrete command.
    pub async fn execute_command_dyn<R: 'static>(
        &self,
        command: Box<dyn CommandBase<R>>,
        cancel: &CancellationToken,
    ) -> Result<R, Error> {
        let message = command.message_type();
        let thunk = self
            .tables()?
            .iter()
            .find_map(|table| table.command::<R>(message))
            .ok_or(ContainerError::NotRegistered {
                service: message.name(),
            })?;
        thunk(self, command.into_any(), cancel).await
    }

    /// Parameterless query, keyed by its result type.
    pub async fn execute_query<R: Send + 'static>(
        &self,
        cancel: &CancellationToken,
    ) -> Result<R, Error> {
        let handler = self.effective::<QueryContract<R>>()?;
        handler.handle(cancel).await
    }

    pub async fn execute_query_with_params<Q: Query>(
        &self,
        query: &Q,
        cancel: &CancellationToken,
    ) -> Result<Q::Result, Error> {
        let handler = self.effective::<QueryWithParamsContract<Q>>()?;
        handler.handle(query, cancel).await
    }

    pub async fn execute_query_dyn<R: 'static>(
        &self,
        query: Box<dyn QueryBase<R>>,
        cancel: &CancellationToken,
    ) -> Result<R, Error> {
        let message = query.message_type();
        let thunk = self
            .tables()?
            .iter()
            .find_map(|table| table.query::<R>(message))
            .ok_or(ContainerError::NotRegistered {
                service: message.name(),
            })?;
        thunk(self, query.into_any(), cancel).await
    }

    fn effective<K: Contract>(&self) -> Result<Arc<K::Handler>, Error> {
        let proxy = self.scope.resolve::<Proxy<K>>()?;
        tracing::trace!(
            contract = %K::handler_contract(),
            decorators = proxy.decorator_count(),
            "dispatch"
        );
        Ok(proxy.handler())
    }

    // One table per registration pass.
    fn tables(&self) -> Result<Vec<Arc<DispatchTable>>, ContainerError> {
        self.scope.resolve_all::<DispatchTable>()
    }
}

impl Inject for Dispatcher {
    fn inject(scope: &Scope) -> Result<Self, ContainerError> {
        Ok(Self::new(scope.clone()))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
