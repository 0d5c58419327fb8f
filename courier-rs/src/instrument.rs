//! Tracing decorator: wraps every dispatched message of every shape in a `dispatch` span and
//! logs the outcome. Register with `Configuration::add_open_decorator::<TracingDecorator>`.

use std::time::Instant;

use async_trait::async_trait;
use courier_core::{CancellationToken, ContainerError, Inject, Scope};
use tracing::Instrument;

use crate::contracts::{ContractShape, Invocation, OpenDecorator, Outcome};
use crate::Error;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDecorator;

impl Inject for TracingDecorator {
    fn inject(_: &Scope) -> Result<Self, ContainerError> {
        Ok(TracingDecorator)
    }
}

#[async_trait]
impl OpenDecorator for TracingDecorator {
    fn shapes() -> Vec<ContractShape> {
        vec![
            ContractShape::Command,
            ContractShape::CommandWithResult,
            ContractShape::Query,
            ContractShape::QueryWithParams,
        ]
    }

    async fn handle(
        &self,
        invocation: Invocation<'_>,
        _cancel: &CancellationToken,
    ) -> Result<Outcome, Error> {
        let span = tracing::debug_span!(
            "dispatch",
            contract = %invocation.contract(),
            message = invocation.message_name()
        );
        let started = Instant::now();
        let result = invocation.proceed().instrument(span).await;
        let elapsed = started.elapsed();
        match &result {
            Ok(_) => tracing::debug!(?elapsed, "handled"),
            Err(err) if err.is_cancelled() => tracing::debug!(?elapsed, "cancelled"),
            Err(err) => tracing::warn!(?elapsed, error = %err, "failed"),
        }
        result
    }
}
