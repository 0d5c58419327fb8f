//! Validation for courier: a decorator that runs every registered validator of a message before the
//! rest of the chain, and fails with one aggregated [`ValidationError`] if any of them reports a failure.
//!
//! ```ignore
//! let config = Configuration::new()
//!     .add_handler::<UserHandler>(Lifetime::Scoped)
//!     .add_validator::<CreateUser, NameRequired>(Lifetime::Singleton)
//!     .validate_command_with_result::<CreateUser>()?;
//! ```

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use courier::{
    CancellationToken, Command, CommandDecorator, CommandHandler, CommandWithResult,
    CommandWithResultDecorator, CommandWithResultHandler, Configuration, ContainerError, Error,
    Inject, IntoDispatchError, Lifetime, Query, QueryWithParamsDecorator, QueryWithParamsHandler,
    Scope, ServiceDescriptor,
};
use serde::Serialize;
use thiserror::Error;

/// One failed rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub property: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.message)
    }
}

/// Every failure reported by every validator of one message.
#[derive(Error, Debug, Clone, Serialize)]
#[error("validation failed: {}", join(.failures))]
pub struct ValidationError {
    failures: Vec<ValidationFailure>,
}

impl ValidationError {
    pub fn from_failures(failures: Vec<ValidationFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }
}

fn join(failures: &[ValidationFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Rules for message `M`. An empty result means valid.
#[async_trait]
pub trait Validator<M>: Send + Sync {
    async fn validate(&self, message: &M, cancel: &CancellationToken) -> Vec<ValidationFailure>;
}

/// Runs all validators of `M`. The next handler is never invoked when any failure exists.
pub struct ValidationDecorator<M> {
    validators: Vec<Arc<dyn Validator<M>>>,
}

impl<M: Send + Sync + 'static> ValidationDecorator<M> {
    pub fn new(validators: Vec<Arc<dyn Validator<M>>>) -> Self {
        Self { validators }
    }

    async fn validate(&self, message: &M, cancel: &CancellationToken) -> Result<(), Error> {
        let mut failures = Vec::new();
        for validator in &self.validators {
            failures.extend(validator.validate(message, cancel).await);
        }
        if failures.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            message = type_name::<M>(),
            failures = failures.len(),
            "validation failed"
        );
        Err(ValidationError { failures }.into_dispatch_error())
    }
}

impl<M: Send + Sync + 'static> Inject for ValidationDecorator<M> {
    fn inject(scope: &Scope) -> Result<Self, ContainerError> {
        Ok(Self::new(scope.resolve_all::<dyn Validator<M>>()?))
    }
}

#[async_trait]
impl<C: Command> CommandDecorator<C> for ValidationDecorator<C> {
    async fn handle(
        &self,
        command: &C,
        next: &dyn CommandHandler<C>,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        self.validate(command, cancel).await?;
        next.handle(command, cancel).await
    }
}

#[async_trait]
impl<C: CommandWithResult> CommandWithResultDecorator<C> for ValidationDecorator<C> {
    async fn handle(
        &self,
        command: &C,
        next: &dyn CommandWithResultHandler<C>,
        cancel: &CancellationToken,
    ) -> Result<C::Result, Error> {
        self.validate(command, cancel).await?;
        next.handle(command, cancel).await
    }
}

#[async_trait]
impl<Q: Query> QueryWithParamsDecorator<Q> for ValidationDecorator<Q> {
    async fn handle(
        &self,
        query: &Q,
        next: &dyn QueryWithParamsHandler<Q>,
        cancel: &CancellationToken,
    ) -> Result<Q::Result, Error> {
        self.validate(query, cancel).await?;
        next.handle(query, cancel).await
    }
}

/// Validation registration on [`Configuration`].
pub trait ValidationExt: Sized {
    /// Register validator `V` for message `M`.
    fn add_validator<M, V>(self, lifetime: Lifetime) -> Self
    where
        M: Send + Sync + 'static,
        V: Validator<M> + Inject;

    fn validate_command<C: Command>(self) -> Result<Self, Error>;

    fn validate_command_with_result<C: CommandWithResult>(self) -> Result<Self, Error>;

    fn validate_query<Q: Query>(self) -> Result<Self, Error>;
}

impl ValidationExt for Configuration {
    fn add_validator<M, V>(self, lifetime: Lifetime) -> Self
    where
        M: Send + Sync + 'static,
        V: Validator<M> + Inject,
    {
        self.register_services(move |services| {
            services.add(ServiceDescriptor::new::<dyn Validator<M>, _>(
                type_name::<V>(),
                lifetime,
                |scope: &Scope| -> Result<Arc<dyn Validator<M>>, ContainerError> {
                    Ok(Arc::new(V::inject(scope)?))
                },
            ));
        })
    }

    fn validate_command<C: Command>(self) -> Result<Self, Error> {
        self.add_decorator_with::<ValidationDecorator<C>>(Lifetime::Transient, |contracts| {
            contracts.command_decorator::<C>();
        })
    }

    fn validate_command_with_result<C: CommandWithResult>(self) -> Result<Self, Error> {
        self.add_decorator_with::<ValidationDecorator<C>>(Lifetime::Transient, |contracts| {
            contracts.command_with_result_decorator::<C>();
        })
    }

    fn validate_query<Q: Query>(self) -> Result<Self, Error> {
        self.add_decorator_with::<ValidationDecorator<Q>>(Lifetime::Transient, |contracts| {
            contracts.query_with_params_decorator::<Q>();
        })
    }
}
