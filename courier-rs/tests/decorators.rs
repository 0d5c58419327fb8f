//! Decorator chains: ordering, cancellation, open decorators.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use courier::{
    CancellationToken, Capabilities, Command, CommandHandler, CommandWithResultDecorator,
    CommandWithResultHandler, Configuration, ContractSet, ContractShape, DecoratorLocator,
    Dispatcher, Error, Inject, IntoDispatchError, Invocation, Lifetime, OpenDecorator, Outcome,
    Query, QueryWithParamsHandler,
    ServiceCollection, ServiceCollectionExt, TracingDecorator,
};

#[derive(Default)]
struct Log(Mutex<Vec<String>>);

impl Log {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Command)]
#[command(result = i64)]
struct CreateUserCommand {
    value: i64,
}

#[derive(Command)]
struct Ping;

#[derive(Query)]
#[query(result = String)]
struct Echo {
    text: String,
}

#[derive(Inject)]
struct BaseHandler {
    log: Arc<Log>,
}

#[async_trait]
impl CommandWithResultHandler<CreateUserCommand> for BaseHandler {
    async fn handle(&self, command: &CreateUserCommand, cancel: &CancellationToken) -> Result<i64, Error> {
        cancel.error_if_cancelled()?;
        if command.value < 0 {
            let invalid = io::Error::new(io::ErrorKind::InvalidInput, "negative value");
            return Err(invalid.into_dispatch_error());
        }
        self.log.push("handler");
        Ok(command.value * 42)
    }
}

#[async_trait]
impl CommandHandler<Ping> for BaseHandler {
    async fn handle(&self, _: &Ping, _: &CancellationToken) -> Result<(), Error> {
        self.log.push("ping");
        Ok(())
    }
}

#[async_trait]
impl QueryWithParamsHandler<Echo> for BaseHandler {
    async fn handle(&self, query: &Echo, _: &CancellationToken) -> Result<String, Error> {
        self.log.push("echo");
        Ok(query.text.clone())
    }
}

impl Capabilities for BaseHandler {
    fn declare(contracts: &mut ContractSet<Self>) {
        contracts
            .command_with_result::<CreateUserCommand>()
            .command::<Ping>()
            .query_with_params::<Echo>();
    }
}

#[derive(Inject)]
struct D1 {
    log: Arc<Log>,
}

#[derive(Inject)]
struct D2 {
    log: Arc<Log>,
}

macro_rules! recording_decorator {
    ($name:ident, $label:literal) => {
        #[async_trait]
        impl CommandWithResultDecorator<CreateUserCommand> for $name {
            async fn handle(
                &self,
                command: &CreateUserCommand,
                next: &dyn CommandWithResultHandler<CreateUserCommand>,
                cancel: &CancellationToken,
            ) -> Result<i64, Error> {
                self.log.push(format!("{} before cancelled={}", $label, cancel.is_cancelled()));
                let result = next.handle(command, cancel).await;
                self.log.push(format!("{} after", $label));
                result
            }
        }

        impl Capabilities for $name {
            fn declare(contracts: &mut ContractSet<Self>) {
                contracts.command_with_result_decorator::<CreateUserCommand>();
            }
        }
    };
}

recording_decorator!(D1, "D1");
recording_decorator!(D2, "D2");

/// Records the message name of every invocation it wraps.
#[derive(Inject)]
struct Auditing {
    log: Arc<Log>,
}

#[async_trait]
impl OpenDecorator for Auditing {
    fn shapes() -> Vec<ContractShape> {
        vec![ContractShape::CommandWithResult, ContractShape::QueryWithParams]
    }

    async fn handle(&self, invocation: Invocation<'_>, _: &CancellationToken) -> Result<Outcome, Error> {
        let value = invocation.message::<CreateUserCommand>().map(|c| c.value);
        self.log.push(format!("audit {} {:?}", short(invocation.message_name()), value));
        invocation.proceed().await
    }
}

/// Replaces the chain's result with a value of the wrong type.
#[derive(Inject)]
struct Tampering;

#[async_trait]
impl OpenDecorator for Tampering {
    fn shapes() -> Vec<ContractShape> {
        vec![ContractShape::CommandWithResult]
    }

    async fn handle(&self, invocation: Invocation<'_>, _: &CancellationToken) -> Result<Outcome, Error> {
        invocation.proceed().await?;
        Ok(Box::new(0u8))
    }
}

/// Declares the same shape twice.
#[derive(Inject)]
struct Repeating {
    log: Arc<Log>,
}

#[async_trait]
impl OpenDecorator for Repeating {
    fn shapes() -> Vec<ContractShape> {
        vec![
            ContractShape::CommandWithResult,
            ContractShape::QueryWithParams,
            ContractShape::CommandWithResult,
        ]
    }

    async fn handle(&self, invocation: Invocation<'_>, _: &CancellationToken) -> Result<Outcome, Error> {
        self.log.push("repeating");
        invocation.proceed().await
    }
}

fn short(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

fn setup(config: Configuration) -> (Dispatcher, Arc<Log>) {
    let log = Arc::new(Log::default());
    let mut services = ServiceCollection::new();
    services.add_instance(Arc::clone(&log));
    services.add_dispatch(config).unwrap();
    let scope = services.build().create_scope();
    (scope.resolve::<Dispatcher>().unwrap().as_ref().clone(), log)
}

#[tokio::test]
async fn last_registered_decorator_is_outermost() {
    let config = Configuration::new()
        .add_handler::<BaseHandler>(Lifetime::Transient)
        .add_decorator::<D1>(Lifetime::Transient)
        .unwrap()
        .add_decorator::<D2>(Lifetime::Transient)
        .unwrap();
    let (dispatcher, log) = setup(config);

    let result = dispatcher
        .execute_command_with_result(&CreateUserCommand { value: 10 }, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result, 420);
    assert_eq!(
        log.entries(),
        [
            "D2 before cancelled=false",
            "D1 before cancelled=false",
            "handler",
            "D1 after",
            "D2 after",
        ]
    );
}

#[tokio::test]
async fn type_erased_dispatch_runs_same_chain() {
    let config = Configuration::new()
        .add_handler::<BaseHandler>(Lifetime::Transient)
        .add_decorator::<D1>(Lifetime::Transient)
        .unwrap();
    let (dispatcher, log) = setup(config);
    let cancel = CancellationToken::new();

    let typed = dispatcher
        .execute_command_with_result(&CreateUserCommand { value: 2 }, &cancel)
        .await
        .unwrap();
    let typed_log = log.entries();
    log.0.lock().unwrap().clear();

    let erased = dispatcher
        .execute_command_dyn::<i64>(Box::new(CreateUserCommand { value: 2 }), &cancel)
        .await
        .unwrap();

    assert_eq!(typed, erased);
    assert_eq!(typed_log, log.entries());
}

#[tokio::test]
async fn pre_cancelled_token_fails_without_running_handler() {
    let config = Configuration::new()
        .add_handler::<BaseHandler>(Lifetime::Transient)
        .add_decorator::<D1>(Lifetime::Transient)
        .unwrap();
    let (dispatcher, log) = setup(config);

    let err = dispatcher
        .execute_command_with_result(&CreateUserCommand { value: 1 }, &CancellationToken::cancelled_token())
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(err.to_string(), "operation was cancelled");
    assert_eq!(log.entries(), ["D1 before cancelled=true", "D1 after"]);
}

#[tokio::test]
async fn open_decorator_wraps_matching_shapes_only() {
    let config = Configuration::new()
        .add_handler::<BaseHandler>(Lifetime::Transient)
        .add_open_decorator::<Auditing>(Lifetime::Singleton)
        .unwrap();
    let (dispatcher, log) = setup(config);
    let cancel = CancellationToken::new();

    let value = dispatcher
        .execute_command_with_result(&CreateUserCommand { value: 1 }, &cancel)
        .await
        .unwrap();
    let echoed = dispatcher
        .execute_query_with_params(&Echo { text: "hi".into() }, &cancel)
        .await
        .unwrap();
    dispatcher.execute_command(&Ping, &cancel).await.unwrap();

    assert_eq!(value, 42);
    assert_eq!(echoed, "hi");
    assert_eq!(
        log.entries(),
        [
            "audit CreateUserCommand Some(1)",
            "handler",
            "audit Echo None",
            "echo",
            "ping",
        ]
    );
}

#[tokio::test]
async fn open_and_closed_decorators_keep_configuration_order() {
    let config = Configuration::new()
        .add_handler::<BaseHandler>(Lifetime::Transient)
        .add_open_decorator::<Auditing>(Lifetime::Transient)
        .unwrap()
        .add_decorator::<D1>(Lifetime::Transient)
        .unwrap();
    let (dispatcher, log) = setup(config);

    dispatcher
        .execute_command_with_result(&CreateUserCommand { value: 3 }, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        log.entries(),
        [
            "D1 before cancelled=false",
            "audit CreateUserCommand Some(3)",
            "handler",
            "D1 after",
        ]
    );
}

#[tokio::test]
async fn tracing_decorator_passes_results_through() {
    let config = Configuration::new()
        .add_handler::<BaseHandler>(Lifetime::Transient)
        .add_open_decorator::<TracingDecorator>(Lifetime::Singleton)
        .unwrap();
    let (dispatcher, _) = setup(config);
    let cancel = CancellationToken::new();

    let value = dispatcher
        .execute_command_with_result(&CreateUserCommand { value: 2 }, &cancel)
        .await
        .unwrap();
    dispatcher.execute_command(&Ping, &cancel).await.unwrap();

    assert_eq!(value, 84);
}

#[tokio::test]
async fn handler_error_passes_through_every_link_unchanged() {
    let config = Configuration::new()
        .add_handler::<BaseHandler>(Lifetime::Transient)
        .add_decorator::<D1>(Lifetime::Transient)
        .unwrap()
        .add_open_decorator::<TracingDecorator>(Lifetime::Singleton)
        .unwrap();
    let (dispatcher, log) = setup(config);

    let err = dispatcher
        .execute_command_dyn::<i64>(
            Box::new(CreateUserCommand { value: -1 }),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    let invalid = err.downcast_ref::<io::Error>().unwrap();
    assert_eq!(invalid.kind(), io::ErrorKind::InvalidInput);
    assert_eq!(invalid.to_string(), "negative value");
    assert_eq!(log.entries(), ["D1 before cancelled=false", "D1 after"]);
}

#[tokio::test]
async fn open_decorator_with_wrong_outcome_type_fails() {
    let config = Configuration::new()
        .add_handler::<BaseHandler>(Lifetime::Transient)
        .add_open_decorator::<Tampering>(Lifetime::Transient)
        .unwrap();
    let (dispatcher, log) = setup(config);

    let err = dispatcher
        .execute_command_with_result(&CreateUserCommand { value: 1 }, &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        Error::OutcomeMismatch { expected } => assert_eq!(expected, "i64"),
        other => panic!("expected OutcomeMismatch, got {other:?}"),
    }
    assert_eq!(log.entries(), ["handler"]);
}

#[tokio::test]
async fn repeated_open_shapes_wrap_once() {
    let options = Configuration::new()
        .add_open_decorator::<Repeating>(Lifetime::Transient)
        .unwrap()
        .build();
    assert_eq!(DecoratorLocator.locate(&options).count(), 2);

    let config = Configuration::new()
        .add_handler::<BaseHandler>(Lifetime::Transient)
        .add_open_decorator::<Repeating>(Lifetime::Transient)
        .unwrap();
    let (dispatcher, log) = setup(config);
    dispatcher
        .execute_command_with_result(&CreateUserCommand { value: 1 }, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(log.entries(), ["repeating", "handler"]);
}
