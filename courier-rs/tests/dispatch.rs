//! Dispatch: typed and type-erased paths, missing registrations, parameterless queries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use courier::{
    CancellationToken, Capabilities, Command, CommandBase, CommandHandler,
    CommandWithResultHandler, Configuration, ContractSet, Dispatcher, Error, Inject,
    IntoDispatchError, Lifetime,
    Query, QueryBase, QueryHandler, QueryWithParamsHandler, ServiceCollection,
    ServiceCollectionExt,
};

#[derive(Command)]
#[command(result = i64)]
struct CreateUserCommand {
    value: i64,
}

#[derive(Command)]
struct DeleteUser {
    id: u32,
}

#[derive(Query)]
#[query(result = Option<String>)]
struct GetUserName {
    id: u32,
}

#[derive(Default)]
struct Calls(AtomicUsize);

impl Calls {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Inject)]
struct UserHandler {
    calls: Arc<Calls>,
}

#[async_trait]
impl CommandWithResultHandler<CreateUserCommand> for UserHandler {
    async fn handle(&self, command: &CreateUserCommand, _: &CancellationToken) -> Result<i64, Error> {
        self.calls.0.fetch_add(1, Ordering::SeqCst);
        Ok(command.value * 42)
    }
}

#[async_trait]
impl CommandHandler<DeleteUser> for UserHandler {
    async fn handle(&self, command: &DeleteUser, _: &CancellationToken) -> Result<(), Error> {
        self.calls.0.fetch_add(1, Ordering::SeqCst);
        if command.id == 0 {
            let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "no user 0");
            return Err(missing.into_dispatch_error());
        }
        Ok(())
    }
}

#[async_trait]
impl QueryWithParamsHandler<GetUserName> for UserHandler {
    async fn handle(&self, query: &GetUserName, _: &CancellationToken) -> Result<Option<String>, Error> {
        self.calls.0.fetch_add(1, Ordering::SeqCst);
        Ok((query.id == 7).then(|| "ada".to_string()))
    }
}

#[async_trait]
impl QueryHandler<u64> for UserHandler {
    async fn handle(&self, _: &CancellationToken) -> Result<u64, Error> {
        self.calls.0.fetch_add(1, Ordering::SeqCst);
        Ok(3)
    }
}

impl Capabilities for UserHandler {
    fn declare(contracts: &mut ContractSet<Self>) {
        contracts
            .command_with_result::<CreateUserCommand>()
            .command::<DeleteUser>()
            .query_with_params::<GetUserName>()
            .query::<u64>();
    }
}

fn setup(config: Configuration) -> (Dispatcher, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let mut services = ServiceCollection::new();
    services.add_instance(Arc::clone(&calls));
    services.add_dispatch(config).unwrap();
    let scope = services.build().create_scope();
    let dispatcher = scope.resolve::<Dispatcher>().unwrap();
    (dispatcher.as_ref().clone(), calls)
}

fn users() -> Configuration {
    Configuration::new().add_handler::<UserHandler>(Lifetime::Scoped)
}

#[tokio::test]
async fn command_with_result_returns_handler_value() {
    let (dispatcher, calls) = setup(users());
    let result = dispatcher
        .execute_command_with_result(&CreateUserCommand { value: 10 }, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result, 420);
    assert_eq!(calls.count(), 1);
}

#[tokio::test]
async fn type_erased_command_matches_typed_path() {
    let (dispatcher, calls) = setup(users());
    let cancel = CancellationToken::new();

    let typed = dispatcher
        .execute_command_with_result(&CreateUserCommand { value: 5 }, &cancel)
        .await
        .unwrap();
    let command: Box<dyn CommandBase<i64>> = Box::new(CreateUserCommand { value: 5 });
    let erased = dispatcher.execute_command_dyn(command, &cancel).await.unwrap();

    assert_eq!(typed, erased);
    assert_eq!(calls.count(), 2);
}

#[tokio::test]
async fn type_erased_query_matches_typed_path() {
    let (dispatcher, calls) = setup(users());
    let cancel = CancellationToken::new();

    let typed = dispatcher
        .execute_query_with_params(&GetUserName { id: 7 }, &cancel)
        .await
        .unwrap();
    let query: Box<dyn QueryBase<Option<String>>> = Box::new(GetUserName { id: 7 });
    let erased = dispatcher.execute_query_dyn(query, &cancel).await.unwrap();

    assert_eq!(typed.as_deref(), Some("ada"));
    assert_eq!(typed, erased);
    assert_eq!(calls.count(), 2);
}

#[tokio::test]
async fn parameterless_query_is_keyed_by_result() {
    let (dispatcher, _) = setup(users());
    let count = dispatcher
        .execute_query::<u64>(&CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn handler_error_is_returned_unchanged() {
    let (dispatcher, calls) = setup(users());
    let err = dispatcher
        .execute_command(&DeleteUser { id: 0 }, &CancellationToken::new())
        .await
        .unwrap_err();
    let io = err.downcast_ref::<std::io::Error>().unwrap();
    assert_eq!(io.kind(), std::io::ErrorKind::NotFound);
    assert_eq!(calls.count(), 1);
}

#[tokio::test]
async fn zero_handlers_is_not_registered() {
    let (dispatcher, _) = setup(Configuration::new());
    let cancel = CancellationToken::new();

    let err = dispatcher
        .execute_command_with_result(&CreateUserCommand { value: 1 }, &cancel)
        .await
        .unwrap_err();
    assert!(err.is_not_registered());
    assert!(err.to_string().starts_with("required service not registered"));

    let command: Box<dyn CommandBase<i64>> = Box::new(CreateUserCommand { value: 1 });
    let err = dispatcher.execute_command_dyn(command, &cancel).await.unwrap_err();
    assert!(err.is_not_registered());
    assert!(err.to_string().contains("CreateUserCommand"));

    let query: Box<dyn QueryBase<Option<String>>> = Box::new(GetUserName { id: 7 });
    let err = dispatcher.execute_query_dyn(query, &cancel).await.unwrap_err();
    assert!(err.is_not_registered());
    assert!(err.to_string().contains("GetUserName"));
}

#[tokio::test]
async fn scoped_handler_is_shared_within_scope() {
    let calls = Arc::new(Calls::default());
    let mut services = ServiceCollection::new();
    services.add_instance(Arc::clone(&calls));
    services.add_dispatch(users()).unwrap();
    let provider = services.build();

    let scope = provider.create_scope();
    let first = scope.resolve::<dyn CommandHandler<DeleteUser>>().unwrap();
    let second = scope.resolve::<dyn CommandHandler<DeleteUser>>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let other = provider.create_scope();
    let third = other.resolve::<dyn CommandHandler<DeleteUser>>().unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
}
