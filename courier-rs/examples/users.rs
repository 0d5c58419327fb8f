//! Example: a user handler behind a logging decorator and the tracing decorator.
//!
//! Run with `cargo run -p courier-rs --example users`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use courier::{
    CancellationToken, Capabilities, Command, CommandBase, CommandWithResultDecorator,
    CommandWithResultHandler, Configuration, ContractSet, Dispatcher, Error, Inject, Lifetime,
    Query, QueryWithParamsHandler, ServiceCollection, ServiceCollectionExt, TracingDecorator,
};

#[derive(Command)]
#[command(result = u64)]
struct CreateUser {
    name: String,
}

#[derive(Query)]
#[query(result = Option<String>)]
struct GetUser {
    id: u64,
}

#[derive(Default)]
struct UserStore(Mutex<HashMap<u64, String>>);

#[derive(Inject)]
struct UserHandler {
    store: Arc<UserStore>,
}

#[async_trait]
impl CommandWithResultHandler<CreateUser> for UserHandler {
    async fn handle(&self, command: &CreateUser, cancel: &CancellationToken) -> Result<u64, Error> {
        cancel.error_if_cancelled()?;
        let mut users = self.store.0.lock();
        let id = users.len() as u64 + 1;
        users.insert(id, command.name.clone());
        Ok(id)
    }
}

#[async_trait]
impl QueryWithParamsHandler<GetUser> for UserHandler {
    async fn handle(&self, query: &GetUser, _: &CancellationToken) -> Result<Option<String>, Error> {
        let users = self.store.0.lock();
        Ok(users.get(&query.id).cloned())
    }
}

impl Capabilities for UserHandler {
    fn declare(contracts: &mut ContractSet<Self>) {
        contracts
            .command_with_result::<CreateUser>()
            .query_with_params::<GetUser>();
    }
}

#[derive(Inject)]
struct RejectBlankNames;

#[async_trait]
impl CommandWithResultDecorator<CreateUser> for RejectBlankNames {
    async fn handle(
        &self,
        command: &CreateUser,
        next: &dyn CommandWithResultHandler<CreateUser>,
        cancel: &CancellationToken,
    ) -> Result<u64, Error> {
        if command.name.trim().is_empty() {
            return Err(Error::handler("user name must not be blank"));
        }
        next.handle(command, cancel).await
    }
}

impl Capabilities for RejectBlankNames {
    fn declare(contracts: &mut ContractSet<Self>) {
        contracts.command_with_result_decorator::<CreateUser>();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()?;

    let config = Configuration::new()
        .add_handler::<UserHandler>(Lifetime::Scoped)
        .add_decorator::<RejectBlankNames>(Lifetime::Singleton)?
        .add_open_decorator::<TracingDecorator>(Lifetime::Singleton)?;

    let mut services = ServiceCollection::new();
    services.add_instance(Arc::new(UserStore::default()));
    services.add_dispatch(config)?;
    let scope = services.build().create_scope();
    let dispatcher = scope.resolve::<Dispatcher>()?;
    let cancel = CancellationToken::new();

    let id = dispatcher
        .execute_command_with_result(&CreateUser { name: "ada".into() }, &cancel)
        .await?;
    let user = dispatcher.execute_query_with_params(&GetUser { id }, &cancel).await?;
    println!("created user {id}: {user:?}");

    let erased: Box<dyn CommandBase<u64>> = Box::new(CreateUser { name: " ".into() });
    if let Err(err) = dispatcher.execute_command_dyn(erased, &cancel).await {
        println!("rejected: {err}");
    }
    Ok(())
}
