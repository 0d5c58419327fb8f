//! Compile-time contract families. Each family ties one message shape to its handler trait,
//! its decorator trait and the chain link joining them. `Proxy<K>` is generic over a family.

use std::marker::PhantomData;
use std::sync::Arc;

use super::decorators::{
    CommandDecorator, CommandWithResultDecorator, QueryDecorator, QueryWithParamsDecorator,
};
use super::handlers::{CommandHandler, CommandWithResultHandler, QueryHandler, QueryWithParamsHandler};
use super::open::{OpenAdapter, OpenDecorator};
use super::shape::{ContractRole, ContractShape, ContractType, TypeInfo};
use crate::dispatch::DispatchTable;
use crate::messages::{Command, CommandWithResult, Query};
use crate::proxy::chain::{CommandLink, CommandWithResultLink, QueryLink, QueryWithParamsLink};

pub trait Contract: Send + Sync + 'static {
    const SHAPE: ContractShape;

    /// Handler trait object, e.g. `dyn CommandHandler<C>`.
    type Handler: ?Sized + Send + Sync + 'static;
    /// Decorator trait object, e.g. `dyn CommandDecorator<C>`.
    type Decorator: ?Sized + Send + Sync + 'static;

    fn handler_contract() -> ContractType;

    fn decorator_contract() -> ContractType {
        Self::handler_contract().with_role(ContractRole::Decorator)
    }

    /// Pair `decorator` with `next`; the result is the new effective handler.
    fn link(decorator: Arc<Self::Decorator>, next: Arc<Self::Handler>) -> Arc<Self::Handler>;

    /// Close an open decorator over this family's message type.
    fn adapt(open: Arc<dyn OpenDecorator>) -> Arc<Self::Decorator>;

    /// Add the type-erased dispatch entry, for the shapes that have one.
    fn register_dispatch(_table: &mut DispatchTable) {}
}

pub struct CommandContract<C>(PhantomData<fn() -> C>);

pub struct CommandWithResultContract<C>(PhantomData<fn() -> C>);

/// Parameterless query family, keyed by result type.
pub struct QueryContract<R>(PhantomData<fn() -> R>);

pub struct QueryWithParamsContract<Q>(PhantomData<fn() -> Q>);

impl<C: Command> Contract for CommandContract<C> {
    const SHAPE: ContractShape = ContractShape::Command;
    type Handler = dyn CommandHandler<C>;
    type Decorator = dyn CommandDecorator<C>;

    fn handler_contract() -> ContractType {
        ContractType::new(
            ContractRole::Handler,
            Self::SHAPE,
            Some(TypeInfo::of::<C>()),
            None,
        )
    }

    fn link(decorator: Arc<Self::Decorator>, next: Arc<Self::Handler>) -> Arc<Self::Handler> {
        Arc::new(CommandLink::new(decorator, next))
    }

    fn adapt(open: Arc<dyn OpenDecorator>) -> Arc<Self::Decorator> {
        Arc::new(OpenAdapter::<Self>::new(open))
    }
}

impl<C: CommandWithResult> Contract for CommandWithResultContract<C> {
    const SHAPE: ContractShape = ContractShape::CommandWithResult;
    type Handler = dyn CommandWithResultHandler<C>;
    type Decorator = dyn CommandWithResultDecorator<C>;

    fn handler_contract() -> ContractType {
        ContractType::new(
            ContractRole::Handler,
            Self::SHAPE,
            Some(TypeInfo::of::<C>()),
            Some(TypeInfo::of::<C::Result>()),
        )
    }

    fn link(decorator: Arc<Self::Decorator>, next: Arc<Self::Handler>) -> Arc<Self::Handler> {
        Arc::new(CommandWithResultLink::new(decorator, next))
    }

    fn adapt(open: Arc<dyn OpenDecorator>) -> Arc<Self::Decorator> {
        Arc::new(OpenAdapter::<Self>::new(open))
    }

    fn register_dispatch(table: &mut DispatchTable) {
        table.insert_command::<C>();
    }
}

impl<R: Send + 'static> Contract for QueryContract<R> {
    const SHAPE: ContractShape = ContractShape::Query;
    type Handler = dyn QueryHandler<R>;
    type Decorator = dyn QueryDecorator<R>;

    fn handler_contract() -> ContractType {
        ContractType::new(
            ContractRole::Handler,
            Self::SHAPE,
            None,
            Some(TypeInfo::of::<R>()),
        )
    }

    fn link(decorator: Arc<Self::Decorator>, next: Arc<Self::Handler>) -> Arc<Self::Handler> {
        Arc::new(QueryLink::new(decorator, next))
    }

    fn adapt(open: Arc<dyn OpenDecorator>) -> Arc<Self::Decorator> {
        Arc::new(OpenAdapter::<Self>::new(open))
    }
}

impl<Q: Query> Contract for QueryWithParamsContract<Q> {
    const SHAPE: ContractShape = ContractShape::QueryWithParams;
    type Handler = dyn QueryWithParamsHandler<Q>;
    type Decorator = dyn QueryWithParamsDecorator<Q>;

    fn handler_contract() -> ContractType {
        ContractType::new(
            ContractRole::Handler,
            Self::SHAPE,
            Some(TypeInfo::of::<Q>()),
            Some(TypeInfo::of::<Q::Result>()),
        )
    }

    fn link(decorator: Arc<Self::Decorator>, next: Arc<Self::Handler>) -> Arc<Self::Handler> {
        Arc::new(QueryWithParamsLink::new(decorator, next))
    }

    fn adapt(open: Arc<dyn OpenDecorator>) -> Arc<Self::Decorator> {
        Arc::new(OpenAdapter::<Self>::new(open))
    }

    fn register_dispatch(table: &mut DispatchTable) {
        table.insert_query::<Q>();
    }
}
