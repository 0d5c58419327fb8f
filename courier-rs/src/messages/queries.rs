//! Query markers. Derive with `#[derive(Query)]` and `#[query(result = T)]`.
//! Parameterless queries have no message type: they are keyed by their result type alone.

use std::any::Any;

use crate::contracts::TypeInfo;

/// Query carrying input fields.
pub trait Query: Send + Sync + 'static {
    type Result: Send + 'static;
}

/// Query whose concrete type is erased. Every `Query<Result = R>` is a `QueryBase<R>`.
pub trait QueryBase<R>: Send + Sync + 'static {
    fn message_type(&self) -> TypeInfo;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<Q: Query> QueryBase<Q::Result> for Q {
    fn message_type(&self) -> TypeInfo {
        TypeInfo::of::<Q>()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}
