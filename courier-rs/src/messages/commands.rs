//! Command markers. Derive with `#[derive(Command)]`, add `#[command(result = T)]` for a result.

use std::any::Any;

use crate::contracts::TypeInfo;

/// Command without a result.
pub trait Command: Send + Sync + 'static {}

/// Command producing a result.
pub trait CommandWithResult: Send + Sync + 'static {
    type Result: Send + 'static;
}

/// Command whose concrete type is erased. Every `CommandWithResult<Result = R>` is a `CommandBase<R>`.
/// Dispatch with [`Dispatcher::execute_command_dyn`](crate::Dispatcher::execute_command_dyn).
pub trait CommandBase<R>: Send + Sync + 'static {
    fn message_type(&self) -> TypeInfo;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

impl<C: CommandWithResult> CommandBase<C::Result> for C {
    fn message_type(&self) -> TypeInfo {
        TypeInfo::of::<C>()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}
