//! Dispatch: the dispatcher service and the table behind its type-erased overloads.

mod dispatcher;
mod table;

pub use dispatcher::Dispatcher;
pub use table::DispatchTable;
