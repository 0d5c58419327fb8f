//! Contracts: handler and decorator traits per message shape, their runtime descriptors
//! and the compile-time families the proxy is generic over.

pub mod decorators;
pub mod family;
pub mod handlers;
pub mod open;
pub mod shape;

pub use decorators::{
    CommandDecorator, CommandWithResultDecorator, QueryDecorator, QueryWithParamsDecorator,
};
pub use family::{
    CommandContract, CommandWithResultContract, Contract, QueryContract, QueryWithParamsContract,
};
pub use handlers::{CommandHandler, CommandWithResultHandler, QueryHandler, QueryWithParamsHandler};
pub use open::{Invocation, OpenDecorator, Outcome};
pub use shape::{ContractRole, ContractShape, ContractType, TypeInfo};
