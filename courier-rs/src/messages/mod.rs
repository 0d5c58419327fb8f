//! Messages: commands and queries.

pub mod commands;
pub mod queries;

pub use commands::{Command, CommandBase, CommandWithResult};
pub use queries::{Query, QueryBase};
