//! Discovery: capability sets, assembly catalogs and the locators that turn them into registration entries.

mod assembly;
mod capabilities;
mod decorator_locator;
mod entry;
mod handler_locator;

pub use assembly::Assembly;
pub(crate) use capabilities::OpenFactory;
pub use capabilities::{Binding, Capabilities, Component, ContractSet};
pub use decorator_locator::DecoratorLocator;
pub use entry::RegistrationEntry;
pub use handler_locator::HandlerLocator;
