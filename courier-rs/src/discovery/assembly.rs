//! Assembly: a named catalog of exported component types, scanned by the handler locator.

use super::capabilities::{Capabilities, Component};

#[derive(Clone, Debug, Default)]
pub struct Assembly {
    name: &'static str,
    types: Vec<Component>,
}

impl Assembly {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            types: Vec::new(),
        }
    }

    /// Export `T` with its declared contracts. Handlers and decorators may both be exported;
    /// the handler locator skips any type that declares a decorator contract.
    pub fn export<T: Capabilities>(mut self) -> Self {
        self.types.push(Component::of::<T>());
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn types(&self) -> &[Component] {
        &self.types
    }
}
