//! Registration entry: (contract, concrete type, lifetime), the unit locators emit.

use std::fmt;

use courier_core::{Lifetime, ServiceDescriptor};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::capabilities::Binding;
use crate::contracts::{ContractType, TypeInfo};

#[derive(Clone)]
pub struct RegistrationEntry {
    binding: Binding,
    concrete: TypeInfo,
    lifetime: Lifetime,
}

impl RegistrationEntry {
    pub(crate) fn new(binding: Binding, concrete: TypeInfo, lifetime: Lifetime) -> Self {
        Self {
            binding,
            concrete,
            lifetime,
        }
    }

    pub fn contract(&self) -> ContractType {
        self.binding.contract()
    }

    pub fn concrete(&self) -> TypeInfo {
        self.concrete
    }

    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub(crate) fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Container descriptor registering the concrete type under the contract.
    /// `None` for open decorator entries.
    pub(crate) fn descriptor(&self) -> Option<ServiceDescriptor> {
        self.binding.descriptor(self.concrete.name(), self.lifetime)
    }
}

impl PartialEq for RegistrationEntry {
    fn eq(&self, other: &Self) -> bool {
        self.contract() == other.contract()
            && self.concrete == other.concrete
            && self.lifetime == other.lifetime
    }
}

impl Eq for RegistrationEntry {}

impl fmt::Debug for RegistrationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationEntry")
            .field("contract", &self.contract().to_string())
            .field("concrete", &self.concrete.name())
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl Serialize for RegistrationEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RegistrationEntry", 3)?;
        state.serialize_field("contract", &self.contract().to_string())?;
        state.serialize_field("concrete", &self.concrete)?;
        state.serialize_field("lifetime", &self.lifetime)?;
        state.end()
    }
}
