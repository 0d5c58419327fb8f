//! Runtime contract descriptors: type identity, shape, role.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

/// Type identity with a readable name. Equality and hashing use the `TypeId` only.
#[derive(Clone, Copy, Debug)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for TypeInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

/// The four message shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractShape {
    Command,
    CommandWithResult,
    /// Parameterless query.
    Query,
    QueryWithParams,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractRole {
    Handler,
    Decorator,
}

/// Capability descriptor keyed by (role, shape, message type, result type).
///
/// A generic definition carries neither message nor result: it stands for the contract
/// of its shape over every message type (used by open decorators).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ContractType {
    role: ContractRole,
    shape: ContractShape,
    message: Option<TypeInfo>,
    result: Option<TypeInfo>,
}

impl ContractType {
    pub(crate) fn new(
        role: ContractRole,
        shape: ContractShape,
        message: Option<TypeInfo>,
        result: Option<TypeInfo>,
    ) -> Self {
        Self {
            role,
            shape,
            message,
            result,
        }
    }

    pub fn generic_definition(role: ContractRole, shape: ContractShape) -> Self {
        Self::new(role, shape, None, None)
    }

    pub fn is_generic_definition(&self) -> bool {
        self.message.is_none() && self.result.is_none()
    }

    pub fn to_generic_definition(&self) -> Self {
        Self::generic_definition(self.role, self.shape)
    }

    /// Same shape and type arguments, other role: the decorator contract matching a handler contract.
    pub fn with_role(&self, role: ContractRole) -> Self {
        Self { role, ..*self }
    }

    pub fn role(&self) -> ContractRole {
        self.role
    }

    pub fn shape(&self) -> ContractShape {
        self.shape
    }

    pub fn message(&self) -> Option<TypeInfo> {
        self.message
    }

    pub fn result(&self) -> Option<TypeInfo> {
        self.result
    }

    fn trait_name(&self) -> &'static str {
        match (self.role, self.shape) {
            (ContractRole::Handler, ContractShape::Command) => "CommandHandler",
            (ContractRole::Handler, ContractShape::CommandWithResult) => "CommandWithResultHandler",
            (ContractRole::Handler, ContractShape::Query) => "QueryHandler",
            (ContractRole::Handler, ContractShape::QueryWithParams) => "QueryWithParamsHandler",
            (ContractRole::Decorator, ContractShape::Command) => "CommandDecorator",
            (ContractRole::Decorator, ContractShape::CommandWithResult) => {
                "CommandWithResultDecorator"
            }
            (ContractRole::Decorator, ContractShape::Query) => "QueryDecorator",
            (ContractRole::Decorator, ContractShape::QueryWithParams) => "QueryWithParamsDecorator",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let argument = match (self.message, self.result) {
            (Some(message), _) => message.name(),
            (None, Some(result)) => result.name(),
            (None, None) => "_",
        };
        write!(f, "{}<{}>", self.trait_name(), argument)
    }
}
