use super::Owner;
use crate::types::TypeDescriptor;

/// A `typedef`; the description lives on the descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeAlias {
    pub name: String,
    pub ty: TypeDescriptor,
    pub owner: Option<Owner>,
}

impl TypeAlias {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            owner: None,
        }
    }

    pub fn description(&self) -> &str {
        &self.ty.description
    }
}
