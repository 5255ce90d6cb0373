use super::Owner;
use crate::types::TypeDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlobalVariable {
    pub name: String,
    pub ty: TypeDescriptor,
    pub owner: Option<Owner>,
}

impl GlobalVariable {
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
