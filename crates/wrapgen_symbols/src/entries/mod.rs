//! Entity types stored in the symbol table.

mod class;
mod constant;
mod enumeration;
mod function;
mod type_alias;
mod variable;

pub use class::{Class, ClassVariable};
pub use constant::Constant;
pub use enumeration::{Enumeration, EnumerationOwner};
pub use function::{
    DuplicateParameterPolicy, Function, Overload, OverloadFlags, Parameter, ReturnType,
};
pub use type_alias::TypeAlias;
pub use variable::GlobalVariable;

/// Back-reference from an attached element to the header and namespace that
/// hold it. Set by the table on attach; detached elements carry `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Owner {
    pub header: String,
    pub namespace: String,
}

impl Owner {
    pub fn new(header: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            namespace: namespace.into(),
        }
    }
}
