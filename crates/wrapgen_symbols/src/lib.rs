//! Symbol-table model for documented C/C++ APIs.
//!
//! The [`SymbolTable`] owns every header, namespace and element. Elements
//! refer back to their owners by name ([`Owner`], [`EnumerationOwner`],
//! `Function::class`) rather than by pointer.

pub mod entries;
pub mod error;
pub mod namespace;
pub mod table;
pub mod types;

pub use entries::{
    Class, ClassVariable, Constant, DuplicateParameterPolicy, Enumeration, EnumerationOwner,
    Function, GlobalVariable, Overload, OverloadFlags, Owner, Parameter, ReturnType, TypeAlias,
};
pub use error::SymbolError;
pub use namespace::{Header, Namespace, ROOT_NAMESPACE, canonical_namespace};
pub use table::{SymbolCounts, SymbolTable, header_counts};
pub use types::TypeDescriptor;
