use super::Owner;
use crate::error::SymbolError;
use crate::types::TypeDescriptor;

/// What to do when an overload already has a parameter with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateParameterPolicy {
    /// Keep the first parameter and drop the new one silently.
    #[default]
    Ignore,
    /// Refuse with [`SymbolError::DuplicateParameter`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Default value expression; empty means the argument is required.
    pub default_value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value: String::new(),
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn is_optional(&self) -> bool {
        !self.default_value.is_empty()
    }

    pub fn description(&self) -> &str {
        &self.ty.description
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReturnType {
    pub ty: TypeDescriptor,
}

impl ReturnType {
    pub fn new(ty: TypeDescriptor) -> Self {
        Self { ty }
    }

    pub fn parse(raw: &str) -> Self {
        Self::new(TypeDescriptor::parse(raw))
    }

    pub fn is_void(&self) -> bool {
        self.ty.is_void() || self.ty.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverloadFlags {
    pub is_static: bool,
    pub is_const: bool,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    pub is_protected: bool,
    pub is_deprecated: bool,
}

/// One concrete signature of a function or method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Overload {
    pub return_type: ReturnType,
    /// Declaration order is significant and never changed.
    pub parameters: Vec<Parameter>,
    pub flags: OverloadFlags,
    pub description: String,
    /// Name of the owning function, set by [`Function::add_overload`].
    pub function: String,
}

impl Overload {
    pub fn new(return_type: ReturnType) -> Self {
        Self {
            return_type,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: OverloadFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Append a parameter. Returns `Ok(false)` when a duplicate name was
    /// dropped under [`DuplicateParameterPolicy::Ignore`].
    pub fn add_parameter(
        &mut self,
        parameter: Parameter,
        policy: DuplicateParameterPolicy,
    ) -> Result<bool, SymbolError> {
        if self.has_parameter(&parameter.name) {
            return match policy {
                DuplicateParameterPolicy::Ignore => Ok(false),
                DuplicateParameterPolicy::Reject => Err(SymbolError::DuplicateParameter {
                    function: self.function.clone(),
                    parameter: parameter.name,
                }),
            };
        }
        self.parameters.push(parameter);
        Ok(true)
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|param| param.name == name)
    }

    /// Parameters before the first one carrying a default value. Everything
    /// from that point on is the optional tail, even if a later parameter
    /// has no default of its own.
    pub fn required_count(&self) -> usize {
        self.parameters
            .iter()
            .position(Parameter::is_optional)
            .unwrap_or(self.parameters.len())
    }

    pub fn total_count(&self) -> usize {
        self.parameters.len()
    }
}

/// A free function or a class method with its overload set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Function {
    pub name: String,
    pub overloads: Vec<Overload>,
    /// Mirrors the first documented overload.
    pub description: String,
    pub owner: Option<Owner>,
    /// Owning class name for methods.
    pub class: Option<String>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append an overload. The function's own description is taken from
    /// the first overload that has one.
    pub fn add_overload(&mut self, mut overload: Overload) {
        overload.function = self.name.clone();
        if self.description.is_empty() {
            self.description = overload.description.clone();
        }
        self.overloads.push(overload);
    }

    pub fn is_method(&self) -> bool {
        self.class.is_some()
    }

    pub fn is_constructor(&self) -> bool {
        self.class.as_deref() == Some(self.name.as_str())
    }
}
