//! On-disk shapes of the data cache format.
//!
//! Optional fields are left out of the file when empty or false, and read
//! back as their defaults.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use wrapgen_symbols::{
    Class, ClassVariable, Constant, DuplicateParameterPolicy, Enumeration, Overload,
    OverloadFlags, Parameter, ReturnType, SymbolError, TypeDescriptor,
};

/// `header -> namespace -> element name -> body`.
pub type Nested<T> = IndexMap<String, IndexMap<String, IndexMap<String, T>>>;

/// `header -> namespace -> class name -> member name -> body`.
pub type ClassNested<T> = Nested<IndexMap<String, T>>;

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantRecord {
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl From<&Constant> for ConstantRecord {
    fn from(constant: &Constant) -> Self {
        Self {
            value: constant.value.clone(),
            description: constant.description.clone(),
        }
    }
}

impl ConstantRecord {
    pub fn into_constant(self, name: &str) -> Constant {
        Constant::new(name, self.value).with_description(self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationRecord {
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl From<&Enumeration> for EnumerationRecord {
    fn from(enumeration: &Enumeration) -> Self {
        Self {
            options: enumeration.options.iter().cloned().collect(),
            description: enumeration.description.clone(),
        }
    }
}

impl EnumerationRecord {
    pub fn into_enumeration(self, name: &str) -> Enumeration {
        Enumeration::with_options(name, self.options).with_description(self.description)
    }
}

/// Body shared by type definitions and global variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedRecord {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl From<&TypeDescriptor> for TypedRecord {
    fn from(ty: &TypeDescriptor) -> Self {
        Self {
            ty: ty.original_text.clone(),
            description: ty.description.clone(),
        }
    }
}

impl TypedRecord {
    pub fn into_descriptor(self) -> TypeDescriptor {
        TypeDescriptor::parse(&self.ty).with_description(self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassVariableRecord {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub ty: String,
    #[serde(rename = "static", default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(rename = "mutable", default, skip_serializing_if = "is_false")]
    pub is_mutable: bool,
    #[serde(rename = "protected", default, skip_serializing_if = "is_false")]
    pub is_protected: bool,
    #[serde(rename = "public", default, skip_serializing_if = "is_false")]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl From<&ClassVariable> for ClassVariableRecord {
    fn from(variable: &ClassVariable) -> Self {
        Self {
            ty: variable.ty.original_text.clone(),
            is_static: variable.is_static,
            is_mutable: variable.is_mutable,
            is_protected: variable.is_protected,
            is_public: variable.is_public,
            description: variable.ty.description.clone(),
        }
    }
}

impl ClassVariableRecord {
    pub fn into_variable(self, name: &str) -> ClassVariable {
        ClassVariable {
            name: name.to_string(),
            ty: TypeDescriptor::parse(&self.ty).with_description(self.description),
            is_static: self.is_static,
            is_mutable: self.is_mutable,
            is_protected: self.is_protected,
            is_public: self.is_public,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_array: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl From<&Parameter> for ParameterRecord {
    fn from(parameter: &Parameter) -> Self {
        Self {
            name: parameter.name.clone(),
            ty: parameter.ty.original_text.clone(),
            is_array: parameter.ty.is_array,
            value: parameter.default_value.clone(),
            description: parameter.ty.description.clone(),
        }
    }
}

impl ParameterRecord {
    pub fn into_parameter(self) -> Parameter {
        let mut ty = TypeDescriptor::parse(&self.ty).with_description(self.description);
        ty.is_array |= self.is_array && !ty.is_empty();
        Parameter::new(self.name, ty).with_default(self.value)
    }
}

/// One overload; free functions never set the method-only flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverloadRecord {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub return_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub return_description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterRecord>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub constant: bool,
    #[serde(rename = "static", default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(rename = "virtual", default, skip_serializing_if = "is_false")]
    pub is_virtual: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pure_virtual: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub protected: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
}

impl From<&Overload> for OverloadRecord {
    fn from(overload: &Overload) -> Self {
        let flags = overload.flags;
        Self {
            description: overload.description.clone(),
            return_type: overload.return_type.ty.original_text.clone(),
            return_description: overload.return_type.ty.description.clone(),
            parameters: overload.parameters.iter().map(ParameterRecord::from).collect(),
            constant: flags.is_const,
            is_static: flags.is_static,
            is_virtual: flags.is_virtual,
            pure_virtual: flags.is_pure_virtual,
            protected: flags.is_protected,
            deprecated: flags.is_deprecated,
        }
    }
}

impl OverloadRecord {
    /// Rebuild the overload, applying `policy` to repeated parameter names.
    pub fn into_overload(
        self,
        function: &str,
        policy: DuplicateParameterPolicy,
    ) -> Result<Overload, SymbolError> {
        let return_type = TypeDescriptor::parse(&self.return_type)
            .with_description(self.return_description);
        let mut overload = Overload::new(ReturnType::new(return_type))
            .with_description(self.description)
            .with_flags(OverloadFlags {
                is_static: self.is_static,
                is_const: self.constant,
                is_virtual: self.is_virtual,
                is_pure_virtual: self.pure_virtual,
                is_protected: self.protected,
                is_deprecated: self.deprecated,
            });
        overload.function = function.to_string();
        for parameter in self.parameters {
            overload.add_parameter(parameter.into_parameter(), policy)?;
        }
        Ok(overload)
    }
}

/// A class entry in `classes.json`. Class-level fields sit under `@` keys,
/// which can never collide with C++ method names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassRecord {
    #[serde(rename = "@description", default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "@struct", default, skip_serializing_if = "is_false")]
    pub is_struct: bool,
    #[serde(
        rename = "@forward_declaration",
        default,
        skip_serializing_if = "is_false"
    )]
    pub is_forward_declaration: bool,
    #[serde(rename = "@parents", default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    #[serde(rename = "@generics", default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<String>,
    #[serde(flatten)]
    pub methods: IndexMap<String, Vec<OverloadRecord>>,
}

impl From<&Class> for ClassRecord {
    fn from(class: &Class) -> Self {
        Self {
            description: class.description.clone(),
            is_struct: class.is_struct,
            is_forward_declaration: class.is_forward_declaration,
            parents: class.parents.iter().cloned().collect(),
            generics: class.generic_parameters.clone(),
            methods: class
                .methods
                .iter()
                .map(|(name, method)| {
                    let overloads: Vec<OverloadRecord> =
                        method.overloads.iter().map(OverloadRecord::from).collect();
                    (name.clone(), overloads)
                })
                .collect(),
        }
    }
}
