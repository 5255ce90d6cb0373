use indexmap::{IndexMap, IndexSet};

use super::{Enumeration, EnumerationOwner, Function, Owner};
use crate::types::TypeDescriptor;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassVariable {
    pub name: String,
    pub ty: TypeDescriptor,
    pub is_static: bool,
    pub is_mutable: bool,
    pub is_protected: bool,
    pub is_public: bool,
}

impl ClassVariable {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            is_public: true,
            ..Self::default()
        }
    }

    pub fn description(&self) -> &str {
        &self.ty.description
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Class {
    pub name: String,
    pub generic_parameters: Vec<String>,
    pub is_struct: bool,
    pub is_forward_declaration: bool,
    pub parents: IndexSet<String>,
    pub variables: IndexMap<String, ClassVariable>,
    pub enumerations: IndexMap<String, Enumeration>,
    pub methods: IndexMap<String, Function>,
    pub description: String,
    pub owner: Option<Owner>,
}

impl Class {
    /// Create a class; a `<...>` suffix on `name` becomes the generic
    /// parameter list (`Vector<T, A>` -> `Vector` with `[T, A]`).
    pub fn new(name: impl AsRef<str>) -> Self {
        let raw = name.as_ref().trim();
        let (name, generic_parameters) = match raw.find('<') {
            Some(pos) => {
                let inner = raw[pos + 1..].trim_end();
                let inner = inner.strip_suffix('>').unwrap_or(inner);
                (raw[..pos].trim().to_string(), split_generic_arguments(inner))
            }
            None => (raw.to_string(), Vec::new()),
        };

        Self {
            name,
            generic_parameters,
            ..Self::default()
        }
    }

    pub fn new_struct(name: impl AsRef<str>) -> Self {
        Self {
            is_struct: true,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Duplicates are ignored.
    pub fn add_parent(&mut self, parent: impl Into<String>) {
        self.parents.insert(parent.into());
    }

    pub fn add_variable(&mut self, variable: ClassVariable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    pub fn add_enumeration(&mut self, mut enumeration: Enumeration) {
        enumeration.owner = EnumerationOwner::Class(self.name.clone());
        self.enumerations
            .insert(enumeration.name.clone(), enumeration);
    }

    pub fn add_method(&mut self, mut method: Function) {
        method.class = Some(self.name.clone());
        method.owner = self.owner.clone();
        self.methods.insert(method.name.clone(), method);
    }

    pub fn has_constructor(&self) -> bool {
        self.methods.contains_key(&self.name)
    }

    /// Record the owning header/namespace here and on every method.
    pub(crate) fn attach(&mut self, owner: &Owner) {
        self.owner = Some(owner.clone());
        for method in self.methods.values_mut() {
            method.owner = Some(owner.clone());
        }
    }
}

/// Split on commas that are not nested inside `<>`, `()` or `[]`.
fn split_generic_arguments(inner: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in inner.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                arguments.push(&inner[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    arguments.push(&inner[start..]);

    arguments
        .into_iter()
        .map(str::trim)
        .filter(|argument| !argument.is_empty())
        .map(String::from)
        .collect()
}
