use indexmap::IndexMap;

use crate::entries::{Class, Constant, Enumeration, Function, GlobalVariable, TypeAlias};

/// Canonical name of the unnamed global namespace.
pub const ROOT_NAMESPACE: &str = "\\";

/// Map any spelling of the global namespace (`""`, `"::"`, `"\\"`) to
/// [`ROOT_NAMESPACE`] and drop a leading `::` from qualified names.
pub fn canonical_namespace(name: &str) -> String {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_prefix("::").unwrap_or(trimmed);
    if trimmed.is_empty() || trimmed == ROOT_NAMESPACE {
        ROOT_NAMESPACE.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub name: String,
    pub constants: IndexMap<String, Constant>,
    pub enumerations: IndexMap<String, Enumeration>,
    pub type_aliases: IndexMap<String, TypeAlias>,
    pub variables: IndexMap<String, GlobalVariable>,
    pub functions: IndexMap<String, Function>,
    pub classes: IndexMap<String, Class>,
}

impl Namespace {
    pub fn new(name: &str) -> Self {
        Self {
            name: canonical_namespace(name),
            constants: IndexMap::new(),
            enumerations: IndexMap::new(),
            type_aliases: IndexMap::new(),
            variables: IndexMap::new(),
            functions: IndexMap::new(),
            classes: IndexMap::new(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.name == ROOT_NAMESPACE
    }

    pub fn has_constants(&self) -> bool {
        !self.constants.is_empty()
    }

    pub fn has_enumerations(&self) -> bool {
        !self.enumerations.is_empty()
    }

    pub fn has_type_aliases(&self) -> bool {
        !self.type_aliases.is_empty()
    }

    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }

    pub fn has_functions(&self) -> bool {
        !self.functions.is_empty()
    }

    pub fn has_classes(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn has_class_enumerations(&self) -> bool {
        self.classes
            .values()
            .any(|class| !class.enumerations.is_empty())
    }

    pub fn has_class_variables(&self) -> bool {
        self.classes
            .values()
            .any(|class| !class.variables.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        !(self.has_constants()
            || self.has_enumerations()
            || self.has_type_aliases()
            || self.has_variables()
            || self.has_functions()
            || self.has_classes())
    }
}

/// One documentation unit (usually a public include file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    /// Disabled headers keep their symbols but are skipped by the emitter.
    pub enabled: bool,
    pub namespaces: IndexMap<String, Namespace>,
}

macro_rules! any_namespace {
    ($($method:ident),* $(,)?) => {
        $(
            pub fn $method(&self) -> bool {
                self.namespaces.values().any(Namespace::$method)
            }
        )*
    };
}

impl Header {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            namespaces: IndexMap::new(),
        }
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(&canonical_namespace(name))
    }

    /// Fetch or lazily create the namespace; never replaces an existing one.
    pub fn namespace_mut(&mut self, name: &str) -> &mut Namespace {
        let canonical = canonical_namespace(name);
        self.namespaces
            .entry(canonical.clone())
            .or_insert_with(|| Namespace::new(&canonical))
    }

    any_namespace!(
        has_constants,
        has_enumerations,
        has_type_aliases,
        has_variables,
        has_functions,
        has_classes,
        has_class_enumerations,
        has_class_variables,
    );
}
