use indexmap::IndexSet;

use super::Owner;

/// Who holds an enumeration: a namespace or a class, never both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnumerationOwner {
    #[default]
    Detached,
    Namespace(Owner),
    Class(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Enumeration {
    pub name: String,
    /// Enumerator names in declaration order. Values are not tracked.
    pub options: IndexSet<String>,
    pub description: String,
    pub owner: EnumerationOwner,
}

impl Enumeration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_options<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut enumeration = Self::new(name);
        for option in options {
            enumeration.add_option(option);
        }
        enumeration
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns false when the option was already present.
    pub fn add_option(&mut self, option: impl Into<String>) -> bool {
        self.options.insert(option.into())
    }

    pub fn class_name(&self) -> Option<&str> {
        match &self.owner {
            EnumerationOwner::Class(name) => Some(name),
            _ => None,
        }
    }
}
