use super::Owner;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Constant {
    pub name: String,
    /// Literal initializer text, copied verbatim.
    pub value: String,
    pub description: String,
    pub owner: Option<Owner>,
}

impl Constant {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
