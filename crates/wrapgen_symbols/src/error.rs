use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("parameter `{parameter}` is declared twice in an overload of `{function}`")]
    DuplicateParameter { function: String, parameter: String },
}
