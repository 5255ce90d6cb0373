//! Populating a [`SymbolTable`] from pre-generated documentation metadata.

pub mod doxygen;

use std::path::Path;

use wrapgen_symbols::SymbolTable;

use crate::error::StructuralError;
use crate::warnings::WarningLog;

pub use doxygen::{DoxygenExtractor, ExtractOptions};

/// Summary of one extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub compounds: usize,
    pub members: usize,
}

pub trait DefinitionExtractor {
    /// Read every compound under `source` and add its members to `table`.
    /// Existing entries are only ever added to or overwritten by name.
    fn extract(
        &self,
        source: &Path,
        table: &mut SymbolTable,
        warnings: &mut WarningLog,
    ) -> Result<ExtractStats, StructuralError>;
}
