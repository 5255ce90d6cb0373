//! Source format: the table as a script of definition calls.
//!
//! ```text
//! include("widgets.h");
//! class("widgets.h", "ui", "Button", parents = ["Control"]) {
//!     method("SetLabel") {
//!         overload(return = "void") {
//!             parameter("label", type = "const char*");
//!         }
//!     }
//! }
//! ```

pub mod grammar;
pub mod lexer;
pub mod loader;
pub mod token;
pub mod writer;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use wrapgen_symbols::{DuplicateParameterPolicy, SymbolTable};
use wrapgen_utils::{Diagnostic, emit_diagnostics};

use super::{CacheFormat, DefinitionStore, ensure_cache_dir};
use crate::error::{StructuralError, read_file};

pub use loader::ScriptError;
pub use writer::write_script;

pub const SCRIPT_FILE: &str = "definitions.wgs";

/// Reads and writes `definitions.wgs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptStore {
    policy: DuplicateParameterPolicy,
    render_diagnostics: bool,
}

impl ScriptStore {
    pub fn new(policy: DuplicateParameterPolicy) -> Self {
        Self {
            policy,
            render_diagnostics: false,
        }
    }

    /// Print located lexer/parser errors to stderr when loading fails.
    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.render_diagnostics = enabled;
        self
    }

    /// Parse script text into a table.
    pub fn parse_source(&self, source: &str, path: &Path) -> Result<SymbolTable, StructuralError> {
        let source_id = path.display().to_string();

        let tokens = lexer::tokenize(source).map_err(|errors| {
            let diagnostics: Vec<Diagnostic> = errors
                .iter()
                .map(|err| err.to_diagnostic(&source_id))
                .collect();
            self.fail(path, source, &diagnostics)
        })?;

        let calls = grammar::parse(&tokens).map_err(|errors| {
            let diagnostics: Vec<Diagnostic> = errors
                .iter()
                .map(|err| err.to_diagnostic(&source_id))
                .collect();
            self.fail(path, source, &diagnostics)
        })?;

        loader::build_table(&calls, self.policy)
            .map_err(|err| self.fail(path, source, &[err.to_diagnostic(&source_id)]))
    }

    fn fail(&self, path: &Path, source: &str, diagnostics: &[Diagnostic]) -> StructuralError {
        if self.render_diagnostics {
            emit_diagnostics(diagnostics, source);
        }
        let message = match diagnostics {
            [] => "invalid definitions script".to_string(),
            [only] => only.message().to_string(),
            [first, rest @ ..] => format!("{} (and {} more)", first.message(), rest.len()),
        };
        StructuralError::malformed(path, message)
    }
}

impl DefinitionStore for ScriptStore {
    fn format(&self) -> CacheFormat {
        CacheFormat::Source
    }

    fn save(&self, table: &SymbolTable, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create cache directory {}", dir.display()))?;
        let path = dir.join(SCRIPT_FILE);
        fs::write(&path, write_script(table))
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(cache = %dir.display(), headers = table.header_count(), "wrote source cache");
        Ok(())
    }

    fn load(&self, dir: &Path) -> Result<SymbolTable> {
        ensure_cache_dir(dir)?;
        let path = dir.join(SCRIPT_FILE);
        if !path.exists() {
            debug!(file = %path.display(), "definitions script absent, empty table");
            return Ok(SymbolTable::new());
        }

        let source = read_file(&path)?;
        let table = self.parse_source(&source, &path)?;
        debug!(cache = %dir.display(), headers = table.header_count(), "loaded source cache");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_become_malformed() {
        let store = ScriptStore::default();
        let err = store
            .parse_source("constant(\"a.h\" \"b\");", Path::new("defs.wgs"))
            .unwrap_err();
        match err {
            StructuralError::Malformed { path, message } => {
                assert_eq!(path, Path::new("defs.wgs"));
                assert!(message.contains("unexpected token"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn lexer_errors_are_counted() {
        let store = ScriptStore::default();
        let err = store
            .parse_source("# $", Path::new("defs.wgs"))
            .unwrap_err();
        assert!(err.to_string().contains("and 1 more"), "{err}");
    }
}
