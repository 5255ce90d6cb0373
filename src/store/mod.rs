//! Definition cache persistence.
//!
//! Both formats hold the same logical content and can be converted into each
//! other without loss, apart from optional fields that are empty.

pub mod json;
pub mod records;
pub mod script;

use std::fmt;
use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use wrapgen_symbols::{DuplicateParameterPolicy, SymbolTable};

use crate::error::StructuralError;

pub use json::JsonStore;
pub use script::ScriptStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CacheFormat {
    /// One JSON document per element kind.
    #[default]
    Data,
    /// A single definitions script.
    Source,
}

impl fmt::Display for CacheFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheFormat::Data => f.write_str("data"),
            CacheFormat::Source => f.write_str("source"),
        }
    }
}

pub trait DefinitionStore {
    fn format(&self) -> CacheFormat;

    /// Write every cache file for `table` into `dir`, creating it if needed.
    fn save(&self, table: &SymbolTable, dir: &Path) -> Result<()>;

    /// Rebuild a table from `dir`. Absent files contribute nothing; a missing
    /// directory is a [`StructuralError::MissingDirectory`].
    fn load(&self, dir: &Path) -> Result<SymbolTable>;
}

pub fn store_for(
    format: CacheFormat,
    policy: DuplicateParameterPolicy,
) -> Box<dyn DefinitionStore> {
    match format {
        CacheFormat::Data => Box::new(JsonStore::new(policy)),
        CacheFormat::Source => Box::new(ScriptStore::new(policy).with_diagnostics(true)),
    }
}

pub(crate) fn ensure_cache_dir(dir: &Path) -> Result<(), StructuralError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(StructuralError::MissingDirectory(dir.to_path_buf()))
    }
}
