//! Project configuration.
//!
//! Read from `wrapgen.json` (or `wrapgen.toml` with the `toml-config`
//! feature). Every field has a default so an absent file is not an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use wrapgen_symbols::DuplicateParameterPolicy;

use crate::store::CacheFormat;

pub const JSON_CONFIG_FILE: &str = "wrapgen.json";
#[cfg(feature = "toml-config")]
pub const TOML_CONFIG_FILE: &str = "wrapgen.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateParameters {
    #[default]
    Ignore,
    Reject,
}

impl From<DuplicateParameters> for DuplicateParameterPolicy {
    fn from(value: DuplicateParameters) -> Self {
        match value {
            DuplicateParameters::Ignore => Self::Ignore,
            DuplicateParameters::Reject => Self::Reject,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Extension name handed to templates.
    pub name: String,
    pub version: String,
    /// Prefix stripped from documented file locations to form header names.
    pub headers_root: String,
    pub cache_format: CacheFormat,
    /// Extension of generated source files.
    pub output_extension: String,
    pub templates: Option<PathBuf>,
    pub duplicate_parameters: DuplicateParameters,
    /// Whether pointer-typed object parameters accept null.
    pub nullable_object_pointers: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "extension".to_string(),
            version: "0.1.0".to_string(),
            headers_root: String::new(),
            cache_format: CacheFormat::Data,
            output_extension: "cpp".to_string(),
            templates: None,
            duplicate_parameters: DuplicateParameters::Ignore,
            nullable_object_pointers: true,
        }
    }
}

impl ProjectConfig {
    /// Load an explicit configuration file, choosing the parser by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse configuration {}", path.display())),
            #[cfg(feature = "toml-config")]
            Some("toml") => toml::from_str(&raw)
                .with_context(|| format!("failed to parse configuration {}", path.display())),
            _ => bail!(
                "unsupported configuration format for {} (expected .json{})",
                path.display(),
                if cfg!(feature = "toml-config") {
                    " or .toml"
                } else {
                    ""
                }
            ),
        }
    }

    /// Look for a configuration file in `dir`; defaults when none exists.
    pub fn discover(dir: &Path) -> Result<Self> {
        let json = dir.join(JSON_CONFIG_FILE);
        if json.is_file() {
            return Self::load(&json);
        }

        #[cfg(feature = "toml-config")]
        {
            let toml = dir.join(TOML_CONFIG_FILE);
            if toml.is_file() {
                return Self::load(&toml);
            }
        }

        Ok(Self::default())
    }

    /// `WRAPGEN_HEADERS_ROOT` overrides the configured headers root.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(root) = std::env::var("WRAPGEN_HEADERS_ROOT") {
            self.headers_root = root;
        }
        self
    }

    pub fn duplicate_parameter_policy(&self) -> DuplicateParameterPolicy {
        self.duplicate_parameters.into()
    }
}
