//! Template fragments and the variables handed to them.
//!
//! A fragment is plain text with `{{key}}` placeholders. Keys missing from the
//! context render as empty text, and so do fragments the provider does not
//! have: a template set only defines the pieces its target needs.

use std::fs;
use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::StructuralError;

/// File extension of fragment files in a template directory.
pub const FRAGMENT_EXTENSION: &str = "tpl";

/// Ordered name/value pairs for one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: IndexMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.values.insert(key.into(), value.to_string());
        self
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

pub trait TemplateProvider {
    /// Render fragment `name`; an unknown fragment yields an empty string.
    fn render(&self, name: &str, context: &TemplateContext) -> String;

    fn has_fragment(&self, name: &str) -> bool;
}

/// Fragments held in memory, usually loaded from a directory of `*.tpl`
/// files where the file stem is the fragment name.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    fragments: AHashMap<String, String>,
}

impl Templates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(StructuralError::MissingDirectory(dir.to_path_buf()).into());
        }

        let mut templates = Self::new();
        let entries = fs::read_dir(dir)
            .with_context(|| format!("failed to list templates in {}", dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("failed to list templates in {}", dir.display()))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FRAGMENT_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let text = fs::read_to_string(&path)
                .with_context(|| format!("failed to read template {}", path.display()))?;
            templates.insert(name, text);
        }

        debug!(dir = %dir.display(), fragments = templates.len(), "loaded templates");
        Ok(templates)
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.fragments.insert(name.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl TemplateProvider for Templates {
    fn render(&self, name: &str, context: &TemplateContext) -> String {
        match self.fragments.get(name) {
            Some(text) => substitute(text, context),
            None => {
                trace!(fragment = name, "no such fragment");
                String::new()
            }
        }
    }

    fn has_fragment(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }
}

/// Replace every `{{key}}` in `text`. An unclosed `{{` is copied through.
pub fn substitute(text: &str, context: &TemplateContext) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };
        let key = after[..close].trim();
        out.push_str(context.get(key).unwrap_or_default());
        rest = &after[close + 2..];
    }

    out.push_str(rest);
    out
}
