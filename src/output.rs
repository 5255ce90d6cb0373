//! Writes generated files, leaving unchanged ones untouched so build systems
//! watching the output directory do not rebuild needlessly.

use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashSet;
use anyhow::{Context, Result, bail};
use sha1::{Digest, Sha1};
use tracing::{debug, info};

use crate::codegen::GeneratedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputReport {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

impl OutputReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.unchanged.len()
    }
}

fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha1::digest(bytes))
}

/// Write `file` under `root` unless the existing file already has the same
/// contents.
pub fn write_if_changed(root: &Path, file: &GeneratedFile) -> Result<WriteOutcome> {
    let path = root.join(&file.path);

    if path.is_file() {
        let existing =
            fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        if fingerprint(&existing) == fingerprint(file.contents.as_bytes()) {
            debug!(path = %path.display(), "unchanged");
            return Ok(WriteOutcome::Unchanged);
        }
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }
    fs::write(&path, &file.contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "written");
    Ok(WriteOutcome::Written)
}

/// Write every file. Nothing is written when two files share a path, since
/// one would silently replace the other.
pub fn write_all(root: &Path, files: &[GeneratedFile]) -> Result<OutputReport> {
    let mut seen = AHashSet::new();
    for file in files {
        if !seen.insert(file.path.as_path()) {
            bail!(
                "more than one generated file maps to {}",
                root.join(&file.path).display()
            );
        }
    }

    let mut report = OutputReport::default();
    for file in files {
        match write_if_changed(root, file)? {
            WriteOutcome::Written => report.written.push(file.path.clone()),
            WriteOutcome::Unchanged => report.unchanged.push(file.path.clone()),
        }
    }
    info!(
        written = report.written.len(),
        unchanged = report.unchanged.len(),
        "output complete"
    );
    Ok(report)
}
