use std::path::Path;

use roxmltree::Document;

use super::xml::{child_text, children};
use crate::error::{StructuralError, read_file};

pub const INDEX_FILE: &str = "index.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundKind {
    File,
    Namespace,
    Class,
    Struct,
}

impl CompoundKind {
    fn from_attribute(kind: &str) -> Option<Self> {
        match kind {
            "file" => Some(Self::File),
            "namespace" => Some(Self::Namespace),
            "class" => Some(Self::Class),
            "struct" => Some(Self::Struct),
            _ => None,
        }
    }

    pub fn is_class_like(self) -> bool {
        matches!(self, Self::Class | Self::Struct)
    }
}

/// One documented unit listed in `index.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    pub refid: String,
    pub kind: CompoundKind,
    pub name: String,
}

impl Compound {
    pub fn document_name(&self) -> String {
        format!("{}.xml", self.refid)
    }
}

/// Compounds of the supported kinds, in index order. Other kinds (pages,
/// directories, groups, unions) are ignored.
pub fn read_index(dir: &Path) -> Result<Vec<Compound>, StructuralError> {
    if !dir.is_dir() {
        return Err(StructuralError::MissingDirectory(dir.to_path_buf()));
    }
    let path = dir.join(INDEX_FILE);
    if !path.is_file() {
        return Err(StructuralError::MissingIndex(path));
    }

    let raw = read_file(&path)?;
    parse_index(&raw).map_err(|message| StructuralError::malformed(&path, message))
}

pub fn parse_index(raw: &str) -> Result<Vec<Compound>, String> {
    let doc = Document::parse(raw).map_err(|err| err.to_string())?;
    let root = doc.root_element();
    if !root.has_tag_name("doxygenindex") {
        return Err(format!(
            "expected <doxygenindex>, found <{}>",
            root.tag_name().name()
        ));
    }

    Ok(children(root, "compound")
        .filter_map(|node| {
            let kind = CompoundKind::from_attribute(node.attribute("kind")?)?;
            Some(Compound {
                refid: node.attribute("refid")?.to_string(),
                kind,
                name: child_text(node, "name").unwrap_or_default(),
            })
        })
        .collect())
}
