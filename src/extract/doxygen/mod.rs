//! Extraction from doxygen XML output (`GENERATE_XML = YES`).
//!
//! `index.xml` lists the compounds; each compound's members live in
//! `<refid>.xml`. Namespaces are read before files so that a member listed
//! under both keeps its namespace, then classes and structs are read.

pub mod index;
pub mod member;
pub mod xml;

use std::path::Path;

use ahash::AHashSet;
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use roxmltree::{Document, Node};
use tracing::{debug, trace};
use wrapgen_symbols::{
    Class, ClassVariable, Constant, DuplicateParameterPolicy, Enumeration, Function,
    GlobalVariable, Overload, OverloadFlags, ROOT_NAMESPACE, ReturnType, SymbolError,
    SymbolTable, TypeAlias, TypeDescriptor,
};

use self::index::{Compound, CompoundKind, read_index};
use self::member::{member_type, read_parameters};
use self::xml::{
    brief, child, child_text, children, flag, is_deprecated, parameter_descriptions,
    return_description,
};
use super::{DefinitionExtractor, ExtractStats};
use crate::config::ProjectConfig;
use crate::error::{StructuralError, read_file};
use crate::warnings::{DataQualityWarning, WarningLog};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Prefix removed from `<location file>` paths to form header names.
    pub headers_root: String,
    pub policy: DuplicateParameterPolicy,
}

impl From<&ProjectConfig> for ExtractOptions {
    fn from(config: &ProjectConfig) -> Self {
        Self {
            headers_root: config.headers_root.clone(),
            policy: config.duplicate_parameter_policy(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DoxygenExtractor {
    options: ExtractOptions,
    show_progress: bool,
}

impl DoxygenExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            show_progress: false,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Header name for a documented file path: forward slashes, headers root
    /// removed.
    pub fn header_name(&self, file: &str) -> String {
        let normalized = file.replace('\\', "/");
        let root = self.options.headers_root.replace('\\', "/");
        let relative = if root.is_empty() {
            normalized.as_str()
        } else {
            normalized.strip_prefix(root.as_str()).unwrap_or(&normalized)
        };
        relative.trim_start_matches('/').to_string()
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) =
            ProgressStyle::with_template("extracting [{elapsed_precise}] {wide_bar} {pos}/{len}")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb
    }
}

impl DefinitionExtractor for DoxygenExtractor {
    fn extract(
        &self,
        source: &Path,
        table: &mut SymbolTable,
        warnings: &mut WarningLog,
    ) -> Result<ExtractStats, StructuralError> {
        let compounds = read_index(source)?;
        debug!(source = %source.display(), compounds = compounds.len(), "read doxygen index");

        let ordered = [
            CompoundKind::Namespace,
            CompoundKind::File,
            CompoundKind::Class,
            CompoundKind::Struct,
        ]
        .into_iter()
        .flat_map(|kind| compounds.iter().filter(move |c| c.kind == kind));

        let pb = self.progress_bar(compounds.len());
        let mut walk = Walk {
            extractor: self,
            table,
            warnings,
            seen: AHashSet::new(),
            functions: IndexMap::new(),
            stats: ExtractStats::default(),
        };

        for compound in ordered {
            let path = source.join(compound.document_name());
            let raw = read_file(&path)?;
            walk.compound(compound, &raw, &path)?;
            walk.stats.compounds += 1;
            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok(walk.finish())
    }
}

/// State for one extraction pass.
struct Walk<'a> {
    extractor: &'a DoxygenExtractor,
    table: &'a mut SymbolTable,
    warnings: &'a mut WarningLog,
    seen: AHashSet<String>,
    /// Free functions grouped by (namespace, name); the header is the first
    /// one an overload was seen in.
    functions: IndexMap<(String, String), (String, Function)>,
    stats: ExtractStats,
}

impl Walk<'_> {
    fn finish(self) -> ExtractStats {
        for ((namespace, _), (header, function)) in self.functions {
            self.table.add_function(function, &header, &namespace);
        }
        self.stats
    }

    fn compound(
        &mut self,
        compound: &Compound,
        raw: &str,
        path: &Path,
    ) -> Result<(), StructuralError> {
        let doc = Document::parse(raw).map_err(|err| StructuralError::malformed(path, err))?;
        let def = child(doc.root_element(), "compounddef")
            .ok_or_else(|| StructuralError::malformed(path, "no <compounddef> element"))?;
        let name = child_text(def, "compoundname").unwrap_or_else(|| compound.name.clone());
        trace!(compound = %name, kind = ?compound.kind, "reading compound");

        let fallback_header = match location(def) {
            Some(file) => self.extractor.header_name(file),
            None => compound.name.clone(),
        };

        match compound.kind {
            CompoundKind::File => self.scope(def, ROOT_NAMESPACE, &fallback_header),
            CompoundKind::Namespace => self.scope(def, &name, &fallback_header),
            CompoundKind::Class | CompoundKind::Struct => {
                self.class(def, &name, compound.kind, &fallback_header)
            }
        }
        Ok(())
    }

    /// Members of `def` not seen before, in document order.
    fn fresh_members<'d, 'i>(&mut self, def: Node<'d, 'i>) -> Vec<Node<'d, 'i>> {
        let mut members = Vec::new();
        for section in children(def, "sectiondef") {
            for member in children(section, "memberdef") {
                let id = member.attribute("id").unwrap_or_default();
                if !id.is_empty() && !self.seen.insert(id.to_string()) {
                    continue;
                }
                members.push(member);
            }
        }
        members
    }

    fn header_of(&self, member: Node<'_, '_>, fallback: &str) -> String {
        match location(member) {
            Some(file) => self.extractor.header_name(file),
            None => fallback.to_string(),
        }
    }

    fn scope(&mut self, def: Node<'_, '_>, namespace: &str, fallback_header: &str) {
        for member in self.fresh_members(def) {
            let header = self.header_of(member, fallback_header);
            let name = child_text(member, "name").unwrap_or_default();
            if name.is_empty() {
                continue;
            }

            match member.attribute("kind").unwrap_or_default() {
                "define" => self.macro_constant(member, name, &header, namespace),
                "enum" => self.enumeration(member, name, &header, namespace),
                "typedef" => {
                    let ty = self.typed(member, &name, &header);
                    self.table
                        .add_type_alias(TypeAlias::new(name, ty), &header, namespace);
                    self.stats.members += 1;
                }
                "variable" => {
                    let ty = self.typed(member, &name, &header);
                    self.table
                        .add_global_variable(GlobalVariable::new(name, ty), &header, namespace);
                    self.stats.members += 1;
                }
                "function" => {
                    let Some(overload) = self.overload(member, &name, &header, false) else {
                        continue;
                    };
                    self.functions
                        .entry((namespace.to_string(), name.clone()))
                        .or_insert_with(|| (header, Function::new(&name)))
                        .1
                        .add_overload(overload);
                    self.stats.members += 1;
                }
                other => trace!(kind = other, member = %name, "ignoring member"),
            }
        }
    }

    fn macro_constant(&mut self, member: Node<'_, '_>, name: String, header: &str, namespace: &str) {
        if child(member, "param").is_some() {
            trace!(member = %name, "skipping function-like macro");
            return;
        }
        if name.starts_with("__") {
            self.warnings.push(DataQualityWarning::ReservedName {
                name,
                header: header.to_string(),
            });
            return;
        }

        match child_text(member, "initializer").filter(|value| !value.is_empty()) {
            Some(value) => {
                let constant = Constant::new(name, value).with_description(brief(member));
                self.table.add_constant(constant, header, namespace);
                self.stats.members += 1;
            }
            None => self.warnings.push(DataQualityWarning::MacroWithoutValue {
                name,
                header: header.to_string(),
            }),
        }
    }

    fn enumeration(&mut self, member: Node<'_, '_>, name: String, header: &str, namespace: &str) {
        if is_anonymous(&name) {
            // Enumerator ordinals are not kept.
            for value in children(member, "enumvalue") {
                let Some(option) = child_text(value, "name") else {
                    continue;
                };
                let constant = Constant::new(option, "1").with_description(brief(value));
                self.table.add_constant(constant, header, namespace);
                self.stats.members += 1;
            }
            return;
        }

        self.table
            .add_enumeration(read_enumeration(member, name), header, namespace);
        self.stats.members += 1;
    }

    fn typed(&mut self, member: Node<'_, '_>, name: &str, header: &str) -> TypeDescriptor {
        let raw = member_type(member);
        let ty = TypeDescriptor::parse(&raw).with_description(brief(member));
        if ty.is_empty() {
            self.warnings.push(DataQualityWarning::EmptyType {
                context: format!("{header}: {name}"),
                raw,
            });
        }
        ty
    }

    /// One overload from a function or method member, or `None` when the
    /// member has to be dropped.
    fn overload(
        &mut self,
        member: Node<'_, '_>,
        name: &str,
        header: &str,
        is_method: bool,
    ) -> Option<Overload> {
        let descriptions = parameter_descriptions(member);
        let parameters = match read_parameters(member, &descriptions) {
            Ok(parameters) => parameters,
            Err(position) => {
                self.warnings.push(DataQualityWarning::UnnamedParameter {
                    function: name.to_string(),
                    position,
                    header: header.to_string(),
                });
                return None;
            }
        };

        let virt = member.attribute("virt").unwrap_or("non-virtual");
        let flags = if is_method {
            OverloadFlags {
                is_static: flag(member, "static"),
                is_const: flag(member, "const"),
                is_virtual: virt != "non-virtual",
                is_pure_virtual: virt == "pure-virtual",
                is_protected: member.attribute("prot") == Some("protected"),
                is_deprecated: is_deprecated(member),
            }
        } else {
            OverloadFlags {
                is_deprecated: is_deprecated(member),
                ..OverloadFlags::default()
            }
        };

        let return_type =
            TypeDescriptor::parse(&member_type(member)).with_description(return_description(member));
        let mut overload = Overload::new(ReturnType::new(return_type))
            .with_description(brief(member))
            .with_flags(flags);
        overload.function = name.to_string();

        for parameter in parameters {
            if let Err(SymbolError::DuplicateParameter { function, parameter }) =
                overload.add_parameter(parameter, self.extractor.options.policy)
            {
                self.warnings.push(DataQualityWarning::DuplicateParameter {
                    function,
                    parameter,
                    header: header.to_string(),
                });
                return None;
            }
        }

        for parameter in &overload.parameters {
            if parameter.ty.is_empty() {
                self.warnings.push(DataQualityWarning::EmptyType {
                    context: format!("{header}: parameter `{}` of {name}", parameter.name),
                    raw: parameter.ty.original_text.clone(),
                });
            }
        }

        Some(overload)
    }

    fn class(&mut self, def: Node<'_, '_>, full_name: &str, kind: CompoundKind, header: &str) {
        let (namespace, short_name) = split_scope(full_name);
        let mut class = match kind {
            CompoundKind::Struct => Class::new_struct(short_name),
            _ => Class::new(short_name),
        };
        class.description = brief(def);
        if class.generic_parameters.is_empty() {
            class.generic_parameters = template_parameters(def);
        }
        for parent in parents(def, full_name, &class.name) {
            class.add_parent(parent);
        }

        let mut methods: IndexMap<String, Function> = IndexMap::new();
        for member in self.fresh_members(def) {
            if member.attribute("prot") == Some("private") {
                continue;
            }
            let name = child_text(member, "name").unwrap_or_default();
            if name.is_empty() {
                continue;
            }

            match member.attribute("kind").unwrap_or_default() {
                "function" => {
                    if name.starts_with('~') {
                        continue;
                    }
                    let member_header = self.header_of(member, header);
                    if let Some(overload) = self.overload(member, &name, &member_header, true) {
                        methods
                            .entry(name.clone())
                            .or_insert_with(|| Function::new(&name))
                            .add_overload(overload);
                    }
                }
                "enum" => {
                    if !is_anonymous(&name) {
                        class.add_enumeration(read_enumeration(member, name));
                    }
                }
                "variable" => {
                    let ty = self.typed(member, &name, header);
                    let prot = member.attribute("prot").unwrap_or("public");
                    class.add_variable(ClassVariable {
                        is_static: flag(member, "static"),
                        is_mutable: flag(member, "mutable"),
                        is_protected: prot == "protected",
                        is_public: prot == "public",
                        ..ClassVariable::new(name, ty)
                    });
                }
                other => trace!(kind = other, member = %name, class = %full_name, "ignoring member"),
            }
        }

        for (_, method) in methods {
            class.add_method(method);
        }
        self.table.add_class(class, header, namespace);
        self.stats.members += 1;
    }
}

fn location<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    child(node, "location")?
        .attribute("file")
        .filter(|file| !file.is_empty())
}

/// Doxygen names anonymous enums `@0`, `@1`, ...
fn is_anonymous(name: &str) -> bool {
    name.starts_with('@')
}

fn read_enumeration(member: Node<'_, '_>, name: String) -> Enumeration {
    let options = children(member, "enumvalue").filter_map(|value| child_text(value, "name"));
    Enumeration::with_options(name, options).with_description(brief(member))
}

/// `geo::shapes::Point` -> (`geo::shapes`, `Point`); template arguments are
/// never split.
fn split_scope(full_name: &str) -> (&str, &str) {
    let end = full_name.find('<').unwrap_or(full_name.len());
    match full_name[..end].rfind("::") {
        Some(pos) => (&full_name[..pos], &full_name[pos + 2..]),
        None => (ROOT_NAMESPACE, full_name),
    }
}

fn template_parameters(def: Node<'_, '_>) -> Vec<String> {
    let Some(list) = child(def, "templateparamlist") else {
        return Vec::new();
    };
    children(list, "param")
        .filter_map(|param| {
            child_text(param, "declname")
                .filter(|name| !name.is_empty())
                .or_else(|| {
                    child_text(param, "type")
                        .and_then(|ty| ty.split_whitespace().last().map(String::from))
                })
        })
        .collect()
}

/// Parent names from the inheritance graph: find this class's node and follow
/// its child edges. Falls back to `<basecompoundref>` when there is no graph.
fn parents(def: Node<'_, '_>, full_name: &str, short_name: &str) -> Vec<String> {
    if let Some(graph) = child(def, "inheritancegraph") {
        fn label(node: &Node<'_, '_>) -> String {
            child_text(*node, "label").unwrap_or_default()
        }

        let nodes: Vec<Node<'_, '_>> = children(graph, "node").collect();
        let current = nodes.iter().find(|node| {
            let label = label(node);
            label == full_name || label == short_name
        });

        if let Some(current) = current {
            return children(*current, "childnode")
                .filter_map(|edge| edge.attribute("refid"))
                .filter_map(|refid| {
                    nodes
                        .iter()
                        .find(|node| node.attribute("id") == Some(refid))
                        .map(label)
                })
                .filter(|name| !name.is_empty())
                .collect();
        }
    }

    children(def, "basecompoundref")
        .filter(|base| base.attribute("prot") != Some("private"))
        .map(xml::text_content)
        .filter(|name| !name.is_empty())
        .collect()
}
