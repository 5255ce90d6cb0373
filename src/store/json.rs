//! Data format: one JSON document per element kind.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use wrapgen_symbols::{
    Class, DuplicateParameterPolicy, Function, GlobalVariable, Header, Namespace, SymbolTable,
    TypeAlias,
};

use super::records::{
    ClassNested, ClassRecord, ClassVariableRecord, ConstantRecord, EnumerationRecord, Nested,
    OverloadRecord, TypedRecord,
};
use super::{CacheFormat, DefinitionStore, ensure_cache_dir};
use crate::error::StructuralError;

pub const INCLUDES_FILE: &str = "includes.json";
pub const CONSTANTS_FILE: &str = "constants.json";
pub const ENUMERATIONS_FILE: &str = "enumerations.json";
pub const TYPE_DEFINITIONS_FILE: &str = "type_definitions.json";
pub const VARIABLES_FILE: &str = "variables.json";
pub const FUNCTIONS_FILE: &str = "functions.json";
pub const CLASSES_FILE: &str = "classes.json";
pub const CLASS_ENUMERATIONS_FILE: &str = "class_enumerations.json";
pub const CLASS_VARIABLES_FILE: &str = "class_variables.json";

/// Reads and writes the `*.json` cache files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStore {
    policy: DuplicateParameterPolicy,
}

impl JsonStore {
    pub fn new(policy: DuplicateParameterPolicy) -> Self {
        Self { policy }
    }
}

#[derive(Default)]
struct Documents {
    includes: IndexMap<String, bool>,
    constants: Nested<ConstantRecord>,
    enumerations: Nested<EnumerationRecord>,
    type_definitions: Nested<TypedRecord>,
    variables: Nested<TypedRecord>,
    functions: Nested<Vec<OverloadRecord>>,
    classes: Nested<ClassRecord>,
    class_enumerations: ClassNested<EnumerationRecord>,
    class_variables: ClassNested<ClassVariableRecord>,
}

fn slot<'a, T>(
    map: &'a mut Nested<T>,
    header: &Header,
    ns: &Namespace,
) -> &'a mut IndexMap<String, T> {
    map.entry(header.name.clone())
        .or_default()
        .entry(ns.name.clone())
        .or_default()
}

impl Documents {
    fn collect(table: &SymbolTable) -> Self {
        let mut docs = Self::default();

        for header in table.headers() {
            docs.includes.insert(header.name.clone(), header.enabled);

            for ns in header.namespaces.values() {
                if ns.has_constants() {
                    slot(&mut docs.constants, header, ns).extend(
                        ns.constants
                            .iter()
                            .map(|(name, constant)| (name.clone(), ConstantRecord::from(constant))),
                    );
                }
                if ns.has_enumerations() {
                    slot(&mut docs.enumerations, header, ns).extend(
                        ns.enumerations
                            .iter()
                            .map(|(name, enumeration)| (name.clone(), EnumerationRecord::from(enumeration))),
                    );
                }
                if ns.has_type_aliases() {
                    slot(&mut docs.type_definitions, header, ns).extend(
                        ns.type_aliases
                            .iter()
                            .map(|(name, alias)| (name.clone(), TypedRecord::from(&alias.ty))),
                    );
                }
                if ns.has_variables() {
                    slot(&mut docs.variables, header, ns).extend(
                        ns.variables
                            .iter()
                            .map(|(name, variable)| (name.clone(), TypedRecord::from(&variable.ty))),
                    );
                }
                if ns.has_functions() {
                    slot(&mut docs.functions, header, ns).extend(ns.functions.iter().map(
                        |(name, function)| {
                            let overloads: Vec<OverloadRecord> =
                                function.overloads.iter().map(OverloadRecord::from).collect();
                            (name.clone(), overloads)
                        },
                    ));
                }
                if ns.has_classes() {
                    slot(&mut docs.classes, header, ns).extend(
                        ns.classes
                            .iter()
                            .map(|(name, class)| (name.clone(), ClassRecord::from(class))),
                    );
                }
                if ns.has_class_enumerations() {
                    let classes = slot(&mut docs.class_enumerations, header, ns);
                    for (name, class) in &ns.classes {
                        if class.enumerations.is_empty() {
                            continue;
                        }
                        classes.insert(
                            name.clone(),
                            class
                                .enumerations
                                .iter()
                                .map(|(enum_name, e)| (enum_name.clone(), EnumerationRecord::from(e)))
                                .collect(),
                        );
                    }
                }
                if ns.has_class_variables() {
                    let classes = slot(&mut docs.class_variables, header, ns);
                    for (name, class) in &ns.classes {
                        if class.variables.is_empty() {
                            continue;
                        }
                        classes.insert(
                            name.clone(),
                            class
                                .variables
                                .iter()
                                .map(|(var_name, v)| (var_name.clone(), ClassVariableRecord::from(v)))
                                .collect(),
                        );
                    }
                }
            }
        }

        docs
    }
}

impl DefinitionStore for JsonStore {
    fn format(&self) -> CacheFormat {
        CacheFormat::Data
    }

    fn save(&self, table: &SymbolTable, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create cache directory {}", dir.display()))?;

        let docs = Documents::collect(table);
        write_document(&dir.join(INCLUDES_FILE), &docs.includes)?;
        write_document(&dir.join(CONSTANTS_FILE), &docs.constants)?;
        write_document(&dir.join(ENUMERATIONS_FILE), &docs.enumerations)?;
        write_document(&dir.join(TYPE_DEFINITIONS_FILE), &docs.type_definitions)?;
        write_document(&dir.join(VARIABLES_FILE), &docs.variables)?;
        write_document(&dir.join(FUNCTIONS_FILE), &docs.functions)?;
        write_document(&dir.join(CLASSES_FILE), &docs.classes)?;
        write_document(&dir.join(CLASS_ENUMERATIONS_FILE), &docs.class_enumerations)?;
        write_document(&dir.join(CLASS_VARIABLES_FILE), &docs.class_variables)?;

        debug!(cache = %dir.display(), headers = table.header_count(), "wrote data cache");
        Ok(())
    }

    fn load(&self, dir: &Path) -> Result<SymbolTable> {
        ensure_cache_dir(dir)?;
        let mut table = SymbolTable::new();

        if let Some(includes) = read_document::<IndexMap<String, bool>>(&dir.join(INCLUDES_FILE))? {
            for (header, enabled) in includes {
                table.set_header_enabled(&header, enabled);
            }
        }

        for_each_nested(
            read_document::<Nested<ConstantRecord>>(&dir.join(CONSTANTS_FILE))?,
            |header, ns, name, record| {
                table.add_constant(record.into_constant(&name), header, ns);
                Ok(())
            },
        )?;

        for_each_nested(
            read_document::<Nested<EnumerationRecord>>(&dir.join(ENUMERATIONS_FILE))?,
            |header, ns, name, record| {
                table.add_enumeration(record.into_enumeration(&name), header, ns);
                Ok(())
            },
        )?;

        for_each_nested(
            read_document::<Nested<TypedRecord>>(&dir.join(TYPE_DEFINITIONS_FILE))?,
            |header, ns, name, record| {
                table.add_type_alias(TypeAlias::new(name, record.into_descriptor()), header, ns);
                Ok(())
            },
        )?;

        for_each_nested(
            read_document::<Nested<TypedRecord>>(&dir.join(VARIABLES_FILE))?,
            |header, ns, name, record| {
                table.add_global_variable(
                    GlobalVariable::new(name, record.into_descriptor()),
                    header,
                    ns,
                );
                Ok(())
            },
        )?;

        let functions_path = dir.join(FUNCTIONS_FILE);
        for_each_nested(
            read_document::<Nested<Vec<OverloadRecord>>>(&functions_path)?,
            |header, ns, name, records| {
                let function = function_from_records(&name, records, self.policy)
                    .with_context(|| format!("in {}", functions_path.display()))?;
                table.add_function(function, header, ns);
                Ok(())
            },
        )?;

        let classes_path = dir.join(CLASSES_FILE);
        for_each_nested(
            read_document::<Nested<ClassRecord>>(&classes_path)?,
            |header, ns, name, record| {
                let class = class_from_record(&name, record, self.policy)
                    .with_context(|| format!("in {}", classes_path.display()))?;
                table.add_class(class, header, ns);
                Ok(())
            },
        )?;

        for_each_nested(
            read_document::<ClassNested<EnumerationRecord>>(&dir.join(CLASS_ENUMERATIONS_FILE))?,
            |header, ns, class_name, members| {
                let class = class_entry(&mut table, header, ns, &class_name)?;
                for (name, record) in members {
                    class.add_enumeration(record.into_enumeration(&name));
                }
                Ok(())
            },
        )?;

        for_each_nested(
            read_document::<ClassNested<ClassVariableRecord>>(&dir.join(CLASS_VARIABLES_FILE))?,
            |header, ns, class_name, members| {
                let class = class_entry(&mut table, header, ns, &class_name)?;
                for (name, record) in members {
                    class.add_variable(record.into_variable(&name));
                }
                Ok(())
            },
        )?;

        debug!(cache = %dir.display(), headers = table.header_count(), "loaded data cache");
        Ok(table)
    }
}

pub(crate) fn function_from_records(
    name: &str,
    records: Vec<OverloadRecord>,
    policy: DuplicateParameterPolicy,
) -> Result<Function> {
    let mut function = Function::new(name);
    for record in records {
        function.add_overload(record.into_overload(name, policy)?);
    }
    Ok(function)
}

pub(crate) fn class_from_record(
    name: &str,
    record: ClassRecord,
    policy: DuplicateParameterPolicy,
) -> Result<Class> {
    let mut class = Class::new(name);
    class.description = record.description;
    class.is_struct = record.is_struct;
    class.is_forward_declaration = record.is_forward_declaration;
    if !record.generics.is_empty() {
        class.generic_parameters = record.generics;
    }
    for parent in record.parents {
        class.add_parent(parent);
    }
    for (method_name, overloads) in record.methods {
        class.add_method(function_from_records(&method_name, overloads, policy)?);
    }
    Ok(class)
}

/// The named class, created empty when only its satellite entries exist.
pub(crate) fn class_entry<'a>(
    table: &'a mut SymbolTable,
    header: &str,
    ns: &str,
    name: &str,
) -> Result<&'a mut Class> {
    if table.class_mut(header, ns, name).is_none() {
        table.add_class(Class::new(name), header, ns);
    }
    table
        .class_mut(header, ns, name)
        .ok_or_else(|| anyhow!("class `{name}` could not be attached under {header}"))
}

fn for_each_nested<T>(
    document: Option<Nested<T>>,
    mut visit: impl FnMut(&str, &str, String, T) -> Result<()>,
) -> Result<()> {
    for (header, namespaces) in document.unwrap_or_default() {
        for (ns, items) in namespaces {
            for (name, item) in items {
                visit(&header, &ns, name, item)?;
            }
        }
    }
    Ok(())
}

fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(document)
        .with_context(|| format!("failed to serialise {}", path.display()))?;
    json.push('\n');
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// `Ok(None)` when the file is absent; an unreadable or malformed file is a
/// structural error.
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        debug!(file = %path.display(), "cache file absent, skipping");
        return Ok(None);
    }
    let raw = crate::error::read_file(path)?;
    let document =
        serde_json::from_str(&raw).map_err(|err| StructuralError::malformed(path, err))?;
    Ok(Some(document))
}
