use std::fs;

use anyhow::Result;
use wrapgen::error::StructuralError;
use wrapgen::store::json::{CLASSES_FILE, FUNCTIONS_FILE, INCLUDES_FILE};
use wrapgen::store::script::SCRIPT_FILE;
use wrapgen::store::{CacheFormat, DefinitionStore, JsonStore, ScriptStore, store_for};
use wrapgen_symbols::{
    Class, ClassVariable, Constant, DuplicateParameterPolicy, Enumeration, Function,
    GlobalVariable, Overload, OverloadFlags, Parameter, ReturnType, TypeAlias, TypeDescriptor,
};
use wrapgen_symbols::{SymbolTable, ROOT_NAMESPACE};

fn param(name: &str, ty: &str, default: &str) -> Parameter {
    Parameter::new(name, TypeDescriptor::parse(ty)).with_default(default)
}

fn overload(ret: &str, params: &[Parameter]) -> Overload {
    let mut overload = Overload::new(ReturnType::parse(ret));
    for p in params {
        overload
            .add_parameter(p.clone(), DuplicateParameterPolicy::Ignore)
            .unwrap();
    }
    overload
}

fn sample_table() -> SymbolTable {
    let mut table = SymbolTable::new();

    table.add_constant(
        Constant::new("GEO_VERSION", "3").with_description("Library version."),
        "geo.h",
        ROOT_NAMESPACE,
    );
    table.add_enumeration(
        Enumeration::with_options("Axis", ["X", "Y", "Z"]),
        "geo.h",
        "geo",
    );
    table.add_type_alias(
        TypeAlias::new("Real", TypeDescriptor::parse("double").with_description("Scalar.")),
        "geo.h",
        "geo",
    );
    table.add_global_variable(
        GlobalVariable::new("origin_count", TypeDescriptor::parse("unsigned int")),
        "geo.h",
        "geo",
    );

    let mut add = Function::new("Add");
    add.add_overload(
        overload("int", &[param("a", "int", ""), param("b", "int", "0")])
            .with_description("Adds integers."),
    );
    add.add_overload(overload(
        "double",
        &[param("a", "double", ""), param("b", "double", "")],
    ));
    table.add_function(add, "math.h", "");

    let mut shape = Class::new("Shape<T>").with_description("A shape.");
    shape.add_parent("Drawable");
    let mut ctor = Function::new("Shape");
    ctor.add_overload(overload("", &[param("name", "const char*", "\"shape\"")]));
    shape.add_method(ctor);
    let mut area = Function::new("Area");
    area.add_overload(overload("double", &[]).with_flags(OverloadFlags {
        is_const: true,
        is_virtual: true,
        is_pure_virtual: true,
        ..OverloadFlags::default()
    }));
    shape.add_method(area);
    shape.add_variable(ClassVariable {
        is_protected: true,
        is_public: false,
        ..ClassVariable::new("id_", TypeDescriptor::parse("int"))
    });
    shape.add_enumeration(Enumeration::with_options("Kind", ["Open", "Closed"]));
    table.add_class(shape, "geo.h", "geo");

    table.add_class(Class::new_struct("Point"), "geo.h", "geo");
    table.add_constant(Constant::new("LEGACY", "1"), "legacy.h", "");
    table.set_header_enabled("legacy.h", false);
    table
}

#[test]
fn data_format_roundtrip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let table = sample_table();
    let store = JsonStore::new(DuplicateParameterPolicy::Ignore);

    store.save(&table, dir.path())?;
    let loaded = store.load(dir.path())?;
    assert_eq!(loaded, table);
    Ok(())
}

#[test]
fn source_format_roundtrip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let table = sample_table();
    let store = ScriptStore::default();

    store.save(&table, dir.path())?;
    assert!(dir.path().join(SCRIPT_FILE).is_file());
    let loaded = store.load(dir.path())?;
    assert_eq!(loaded, table);
    Ok(())
}

#[test]
fn formats_convert_into_each_other() -> Result<()> {
    let data_dir = tempfile::tempdir()?;
    let source_dir = tempfile::tempdir()?;
    let back_dir = tempfile::tempdir()?;
    let policy = DuplicateParameterPolicy::Ignore;

    let table = sample_table();
    store_for(CacheFormat::Data, policy).save(&table, data_dir.path())?;

    let from_data = store_for(CacheFormat::Data, policy).load(data_dir.path())?;
    store_for(CacheFormat::Source, policy).save(&from_data, source_dir.path())?;

    let from_source = store_for(CacheFormat::Source, policy).load(source_dir.path())?;
    store_for(CacheFormat::Data, policy).save(&from_source, back_dir.path())?;
    let back = store_for(CacheFormat::Data, policy).load(back_dir.path())?;

    assert_eq!(from_source, table);
    assert_eq!(back, table);
    Ok(())
}

#[test]
fn empty_optional_fields_are_omitted() -> Result<()> {
    let dir = tempfile::tempdir()?;
    JsonStore::default().save(&sample_table(), dir.path())?;

    let functions: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(FUNCTIONS_FILE))?)?;
    let second = &functions["math.h"][ROOT_NAMESPACE]["Add"][1];
    assert_eq!(second["return_type"], "double");
    let b = &second["parameters"][1];
    assert_eq!(b["name"], "b");
    assert!(b.get("value").is_none());
    assert!(b.get("description").is_none());
    assert!(second.get("static").is_none());

    let first_b = &functions["math.h"][ROOT_NAMESPACE]["Add"][0]["parameters"][1];
    assert_eq!(first_b["value"], "0");

    let classes: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(CLASSES_FILE))?)?;
    let point = &classes["geo.h"]["geo"]["Point"];
    assert_eq!(point["@struct"], true);
    assert!(point.get("@description").is_none());
    assert!(point.get("@parents").is_none());
    let shape = &classes["geo.h"]["geo"]["Shape"];
    assert_eq!(shape["@generics"][0], "T");
    assert_eq!(shape["Area"][0]["pure_virtual"], true);
    Ok(())
}

#[test]
fn includes_control_header_state() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join(INCLUDES_FILE),
        r#"{ "legacy.h": false, "core.h": true }"#,
    )?;

    let table = JsonStore::default().load(dir.path())?;
    let enabled: Vec<&str> = table.enabled_headers().map(|h| h.name.as_str()).collect();
    assert_eq!(enabled, vec!["core.h"]);
    assert_eq!(table.header("legacy.h").map(|h| h.enabled), Some(false));
    Ok(())
}

#[test]
fn absent_files_contribute_nothing() -> Result<()> {
    let dir = tempfile::tempdir()?;
    assert!(JsonStore::default().load(dir.path())?.is_empty());
    assert!(ScriptStore::default().load(dir.path())?.is_empty());
    Ok(())
}

#[test]
fn missing_cache_directory_is_structural() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    for format in [CacheFormat::Data, CacheFormat::Source] {
        let err = store_for(format, DuplicateParameterPolicy::Ignore)
            .load(&missing)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StructuralError>(),
            Some(StructuralError::MissingDirectory(path)) if path == &missing
        ));
    }
}

#[test]
fn malformed_json_names_the_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join(FUNCTIONS_FILE), "{ not json")?;

    let err = JsonStore::default().load(dir.path()).unwrap_err();
    match err.downcast_ref::<StructuralError>() {
        Some(StructuralError::Malformed { path, .. }) => {
            assert_eq!(path, &dir.path().join(FUNCTIONS_FILE));
        }
        other => panic!("expected malformed error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn duplicate_parameters_follow_policy() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join(FUNCTIONS_FILE),
        r#"{ "m.h": { "\\": { "Clamp": [ {
            "return_type": "int",
            "parameters": [
                { "name": "v", "type": "int" },
                { "name": "v", "type": "long" }
            ]
        } ] } } }"#,
    )?;

    let table = JsonStore::new(DuplicateParameterPolicy::Ignore).load(dir.path())?;
    let clamp = table.functions().next().unwrap();
    assert_eq!(clamp.overloads[0].parameters.len(), 1);
    assert_eq!(clamp.overloads[0].parameters[0].ty.base_type, "int");

    let err = JsonStore::new(DuplicateParameterPolicy::Reject)
        .load(dir.path())
        .unwrap_err();
    assert!(format!("{err:#}").contains("`v`"));
    Ok(())
}
