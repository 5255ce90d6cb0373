use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wrapgen::error::StructuralError;
use wrapgen::extract::{DefinitionExtractor, DoxygenExtractor, ExtractOptions};
use wrapgen::warnings::{DataQualityWarning, WarningLog};
use wrapgen_symbols::{DuplicateParameterPolicy, Namespace, ROOT_NAMESPACE, SymbolTable};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/doxygen")
}

fn extractor() -> DoxygenExtractor {
    DoxygenExtractor::new(ExtractOptions {
        headers_root: "/sdk/include".to_string(),
        ..ExtractOptions::default()
    })
}

fn extract_fixtures() -> Result<(SymbolTable, WarningLog)> {
    let mut table = SymbolTable::new();
    let mut warnings = WarningLog::new();
    let stats = extractor().extract(&fixtures(), &mut table, &mut warnings)?;
    assert_eq!(stats.compounds, 4);
    Ok((table, warnings))
}

fn namespace<'a>(table: &'a SymbolTable, header: &str, ns: &str) -> Result<&'a Namespace> {
    table
        .header(header)
        .and_then(|h| h.namespace(ns))
        .with_context(|| format!("no namespace {ns} in {header}"))
}

#[test]
fn headers_follow_locations() -> Result<()> {
    let (table, _) = extract_fixtures()?;
    let names: Vec<&str> = table.headers().map(|h| h.name.as_str()).collect();
    assert_eq!(names, vec!["geo.h", "math.h"]);
    Ok(())
}

#[test]
fn free_functions_group_overloads() -> Result<()> {
    let (table, _) = extract_fixtures()?;
    let root = namespace(&table, "math.h", ROOT_NAMESPACE)?;

    let add = &root.functions["Add"];
    assert_eq!(add.overloads.len(), 2);
    let first = &add.overloads[0];
    assert_eq!(first.required_count(), 1);
    assert_eq!(first.total_count(), 2);
    assert_eq!(first.parameters[0].description(), "first addend");
    assert_eq!(first.parameters[1].default_value, "0");
    assert_eq!(first.return_type.ty.description, "the sum");
    assert_eq!(add.description, "Adds two integers.");
    assert_eq!(add.overloads[1].return_type.ty.base_type, "double");

    assert!(root.functions["Reset"].overloads[0].parameters.is_empty());
    assert!(root.functions["OldAdd"].overloads[0].flags.is_deprecated);
    assert!(!root.functions.contains_key("Broken"));
    Ok(())
}

#[test]
fn macros_and_anonymous_enums_become_constants() -> Result<()> {
    let (table, warnings) = extract_fixtures()?;
    let root = namespace(&table, "math.h", ROOT_NAMESPACE)?;

    let names: Vec<&str> = root.constants.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["MATH_VERSION", "FLAG_READ", "FLAG_WRITE"]);
    assert_eq!(root.constants["MATH_VERSION"].value, "3");
    assert_eq!(root.constants["MATH_VERSION"].description, "Library version.");
    assert_eq!(root.constants["FLAG_WRITE"].value, "1");
    assert!(root.type_aliases["counter_t"].ty.is_unsigned);

    let warnings = warnings.into_vec();
    assert!(warnings.contains(&DataQualityWarning::MacroWithoutValue {
        name: "MATH_EXPORT".to_string(),
        header: "math.h".to_string(),
    }));
    assert!(warnings.contains(&DataQualityWarning::ReservedName {
        name: "__MATH_INTERNAL".to_string(),
        header: "math.h".to_string(),
    }));
    assert!(warnings.contains(&DataQualityWarning::UnnamedParameter {
        function: "Broken".to_string(),
        position: 2,
        header: "math.h".to_string(),
    }));
    assert_eq!(warnings.len(), 3);
    Ok(())
}

#[test]
fn namespace_members_land_in_their_namespace() -> Result<()> {
    let (table, _) = extract_fixtures()?;
    let geo = namespace(&table, "geo.h", "geo")?;

    let axis = &geo.enumerations["Axis"];
    assert_eq!(axis.options.iter().collect::<Vec<_>>(), vec!["AXIS_X", "AXIS_Y"]);
    assert_eq!(axis.description, "Coordinate axis.");

    let distance = &geo.functions["Distance"].overloads[0];
    let a = &distance.parameters[0].ty;
    assert_eq!(a.base_type, "Point");
    assert!(a.is_const && a.is_reference);
    Ok(())
}

#[test]
fn classes_keep_public_and_protected_members() -> Result<()> {
    let (table, _) = extract_fixtures()?;
    let geo = namespace(&table, "geo.h", "geo")?;

    let shape = &geo.classes["Shape"];
    assert_eq!(shape.description, "Base of all shapes.");
    assert!(shape.parents.contains("geo::Drawable"));
    let methods: Vec<&str> = shape.methods.keys().map(String::as_str).collect();
    assert_eq!(methods, vec!["Shape", "Area", "Count"]);

    let ctor = &shape.methods["Shape"];
    assert!(ctor.is_constructor());
    assert_eq!(ctor.overloads[0].parameters[0].default_value, "\"shape\"");
    assert_eq!(ctor.overloads[0].parameters[0].ty.original_text, "const char*");

    let area = &shape.methods["Area"].overloads[0];
    assert_eq!(area.return_type.ty.base_type, "double");
    assert!(area.flags.is_const && area.flags.is_virtual && area.flags.is_pure_virtual);
    assert!(shape.methods["Count"].overloads[0].flags.is_static);

    let id = &shape.variables["id_"];
    assert!(id.is_protected && !id.is_public);

    let point = &geo.classes["Point"];
    assert!(point.is_struct);
    assert!(point.methods.is_empty());
    assert!(point.parents.is_empty());
    let fields: Vec<&str> = point.variables.keys().map(String::as_str).collect();
    assert_eq!(fields, vec!["x", "y"]);
    Ok(())
}

#[test]
fn duplicate_parameters_drop_the_member_when_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("index.xml"),
        r#"<doxygenindex><compound refid="dup_8h" kind="file"><name>dup.h</name></compound></doxygenindex>"#,
    )?;
    fs::write(
        dir.path().join("dup_8h.xml"),
        r#"<doxygen><compounddef id="dup_8h" kind="file">
            <compoundname>dup.h</compoundname>
            <sectiondef kind="func">
                <memberdef kind="function" id="dup_8h_1a1">
                    <type>int</type><name>Clamp</name>
                    <param><type>int</type><declname>v</declname></param>
                    <param><type>int</type><declname>v</declname></param>
                </memberdef>
            </sectiondef>
            <location file="dup.h"/>
        </compounddef></doxygen>"#,
    )?;

    let lenient = DoxygenExtractor::default();
    let mut table = SymbolTable::new();
    lenient.extract(dir.path(), &mut table, &mut WarningLog::new())?;
    let clamp = table.functions().next().context("Clamp missing")?;
    assert_eq!(clamp.overloads[0].parameters.len(), 1);

    let strict = DoxygenExtractor::new(ExtractOptions {
        policy: DuplicateParameterPolicy::Reject,
        ..ExtractOptions::default()
    });
    let mut table = SymbolTable::new();
    let mut warnings = WarningLog::new();
    strict.extract(dir.path(), &mut table, &mut warnings)?;
    assert_eq!(table.functions().count(), 0);
    assert!(matches!(
        warnings.iter().next(),
        Some(DataQualityWarning::DuplicateParameter { parameter, .. }) if parameter == "v"
    ));
    Ok(())
}

#[test]
fn missing_inputs_are_structural_errors() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut table = SymbolTable::new();

    let err = extractor()
        .extract(&dir.path().join("absent"), &mut table, &mut WarningLog::new())
        .unwrap_err();
    assert!(matches!(err, StructuralError::MissingDirectory(_)));

    let err = extractor()
        .extract(dir.path(), &mut table, &mut WarningLog::new())
        .unwrap_err();
    assert!(matches!(err, StructuralError::MissingIndex(_)));

    fs::write(dir.path().join("index.xml"), "<notindex/>")?;
    let err = extractor()
        .extract(dir.path(), &mut table, &mut WarningLog::new())
        .unwrap_err();
    assert!(matches!(err, StructuralError::Malformed { .. }));
    Ok(())
}
