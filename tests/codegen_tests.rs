use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wrapgen::codegen::{
    Argument, CodeEmitter, EmitOptions, Mismatch, OverloadPlanner, PlanOptions, PrimitiveKind,
    TemplateProvider, Templates, TypeCategory, TypeIndex,
};
use wrapgen::extract::{DefinitionExtractor, DoxygenExtractor, ExtractOptions};
use wrapgen::output::{self, WriteOutcome};
use wrapgen::warnings::{DataQualityWarning, WarningLog};
use wrapgen_symbols::{
    Class, DuplicateParameterPolicy, Function, Overload, Parameter, ReturnType, SymbolTable,
    TypeDescriptor,
};

fn overload(ret: &str, params: &[(&str, &str, &str)]) -> Overload {
    let mut overload = Overload::new(ReturnType::parse(ret));
    for (name, ty, default) in params {
        overload
            .add_parameter(
                Parameter::new(*name, TypeDescriptor::parse(ty)).with_default(*default),
                DuplicateParameterPolicy::Ignore,
            )
            .unwrap();
    }
    overload
}

/// `Draw(Shape* s)` then `Draw(const char* label, int size = 12)`.
fn draw_table() -> SymbolTable {
    let mut table = SymbolTable::new();
    table.add_class(Class::new("Shape"), "draw.h", "");
    let mut draw = Function::new("Draw");
    draw.add_overload(overload("void", &[("s", "Shape*", "")]));
    draw.add_overload(overload(
        "bool",
        &[("label", "const char*", ""), ("size", "int", "12")],
    ));
    table.add_function(draw, "draw.h", "");
    table
}

fn string() -> Argument {
    Argument::Value(TypeCategory::Primitive(PrimitiveKind::String))
}

fn integer() -> Argument {
    Argument::Value(TypeCategory::Primitive(PrimitiveKind::Integer))
}

#[test]
fn blocks_cover_every_argument_count() {
    let mut table = SymbolTable::new();
    let mut f = Function::new("F");
    f.add_overload(overload(
        "void",
        &[
            ("a", "int", ""),
            ("b", "int", ""),
            ("c", "int", ""),
            ("d", "int", "1"),
            ("e", "int", "2"),
        ],
    ));
    table.add_function(f, "f.h", "");

    let index = TypeIndex::build(&table);
    let function = table.functions().next().unwrap();
    let plan = OverloadPlanner::new(&index, PlanOptions::default())
        .plan(function, &mut WarningLog::new());

    let counts: Vec<usize> = plan.overloads[0]
        .blocks
        .iter()
        .map(|block| block.argument_count)
        .collect();
    assert_eq!(counts, vec![3, 4, 5]);
}

#[test]
fn mismatches_fall_through_to_later_overloads() {
    let table = draw_table();
    let index = TypeIndex::build(&table);
    let function = table.functions().next().unwrap();
    let plan = OverloadPlanner::new(&index, PlanOptions::default())
        .plan(function, &mut WarningLog::new());

    let hit = plan.dispatch(&[Argument::Value(TypeCategory::Object)]).unwrap();
    assert_eq!((hit.overload, hit.block), (0, 0));

    let hit = plan.dispatch(&[string()]).unwrap();
    assert_eq!((hit.overload, hit.block), (1, 0));
    assert_eq!(hit.tried, vec![0, 1]);

    let hit = plan.dispatch(&[string(), integer()]).unwrap();
    assert_eq!((hit.overload, hit.block), (1, 1));

    let hit = plan.dispatch(&[Argument::Null]).unwrap();
    assert_eq!(hit.overload, 0);
}

#[test]
fn only_the_last_overload_raises() {
    let table = draw_table();
    let index = TypeIndex::build(&table);
    let function = table.functions().next().unwrap();
    let plan = OverloadPlanner::new(
        &index,
        PlanOptions {
            nullable_object_pointers: false,
        },
    )
    .plan(function, &mut WarningLog::new());

    let err = plan.dispatch(&[Argument::Null]).unwrap_err();
    assert_eq!(err.tried, vec![0, 1]);
    assert_eq!(err.mismatch, Mismatch::NullHandle { position: 0 });

    let err = plan.dispatch(&[integer(), integer(), integer()]).unwrap_err();
    assert_eq!(
        err.mismatch,
        Mismatch::ArgumentCount {
            given: 3,
            required: 1,
            total: 2
        }
    );
    assert!(err.to_string().contains("`Draw`"));
}

#[test]
fn unknown_types_warn_with_suggestion() {
    let mut table = draw_table();
    let mut f = Function::new("Fill");
    f.add_overload(overload("void", &[("s", "Shpe&", "")]));
    table.add_function(f, "draw.h", "");

    let index = TypeIndex::build(&table);
    let mut warnings = WarningLog::new();
    let fill = table.functions().find(|f| f.name == "Fill").unwrap();
    let plan = OverloadPlanner::new(&index, PlanOptions::default()).plan(fill, &mut warnings);

    assert_eq!(
        plan.overloads[0].parameters[0].category,
        TypeCategory::Primitive(PrimitiveKind::Unknown)
    );
    assert_eq!(
        warnings.into_vec(),
        vec![DataQualityWarning::UnknownType {
            context: "draw.h: Fill".to_string(),
            type_name: "Shpe".to_string(),
            suggestion: Some("Shape".to_string()),
        }]
    );
}

fn write_templates(dir: &Path) -> Result<()> {
    let fragments = [
        ("module_begin", "// {{name}} {{version}}\n"),
        ("module_header", "#include \"{{output}}\"\n"),
        ("file_begin", "// {{header}}\n"),
        ("constant", "const {{constant}} = {{value}};\n"),
        ("class_begin", "class {{class}} : {{parents}} {\n"),
        ("class_end", "}\n"),
        ("method_begin", "  method {{function}} x{{overload_count}}\n"),
        ("function_begin", "fn {{function}}\n"),
        ("overload_begin", "  overload {{overload_index}} ({{required}}..{{total}})\n"),
        ("block_begin", "    call({{call_arguments}})\n"),
        ("overload_next", "    else goto {{next_overload}}\n"),
        ("overload_error", "    else raise\n"),
        ("return_constructor", "    -> new\n"),
    ];
    for (name, text) in fragments {
        fs::write(dir.join(format!("{name}.tpl")), text)?;
    }
    fs::write(dir.join("README.md"), "not a fragment")?;
    Ok(())
}

#[test]
fn extracted_headers_render_end_to_end() -> Result<()> {
    let xml = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/doxygen");
    let templates_dir = tempfile::tempdir()?;
    let output_dir = tempfile::tempdir()?;
    write_templates(templates_dir.path())?;

    let mut table = SymbolTable::new();
    let mut warnings = WarningLog::new();
    DoxygenExtractor::new(ExtractOptions {
        headers_root: "/sdk/include".to_string(),
        ..ExtractOptions::default()
    })
    .extract(&xml, &mut table, &mut warnings)?;

    let templates = Templates::load_dir(templates_dir.path())?;
    assert!(templates.has_fragment("block_begin"));
    assert!(!templates.has_fragment("README"));

    let emitter = CodeEmitter::new(&table, &templates, EmitOptions::default());
    let files = emitter.emit(&mut warnings);
    let paths: Vec<&Path> = files.iter().map(|f| f.path.as_path()).collect();
    assert_eq!(
        paths,
        vec![
            Path::new("geo.h.cpp"),
            Path::new("math.h.cpp"),
            Path::new("extension.cpp")
        ]
    );

    let math = &files[1].contents;
    assert!(math.starts_with("// math.h\nconst MATH_VERSION = 3;\n"));
    assert!(math.contains(
        "fn Add\n  overload 0 (1..2)\n    call(a)\n    call(a, b)\n    else goto 1\n  overload 1 (2..2)\n    call(a, b)\n    else raise\n"
    ));

    let geo = &files[0].contents;
    assert!(geo.contains("class Shape : geo::Drawable {\n  method Shape x1\n"));
    assert!(geo.contains("    call(name)\n    -> new\n"));

    let module = &files[2].contents;
    assert_eq!(
        module,
        "// extension 0.1.0\n#include \"geo.h.cpp\"\n#include \"math.h.cpp\"\n"
    );

    let report = output::write_all(output_dir.path(), &files)?;
    assert_eq!(report.written.len(), 3);
    let again = output::write_all(output_dir.path(), &files)?;
    assert_eq!(again.unchanged.len(), 3);
    assert!(again.written.is_empty());
    Ok(())
}

#[test]
fn regenerated_output_is_stable() -> Result<()> {
    let table = draw_table();
    let mut templates = Templates::new();
    templates.insert("function_begin", "{{function}}/{{overload_count}}\n");
    templates.insert("parameter_object", "obj {{parameter}} nullable={{parameter_nullable}}\n");
    templates.insert("parameter_primitive", "prim {{parameter}}={{parameter_default}}\n");

    let output_dir = tempfile::tempdir()?;
    let first = CodeEmitter::new(&table, &templates, EmitOptions::default())
        .emit(&mut WarningLog::new());
    output::write_all(output_dir.path(), &first)?;

    let second = CodeEmitter::new(&table, &templates, EmitOptions::default())
        .emit(&mut WarningLog::new());
    let draw = second
        .iter()
        .find(|f| f.path == PathBuf::from("draw.h.cpp"))
        .context("draw.h.cpp not generated")?;
    assert_eq!(
        draw.contents,
        "Draw/2\nobj s nullable=true\nprim label=\nprim label=\nprim size=12\n"
    );
    assert_eq!(
        output::write_if_changed(output_dir.path(), draw)?,
        WriteOutcome::Unchanged
    );
    Ok(())
}
