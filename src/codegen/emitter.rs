//! Walks a table and renders wrapper sources through a [`TemplateProvider`].
//!
//! One file is produced per enabled header, plus a module file that lists
//! them. Fragments are requested in a fixed order:
//!
//! ```text
//! file_begin
//!   namespace_begin
//!     constant, enumeration_begin / enumeration_option / enumeration_end,
//!     type_alias, variable
//!     function_begin
//!       overload_begin
//!         block_begin, parameter_<category>..., call, return_<category>, block_end
//!       overload_next | overload_error
//!       overload_end
//!     function_end
//!     class_begin
//!       class_variable, class_enumeration_*, method_begin ... method_end
//!     class_end
//!   namespace_end
//! file_end
//! module_begin, module_header..., module_end
//! ```

use std::path::PathBuf;

use tracing::debug;
use wrapgen_symbols::{Class, Enumeration, Function, Header, Namespace, SymbolTable};

use super::category::{TypeCategory, TypeIndex};
use super::planner::{FunctionPlan, OnMismatch, OverloadPlan, OverloadPlanner, PlanOptions};
use super::templates::{TemplateContext, TemplateProvider};
use crate::config::ProjectConfig;
use crate::warnings::WarningLog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Extension (module) name exposed to templates.
    pub name: String,
    pub version: String,
    pub output_extension: String,
    pub plan: PlanOptions,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self::from(&ProjectConfig::default())
    }
}

impl From<&ProjectConfig> for EmitOptions {
    fn from(config: &ProjectConfig) -> Self {
        Self {
            name: config.name.clone(),
            version: config.version.clone(),
            output_extension: config.output_extension.clone(),
            plan: PlanOptions {
                nullable_object_pointers: config.nullable_object_pointers,
            },
        }
    }
}

/// Rendered text and its path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

pub struct CodeEmitter<'a> {
    table: &'a SymbolTable,
    templates: &'a dyn TemplateProvider,
    index: TypeIndex,
    options: EmitOptions,
}

impl<'a> CodeEmitter<'a> {
    pub fn new(
        table: &'a SymbolTable,
        templates: &'a dyn TemplateProvider,
        options: EmitOptions,
    ) -> Self {
        Self {
            table,
            templates,
            index: TypeIndex::build(table),
            options,
        }
    }

    /// Render every enabled header. Output depends only on the table and
    /// the templates.
    pub fn emit(&self, warnings: &mut WarningLog) -> Vec<GeneratedFile> {
        let mut files = Vec::new();
        let mut module = String::new();
        let base = self.base_context();

        module.push_str(&self.templates.render("module_begin", &base));
        for header in self.table.enabled_headers() {
            let path = self.output_path(&header.name);
            let contents = self.emit_header(header, warnings);
            debug!(header = %header.name, output = %path.display(), "rendered header");

            let context = self.header_context(header).with("output", path.display());
            module.push_str(&self.templates.render("module_header", &context));
            files.push(GeneratedFile { path, contents });
        }
        module.push_str(&self.templates.render("module_end", &base));

        files.push(GeneratedFile {
            path: PathBuf::from(format!(
                "{}.{}",
                self.options.name, self.options.output_extension
            )),
            contents: module,
        });
        files
    }

    /// `wx/button.h` -> `wx/button.h.<ext>`. The header's own extension is
    /// kept so `a.h` and `a.hpp` do not share an output file.
    pub fn output_path(&self, header: &str) -> PathBuf {
        let mut path = PathBuf::from(header).into_os_string();
        path.push(".");
        path.push(&self.options.output_extension);
        PathBuf::from(path)
    }

    fn base_context(&self) -> TemplateContext {
        TemplateContext::new()
            .with("name", &self.options.name)
            .with("version", &self.options.version)
    }

    fn header_context(&self, header: &Header) -> TemplateContext {
        let stem = PathBuf::from(&header.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.base_context()
            .with("header", &header.name)
            .with("header_stem", stem)
    }

    fn emit_header(&self, header: &Header, warnings: &mut WarningLog) -> String {
        let mut out = String::new();
        let context = self.header_context(header);

        out.push_str(&self.templates.render("file_begin", &context));
        for ns in header.namespaces.values() {
            if ns.is_empty() {
                continue;
            }
            self.emit_namespace(&mut out, &context, ns, warnings);
        }
        out.push_str(&self.templates.render("file_end", &context));
        out
    }

    fn emit_namespace(
        &self,
        out: &mut String,
        header_context: &TemplateContext,
        ns: &Namespace,
        warnings: &mut WarningLog,
    ) {
        let mut context = header_context.clone();
        context
            .set("namespace", &ns.name)
            .set("is_global", ns.is_global());
        out.push_str(&self.templates.render("namespace_begin", &context));

        for constant in ns.constants.values() {
            let mut item = context.clone();
            item.set("constant", &constant.name)
                .set("value", &constant.value)
                .set("description", &constant.description);
            out.push_str(&self.templates.render("constant", &item));
        }

        for enumeration in ns.enumerations.values() {
            self.emit_enumeration(out, &context, "enumeration", enumeration);
        }

        for alias in ns.type_aliases.values() {
            let mut item = context.clone();
            item.set("alias", &alias.name)
                .set("type", &alias.ty.original_text)
                .set("category", self.index.classify(&alias.ty).category)
                .set("description", alias.description());
            out.push_str(&self.templates.render("type_alias", &item));
        }

        for variable in ns.variables.values() {
            let category = self.index.classify(&variable.ty).category;
            let mut item = context.clone();
            item.set("variable", &variable.name)
                .set("type", &variable.ty.original_text)
                .set("category", &category)
                .set("category_fragment", category.fragment_suffix())
                .set("description", variable.description());
            out.push_str(&self.templates.render("variable", &item));
        }

        for function in ns.functions.values() {
            self.emit_function(out, &context, "function", function, warnings);
        }

        for class in ns.classes.values() {
            self.emit_class(out, &context, class, warnings);
        }

        out.push_str(&self.templates.render("namespace_end", &context));
    }

    fn emit_enumeration(
        &self,
        out: &mut String,
        parent: &TemplateContext,
        prefix: &str,
        enumeration: &Enumeration,
    ) {
        let mut context = parent.clone();
        context
            .set("enumeration", &enumeration.name)
            .set("option_count", enumeration.options.len())
            .set("description", &enumeration.description);
        out.push_str(
            &self
                .templates
                .render(&format!("{prefix}_begin"), &context),
        );
        for (position, option) in enumeration.options.iter().enumerate() {
            let item = context
                .clone()
                .with("option", option)
                .with("option_index", position);
            out.push_str(
                &self
                    .templates
                    .render(&format!("{prefix}_option"), &item),
            );
        }
        out.push_str(&self.templates.render(&format!("{prefix}_end"), &context));
    }

    fn emit_class(
        &self,
        out: &mut String,
        parent: &TemplateContext,
        class: &Class,
        warnings: &mut WarningLog,
    ) {
        let parents: Vec<&str> = class.parents.iter().map(String::as_str).collect();
        let mut context = parent.clone();
        context
            .set("class", &class.name)
            .set("is_struct", class.is_struct)
            .set("is_forward_declaration", class.is_forward_declaration)
            .set("parents", parents.join(", "))
            .set("parent", parents.first().copied().unwrap_or_default())
            .set("generics", class.generic_parameters.join(", "))
            .set("has_constructor", class.has_constructor())
            .set("description", &class.description);
        out.push_str(&self.templates.render("class_begin", &context));

        for variable in class.variables.values() {
            let category = self.index.classify(&variable.ty).category;
            let mut item = context.clone();
            item.set("variable", &variable.name)
                .set("type", &variable.ty.original_text)
                .set("category", &category)
                .set("category_fragment", category.fragment_suffix())
                .set("is_static", variable.is_static)
                .set("is_mutable", variable.is_mutable)
                .set("is_protected", variable.is_protected)
                .set("is_public", variable.is_public)
                .set("description", variable.description());
            out.push_str(&self.templates.render("class_variable", &item));
        }

        for enumeration in class.enumerations.values() {
            self.emit_enumeration(out, &context, "class_enumeration", enumeration);
        }

        for method in class.methods.values() {
            self.emit_function(out, &context, "method", method, warnings);
        }

        out.push_str(&self.templates.render("class_end", &context));
    }

    fn emit_function(
        &self,
        out: &mut String,
        parent: &TemplateContext,
        prefix: &str,
        function: &Function,
        warnings: &mut WarningLog,
    ) {
        let planner = OverloadPlanner::new(&self.index, self.options.plan);
        let plan = planner.plan(function, warnings);

        let mut context = parent.clone();
        context
            .set("function", &plan.name)
            .set("overload_count", plan.overloads.len())
            .set("block_count", plan.block_count())
            .set("is_constructor", plan.is_constructor)
            .set("description", &function.description);
        out.push_str(&self.templates.render(&format!("{prefix}_begin"), &context));

        for overload in &plan.overloads {
            self.emit_overload(out, &context, &plan, overload);
        }

        out.push_str(&self.templates.render(&format!("{prefix}_end"), &context));
    }

    fn emit_overload(
        &self,
        out: &mut String,
        parent: &TemplateContext,
        plan: &FunctionPlan,
        overload: &OverloadPlan,
    ) {
        let flags = overload.flags;
        let (next_overload, mismatch_fragment) = match overload.on_mismatch {
            OnMismatch::Next(next) => (next.to_string(), "overload_next"),
            OnMismatch::Error => (String::new(), "overload_error"),
        };

        let mut context = parent.clone();
        context
            .set("overload_index", overload.index)
            .set("next_overload", &next_overload)
            .set("is_last_overload", overload.is_last())
            .set("required", overload.required)
            .set("total", overload.total)
            .set("return_type", &overload.return_plan.declaration)
            .set("return_category", &overload.return_plan.category)
            .set("return_fragment", overload.return_plan.fragment())
            .set("is_static", flags.is_static)
            .set("is_const", flags.is_const)
            .set("is_virtual", flags.is_virtual)
            .set("is_pure_virtual", flags.is_pure_virtual)
            .set("is_protected", flags.is_protected)
            .set("is_deprecated", flags.is_deprecated)
            .set("overload_description", &overload.description);
        if let Some(class) = &plan.class {
            context.set("class", class);
        }
        out.push_str(&self.templates.render("overload_begin", &context));

        for block in &overload.blocks {
            let bound = &overload.parameters[..block.argument_count];
            let arguments: Vec<&str> = bound.iter().map(|p| p.name.as_str()).collect();

            let mut block_context = context.clone();
            block_context
                .set("block_index", block.index)
                .set("argument_count", block.argument_count)
                .set("call_arguments", arguments.join(", "));
            out.push_str(&self.templates.render("block_begin", &block_context));

            for parameter in bound {
                let mut item = block_context.clone();
                item.set("parameter", &parameter.name)
                    .set("parameter_position", parameter.position)
                    .set("parameter_type", &parameter.declaration)
                    .set("parameter_category", &parameter.category)
                    .set("parameter_default", &parameter.default_value)
                    .set("parameter_nullable", parameter.nullable)
                    .set("requires_handle", parameter.requires_handle);
                if let TypeCategory::Array(element) = &parameter.category {
                    item.set("element_category", element.fragment_suffix());
                }
                out.push_str(&self.templates.render(&parameter.fragment(), &item));
            }

            out.push_str(&self.templates.render("call", &block_context));
            out.push_str(
                &self
                    .templates
                    .render(&overload.return_plan.fragment(), &block_context),
            );
            out.push_str(&self.templates.render("block_end", &block_context));
        }

        out.push_str(&self.templates.render(mismatch_fragment, &context));
        out.push_str(&self.templates.render("overload_end", &context));
    }
}
