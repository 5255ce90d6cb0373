
use wrapgen_symbols::{Class, Enumeration, Function, Overload, SymbolTable, TypeDescriptor};

enum Arg<'a> {
    Str(&'a str),
    /// Written only when true.
    Flag(bool),
    /// Written as is, never omitted.
    Bool(bool),
    List(Vec<&'a str>),
}

impl Arg<'_> {
    fn is_omitted(&self) -> bool {
        match self {
            Arg::Str(value) => value.is_empty(),
            Arg::Flag(value) => !value,
            Arg::Bool(_) => false,
            Arg::List(items) => items.is_empty(),
        }
    }
}

/// Render `table` as a definitions script. Output is fully determined by the
/// table's iteration order.
pub fn write_script(table: &SymbolTable) -> String {
    let mut writer = ScriptWriter::default();
    writer.out.push_str("// wrapgen definitions\n");

    for header in table.headers() {
        writer.statement(
            "include",
            &[header.name.as_str()],
            if header.enabled {
                Vec::new()
            } else {
                vec![("enabled", Arg::Bool(false))]
            },
            |_| {},
        );
    }

    for header in table.headers() {
        for ns in header.namespaces.values() {
            let place = [header.name.as_str(), ns.name.as_str()];

            for constant in ns.constants.values() {
                writer.statement(
                    "constant",
                    &[place[0], place[1], constant.name.as_str()],
                    vec![
                        ("value", Arg::Str(&constant.value)),
                        ("description", Arg::Str(&constant.description)),
                    ],
                    |_| {},
                );
            }
            for enumeration in ns.enumerations.values() {
                writer.enumeration(&[place[0], place[1], enumeration.name.as_str()], enumeration);
            }
            for alias in ns.type_aliases.values() {
                writer.typed("type_alias", &[place[0], place[1], alias.name.as_str()], &alias.ty);
            }
            for variable in ns.variables.values() {
                writer.typed("variable", &[place[0], place[1], variable.name.as_str()], &variable.ty);
            }
            for function in ns.functions.values() {
                writer.function("function", &[place[0], place[1], function.name.as_str()], function);
            }
            for class in ns.classes.values() {
                writer.class(&place, class);
            }
        }
    }

    writer.out
}

#[derive(Default)]
struct ScriptWriter {
    out: String,
    indent: usize,
}

impl ScriptWriter {
    /// Emit one call. A statement whose `body` writes nothing ends with `;`.
    fn statement(
        &mut self,
        name: &str,
        positional: &[&str],
        named: Vec<(&str, Arg<'_>)>,
        body: impl FnOnce(&mut Self),
    ) {
        self.pad();
        self.out.push_str(name);
        self.out.push('(');

        let mut first = true;
        let mut separator = |out: &mut String| {
            if !first {
                out.push_str(", ");
            }
            first = false;
        };

        for value in positional {
            separator(&mut self.out);
            quote(&mut self.out, value);
        }
        for (key, value) in named {
            if value.is_omitted() {
                continue;
            }
            separator(&mut self.out);
            self.out.push_str(key);
            self.out.push_str(" = ");
            match value {
                Arg::Str(text) => quote(&mut self.out, text),
                Arg::Flag(flag) | Arg::Bool(flag) => {
                    self.out.push_str(if flag { "true" } else { "false" });
                }
                Arg::List(items) => {
                    self.out.push('[');
                    for (idx, item) in items.iter().enumerate() {
                        if idx > 0 {
                            self.out.push_str(", ");
                        }
                        quote(&mut self.out, item);
                    }
                    self.out.push(']');
                }
            }
        }
        self.out.push(')');

        let mark = self.out.len();
        self.out.push_str(" {\n");
        self.indent += 1;
        let body_start = self.out.len();
        body(self);
        self.indent -= 1;

        if self.out.len() == body_start {
            self.out.truncate(mark);
            self.out.push_str(";\n");
        } else {
            self.pad();
            self.out.push_str("}\n");
        }
    }

    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn typed(&mut self, name: &str, positional: &[&str], ty: &TypeDescriptor) {
        self.statement(
            name,
            positional,
            vec![
                ("type", Arg::Str(&ty.original_text)),
                ("description", Arg::Str(&ty.description)),
            ],
            |_| {},
        );
    }

    fn enumeration(&mut self, positional: &[&str], enumeration: &Enumeration) {
        self.statement(
            "enumeration",
            positional,
            vec![
                (
                    "options",
                    Arg::List(enumeration.options.iter().map(String::as_str).collect()),
                ),
                ("description", Arg::Str(&enumeration.description)),
            ],
            |_| {},
        );
    }

    fn function(&mut self, keyword: &str, positional: &[&str], function: &Function) {
        self.statement(keyword, positional, Vec::new(), |writer| {
            for overload in &function.overloads {
                writer.overload(overload);
            }
        });
    }

    fn overload(&mut self, overload: &Overload) {
        let flags = overload.flags;
        let return_ty = &overload.return_type.ty;
        self.statement(
            "overload",
            &[],
            vec![
                ("return", Arg::Str(&return_ty.original_text)),
                ("return_description", Arg::Str(&return_ty.description)),
                ("description", Arg::Str(&overload.description)),
                ("static", Arg::Flag(flags.is_static)),
                ("const", Arg::Flag(flags.is_const)),
                ("virtual", Arg::Flag(flags.is_virtual)),
                ("pure_virtual", Arg::Flag(flags.is_pure_virtual)),
                ("protected", Arg::Flag(flags.is_protected)),
                ("deprecated", Arg::Flag(flags.is_deprecated)),
            ],
            |writer| {
                for parameter in &overload.parameters {
                    writer.statement(
                        "parameter",
                        &[parameter.name.as_str()],
                        vec![
                            ("type", Arg::Str(&parameter.ty.original_text)),
                            ("array", Arg::Flag(parameter.ty.is_array)),
                            ("value", Arg::Str(&parameter.default_value)),
                            ("description", Arg::Str(&parameter.ty.description)),
                        ],
                        |_| {},
                    );
                }
            },
        );
    }

    fn class(&mut self, place: &[&str; 2], class: &Class) {
        self.statement(
            "class",
            &[place[0], place[1], class.name.as_str()],
            vec![
                ("struct", Arg::Flag(class.is_struct)),
                ("forward", Arg::Flag(class.is_forward_declaration)),
                (
                    "parents",
                    Arg::List(class.parents.iter().map(String::as_str).collect()),
                ),
                (
                    "generics",
                    Arg::List(class.generic_parameters.iter().map(String::as_str).collect()),
                ),
                ("description", Arg::Str(&class.description)),
            ],
            |writer| {
                for variable in class.variables.values() {
                    writer.statement(
                        "variable",
                        &[variable.name.as_str()],
                        vec![
                            ("type", Arg::Str(&variable.ty.original_text)),
                            ("static", Arg::Flag(variable.is_static)),
                            ("mutable", Arg::Flag(variable.is_mutable)),
                            ("protected", Arg::Flag(variable.is_protected)),
                            ("public", Arg::Flag(variable.is_public)),
                            ("description", Arg::Str(&variable.ty.description)),
                        ],
                        |_| {},
                    );
                }
                for enumeration in class.enumerations.values() {
                    writer.enumeration(&[enumeration.name.as_str()], enumeration);
                }
                for method in class.methods.values() {
                    writer.function("method", &[method.name.as_str()], method);
                }
            },
        );
    }
}

fn quote(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
}
