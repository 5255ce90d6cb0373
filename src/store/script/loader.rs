//! Replays parsed definition calls against a fresh [`SymbolTable`].

use wrapgen_span::Span;
use wrapgen_symbols::{
    Class, ClassVariable, Constant, DuplicateParameterPolicy, Enumeration, Function,
    GlobalVariable, Overload, OverloadFlags, Parameter, ReturnType, SymbolTable, TypeAlias,
    TypeDescriptor,
};
use wrapgen_utils::Diagnostic;

use super::grammar::{Argument, Call, Value};

/// A well-formed call that does not describe a valid definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    pub message: String,
    pub span: Span,
    pub help: Option<String>,
}

impl ScriptError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            help: None,
        }
    }

    #[must_use]
    fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn to_diagnostic(&self, source_id: &str) -> Diagnostic {
        let diagnostic = Diagnostic::error(source_id, self.span, self.message.clone());
        match &self.help {
            Some(help) => diagnostic.with_help(help.clone()),
            None => diagnostic,
        }
    }
}

type LoadResult<T> = Result<T, ScriptError>;

/// Argument accessors for one call, checking names and value kinds.
struct Args<'a> {
    call: &'a Call,
}

impl<'a> Args<'a> {
    fn new(call: &'a Call, allowed: &[&str]) -> LoadResult<Self> {
        let unexpected = call.arguments.iter().find(|argument| {
            argument
                .name
                .as_deref()
                .is_some_and(|name| !allowed.contains(&name))
        });
        if let Some(argument) = unexpected {
            let help = if allowed.is_empty() {
                format!("`{}` takes no named arguments", call.name)
            } else {
                format!("`{}` accepts {}", call.name, allowed.join(", "))
            };
            return Err(ScriptError::new(
                format!(
                    "`{}` does not take an argument named `{}`",
                    call.name,
                    argument.name.as_deref().unwrap_or_default()
                ),
                argument.span,
            )
            .with_help(help));
        }
        Ok(Self { call })
    }

    fn positional(&self, index: usize, what: &str) -> LoadResult<&'a str> {
        let argument = self
            .call
            .arguments
            .iter()
            .filter(|argument| argument.name.is_none())
            .nth(index)
            .ok_or_else(|| {
                ScriptError::new(
                    format!("`{}` is missing its {what} argument", self.call.name),
                    self.call.span,
                )
            })?;
        expect_str(argument, what)
    }

    fn named(&self, key: &str) -> Option<&'a Argument> {
        self.call
            .arguments
            .iter()
            .find(|argument| argument.name.as_deref() == Some(key))
    }

    fn string(&self, key: &str) -> LoadResult<String> {
        match self.named(key) {
            Some(argument) => expect_str(argument, key).map(str::to_string),
            None => Ok(String::new()),
        }
    }

    fn flag_or(&self, key: &str, default: bool) -> LoadResult<bool> {
        match self.named(key) {
            Some(Argument {
                value: Value::Bool(value),
                ..
            }) => Ok(*value),
            Some(argument) => Err(mismatch(argument, key, "boolean")),
            None => Ok(default),
        }
    }

    fn flag(&self, key: &str) -> LoadResult<bool> {
        self.flag_or(key, false)
    }

    fn list(&self, key: &str) -> LoadResult<Vec<String>> {
        match self.named(key) {
            Some(Argument {
                value: Value::List(items),
                ..
            }) => Ok(items.clone()),
            Some(argument) => Err(mismatch(argument, key, "list")),
            None => Ok(Vec::new()),
        }
    }

    fn leaf(&self) -> LoadResult<()> {
        if self.call.body.is_some() {
            return Err(ScriptError::new(
                format!("`{}` does not take a block", self.call.name),
                self.call.span,
            ));
        }
        Ok(())
    }

    fn body(&self) -> &'a [Call] {
        self.call.body.as_deref().unwrap_or_default()
    }
}

fn expect_str<'a>(argument: &'a Argument, what: &str) -> LoadResult<&'a str> {
    match &argument.value {
        Value::Str(value) => Ok(value),
        _ => Err(mismatch(argument, what, "string")),
    }
}

fn mismatch(argument: &Argument, what: &str, expected: &str) -> ScriptError {
    ScriptError::new(
        format!(
            "`{what}` expects a {expected}, found a {}",
            argument.value.kind()
        ),
        argument.span,
    )
}

fn unknown(call: &Call, context: &str) -> ScriptError {
    ScriptError::new(
        format!("unknown statement `{}` {context}", call.name),
        call.name_span,
    )
}

fn described_type(args: &Args<'_>) -> LoadResult<TypeDescriptor> {
    Ok(TypeDescriptor::parse(&args.string("type")?).with_description(args.string("description")?))
}

/// Build a table from top-level calls, in order.
pub fn build_table(calls: &[Call], policy: DuplicateParameterPolicy) -> LoadResult<SymbolTable> {
    let mut table = SymbolTable::new();

    for call in calls {
        match call.name.as_str() {
            "include" => {
                let args = Args::new(call, &["enabled"])?;
                args.leaf()?;
                let header = args.positional(0, "header")?;
                table.set_header_enabled(header, args.flag_or("enabled", true)?);
            }
            "constant" => {
                let args = Args::new(call, &["value", "description"])?;
                args.leaf()?;
                let (header, ns, name) = location(&args)?;
                let constant =
                    Constant::new(name, args.string("value")?).with_description(args.string("description")?);
                table.add_constant(constant, header, ns);
            }
            "enumeration" => {
                let args = Args::new(call, &["options", "description"])?;
                args.leaf()?;
                let (header, ns, name) = location(&args)?;
                table.add_enumeration(enumeration(name, &args)?, header, ns);
            }
            "type_alias" => {
                let args = Args::new(call, &["type", "description"])?;
                args.leaf()?;
                let (header, ns, name) = location(&args)?;
                table.add_type_alias(TypeAlias::new(name, described_type(&args)?), header, ns);
            }
            "variable" => {
                let args = Args::new(call, &["type", "description"])?;
                args.leaf()?;
                let (header, ns, name) = location(&args)?;
                table.add_global_variable(
                    GlobalVariable::new(name, described_type(&args)?),
                    header,
                    ns,
                );
            }
            "function" => {
                let args = Args::new(call, &[])?;
                let (header, ns, name) = location(&args)?;
                let function = function(name, args.body(), policy)?;
                table.add_function(function, header, ns);
            }
            "class" => {
                let args = Args::new(
                    call,
                    &["struct", "forward", "parents", "generics", "description"],
                )?;
                let (header, ns, name) = location(&args)?;
                let class = class(name, &args, policy)?;
                table.add_class(class, header, ns);
            }
            _ => return Err(unknown(call, "at top level")),
        }
    }

    Ok(table)
}

fn location<'a>(args: &Args<'a>) -> LoadResult<(&'a str, &'a str, &'a str)> {
    Ok((
        args.positional(0, "header")?,
        args.positional(1, "namespace")?,
        args.positional(2, "name")?,
    ))
}

fn enumeration(name: &str, args: &Args<'_>) -> LoadResult<Enumeration> {
    Ok(Enumeration::with_options(name, args.list("options")?)
        .with_description(args.string("description")?))
}

fn function(name: &str, body: &[Call], policy: DuplicateParameterPolicy) -> LoadResult<Function> {
    let mut function = Function::new(name);
    for call in body {
        if call.name != "overload" {
            return Err(unknown(call, "inside a function"));
        }
        function.add_overload(overload(name, call, policy)?);
    }
    Ok(function)
}

fn overload(function: &str, call: &Call, policy: DuplicateParameterPolicy) -> LoadResult<Overload> {
    let args = Args::new(
        call,
        &[
            "return",
            "return_description",
            "description",
            "static",
            "const",
            "virtual",
            "pure_virtual",
            "protected",
            "deprecated",
        ],
    )?;

    let return_type = TypeDescriptor::parse(&args.string("return")?)
        .with_description(args.string("return_description")?);
    let mut overload = Overload::new(ReturnType::new(return_type))
        .with_description(args.string("description")?)
        .with_flags(OverloadFlags {
            is_static: args.flag("static")?,
            is_const: args.flag("const")?,
            is_virtual: args.flag("virtual")?,
            is_pure_virtual: args.flag("pure_virtual")?,
            is_protected: args.flag("protected")?,
            is_deprecated: args.flag("deprecated")?,
        });
    overload.function = function.to_string();

    for call in args.body() {
        if call.name != "parameter" {
            return Err(unknown(call, "inside an overload"));
        }
        let args = Args::new(call, &["type", "array", "value", "description"])?;
        args.leaf()?;
        let mut ty = described_type(&args)?;
        ty.is_array |= args.flag("array")? && !ty.is_empty();
        let parameter =
            Parameter::new(args.positional(0, "name")?, ty).with_default(args.string("value")?);
        overload
            .add_parameter(parameter, policy)
            .map_err(|err| ScriptError::new(err.to_string(), call.span))?;
    }

    Ok(overload)
}

fn class(name: &str, args: &Args<'_>, policy: DuplicateParameterPolicy) -> LoadResult<Class> {
    let mut class = Class::new(name).with_description(args.string("description")?);
    class.is_struct = args.flag("struct")?;
    class.is_forward_declaration = args.flag("forward")?;
    let generics = args.list("generics")?;
    if !generics.is_empty() {
        class.generic_parameters = generics;
    }
    for parent in args.list("parents")? {
        class.add_parent(parent);
    }

    for call in args.body() {
        match call.name.as_str() {
            "variable" => {
                let member = Args::new(
                    call,
                    &["type", "static", "mutable", "protected", "public", "description"],
                )?;
                member.leaf()?;
                class.add_variable(ClassVariable {
                    name: member.positional(0, "name")?.to_string(),
                    ty: described_type(&member)?,
                    is_static: member.flag("static")?,
                    is_mutable: member.flag("mutable")?,
                    is_protected: member.flag("protected")?,
                    is_public: member.flag("public")?,
                });
            }
            "enumeration" => {
                let member = Args::new(call, &["options", "description"])?;
                member.leaf()?;
                let enum_name = member.positional(0, "name")?;
                class.add_enumeration(enumeration(enum_name, &member)?);
            }
            "method" => {
                let member = Args::new(call, &[])?;
                let method_name = member.positional(0, "name")?;
                class.add_method(function(method_name, member.body(), policy)?);
            }
            _ => return Err(unknown(call, "inside a class")),
        }
    }

    Ok(class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::script::{grammar::parse, lexer::tokenize};

    fn load(source: &str, policy: DuplicateParameterPolicy) -> LoadResult<SymbolTable> {
        let tokens = tokenize(source).expect("tokenization should succeed");
        let calls = parse(&tokens).expect("parsing should succeed");
        build_table(&calls, policy)
    }

    #[test]
    fn builds_function_with_optional_tail() {
        let table = load(
            r#"
            function("math.h", "\\", "Add") {
                overload(return = "int", description = "Adds.") {
                    parameter("a", type = "int");
                    parameter("b", type = "int", value = "0");
                }
            }
            "#,
            DuplicateParameterPolicy::Ignore,
        )
        .unwrap();

        let function = table.functions().next().unwrap();
        assert_eq!(function.description, "Adds.");
        let overload = &function.overloads[0];
        assert_eq!(overload.function, "Add");
        assert_eq!(overload.required_count(), 1);
        assert_eq!(overload.total_count(), 2);
    }

    #[test]
    fn unknown_statement_points_at_name() {
        let source = r#"widget("a.h", "\\", "W");"#;
        let err = load(source, DuplicateParameterPolicy::Ignore).unwrap_err();
        assert!(err.message.contains("unknown statement `widget`"));
        assert_eq!(err.span, Span::new(0, 6));
    }

    #[test]
    fn unknown_named_argument_is_rejected() {
        let err = load(
            r#"constant("a.h", "\\", "A", colour = "red");"#,
            DuplicateParameterPolicy::Ignore,
        )
        .unwrap_err();
        assert!(err.message.contains("colour"));
        assert!(err.help.as_deref().is_some_and(|help| help.contains("value")));

        let diagnostic = err.to_diagnostic("defs.wgs");
        assert_eq!(diagnostic.source_id(), "defs.wgs");
        assert_eq!(diagnostic.help(), err.help.as_deref());
    }

    #[test]
    fn wrong_value_kind_is_rejected() {
        let err = load(
            r#"class("a.h", "\\", "A", struct = "yes");"#,
            DuplicateParameterPolicy::Ignore,
        )
        .unwrap_err();
        assert!(err.message.contains("expects a boolean"));
    }

    #[test]
    fn duplicate_parameter_follows_policy() {
        let source = r#"
            function("a.h", "\\", "Move") {
                overload(return = "void") {
                    parameter("x", type = "int");
                    parameter("x", type = "double");
                }
            }
        "#;

        let table = load(source, DuplicateParameterPolicy::Ignore).unwrap();
        let overload = &table.functions().next().unwrap().overloads[0];
        assert_eq!(overload.parameters.len(), 1);
        assert_eq!(overload.parameters[0].ty.base_type, "int");

        let err = load(source, DuplicateParameterPolicy::Reject).unwrap_err();
        assert!(err.message.contains("`x`"));
        assert!(err.message.contains("`Move`"));
    }
}
