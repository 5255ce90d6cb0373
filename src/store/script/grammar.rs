use std::ops::Range;

use chumsky::Stream;
use chumsky::prelude::*;
use wrapgen_span::Span;
use wrapgen_utils::Diagnostic;

use super::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Bool(bool),
    List(Vec<String>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::List(_) => "list",
        }
    }
}

/// `value` or `name = value` inside a call's parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Value,
    pub span: Span,
}

/// `name(args);` or `name(args) { nested calls }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub name: String,
    pub name_span: Span,
    pub arguments: Vec<Argument>,
    pub body: Option<Vec<Call>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ParserError {
    pub message: String,
    pub span: Span,
    /// `expected ...` text shown under the offending token.
    pub expected: Option<String>,
}

impl ParserError {
    pub fn to_diagnostic(&self, source_id: &str) -> Diagnostic {
        let diagnostic = Diagnostic::error(source_id, self.span, self.message.clone());
        match &self.expected {
            Some(expected) => diagnostic.with_label(expected.clone()),
            None => diagnostic,
        }
    }
}

impl From<Simple<TokenKind>> for ParserError {
    fn from(value: Simple<TokenKind>) -> Self {
        let span_range = value.span();
        let span = Span::new(span_range.start, span_range.end);
        let found = match value.found() {
            Some(found) => format!("unexpected token {found}"),
            None => "unexpected end of input".to_string(),
        };
        let mut expected: Vec<String> = value
            .expected()
            .filter_map(|token| token.as_ref().map(|kind| format!("`{}`", kind.name())))
            .collect();
        expected.sort();
        expected.dedup();

        let expected = (!expected.is_empty()).then(|| format!("expected {}", expected.join(" or ")));
        let message = match &expected {
            Some(expected) => format!("{found}, {expected}"),
            None => found,
        };
        Self {
            message,
            span,
            expected,
        }
    }
}

pub fn parse(tokens: &[Token]) -> Result<Vec<Call>, Vec<ParserError>> {
    let parser = program_parser();
    let end = tokens.last().map(|token| token.span.end()).unwrap_or(0);

    let stream = Stream::from_iter(
        end..end + 1,
        tokens
            .iter()
            .cloned()
            .map(|token| (token.kind, token.span.into())),
    );

    parser
        .parse(stream)
        .map_err(|errors| errors.into_iter().map(ParserError::from).collect())
}

fn identifier_parser() -> impl Parser<TokenKind, String, Error = Simple<TokenKind>> {
    select! { TokenKind::Identifier(name) => name }
}

fn string_parser() -> impl Parser<TokenKind, String, Error = Simple<TokenKind>> {
    select! { TokenKind::StringLiteral(value) => value }
}

fn value_parser() -> impl Parser<TokenKind, Value, Error = Simple<TokenKind>> {
    let list = string_parser()
        .separated_by(just(TokenKind::Comma))
        .allow_trailing()
        .delimited_by(just(TokenKind::LBracket), just(TokenKind::RBracket))
        .map(Value::List);

    string_parser()
        .map(Value::Str)
        .or(select! { TokenKind::Bool(value) => Value::Bool(value) })
        .or(list)
}

fn argument_parser() -> impl Parser<TokenKind, Argument, Error = Simple<TokenKind>> {
    let named = identifier_parser()
        .then_ignore(just(TokenKind::Equals))
        .then(value_parser())
        .map(|(name, value)| (Some(name), value));
    let positional = value_parser().map(|value| (None, value));

    named
        .or(positional)
        .map_with_span(|(name, value), span: Range<usize>| Argument {
            name,
            value,
            span: span.into(),
        })
}

fn program_parser() -> impl Parser<TokenKind, Vec<Call>, Error = Simple<TokenKind>> {
    let call = recursive(|call| {
        let arguments = argument_parser()
            .separated_by(just(TokenKind::Comma))
            .allow_trailing()
            .delimited_by(just(TokenKind::LParen), just(TokenKind::RParen));

        let body = call
            .repeated()
            .delimited_by(just(TokenKind::LBrace), just(TokenKind::RBrace))
            .map(Some)
            .or(just(TokenKind::Semicolon).to(None));

        identifier_parser()
            .map_with_span(|name, span: Range<usize>| (name, Span::from(span)))
            .then(arguments)
            .then(body)
            .map_with_span(
                |(((name, name_span), arguments), body), span: Range<usize>| Call {
                    name,
                    name_span,
                    arguments,
                    body,
                    span: span.into(),
                },
            )
    });

    call.repeated().then_ignore(end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::script::lexer::tokenize;

    fn parse_source(source: &str) -> Vec<Call> {
        let tokens = tokenize(source).expect("tokenization should succeed");
        parse(&tokens).expect("parsing should succeed")
    }

    #[test]
    fn parses_leaf_call() {
        let calls = parse_source(r#"include("legacy.h", enabled = false);"#);
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.name, "include");
        assert!(call.body.is_none());
        assert_eq!(call.arguments.len(), 2);
        assert_eq!(call.arguments[0].value, Value::Str("legacy.h".into()));
        assert_eq!(call.arguments[1].name.as_deref(), Some("enabled"));
        assert_eq!(call.arguments[1].value, Value::Bool(false));
    }

    #[test]
    fn parses_nested_blocks_and_lists() {
        let calls = parse_source(
            r#"
            class("h.h", "\\", "Button", parents = ["Control", "Window"]) {
                method("Click") {
                    overload(return = "void");
                }
            }
            "#,
        );
        let class = &calls[0];
        assert_eq!(
            class.arguments[3].value,
            Value::List(vec!["Control".into(), "Window".into()])
        );
        let body = class.body.as_ref().expect("class has a body");
        assert_eq!(body[0].name, "method");
        assert_eq!(body[0].body.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn missing_terminator_is_an_error() {
        let tokens = tokenize(r#"constant("h.h", "\\", "A")"#).unwrap();
        let errors = parse(&tokens).unwrap_err();
        assert!(!errors.is_empty());
        assert!(errors[0].message.contains("end of input"));

        let diagnostic = errors[0].to_diagnostic("defs.wgs");
        assert_eq!(diagnostic.label(), errors[0].expected.as_deref());
        assert_eq!(diagnostic.message(), errors[0].message);
    }
}
