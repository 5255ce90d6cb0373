use thiserror::Error;
use wrapgen_span::Span;
use wrapgen_utils::Diagnostic;

use super::token::{Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("unterminated string literal (line {line}, column {column})")]
    UnterminatedString {
        line: usize,
        column: usize,
        span: Span,
    },
    #[error("unknown escape `\\{ch}` (line {line}, column {column})")]
    InvalidEscape {
        ch: char,
        line: usize,
        column: usize,
        span: Span,
    },
    #[error("unexpected character `{ch}` (line {line}, column {column})")]
    UnexpectedCharacter {
        ch: char,
        line: usize,
        column: usize,
        span: Span,
    },
}

impl LexerError {
    pub fn span(&self) -> Span {
        match self {
            LexerError::UnterminatedString { span, .. }
            | LexerError::InvalidEscape { span, .. }
            | LexerError::UnexpectedCharacter { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self, source_id: &str) -> Diagnostic {
        let diagnostic = Diagnostic::error(source_id, self.span(), self.to_string());
        match self {
            LexerError::UnterminatedString { .. } => diagnostic
                .with_label("string starts here")
                .with_help("close the string with `\"`"),
            LexerError::InvalidEscape { .. } => diagnostic
                .with_label("unknown escape")
                .with_help("supported escapes are \\n \\t \\r \\\" and \\\\"),
            LexerError::UnexpectedCharacter { .. } => {
                diagnostic.with_label("not part of the definitions syntax")
            }
        }
    }
}

pub type LexResult<T> = Result<T, Vec<LexerError>>;

/// Tokenize a definitions script. `//` starts a comment running to the end
/// of the line. All errors are collected before returning.
pub fn tokenize(source: &str) -> LexResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut chars = source.char_indices().peekable();
    let mut line = 1usize;
    let mut line_start = 0usize;

    while let Some((start, ch)) = chars.next() {
        let column = start - line_start + 1;
        let single = |kind| Token::new(kind, Span::new(start, start + ch.len_utf8()));

        match ch {
            '\n' => {
                line += 1;
                line_start = start + 1;
            }
            c if c.is_whitespace() => {}
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                while let Some((_, next)) = chars.peek() {
                    if *next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '(' => tokens.push(single(TokenKind::LParen)),
            ')' => tokens.push(single(TokenKind::RParen)),
            '{' => tokens.push(single(TokenKind::LBrace)),
            '}' => tokens.push(single(TokenKind::RBrace)),
            '[' => tokens.push(single(TokenKind::LBracket)),
            ']' => tokens.push(single(TokenKind::RBracket)),
            ',' => tokens.push(single(TokenKind::Comma)),
            ';' => tokens.push(single(TokenKind::Semicolon)),
            '=' => tokens.push(single(TokenKind::Equals)),
            '"' => {
                let mut value = String::new();
                let mut end = None;

                while let Some((idx, next)) = chars.next() {
                    match next {
                        '"' => {
                            end = Some(idx + 1);
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, 'n')) => value.push('\n'),
                            Some((_, 't')) => value.push('\t'),
                            Some((_, 'r')) => value.push('\r'),
                            Some((_, '"')) => value.push('"'),
                            Some((_, '\\')) => value.push('\\'),
                            Some((esc_idx, other)) => {
                                errors.push(LexerError::InvalidEscape {
                                    ch: other,
                                    line,
                                    column: idx - line_start + 1,
                                    span: Span::new(idx, esc_idx + other.len_utf8()),
                                });
                            }
                            None => break,
                        },
                        '\n' => {
                            value.push('\n');
                            line += 1;
                            line_start = idx + 1;
                        }
                        other => value.push(other),
                    }
                }

                match end {
                    Some(end) => {
                        tokens.push(Token::new(
                            TokenKind::StringLiteral(value),
                            Span::new(start, end),
                        ));
                    }
                    None => {
                        errors.push(LexerError::UnterminatedString {
                            line,
                            column,
                            span: Span::new(start, source.len()),
                        });
                    }
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some((idx, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || *next == '_' {
                        end = idx + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let word = &source[start..end];
                let kind = match word {
                    "true" => TokenKind::Bool(true),
                    "false" => TokenKind::Bool(false),
                    _ => TokenKind::Identifier(word.to_string()),
                };
                tokens.push(Token::new(kind, Span::new(start, end)));
            }
            other => errors.push(LexerError::UnexpectedCharacter {
                ch: other,
                line,
                column,
                span: Span::new(start, start + other.len_utf8()),
            }),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("tokenization should succeed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn call_with_named_arguments() {
        assert_eq!(
            kinds(r#"constant("h.h", value = "1");"#),
            vec![
                TokenKind::Identifier("constant".into()),
                TokenKind::LParen,
                TokenKind::StringLiteral("h.h".into()),
                TokenKind::Comma,
                TokenKind::Identifier("value".into()),
                TokenKind::Equals,
                TokenKind::StringLiteral("1".into()),
                TokenKind::RParen,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn escapes_and_comments() {
        assert_eq!(
            kinds("// header\n\"a\\\"b\\\\\" true [ ]"),
            vec![
                TokenKind::StringLiteral("a\"b\\".into()),
                TokenKind::Bool(true),
                TokenKind::LBracket,
                TokenKind::RBracket,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_reported() {
        let errors = tokenize("include(\"abc").unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [LexerError::UnterminatedString { line: 1, column: 9, .. }]
        ));

        let diagnostic = errors[0].to_diagnostic("defs.wgs");
        assert_eq!(diagnostic.span(), Span::new(8, 12));
        assert_eq!(diagnostic.label(), Some("string starts here"));
        assert!(diagnostic.help().is_some_and(|help| help.contains("close the string")));
    }

    #[test]
    fn unexpected_character_has_position() {
        let errors = tokenize("a\n  #").unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [LexerError::UnexpectedCharacter { ch: '#', line: 2, column: 3, .. }]
        ));
    }
}
