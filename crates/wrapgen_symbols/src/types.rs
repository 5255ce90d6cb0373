//! Declaration-fragment parsing.
//!
//! A [`TypeDescriptor`] is derived from raw text such as `const char*` or
//! `unsigned long&`. Qualifiers are only recognised outside template argument
//! lists; anything between `<` and `>` is carried verbatim in the base type.

/// Parsed shape of a C/C++ type fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeDescriptor {
    /// Type name with `const`, `unsigned`, `&`, `*` and `[]` removed.
    pub base_type: String,
    pub is_const: bool,
    pub is_unsigned: bool,
    pub is_reference: bool,
    pub is_pointer: bool,
    pub pointer_depth: usize,
    pub is_array: bool,
    /// Input text as given to [`TypeDescriptor::parse`].
    pub original_text: String,
    pub description: String,
}

impl TypeDescriptor {
    /// Parse a declaration fragment. Never fails: empty or unusable input
    /// yields an empty `base_type` with every flag cleared.
    pub fn parse(raw: &str) -> Self {
        let mut descriptor = Self {
            original_text: raw.to_string(),
            ..Self::default()
        };

        let text = raw.trim();
        if text.is_empty() {
            return descriptor;
        }

        let mut stripped = String::with_capacity(text.len());
        let mut depth = 0usize;
        let mut in_brackets = false;

        for ch in text.chars() {
            if in_brackets {
                if ch == ']' {
                    in_brackets = false;
                }
                continue;
            }
            match ch {
                '<' => {
                    depth += 1;
                    stripped.push(ch);
                }
                '>' => {
                    depth = depth.saturating_sub(1);
                    stripped.push(ch);
                }
                '*' if depth == 0 => {
                    descriptor.pointer_depth += 1;
                    stripped.push(' ');
                }
                '&' if depth == 0 => {
                    descriptor.is_reference = true;
                    stripped.push(' ');
                }
                '[' if depth == 0 => {
                    descriptor.is_array = true;
                    in_brackets = true;
                    stripped.push(' ');
                }
                _ => stripped.push(ch),
            }
        }

        let mut base_tokens = Vec::new();
        for token in split_outside_templates(&stripped) {
            match token {
                "const" => descriptor.is_const = true,
                "unsigned" => descriptor.is_unsigned = true,
                other => base_tokens.push(other),
            }
        }

        descriptor.base_type = base_tokens.join(" ");
        if descriptor.base_type.is_empty() && descriptor.is_unsigned {
            descriptor.base_type = "int".to_string();
        }
        descriptor.is_pointer = descriptor.pointer_depth > 0;

        if descriptor.base_type.is_empty() {
            return Self {
                original_text: raw.to_string(),
                ..Self::default()
            };
        }

        descriptor
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// True when parsing produced no usable base type.
    pub fn is_empty(&self) -> bool {
        self.base_type.is_empty()
    }

    /// `void` by value, which only makes sense as a return type.
    pub fn is_void(&self) -> bool {
        self.base_type == "void" && !self.is_pointer
    }

    /// Base type with namespace qualification removed (`wx::Point` -> `Point`).
    pub fn unqualified_base(&self) -> &str {
        let end = self.base_type.find('<').unwrap_or(self.base_type.len());
        match self.base_type[..end].rfind("::") {
            Some(pos) => &self.base_type[pos + 2..],
            None => &self.base_type,
        }
    }
}

/// Split on whitespace that is not nested inside `<...>`.
fn split_outside_templates(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    tokens.push(&text[begin..idx]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(idx);
        }
    }

    if let Some(begin) = start {
        tokens.push(&text[begin..]);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_pointer() {
        let ty = TypeDescriptor::parse("const int*");
        assert_eq!(ty.base_type, "int");
        assert!(ty.is_const);
        assert!(!ty.is_unsigned);
        assert!(!ty.is_reference);
        assert!(ty.is_pointer);
        assert_eq!(ty.pointer_depth, 1);
        assert!(!ty.is_array);
        assert_eq!(ty.original_text, "const int*");
    }

    #[test]
    fn unsigned_reference() {
        let ty = TypeDescriptor::parse("unsigned long&");
        assert_eq!(ty.base_type, "long");
        assert!(ty.is_unsigned);
        assert!(ty.is_reference);
        assert!(!ty.is_pointer);
        assert_eq!(ty.pointer_depth, 0);
    }

    #[test]
    fn trailing_array_marker() {
        let ty = TypeDescriptor::parse("Foo[]");
        assert_eq!(ty.base_type, "Foo");
        assert!(ty.is_array);
        assert!(!ty.is_pointer);
    }

    #[test]
    fn multi_token_base_is_kept() {
        let ty = TypeDescriptor::parse("unsigned long long");
        assert_eq!(ty.base_type, "long long");
        assert!(ty.is_unsigned);
    }

    #[test]
    fn pointer_depth_counts_every_star() {
        let ty = TypeDescriptor::parse("char **");
        assert_eq!(ty.base_type, "char");
        assert_eq!(ty.pointer_depth, 2);
        assert!(ty.is_pointer);
    }

    #[test]
    fn template_arguments_are_opaque() {
        let ty = TypeDescriptor::parse("const std::map<int, const Foo*>&");
        assert_eq!(ty.base_type, "std::map<int, const Foo*>");
        assert!(ty.is_const);
        assert!(ty.is_reference);
        assert_eq!(ty.pointer_depth, 0);
    }

    #[test]
    fn bare_unsigned_means_int() {
        let ty = TypeDescriptor::parse("unsigned");
        assert_eq!(ty.base_type, "int");
        assert!(ty.is_unsigned);
    }

    #[test]
    fn empty_input_degrades() {
        for raw in ["", "   ", "const", "*&"] {
            let ty = TypeDescriptor::parse(raw);
            assert!(ty.is_empty(), "{raw:?} should not produce a base type");
            assert!(!ty.is_const && !ty.is_pointer && !ty.is_reference && !ty.is_array);
            assert_eq!(ty.pointer_depth, 0);
        }
    }

    #[test]
    fn base_never_keeps_qualifiers() {
        for raw in ["const unsigned char* const", "const Foo&", "int[]", "wxString const &"] {
            let ty = TypeDescriptor::parse(raw);
            assert!(!ty.base_type.contains("const"), "{raw}");
            assert!(!ty.base_type.contains('&'), "{raw}");
            assert!(!ty.base_type.contains('*'), "{raw}");
            assert!(!ty.base_type.contains("unsigned"), "{raw}");
            assert_eq!(ty.is_pointer, ty.pointer_depth > 0);
        }
    }

    #[test]
    fn unqualified_base_drops_scope() {
        assert_eq!(TypeDescriptor::parse("wx::Point&").unqualified_base(), "Point");
        assert_eq!(
            TypeDescriptor::parse("ns::List<a::B>").unqualified_base(),
            "List<a::B>"
        );
    }
}
