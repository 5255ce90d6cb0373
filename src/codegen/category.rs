//! Marshalling categories: how a value crosses the host/native boundary.

use std::fmt;

use ahash::{AHashMap, AHashSet};
use wrapgen_symbols::{SymbolTable, TypeDescriptor};
use wrapgen_utils::find_best_match;

/// Typedef chains longer than this are treated as unresolved.
const MAX_ALIAS_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Bool,
    Integer,
    Float,
    Character,
    /// `char*` and the standard string classes.
    String,
    /// A name nothing in the table accounts for.
    Unknown,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Character => "character",
            PrimitiveKind::String => "string",
            PrimitiveKind::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Primitive(PrimitiveKind),
    Enumeration,
    Object,
    Array(Box<TypeCategory>),
}

impl TypeCategory {
    /// Suffix of the `parameter_*` / `return_*` template fragments.
    pub fn fragment_suffix(&self) -> &'static str {
        match self {
            TypeCategory::Primitive(_) => "primitive",
            TypeCategory::Enumeration => "enumeration",
            TypeCategory::Object => "object",
            TypeCategory::Array(_) => "array",
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, TypeCategory::Object)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeCategory::Primitive(PrimitiveKind::Void))
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCategory::Primitive(kind) => write!(f, "primitive:{}", kind.name()),
            TypeCategory::Enumeration => f.write_str("enumeration"),
            TypeCategory::Object => f.write_str("object"),
            TypeCategory::Array(element) => write!(f, "array<{element}>"),
        }
    }
}

/// Result of classifying one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: TypeCategory,
    /// Set when the base type was not recognised.
    pub unknown: Option<UnknownName>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName {
    pub name: String,
    pub suggestion: Option<String>,
}

/// Names of classes, enumerations and typedefs across the whole table,
/// keyed by unqualified name.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    classes: AHashSet<String>,
    /// Class names sorted, so tied suggestions resolve the same way every run.
    suggestion_candidates: Vec<String>,
    enumerations: AHashSet<String>,
    aliases: AHashMap<String, TypeDescriptor>,
}

impl TypeIndex {
    pub fn build(table: &SymbolTable) -> Self {
        let mut index = Self::default();
        for class in table.classes() {
            index.classes.insert(class.name.clone());
        }
        for enumeration in table.enumerations() {
            index.enumerations.insert(enumeration.name.clone());
        }
        for alias in table.type_aliases() {
            index.aliases.insert(alias.name.clone(), alias.ty.clone());
        }
        index.suggestion_candidates = index.classes.iter().cloned().collect();
        index.suggestion_candidates.sort();
        index
    }

    pub fn classify(&self, ty: &TypeDescriptor) -> Classification {
        if ty.is_array {
            let element = TypeDescriptor {
                is_array: false,
                ..ty.clone()
            };
            let inner = self.classify(&element);
            return Classification {
                category: TypeCategory::Array(Box::new(inner.category)),
                unknown: inner.unknown,
            };
        }

        let resolved = self.resolve_alias(ty);
        let ty = resolved.as_ref().unwrap_or(ty);
        let name = lookup_name(ty.unqualified_base());

        if let Some(kind) = primitive_kind(ty) {
            return known(TypeCategory::Primitive(kind));
        }
        if self.enumerations.contains(name) {
            return known(TypeCategory::Enumeration);
        }
        if self.classes.contains(name) {
            return known(TypeCategory::Object);
        }

        let suggestion = find_best_match(name, self.suggestion_candidates.iter().cloned());
        Classification {
            category: TypeCategory::Primitive(PrimitiveKind::Unknown),
            unknown: Some(UnknownName {
                name: ty.base_type.clone(),
                suggestion,
            }),
        }
    }

    /// Follow typedefs to the aliased type, accumulating pointer depth and
    /// qualifiers from every level.
    fn resolve_alias(&self, ty: &TypeDescriptor) -> Option<TypeDescriptor> {
        let mut current: Option<TypeDescriptor> = None;
        for _ in 0..MAX_ALIAS_DEPTH {
            let at = current.as_ref().unwrap_or(ty);
            let name = lookup_name(at.unqualified_base());
            if primitive_kind(at).is_some()
                || self.classes.contains(name)
                || self.enumerations.contains(name)
            {
                break;
            }
            let Some(target) = self.aliases.get(name) else {
                break;
            };
            if target.is_empty() || target.base_type == at.base_type {
                break;
            }

            let mut next = target.clone();
            next.pointer_depth += at.pointer_depth;
            next.is_pointer = next.pointer_depth > 0;
            next.is_reference |= at.is_reference;
            next.is_const |= at.is_const;
            next.is_array |= at.is_array;
            current = Some(next);
        }
        current
    }
}

fn known(category: TypeCategory) -> Classification {
    Classification {
        category,
        unknown: None,
    }
}

/// Generic arguments are ignored for lookups: `List<int>` -> `List`.
fn lookup_name(name: &str) -> &str {
    match name.find('<') {
        Some(pos) => name[..pos].trim_end(),
        None => name,
    }
}

fn primitive_kind(ty: &TypeDescriptor) -> Option<PrimitiveKind> {
    let base = ty.base_type.as_str();
    let kind = match base {
        "void" if ty.is_pointer => PrimitiveKind::Unknown,
        "void" => PrimitiveKind::Void,
        "bool" => PrimitiveKind::Bool,
        "char" | "wchar_t" | "char16_t" | "char32_t" if ty.is_pointer => PrimitiveKind::String,
        "char" | "wchar_t" | "char16_t" | "char32_t" => PrimitiveKind::Character,
        "std::string" | "std::wstring" | "string" | "wstring" => PrimitiveKind::String,
        "float" | "double" | "long double" => PrimitiveKind::Float,
        "int" | "short" | "long" | "long long" | "short int" | "long int" | "long long int"
        | "signed" | "signed char" | "size_t" | "ssize_t" | "ptrdiff_t" | "intptr_t"
        | "uintptr_t" => PrimitiveKind::Integer,
        _ if is_fixed_width_integer(base) => PrimitiveKind::Integer,
        _ => return None,
    };
    Some(kind)
}

/// `int8_t` .. `uint64_t`, with or without a `std::` prefix.
fn is_fixed_width_integer(base: &str) -> bool {
    let name = base.strip_prefix("std::").unwrap_or(base);
    let digits = name
        .strip_prefix("uint")
        .or_else(|| name.strip_prefix("int"))
        .and_then(|rest| rest.strip_suffix("_t"));
    matches!(digits, Some("8" | "16" | "32" | "64"))
}
