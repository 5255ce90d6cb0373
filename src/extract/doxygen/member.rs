//! Reading types and parameter lists out of `<memberdef>` elements.

use ahash::AHashMap;
use roxmltree::Node;
use wrapgen_symbols::{Parameter, TypeDescriptor};

use super::xml::{child_text, children};

/// Declaration keywords that doxygen leaves in `<type>` but that say nothing
/// about the value's shape.
const STORAGE_KEYWORDS: [&str; 5] = ["virtual", "static", "inline", "explicit", "extern"];

/// Close up pointer and reference markers: `char *` -> `char*`.
pub fn normalize_type(raw: &str) -> String {
    raw.replace(" *", "*").replace(" &", "&")
}

pub fn strip_storage_keywords(raw: &str) -> String {
    raw.split_whitespace()
        .filter(|token| !STORAGE_KEYWORDS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The member's `<type>`, cleaned up for [`TypeDescriptor::parse`].
pub fn member_type(member: Node<'_, '_>) -> String {
    let raw = child_text(member, "type").unwrap_or_default();
    normalize_type(&strip_storage_keywords(&raw))
}

/// Parameters in declaration order. `Err(position)` (1-based) names the
/// first parameter without a declared name; a lone `void` is an empty list.
pub fn read_parameters(
    member: Node<'_, '_>,
    descriptions: &AHashMap<String, String>,
) -> Result<Vec<Parameter>, usize> {
    let params: Vec<Node<'_, '_>> = children(member, "param").collect();

    if let [only] = params.as_slice() {
        let declname = child_text(*only, "declname").unwrap_or_default();
        if declname.is_empty() && child_text(*only, "type").as_deref() == Some("void") {
            return Ok(Vec::new());
        }
    }

    let mut parameters = Vec::with_capacity(params.len());
    for (idx, param) in params.iter().enumerate() {
        let name = child_text(*param, "declname").unwrap_or_default();
        if name.is_empty() {
            return Err(idx + 1);
        }

        let mut raw = normalize_type(&child_text(*param, "type").unwrap_or_default());
        if let Some(array) = child_text(*param, "array") {
            raw.push_str(&array);
        }
        let description = descriptions.get(&name).cloned().unwrap_or_default();
        let ty = TypeDescriptor::parse(&raw).with_description(description);
        let default = child_text(*param, "defval").unwrap_or_default();

        parameters.push(Parameter::new(name, ty).with_default(default));
    }

    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn parse_params(xml: &str) -> Result<Vec<Parameter>, usize> {
        let doc = Document::parse(xml).unwrap();
        read_parameters(doc.root_element(), &AHashMap::new())
    }

    #[test]
    fn spacing_is_normalized() {
        assert_eq!(normalize_type("const char *"), "const char*");
        assert_eq!(normalize_type("wxString &"), "wxString&");
        assert_eq!(normalize_type("char * *"), "char**");
    }

    #[test]
    fn storage_keywords_are_dropped() {
        assert_eq!(strip_storage_keywords("virtual const wxString &"), "const wxString &");
        assert_eq!(strip_storage_keywords("static inline int"), "int");
    }

    #[test]
    fn lone_void_means_no_parameters() {
        let params = parse_params("<memberdef><param><type>void</type></param></memberdef>").unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn unnamed_parameter_reports_position() {
        let err = parse_params(
            "<memberdef>\
               <param><type>int</type><declname>a</declname></param>\
               <param><type>int</type></param>\
             </memberdef>",
        )
        .unwrap_err();
        assert_eq!(err, 2);
    }

    #[test]
    fn array_and_default_are_read() {
        let params = parse_params(
            "<memberdef>\
               <param><type>int</type><declname>values</declname><array>[4]</array></param>\
               <param><type>bool</type><declname>flag</declname><defval>true</defval></param>\
             </memberdef>",
        )
        .unwrap();
        assert!(params[0].ty.is_array);
        assert_eq!(params[0].ty.base_type, "int");
        assert_eq!(params[1].default_value, "true");
        assert!(params[1].is_optional());
    }
}
