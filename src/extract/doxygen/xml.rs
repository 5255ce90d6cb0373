//! Small accessors over `roxmltree` nodes.

use ahash::AHashMap;
use roxmltree::Node;

pub fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

pub fn children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| child.has_tag_name(tag))
}

/// All descendant text with runs of whitespace collapsed to one space.
pub fn text_content(node: Node<'_, '_>) -> String {
    let mut raw = String::new();
    for descendant in node.descendants() {
        if let Some(text) = descendant.text().filter(|_| descendant.is_text()) {
            raw.push_str(text);
        }
    }
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag).map(text_content)
}

pub fn flag(node: Node<'_, '_>, attribute: &str) -> bool {
    node.attribute(attribute) == Some("yes")
}

/// Text of `<briefdescription>`.
pub fn brief(node: Node<'_, '_>) -> String {
    child_text(node, "briefdescription").unwrap_or_default()
}

/// Text of `<simplesect kind="return">` inside the detailed description.
pub fn return_description(member: Node<'_, '_>) -> String {
    child(member, "detaileddescription")
        .and_then(|detail| {
            detail.descendants().find(|node| {
                node.has_tag_name("simplesect") && node.attribute("kind") == Some("return")
            })
        })
        .map(text_content)
        .unwrap_or_default()
}

/// Parameter name to text from `<parameterlist kind="param">`.
pub fn parameter_descriptions(member: Node<'_, '_>) -> AHashMap<String, String> {
    let mut descriptions = AHashMap::new();
    let Some(detail) = child(member, "detaileddescription") else {
        return descriptions;
    };

    for list in detail
        .descendants()
        .filter(|node| node.has_tag_name("parameterlist") && node.attribute("kind") == Some("param"))
    {
        for item in children(list, "parameteritem") {
            let text = child_text(item, "parameterdescription").unwrap_or_default();
            let Some(names) = child(item, "parameternamelist") else {
                continue;
            };
            for name in children(names, "parametername") {
                descriptions.insert(text_content(name), text.clone());
            }
        }
    }

    descriptions
}

/// True when the detailed description carries a "Deprecated" cross-reference
/// section.
pub fn is_deprecated(member: Node<'_, '_>) -> bool {
    let Some(detail) = child(member, "detaileddescription") else {
        return false;
    };
    detail.descendants().any(|node| {
        node.has_tag_name("xrefsect")
            && (node
                .attribute("id")
                .is_some_and(|id| id.starts_with("deprecated"))
                || child_text(node, "xreftitle").as_deref() == Some("Deprecated"))
    })
}
