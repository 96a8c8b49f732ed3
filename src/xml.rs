//! Namespace-agnostic helpers over `roxmltree`.
//!
//! PresentationML mixes the `p:`, `a:`, `r:` and `c:` namespaces, and decks written by
//! third-party tools do not always bind them to the canonical URIs. Every lookup here matches
//! on the local name only.

use roxmltree::Node;

/// Returns `true` if `node` is an element whose local name is `name`.
pub fn is(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

/// First direct child element with the given local name.
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| is(*c, name))
}

/// All direct child elements with the given local name, in document order.
pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| is(*c, name))
}

/// Direct child elements, skipping text and comments.
pub fn element_children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(|c| c.is_element())
}

/// Follows a chain of direct children, e.g. `path(sp, &["spPr", "xfrm", "off"])`.
pub fn path<'a, 'input>(node: Node<'a, 'input>, names: &[&str]) -> Option<Node<'a, 'input>> {
    names.iter().try_fold(node, |current, name| child(current, name))
}

/// First descendant element (excluding `node` itself) with the given local name.
pub fn descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants().skip(1).find(|d| is(*d, name))
}

/// All descendant elements (excluding `node` itself) with the given local name.
pub fn descendants<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants().skip(1).filter(move |d| is(*d, name))
}

/// Attribute value by local name, ignoring the attribute's namespace (`r:embed` and `embed`
/// both match `"embed"`).
pub fn attr<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|a| a.name() == name)
        .map(|a| a.value())
}

/// Attribute parsed as an integer; `None` when absent or malformed.
pub fn attr_i64(node: Node<'_, '_>, name: &str) -> Option<i64> {
    attr(node, name).and_then(|v| v.trim().parse::<i64>().ok())
}

/// Boolean attribute in the XML Schema lexical space (`1`/`true`).
pub fn attr_bool(node: Node<'_, '_>, name: &str) -> Option<bool> {
    attr(node, name).map(|v| matches!(v.trim(), "1" | "true"))
}

/// Strips a UTF-8 byte-order mark that some producers prepend to parts.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const FRAGMENT: &str = r#"<p:sp xmlns:p="urn:p" xmlns:a="urn:a" xmlns:r="urn:r">
        <p:spPr><a:xfrm rot="5400000"><a:off x="10" y="20"/></a:xfrm></p:spPr>
        <p:txBody><a:p><a:r><a:t>Hello</a:t></a:r><a:r><a:t> world</a:t></a:r></a:p></p:txBody>
        <a:blip r:embed="rId7"/>
    </p:sp>"#;

    #[test]
    fn matches_local_names_regardless_of_prefix() {
        let doc = Document::parse(FRAGMENT).unwrap();
        let root = doc.root_element();
        let off = path(root, &["spPr", "xfrm", "off"]).unwrap();
        assert_eq!(attr_i64(off, "x"), Some(10));
        assert_eq!(attr_i64(off, "y"), Some(20));
        let blip = descendant(root, "blip").unwrap();
        assert_eq!(attr(blip, "embed"), Some("rId7"));
    }

    #[test]
    fn descendant_skips_the_node_itself() {
        let doc = Document::parse("<a><a/></a>").unwrap();
        let outer = doc.root_element();
        let inner = descendant(outer, "a").unwrap();
        assert_ne!(outer, inner);
        assert!(descendant(inner, "a").is_none());
    }

    #[test]
    fn strips_byte_order_mark() {
        assert_eq!(strip_bom("\u{feff}<x/>"), "<x/>");
        assert_eq!(strip_bom("<x/>"), "<x/>");
    }
}
