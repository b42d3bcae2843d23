//! Deterministic serialization of a [`Document`].
//!
//! The repaired file overwrites the original, so output must be stable:
//! attributes in stored order, two-space indentation, text-only elements
//! on one line, empty elements self-closed. Serializing the same tree
//! twice yields identical bytes.

use quick_xml::escape::escape;

use super::{Content, Document, NodeId};

const INDENT: &str = "  ";

/// Serialize the whole document, XML declaration included.
pub fn to_xml_string(doc: &Document) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_element(doc, doc.root(), 0, &mut out);
    out
}

fn write_element(doc: &Document, id: NodeId, depth: usize, out: &mut String) {
    push_indent(depth, out);
    out.push('<');
    out.push_str(doc.name(id).as_str());
    for attr in doc.attributes(id) {
        out.push(' ');
        out.push_str(attr.name.as_str());
        out.push_str("=\"");
        out.push_str(&escape(attr.value.as_str()));
        out.push('"');
    }

    let children = doc.children(id);
    if children.is_empty() {
        out.push_str("/>\n");
        return;
    }

    // Pure text content stays on one line; anything structured gets
    // one child per line.
    if children.iter().all(|c| matches!(c, Content::Text(_))) {
        out.push('>');
        for child in children {
            if let Content::Text(text) = child {
                out.push_str(&escape(text.as_str()));
            }
        }
        out.push_str("</");
        out.push_str(doc.name(id).as_str());
        out.push_str(">\n");
        return;
    }

    out.push_str(">\n");
    for child in children {
        match child {
            Content::Element(child_id) => write_element(doc, *child_id, depth + 1, out),
            Content::Text(text) => {
                push_indent(depth + 1, out);
                out.push_str(&escape(text.as_str()));
                out.push('\n');
            }
            Content::Comment(comment) => {
                push_indent(depth + 1, out);
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->\n");
            }
        }
    }
    push_indent(depth, out);
    out.push_str("</");
    out.push_str(doc.name(id).as_str());
    out.push_str(">\n");
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

// ─── Tests ─────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::super::parse_str;
    use super::*;

    #[test]
    fn test_serialization_is_stable() {
        let input = r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/">
            <mets:file ID="FILE_0001"><mets:FLocat xlink:href="00000001.tif"/></mets:file>
        </mets:mets>"#;
        let doc = parse_str(input).unwrap();
        let once = to_xml_string(&doc);
        let twice = to_xml_string(&parse_str(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_attribute_order_is_preserved() {
        let doc = parse_str(r#"<a ZULU="1" alpha="2" ID="3"/>"#).unwrap();
        let out = to_xml_string(&doc);
        assert!(out.contains(r#"<a ZULU="1" alpha="2" ID="3"/>"#));
    }

    #[test]
    fn test_text_only_element_is_inline() {
        let doc = parse_str("<outer><title>Der Titel</title></outer>").unwrap();
        let out = to_xml_string(&doc);
        assert!(out.contains("  <title>Der Titel</title>\n"));
    }

    #[test]
    fn test_escaping_round_trips() {
        let doc = parse_str(r#"<a note="x &amp; y">a &lt; b</a>"#).unwrap();
        let out = to_xml_string(&doc);
        let again = parse_str(&out).unwrap();
        assert_eq!(again.attribute(again.root(), "note"), Some("x & y"));
    }

    #[test]
    fn test_declaration_and_trailing_newline() {
        let doc = parse_str("<a/>").unwrap();
        let out = to_xml_string(&doc);
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(out.ends_with("<a/>\n"));
    }
}
