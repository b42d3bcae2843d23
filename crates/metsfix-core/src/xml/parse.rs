//! Event-driven construction of a [`Document`] from XML bytes.

use quick_xml::events::Event;

use crate::error::{MetsfixError, Result};

use super::{Attribute, Document, NodeId, QName};

/// Parse a document from raw bytes.
///
/// Whitespace-only text is dropped (the serializer re-indents on save);
/// meaningful text and comments are preserved. Malformed input, a
/// missing root, or multiple roots all yield [`MetsfixError::Parse`].
pub fn parse_bytes(input: &[u8]) -> Result<Document> {
    let mut reader = quick_xml::reader::Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut doc: Option<Document> = None;
    let mut stack: Vec<NodeId> = Vec::new();
    let mut buf = Vec::with_capacity(256);

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| parse_error(&reader, &e.to_string()))?;
        match event {
            Event::Start(e) => {
                let id = open_element(&reader, &mut doc, &stack, &e)?;
                stack.push(id);
            }
            Event::Empty(e) => {
                open_element(&reader, &mut doc, &stack, &e)?;
            }
            Event::End(_) => {
                stack.pop();
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| parse_error(&reader, &err.to_string()))?;
                if let (Some(&parent), Some(document)) = (stack.last(), doc.as_mut()) {
                    if !text.is_empty() {
                        document.push_text(parent, text.into_owned());
                    }
                }
            }
            Event::CData(e) => {
                let text = reader.decoder().decode(&e).unwrap_or_default().into_owned();
                if let (Some(&parent), Some(document)) = (stack.last(), doc.as_mut()) {
                    document.push_text(parent, text);
                }
            }
            Event::Comment(e) => {
                let text = reader.decoder().decode(&e).unwrap_or_default().into_owned();
                if let (Some(&parent), Some(document)) = (stack.last(), doc.as_mut()) {
                    document.push_comment(parent, text);
                }
            }
            Event::Eof => break,
            // Declaration, doctype and processing instructions are not part
            // of the model; the serializer emits its own declaration.
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(parse_error(&reader, "unclosed element"));
    }
    doc.ok_or_else(|| MetsfixError::Parse("no root element".to_string()))
}

/// Parse a document from a string slice.
pub fn parse_str(input: &str) -> Result<Document> {
    parse_bytes(input.as_bytes())
}

fn open_element(
    reader: &quick_xml::reader::Reader<&[u8]>,
    doc: &mut Option<Document>,
    stack: &[NodeId],
    e: &quick_xml::events::BytesStart<'_>,
) -> Result<NodeId> {
    let name = QName::new(
        reader
            .decoder()
            .decode(e.name().as_ref())
            .unwrap_or_default()
            .into_owned(),
    );

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| parse_error(reader, &err.to_string()))?;
        let key = reader
            .decoder()
            .decode(attr.key.as_ref())
            .unwrap_or_default()
            .into_owned();
        let value = attr
            .unescape_value()
            .map_err(|err| parse_error(reader, &err.to_string()))?
            .into_owned();
        attributes.push(Attribute {
            name: QName::new(key),
            value,
        });
    }

    match (stack.last(), doc.as_mut()) {
        (Some(&parent), Some(document)) => Ok(document.push_element(parent, name, attributes)),
        (None, Some(_)) => Err(parse_error(reader, "multiple root elements")),
        _ => {
            let mut document = Document::new(name);
            let root = document.root();
            document.nodes[root].attributes = attributes;
            *doc = Some(document);
            Ok(root)
        }
    }
}

fn parse_error(reader: &quick_xml::reader::Reader<&[u8]>, message: &str) -> MetsfixError {
    MetsfixError::Parse(format!(
        "{message} at byte {}",
        reader.buffer_position()
    ))
}

// ─── Tests ─────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_document() {
        let doc = parse_str(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<mets:mets xmlns:mets="http://www.loc.gov/METS/">
  <mets:fileSec>
    <mets:file ID="FILE_0001" MIMETYPE="image/tiff"/>
  </mets:fileSec>
</mets:mets>"#,
        )
        .unwrap();

        let ids: Vec<String> = doc
            .pre_order()
            .map(|id| doc.name(id).as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["mets:mets", "mets:fileSec", "mets:file"]);

        let file = doc.pre_order().last().unwrap();
        assert_eq!(doc.attribute(file, "ID"), Some("FILE_0001"));
        assert_eq!(doc.attribute(file, "MIMETYPE"), Some("image/tiff"));
    }

    #[test]
    fn test_parse_preserves_text_and_attribute_entities() {
        let doc = parse_str(r#"<a title="x &amp; y">one &lt; two</a>"#).unwrap();
        let root = doc.root();
        assert_eq!(doc.attribute(root, "title"), Some("x & y"));
        assert_eq!(
            doc.children(root),
            &[super::super::Content::Text("one < two".to_string())]
        );
    }

    #[test]
    fn test_parse_drops_whitespace_only_text() {
        let doc = parse_str("<a>\n  <b/>\n</a>").unwrap();
        let root = doc.root();
        assert_eq!(doc.children(root).len(), 1);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(parse_str("<a><b></a>").is_err());
        assert!(parse_str("").is_err());
        assert!(parse_str("not xml at all").is_err());
    }

    #[test]
    fn test_parse_rejects_multiple_roots() {
        assert!(parse_str("<a/><b/>").is_err());
    }
}
