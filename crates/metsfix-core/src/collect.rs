//! Image-reference collection.
//!
//! Walks the document in pre-order and gathers every attribute value
//! ending in the configured image extension — the order in which a
//! reader of the serialized file would encounter them.

use crate::xml::Document;

/// Collect image references in document order. Read-only; a document
/// without references yields an empty vec.
pub fn collect_image_refs(doc: &Document, extension: &str) -> Vec<String> {
    let mut refs = Vec::new();
    for id in doc.pre_order() {
        for attr in doc.attributes(id) {
            if attr.value.ends_with(extension) {
                refs.push(attr.value.clone());
            }
        }
    }
    refs
}

// ─── Tests ─────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    #[test]
    fn test_collects_in_document_order() {
        let doc = parse_str(
            r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
                 <mets:fileSec>
                   <mets:file ID="FILE_0001"><mets:FLocat xlink:href="00000001.tif"/></mets:file>
                   <mets:file ID="FILE_0002"><mets:FLocat xlink:href="00000002.tif"/></mets:file>
                   <mets:file ID="FILE_0003"><mets:FLocat xlink:href="00000001.tif"/></mets:file>
                 </mets:fileSec>
               </mets:mets>"#,
        )
        .unwrap();

        let refs = collect_image_refs(&doc, ".tif");
        assert_eq!(refs, vec!["00000001.tif", "00000002.tif", "00000001.tif"]);
    }

    #[test]
    fn test_ignores_non_matching_attributes() {
        let doc = parse_str(
            r#"<a href="scan.tif" other="scan.jpg" note="tif">
                 <b href="deep.tif">file.tif as text is ignored</b>
               </a>"#,
        )
        .unwrap();

        let refs = collect_image_refs(&doc, ".tif");
        assert_eq!(refs, vec!["scan.tif", "deep.tif"]);
    }

    #[test]
    fn test_no_references_yields_empty() {
        let doc = parse_str("<a><b/></a>").unwrap();
        assert!(collect_image_refs(&doc, ".tif").is_empty());
    }
}
