//! Cross-reference resolution for one duplicate image reference.
//!
//! Pure tree search, no mutation. For a duplicate value this traces the
//! chain file entry → physical entry: carriers of the value are mapped
//! to their owning `ID`-bearing elements (the FILEIDs), and `FILEID`
//! references to those are mapped to their owning elements (the
//! PHYSIDs). "First encountered" always means document pre-order, the
//! same order the detector used, so the canonical-first rule is
//! consistent end to end.

use std::collections::{HashMap, HashSet};

use crate::xml::{Document, NodeId};

/// The identifiers involved in repairing one duplicated reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// The duplicated image reference value.
    pub value: String,
    /// FILEID of the surviving first occurrence.
    pub canonical_file: Option<String>,
    /// FILEIDs of later occurrences, marked for removal.
    pub redundant_files: Vec<String>,
    /// PHYSID of the surviving physical position.
    pub canonical_phys: Option<String>,
    /// PHYSIDs marked for removal.
    pub redundant_phys: Vec<String>,
}

impl DuplicateGroup {
    /// A group with nothing to remove — a dangling duplicate whose
    /// repair is a no-op (ResolutionGap).
    pub fn is_noop(&self) -> bool {
        self.redundant_files.is_empty() && self.redundant_phys.is_empty()
    }
}

/// Resolve the duplicate group for one reference value.
pub fn resolve_group(doc: &Document, value: &str) -> DuplicateGroup {
    // File entries: every carrier of the value, traced to the nearest
    // self-or-ancestor element with an ID attribute.
    let mut file_ids: Vec<String> = Vec::new();
    let mut seen_files: HashSet<String> = HashSet::new();
    for id in doc.pre_order() {
        if doc.attributes(id).iter().any(|a| a.value == value) {
            if let Some(owner) = owning_id(doc, id) {
                if seen_files.insert(owner.clone()) {
                    file_ids.push(owner);
                }
            }
        }
    }

    let canonical_file = file_ids.first().cloned();
    let redundant_files: Vec<String> = file_ids.iter().skip(1).cloned().collect();
    let all_files: HashSet<&str> = file_ids.iter().map(String::as_str).collect();
    let redundant_set: HashSet<&str> = redundant_files.iter().map(String::as_str).collect();

    // Physical entries: every FILEID reference into the group, traced to
    // its owning ID. Track whether each physical entry touches a
    // redundant file entry; only those are removal candidates.
    let mut phys_ids: Vec<String> = Vec::new();
    let mut touches_redundant: HashMap<String, bool> = HashMap::new();
    for id in doc.pre_order() {
        for attr in doc.attributes(id) {
            if attr.name.local() != "FILEID" || !all_files.contains(attr.value.as_str()) {
                continue;
            }
            let Some(owner) = owning_id(doc, id) else {
                continue;
            };
            if all_files.contains(owner.as_str()) {
                continue;
            }
            let redundant = redundant_set.contains(attr.value.as_str());
            match touches_redundant.get_mut(&owner) {
                Some(flag) => *flag |= redundant,
                None => {
                    touches_redundant.insert(owner.clone(), redundant);
                    phys_ids.push(owner);
                }
            }
        }
    }

    // The first physical entry encountered overall is the canonical
    // anchor and is never removed: the page still physically exists.
    let canonical_phys = phys_ids.first().cloned();
    let redundant_phys: Vec<String> = phys_ids
        .iter()
        .skip(1)
        .filter(|p| touches_redundant[p.as_str()])
        .cloned()
        .collect();

    DuplicateGroup {
        value: value.to_string(),
        canonical_file,
        redundant_files,
        canonical_phys,
        redundant_phys,
    }
}

/// Nearest self-or-ancestor element carrying an `ID` attribute.
fn owning_id(doc: &Document, start: NodeId) -> Option<String> {
    let mut current = Some(start);
    while let Some(id) = current {
        if let Some(value) = doc.attribute(id, "ID") {
            return Some(value.to_string());
        }
        current = doc.parent(id);
    }
    None
}

// ─── Tests ─────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    const FIXTURE: &str = r#"<mets:mets xmlns:mets="http://www.loc.gov/METS/" xmlns:xlink="http://www.w3.org/1999/xlink">
  <mets:fileSec>
    <mets:fileGrp USE="PRESENTATION">
      <mets:file ID="FILE_0001"><mets:FLocat xlink:href="00000001.tif"/></mets:file>
      <mets:file ID="FILE_0002"><mets:FLocat xlink:href="00000002.tif"/></mets:file>
      <mets:file ID="FILE_0003"><mets:FLocat xlink:href="00000001.tif"/></mets:file>
    </mets:fileGrp>
  </mets:fileSec>
  <mets:structMap TYPE="PHYSICAL">
    <mets:div ID="PHYS_0000" TYPE="physSequence">
      <mets:div ID="PHYS_0001" ORDER="1" TYPE="page"><mets:fptr FILEID="FILE_0001"/></mets:div>
      <mets:div ID="PHYS_0002" ORDER="2" TYPE="page"><mets:fptr FILEID="FILE_0002"/></mets:div>
      <mets:div ID="PHYS_0003" ORDER="3" TYPE="page"><mets:fptr FILEID="FILE_0003"/></mets:div>
    </mets:div>
  </mets:structMap>
</mets:mets>"#;

    #[test]
    fn test_first_occurrence_is_canonical() {
        let doc = parse_str(FIXTURE).unwrap();
        let group = resolve_group(&doc, "00000001.tif");

        assert_eq!(group.canonical_file.as_deref(), Some("FILE_0001"));
        assert_eq!(group.redundant_files, vec!["FILE_0003"]);
        assert_eq!(group.canonical_phys.as_deref(), Some("PHYS_0001"));
        assert_eq!(group.redundant_phys, vec!["PHYS_0003"]);
        assert!(!group.is_noop());
    }

    #[test]
    fn test_unique_reference_resolves_to_noop() {
        let doc = parse_str(FIXTURE).unwrap();
        let group = resolve_group(&doc, "00000002.tif");

        assert_eq!(group.canonical_file.as_deref(), Some("FILE_0002"));
        assert!(group.redundant_files.is_empty());
        assert!(group.redundant_phys.is_empty());
        assert!(group.is_noop());
    }

    #[test]
    fn test_phys_referencing_only_canonical_file_survives() {
        // A second page pointing at the canonical file entry must not be
        // marked for removal.
        let doc = parse_str(
            r#"<m xmlns:xlink="http://www.w3.org/1999/xlink">
  <fs>
    <file ID="F1"><loc xlink:href="a.tif"/></file>
    <file ID="F2"><loc xlink:href="a.tif"/></file>
  </fs>
  <sm>
    <div ID="P1"><fptr FILEID="F1"/></div>
    <div ID="P2"><fptr FILEID="F1"/></div>
    <div ID="P3"><fptr FILEID="F2"/></div>
  </sm>
</m>"#,
        )
        .unwrap();

        let group = resolve_group(&doc, "a.tif");
        assert_eq!(group.redundant_files, vec!["F2"]);
        assert_eq!(group.canonical_phys.as_deref(), Some("P1"));
        assert_eq!(group.redundant_phys, vec!["P3"]);
    }

    #[test]
    fn test_dangling_duplicate_yields_empty_group() {
        // Carriers with no ID anywhere up the chain: nothing to anchor a
        // removal on, so the resolver returns an empty result instead of
        // failing.
        let doc = parse_str(
            r#"<m xmlns:xlink="http://www.w3.org/1999/xlink">
  <loc xlink:href="a.tif"/>
  <loc xlink:href="a.tif"/>
</m>"#,
        )
        .unwrap();

        let group = resolve_group(&doc, "a.tif");
        assert!(group.canonical_file.is_none());
        assert!(group.is_noop());
    }

    #[test]
    fn test_resolution_is_pure() {
        let doc = parse_str(FIXTURE).unwrap();
        let before = crate::xml::to_xml_string(&doc);
        let _ = resolve_group(&doc, "00000001.tif");
        assert_eq!(crate::xml::to_xml_string(&doc), before);
    }
}
