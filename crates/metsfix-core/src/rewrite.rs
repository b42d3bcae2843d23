//! Structural rewriting for one duplicate group.
//!
//! Strictly two-phase: every node to touch is marked during a read-only
//! walk, then redirects are applied, then removals — redirects first,
//! because removal deletes the identifier a redirect needs to read.

use std::collections::HashSet;

use tracing::debug;

use crate::resolve::DuplicateGroup;
use crate::xml::{Document, NodeId};

/// What one rewrite pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// Structural links rewritten to the canonical physical entry.
    pub redirected_links: usize,
    /// Subtrees detached from the document.
    pub removed_nodes: usize,
}

/// Apply one duplicate group to the document.
///
/// Redirects every structural-link `to` attribute that points at a
/// removed PHYSID to the canonical PHYSID, then detaches every element
/// whose `ID` is marked for removal (subtree removed as a unit). When
/// the group has no surviving physical entry the links are removed
/// instead of redirected, so no dangling link is ever left behind.
pub fn apply_group(doc: &mut Document, group: &DuplicateGroup) -> RewriteOutcome {
    let marked_ids: HashSet<&str> = group
        .redundant_files
        .iter()
        .chain(group.redundant_phys.iter())
        .map(String::as_str)
        .collect();
    let marked_phys: HashSet<&str> = group.redundant_phys.iter().map(String::as_str).collect();

    // Mark phase: materialize targets before any mutation.
    let mut links_to_rewrite: Vec<NodeId> = Vec::new();
    let mut nodes_to_remove: Vec<NodeId> = Vec::new();
    for id in doc.pre_order() {
        if let Some(id_value) = doc.attribute(id, "ID") {
            if marked_ids.contains(id_value) {
                nodes_to_remove.push(id);
                continue;
            }
        }
        if let Some(target) = doc.attribute(id, "to") {
            if marked_phys.contains(target) {
                links_to_rewrite.push(id);
            }
        }
    }

    // Redirect phase, before removal.
    let mut redirected_links = 0;
    match &group.canonical_phys {
        Some(canonical) => {
            for &id in &links_to_rewrite {
                if doc.set_attribute(id, "to", canonical) {
                    redirected_links += 1;
                }
            }
        }
        None => nodes_to_remove.extend(&links_to_rewrite),
    }

    // Removal phase.
    let mut removed_nodes = 0;
    for &id in &nodes_to_remove {
        if doc.detach(id) {
            removed_nodes += 1;
        }
    }

    debug!(
        value = %group.value,
        redirected_links,
        removed_nodes,
        "applied duplicate group"
    );
    RewriteOutcome {
        redirected_links,
        removed_nodes,
    }
}

/// Reassign every `ORDER` attribute in document order, counting
/// contiguously upward from 1 regardless of the stored values. Returns
/// the number of renumbered entries.
pub fn renumber_order(doc: &mut Document) -> usize {
    let ordered: Vec<NodeId> = doc
        .pre_order()
        .filter(|&id| doc.attribute(id, "ORDER").is_some())
        .collect();
    for (index, &id) in ordered.iter().enumerate() {
        doc.set_attribute(id, "ORDER", &(index + 1).to_string());
    }
    ordered.len()
}

// ─── Tests ─────────────────────────────────────────────────
