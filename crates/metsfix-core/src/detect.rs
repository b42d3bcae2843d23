//! Duplicate detection over an ordered reference sequence.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

/// One reference value that occurs more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    /// The repeated image reference.
    pub value: String,
    /// Number of redundant occurrences beyond the canonical first one.
    pub excess: usize,
}

/// Result of scanning a reference sequence, duplicates in the order
/// their second occurrence was first seen. That order is a pure function
/// of the input sequence, so repeated runs report identically.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DuplicateScan {
    pub duplicates: Vec<Duplicate>,
}

impl DuplicateScan {
    pub fn found(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Count of distinct duplicated values.
    pub fn distinct(&self) -> usize {
        self.duplicates.len()
    }
}

/// Find repeated values in an ordered reference sequence.
///
/// The first textual occurrence of each value is canonical and never
/// counted; every later occurrence adds to that value's excess.
pub fn find_duplicates(refs: &[String]) -> DuplicateScan {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut duplicates: Vec<Duplicate> = Vec::new();

    for value in refs {
        if !seen.insert(value.as_str()) {
            match index.get(value.as_str()) {
                Some(&i) => duplicates[i].excess += 1,
                None => {
                    index.insert(value.as_str(), duplicates.len());
                    duplicates.push(Duplicate {
                        value: value.clone(),
                        excess: 1,
                    });
                }
            }
        }
    }

    DuplicateScan { duplicates }
}

// ─── Tests ─────────────────────────────────────────────────
