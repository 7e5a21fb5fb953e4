use rustc_hash::FxHashMap;

use crate::strings;

/// A resolved `[label]: destination "title"` definition.
#[derive(Debug, Clone)]
pub struct ResolvedReference {
    pub url: Vec<u8>,
    pub title: Vec<u8>,
}

/// The set of link reference definitions extracted from paragraph heads
/// during finalization, keyed by normalized label.
///
/// Handed to the inline collaborator once parsing is finished; the block
/// parser itself never resolves a reference, only records it.
#[derive(Debug, Default)]
pub struct RefMap {
    pub map: FxHashMap<String, ResolvedReference>,
}

impl RefMap {
    pub fn new() -> Self {
        RefMap {
            map: FxHashMap::default(),
        }
    }

    /// Insert a definition unless one already exists for this label --
    /// CommonMark specifies first-definition-wins.
    pub fn insert(&mut self, label: &[u8], url: Vec<u8>, title: Vec<u8>) {
        let normalized = strings::normalize_reference_label(label);
        if normalized.is_empty() {
            return;
        }
        self.map
            .entry(normalized)
            .or_insert(ResolvedReference { url, title });
    }

    pub fn lookup(&self, label: &[u8]) -> Option<&ResolvedReference> {
        let normalized = strings::normalize_reference_label(label);
        self.map.get(&normalized)
    }
}
