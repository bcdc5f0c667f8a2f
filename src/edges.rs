use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::{EntityKind, collapse};

/// Edge between original node identities. Node labels are canonical id-set serializations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollapsedKey {
    pub source: String,
    pub target: String,
    pub source_kind: EntityKind,
    pub target_kind: EntityKind,
}

impl CollapsedKey {
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
            source_kind: self.target_kind,
            target_kind: self.source_kind,
        }
    }
}

/// Edge between two single external identifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpandedKey {
    pub source: String,
    pub target: String,
}

impl ExpandedKey {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }
}

/// Deduplicating edge store: one entry per key, holding the union of every label observed
/// for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap<K: Ord> {
    edges: BTreeMap<K, BTreeSet<String>>,
}

impl<K: Ord> Default for EdgeMap<K> {
    fn default() -> Self {
        Self {
            edges: BTreeMap::new(),
        }
    }
}

impl<K: Ord> EdgeMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds labels to the set at `key`, creating an empty set first for a new key.
    /// Merging the same labels again changes nothing.
    pub fn merge<I, S>(&mut self, key: K, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edges
            .entry(key)
            .or_default()
            .extend(labels.into_iter().map(Into::into));
    }

    pub fn get(&self, key: &K) -> Option<&BTreeSet<String>> {
        self.edges.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.edges.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &BTreeSet<String>)> {
        self.edges.iter()
    }
}

impl<K: Ord + Clone> EdgeMap<K> {
    /// Merges under `key` and, when `symmetric`, under `reverse` as well.
    pub fn merge_both<I, S>(&mut self, key: K, reverse: K, labels: I, symmetric: bool)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = labels.into_iter().map(Into::into).collect::<Vec<String>>();
        if symmetric {
            self.merge(reverse, labels.iter().cloned());
        }
        self.merge(key, labels);
    }
}

pub type CollapsedEdges = EdgeMap<CollapsedKey>;
pub type ExpandedEdges = EdgeMap<ExpandedKey>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollapsedRow {
    pub node1: String,
    pub node2: String,
    pub node1_kind: EntityKind,
    pub node2_kind: EntityKind,
    pub relation_types: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedRow {
    pub node1: String,
    pub node2: String,
    pub edge_types: String,
}

impl CollapsedEdges {
    pub fn rows(&self) -> Vec<CollapsedRow> {
        self.iter()
            .map(|(key, labels)| CollapsedRow {
                node1: key.source.clone(),
                node2: key.target.clone(),
                node1_kind: key.source_kind,
                node2_kind: key.target_kind,
                relation_types: collapse(labels),
            })
            .collect()
    }
}

impl ExpandedEdges {
    pub fn rows(&self) -> Vec<ExpandedRow> {
        self.iter()
            .map(|(key, labels)| ExpandedRow {
                node1: key.source.clone(),
                node2: key.target.clone(),
                edge_types: collapse(labels),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_creates_and_unions() {
        let mut map = ExpandedEdges::new();
        map.merge(ExpandedKey::new("A", "B"), ["group_expansion"]);
        map.merge(
            ExpandedKey::new("A", "B"),
            ["one_to_one_mapping:activation".to_string()],
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&ExpandedKey::new("A", "B")).unwrap().len(), 2);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut once = ExpandedEdges::new();
        once.merge(ExpandedKey::new("A", "B"), ["x", "y"]);
        let mut twice = once.clone();
        twice.merge(ExpandedKey::new("A", "B"), ["x", "y"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_empty_collection_keeps_key() {
        let mut map = ExpandedEdges::new();
        map.merge(ExpandedKey::new("A", "B"), Vec::<String>::new());
        assert!(map.contains_key(&ExpandedKey::new("A", "B")));
        assert!(map.get(&ExpandedKey::new("A", "B")).unwrap().is_empty());
    }

    #[test]
    fn merge_both_mirrors_undirected_edges() {
        let key = CollapsedKey {
            source: "P1|P2".to_string(),
            target: "Q1".to_string(),
            source_kind: EntityKind::Group,
            target_kind: EntityKind::Gene,
        };
        let mut map = CollapsedEdges::new();
        map.merge_both(key.clone(), key.reversed(), ["binding/association"], false);
        assert!(!map.contains_key(&key.reversed()));
        map.merge_both(key.clone(), key.reversed(), ["dissociation"], true);
        let reverse = map.get(&key.reversed()).unwrap();
        assert_eq!(reverse.len(), 1);
        assert_eq!(reverse.iter().next().unwrap(), "dissociation");
        assert_eq!(key.reversed().source_kind, EntityKind::Gene);
    }

    #[test]
    fn rows_join_sorted_labels() {
        let mut map = CollapsedEdges::new();
        let key = CollapsedKey {
            source: "P1".to_string(),
            target: "P2".to_string(),
            source_kind: EntityKind::Gene,
            target_kind: EntityKind::Gene,
        };
        map.merge(key, ["phosphorylation", "activation"]);
        let rows = map.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].relation_types, "activation|phosphorylation");
    }
}
