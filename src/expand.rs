use std::collections::BTreeSet;
use std::fmt;

use crate::domain::{EntityKind, IdSet, collapse};

/// Why an expanded edge exists.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Provenance {
    /// Two members of the same complex.
    GroupExpansion,
    /// Both endpoints resolved to exactly one identifier. Carries the relation's subtype label.
    OneToOne(String),
    /// At least one endpoint resolved to several identifiers.
    MultMapping(String),
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::GroupExpansion => write!(f, "group_expansion"),
            Provenance::OneToOne(label) => write!(f, "one_to_one_mapping:{label}"),
            Provenance::MultMapping(label) => write!(f, "mult_mapping_expansion:{label}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpandedEdge {
    pub source: String,
    pub target: String,
    pub provenance: Provenance,
}

impl ExpandedEdge {
    fn new(source: &str, target: &str, provenance: Provenance) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            provenance,
        }
    }
}

/// Canonical keys of the groups whose member edges were already emitted in one pathway run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedGroups(BTreeSet<String>);

impl ExpandedGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns false if the group was already recorded.
    fn insert(&mut self, ids: &IdSet) -> bool {
        self.0.insert(collapse(ids))
    }
}

/// Every ordered pair of distinct members.
pub fn group_edges(members: &IdSet) -> BTreeSet<ExpandedEdge> {
    members
        .iter()
        .flat_map(move |u1| {
            members
                .iter()
                .filter(move |u2| *u2 != u1)
                .map(move |u2| ExpandedEdge::new(u1, u2, Provenance::GroupExpansion))
        })
        .collect()
}

/// Expands one collapsed edge into edges between single identifiers.
///
/// Each group endpoint contributes its internal member edges the first time it is seen in a
/// pathway run; the endpoints are then joined one-to-one or by cross product. The
/// expansion state is taken and handed back so that it stays scoped to one run.
pub fn expand(
    n1: &IdSet,
    n2: &IdSet,
    kind1: EntityKind,
    kind2: EntityKind,
    subtype_label: &str,
    mut expanded_groups: ExpandedGroups,
) -> (BTreeSet<ExpandedEdge>, ExpandedGroups) {
    let mut edges = BTreeSet::new();

    for (ids, kind) in [(n1, kind1), (n2, kind2)] {
        if kind == EntityKind::Group && expanded_groups.insert(ids) {
            edges.extend(group_edges(ids));
        }
    }

    match (single(n1), single(n2)) {
        (Some(u1), Some(u2)) => {
            edges.insert(ExpandedEdge::new(
                u1,
                u2,
                Provenance::OneToOne(subtype_label.to_string()),
            ));
        }
        _ => {
            for u1 in n1 {
                for u2 in n2 {
                    edges.insert(ExpandedEdge::new(
                        u1,
                        u2,
                        Provenance::MultMapping(subtype_label.to_string()),
                    ));
                }
            }
        }
    }

    (edges, expanded_groups)
}

fn single(ids: &IdSet) -> Option<&str> {
    match ids.len() {
        1 => ids.iter().next().map(String::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[&str]) -> IdSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn count(edges: &BTreeSet<ExpandedEdge>, provenance: &Provenance) -> usize {
        edges.iter().filter(|e| &e.provenance == provenance).count()
    }

    #[test]
    fn provenance_tags() {
        assert_eq!(Provenance::GroupExpansion.to_string(), "group_expansion");
        assert_eq!(
            Provenance::OneToOne("activation".to_string()).to_string(),
            "one_to_one_mapping:activation"
        );
        assert_eq!(
            Provenance::MultMapping("activation|phosphorylation".to_string()).to_string(),
            "mult_mapping_expansion:activation|phosphorylation"
        );
    }

    #[test]
    fn one_to_one_genes() {
        let (edges, groups) = expand(
            &ids(&["P1"]),
            &ids(&["P2"]),
            EntityKind::Gene,
            EntityKind::Gene,
            "binding/association",
            ExpandedGroups::new(),
        );
        assert_eq!(edges.len(), 1);
        let edge = edges.iter().next().unwrap();
        assert_eq!(edge.source, "P1");
        assert_eq!(edge.target, "P2");
        assert_eq!(
            edge.provenance.to_string(),
            "one_to_one_mapping:binding/association"
        );
        assert!(groups.is_empty());
    }

    #[test]
    fn endpoints_are_not_consumed() {
        let n1 = ids(&["P1"]);
        let n2 = ids(&["P2"]);
        let _ = expand(
            &n1,
            &n2,
            EntityKind::Gene,
            EntityKind::Gene,
            "activation",
            ExpandedGroups::new(),
        );
        assert_eq!(n1, ids(&["P1"]));
        assert_eq!(n2, ids(&["P2"]));
    }

    #[test]
    fn group_source_to_gene_target() {
        let (edges, groups) = expand(
            &ids(&["A", "B", "C"]),
            &ids(&["D"]),
            EntityKind::Group,
            EntityKind::Gene,
            "activation",
            ExpandedGroups::new(),
        );
        assert_eq!(count(&edges, &Provenance::GroupExpansion), 6);
        let cross = Provenance::MultMapping("activation".to_string());
        assert_eq!(count(&edges, &cross), 3);
        for source in ["A", "B", "C"] {
            assert!(edges.contains(&ExpandedEdge::new(source, "D", cross.clone())));
        }
        assert_eq!(edges.len(), 9);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn group_expands_once_per_run() {
        let group = ids(&["A", "B", "C", "E"]);
        let (first, groups) = expand(
            &group,
            &ids(&["D"]),
            EntityKind::Group,
            EntityKind::Gene,
            "activation",
            ExpandedGroups::new(),
        );
        assert_eq!(count(&first, &Provenance::GroupExpansion), 12);

        let (second, groups) = expand(
            &ids(&["X"]),
            &group,
            EntityKind::Gene,
            EntityKind::Group,
            "inhibition",
            groups,
        );
        assert_eq!(count(&second, &Provenance::GroupExpansion), 0);
        assert_eq!(second.len(), 4);
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn multi_mapped_gene_uses_cross_product() {
        let (edges, groups) = expand(
            &ids(&["P1", "P2"]),
            &ids(&["Q1", "Q2", "Q3"]),
            EntityKind::Gene,
            EntityKind::Gene,
            "phosphorylation",
            ExpandedGroups::new(),
        );
        assert_eq!(edges.len(), 6);
        assert!(
            edges
                .iter()
                .all(|e| e.provenance.to_string() == "mult_mapping_expansion:phosphorylation")
        );
        assert!(groups.is_empty());
    }

    #[test]
    fn single_member_group_has_no_internal_edges() {
        let (edges, groups) = expand(
            &ids(&["A"]),
            &ids(&["B"]),
            EntityKind::Group,
            EntityKind::Gene,
            "group",
            ExpandedGroups::new(),
        );
        assert_eq!(count(&edges, &Provenance::GroupExpansion), 0);
        assert_eq!(
            count(&edges, &Provenance::OneToOne("group".to_string())),
            1
        );
        assert_eq!(groups.len(), 1);
    }
}
