//! Per-pathway graph construction.
//!
//! A raw pathway record is first resolved against a [`NamespaceMapper`]: unmappable genes and
//! groups are dropped, and relations that are noise or that point at dropped entries are
//! excluded. [`GraphBuilder`] then turns the retained relations into the collapsed and
//! expanded edge maps.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::direction::is_directed;
use crate::domain::{
    EntityKind, GeneEntry, GeneGroup, IdSet, PathwayRecord, RawEntryKind, Relation, collapse,
};
use crate::edges::{CollapsedEdges, CollapsedKey, ExpandedEdges, ExpandedKey};
use crate::error::PathwayError;
use crate::expand::{ExpandedGroups, expand};
use crate::filter::should_ignore;
use crate::mapping::NamespaceMapper;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub entries: usize,
    pub relations: usize,
    pub dropped_genes: usize,
    pub dropped_groups: usize,
    pub ignored_relations: usize,
    pub malformed_relations: usize,
}

/// Node of a resolved pathway.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Gene(&'a GeneEntry),
    Group(&'a GeneGroup),
}

impl<'a> Node<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Node::Gene(_) => EntityKind::Gene,
            Node::Group(_) => EntityKind::Group,
        }
    }

    pub fn mapped_ids(&self) -> &'a IdSet {
        match self {
            Node::Gene(entry) => &entry.mapped_ids,
            Node::Group(group) => &group.mapped_ids,
        }
    }
}

/// Genes, groups and relations of one pathway that survived mapping and filtering.
#[derive(Debug, Clone, Default)]
pub struct ResolvedPathway {
    pub genes: BTreeMap<String, GeneEntry>,
    pub groups: BTreeMap<String, GeneGroup>,
    pub relations: Vec<Relation>,
    pub stats: ResolutionStats,
}

impl ResolvedPathway {
    pub fn resolve<M: NamespaceMapper + ?Sized>(record: &PathwayRecord, mapper: &M) -> Self {
        let mut stats = ResolutionStats {
            entries: record.entries.len(),
            relations: record.relations.len(),
            ..ResolutionStats::default()
        };

        let mut genes = BTreeMap::new();
        for raw in record
            .entries
            .iter()
            .filter(|entry| entry.kind == RawEntryKind::Gene)
        {
            let source_ids = raw.source_ids();
            let mapped_ids = mapper.map_to_external_ids(&source_ids);
            if mapped_ids.is_empty() {
                stats.dropped_genes += 1;
                continue;
            }
            genes.insert(
                raw.id.clone(),
                GeneEntry {
                    id: raw.id.clone(),
                    source_ids,
                    mapped_ids,
                },
            );
        }

        let mut groups = BTreeMap::new();
        for raw in record
            .entries
            .iter()
            .filter(|entry| entry.kind == RawEntryKind::Group)
        {
            // Only members that survived gene mapping contribute.
            let source_ids = raw
                .components
                .iter()
                .filter_map(|member| genes.get(member))
                .flat_map(|gene: &GeneEntry| gene.source_ids.iter().cloned())
                .collect::<Vec<_>>();
            let mapped_ids = mapper.map_to_external_ids(&source_ids);
            if mapped_ids.is_empty() {
                stats.dropped_groups += 1;
                continue;
            }
            groups.insert(
                raw.id.clone(),
                GeneGroup {
                    id: raw.id.clone(),
                    components: raw.components.clone(),
                    source_ids,
                    mapped_ids,
                },
            );
        }

        let known = |id: &str| genes.contains_key(id) || groups.contains_key(id);
        let mut relations = Vec::new();
        for raw in &record.relations {
            let relation = Relation::from(raw);
            if !known(relation.entry1.as_str()) || !known(relation.entry2.as_str()) {
                stats.malformed_relations += 1;
                continue;
            }
            if should_ignore(&relation) {
                stats.ignored_relations += 1;
                continue;
            }
            relations.push(relation);
        }

        debug!(
            genes = genes.len(),
            groups = groups.len(),
            relations = relations.len(),
            "resolved pathway {}",
            record.name
        );

        Self {
            genes,
            groups,
            relations,
            stats,
        }
    }

    pub fn node(&self, id: &str) -> Option<Node<'_>> {
        self.genes
            .get(id)
            .map(Node::Gene)
            .or_else(|| self.groups.get(id).map(Node::Group))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelationCounts {
    pub directed: usize,
    pub undirected: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PathwayGraph {
    pub collapsed: CollapsedEdges,
    pub expanded: ExpandedEdges,
    pub counts: RelationCounts,
}

/// Builds the edge maps of a single pathway. Owns the expansion state of that run, so a new
/// builder is needed for every pathway.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: PathwayGraph,
    expanded_groups: ExpandedGroups,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one retained relation between two resolved nodes.
    pub fn add_relation(
        &mut self,
        relation: &Relation,
        source: Node<'_>,
        target: Node<'_>,
    ) -> Result<(), PathwayError> {
        let directed = is_directed(relation)?;
        if directed {
            self.graph.counts.directed += 1;
        } else {
            self.graph.counts.undirected += 1;
        }

        let (n1, n2) = (source.mapped_ids(), target.mapped_ids());
        let (t1, t2) = (source.kind(), target.kind());

        let key = CollapsedKey {
            source: collapse(n1),
            target: collapse(n2),
            source_kind: t1,
            target_kind: t2,
        };
        let reverse = key.reversed();
        self.graph.collapsed.merge_both(
            key,
            reverse,
            relation.subtypes.iter().cloned(),
            !directed,
        );

        let groups = std::mem::take(&mut self.expanded_groups);
        let (edges, groups) = expand(n1, n2, t1, t2, &relation.subtype_label(), groups);
        self.expanded_groups = groups;

        for edge in edges {
            let key = ExpandedKey::new(edge.source, edge.target);
            let reverse = key.reversed();
            self.graph.expanded.merge_both(
                key,
                reverse,
                [edge.provenance.to_string()],
                !directed,
            );
        }
        Ok(())
    }

    pub fn finish(self) -> PathwayGraph {
        self.graph
    }

    /// Builds the graph of a resolved pathway. The first unclassifiable relation aborts.
    pub fn build(pathway: &ResolvedPathway) -> Result<PathwayGraph, PathwayError> {
        let mut builder = Self::new();
        for relation in &pathway.relations {
            let (Some(source), Some(target)) =
                (pathway.node(&relation.entry1), pathway.node(&relation.entry2))
            else {
                warn!(
                    entry1 = %relation.entry1,
                    entry2 = %relation.entry2,
                    "relation endpoint missing from resolved pathway"
                );
                continue;
            };
            builder.add_relation(relation, source, target)?;
        }
        Ok(builder.finish())
    }
}
