use std::collections::BTreeSet;

use assert_matches::assert_matches;

use kegg_pathway_graph::domain::{EntityKind, PathwayRecord};
use kegg_pathway_graph::edges::{CollapsedKey, ExpandedKey};
use kegg_pathway_graph::error::PathwayError;
use kegg_pathway_graph::graph::{GraphBuilder, PathwayGraph, ResolvedPathway};
use kegg_pathway_graph::mapping::ConversionTable;

fn table() -> ConversionTable {
    let mut table = ConversionTable::default();
    for (kegg, target) in [
        ("hsa:1", "A"),
        ("hsa:2", "B"),
        ("hsa:3", "C"),
        ("hsa:4", "D"),
        ("hsa:5", "E1"),
        ("hsa:5", "E2"),
    ] {
        table.insert(kegg, target);
    }
    table
}

fn record(relations: &str) -> PathwayRecord {
    let json = format!(
        r#"{{
            "name": "path:hsa04999",
            "title": "Test pathway",
            "entries": [
                {{"id": "1", "kind": "gene", "names": ["hsa:1"]}},
                {{"id": "2", "kind": "gene", "names": ["hsa:2"]}},
                {{"id": "3", "kind": "gene", "names": ["hsa:3"]}},
                {{"id": "4", "kind": "gene", "names": ["hsa:4"]}},
                {{"id": "5", "kind": "gene", "names": ["hsa:5"]}},
                {{"id": "6", "kind": "gene", "names": ["hsa:404"]}},
                {{"id": "7", "kind": "compound", "names": ["cpd:C00076"]}},
                {{"id": "10", "kind": "group", "components": ["1", "2", "3"]}}
            ],
            "relations": {relations}
        }}"#
    );
    serde_json::from_str(&json).unwrap()
}

fn build(relations: &str) -> Result<PathwayGraph, PathwayError> {
    let resolved = ResolvedPathway::resolve(&record(relations), &table());
    GraphBuilder::build(&resolved)
}

fn expanded_tags(graph: &PathwayGraph, source: &str, target: &str) -> Vec<String> {
    graph
        .expanded
        .get(&ExpandedKey::new(source, target))
        .map(|tags| tags.iter().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn binding_between_genes_is_symmetric() {
    let graph = build(
        r#"[{"entry1": "1", "entry2": "2", "type": "PPrel", "subtypes": ["binding/association"]}]"#,
    )
    .unwrap();

    assert_eq!(graph.counts.directed, 0);
    assert_eq!(graph.counts.undirected, 1);
    assert_eq!(
        expanded_tags(&graph, "A", "B"),
        vec!["one_to_one_mapping:binding/association"]
    );
    assert_eq!(
        expanded_tags(&graph, "B", "A"),
        vec!["one_to_one_mapping:binding/association"]
    );

    let forward = CollapsedKey {
        source: "A".to_string(),
        target: "B".to_string(),
        source_kind: EntityKind::Gene,
        target_kind: EntityKind::Gene,
    };
    assert_eq!(
        graph.collapsed.get(&forward),
        graph.collapsed.get(&forward.reversed())
    );
    assert_eq!(graph.collapsed.len(), 2);
}

#[test]
fn modification_wins_over_binding() {
    let graph = build(
        r#"[{"entry1": "1", "entry2": "2", "type": "PPrel", "subtypes": ["phosphorylation", "binding/association"]}]"#,
    )
    .unwrap();

    assert_eq!(graph.counts.directed, 1);
    assert_eq!(
        expanded_tags(&graph, "A", "B"),
        vec!["one_to_one_mapping:binding/association|phosphorylation"]
    );
    assert!(expanded_tags(&graph, "B", "A").is_empty());
    let rows = graph.collapsed.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].relation_types, "binding/association|phosphorylation");
}

#[test]
fn group_activates_gene() {
    let graph = build(
        r#"[{"entry1": "10", "entry2": "4", "type": "PPrel", "subtypes": ["activation"]}]"#,
    )
    .unwrap();

    let members = ["A", "B", "C"];
    let mut internal = 0;
    for u1 in members {
        for u2 in members.iter().filter(|u2| **u2 != u1) {
            assert_eq!(expanded_tags(&graph, u1, u2), vec!["group_expansion"]);
            internal += 1;
        }
        assert_eq!(
            expanded_tags(&graph, u1, "D"),
            vec!["mult_mapping_expansion:activation"]
        );
        assert!(expanded_tags(&graph, "D", u1).is_empty());
    }
    assert_eq!(internal, 6);
    assert_eq!(graph.expanded.len(), 9);

    let key = CollapsedKey {
        source: "A|B|C".to_string(),
        target: "D".to_string(),
        source_kind: EntityKind::Group,
        target_kind: EntityKind::Gene,
    };
    assert!(graph.collapsed.contains_key(&key));
}

#[test]
fn group_is_expanded_once_across_relations() {
    let graph = build(
        r#"[
            {"entry1": "10", "entry2": "4", "type": "PPrel", "subtypes": ["activation"]},
            {"entry1": "5", "entry2": "10", "type": "PPrel", "subtypes": ["inhibition"]}
        ]"#,
    )
    .unwrap();

    let group_edges = graph
        .expanded
        .iter()
        .filter(|(_, tags)| tags.contains("group_expansion"))
        .count();
    assert_eq!(group_edges, 6);
    assert_eq!(
        expanded_tags(&graph, "E1", "B"),
        vec!["mult_mapping_expansion:inhibition"]
    );
    assert_eq!(graph.counts.directed, 2);
}

#[test]
fn labels_accumulate_on_shared_keys() {
    let graph = build(
        r#"[
            {"entry1": "1", "entry2": "2", "type": "PPrel", "subtypes": ["activation"]},
            {"entry1": "1", "entry2": "2", "type": "PPrel", "subtypes": ["phosphorylation"]},
            {"entry1": "1", "entry2": "2", "type": "PPrel", "subtypes": ["activation"]}
        ]"#,
    )
    .unwrap();

    assert_eq!(
        expanded_tags(&graph, "A", "B"),
        vec![
            "one_to_one_mapping:activation",
            "one_to_one_mapping:phosphorylation"
        ]
    );
    assert_eq!(graph.expanded.len(), 1);
    assert_eq!(graph.counts.directed, 3);
}

#[test]
fn undirected_relations_mirror_every_expanded_edge() {
    let graph = build(
        r#"[{"entry1": "5", "entry2": "10", "type": "PPrel", "subtypes": ["dissociation"]}]"#,
    )
    .unwrap();

    for ((key, tags), count) in graph.expanded.iter().zip(1..) {
        assert_eq!(graph.expanded.get(&key.reversed()), Some(tags), "edge #{count}");
    }
    for (key, labels) in graph.collapsed.iter() {
        assert_eq!(graph.collapsed.get(&key.reversed()), Some(labels));
    }
}

#[test]
fn noise_and_unknown_entries_are_excluded() {
    let resolved = ResolvedPathway::resolve(
        &record(
            r#"[
                {"entry1": "1", "entry2": "2", "type": "GErel", "subtypes": ["activation"]},
                {"entry1": "1", "entry2": "2", "type": "PPrel", "subtypes": []},
                {"entry1": "1", "entry2": "2", "type": "PPrel", "subtypes": ["activation", "state change"]},
                {"entry1": "1", "entry2": "6", "type": "PPrel", "subtypes": ["activation"]},
                {"entry1": "7", "entry2": "2", "type": "PCrel", "subtypes": ["compound"]},
                {"entry1": "1", "entry2": "99", "type": "PPrel", "subtypes": ["activation"]}
            ]"#,
        ),
        &table(),
    );

    assert!(resolved.relations.is_empty());
    assert_eq!(resolved.stats.ignored_relations, 3);
    assert_eq!(resolved.stats.malformed_relations, 3);
    assert_eq!(resolved.stats.dropped_genes, 1);
    assert_eq!(resolved.genes.len(), 5);
    assert_eq!(resolved.groups.len(), 1);

    let graph = GraphBuilder::build(&resolved).unwrap();
    assert!(graph.collapsed.is_empty());
    assert!(graph.expanded.is_empty());
}

#[test]
fn unclassifiable_relation_aborts() {
    let err = build(
        r#"[
            {"entry1": "1", "entry2": "2", "type": "PPrel", "subtypes": ["activation"]},
            {"entry1": "2", "entry2": "3", "type": "PPrel", "subtypes": ["repression"]}
        ]"#,
    )
    .unwrap_err();
    assert_matches!(
        err,
        PathwayError::UnclassifiableRelation { ref entry1, ref subtypes, .. }
            if entry1 == "2" && subtypes == "repression"
    );
}

#[test]
fn multi_mapped_gene_pair_uses_cross_product() {
    let graph = build(
        r#"[{"entry1": "5", "entry2": "4", "type": "PPrel", "subtypes": ["indirect effect"]}]"#,
    )
    .unwrap();
    let keys = graph
        .expanded
        .iter()
        .map(|(key, _)| (key.source.clone(), key.target.clone()))
        .collect::<BTreeSet<_>>();
    assert_eq!(
        keys,
        BTreeSet::from([
            ("E1".to_string(), "D".to_string()),
            ("E2".to_string(), "D".to_string())
        ])
    );
}
