use crate::domain::{Relation, collapse, subtype};
use crate::error::PathwayError;

/// One row of the direction table: if the relation carries any of `subtypes`, it is
/// `directed` (or not).
#[derive(Debug, Clone, Copy)]
pub struct DirectionRule {
    pub name: &'static str,
    pub subtypes: &'static [&'static str],
    pub directed: bool,
}

impl DirectionRule {
    pub fn matches(&self, relation: &Relation) -> bool {
        self.subtypes.iter().any(|label| relation.has_subtype(label))
    }
}

/// Evaluated top to bottom; the first matching rule decides. A relation can carry subtypes
/// that imply opposite directions, so the order is part of the semantics.
pub const DIRECTION_RULES: &[DirectionRule] = &[
    DirectionRule {
        name: "effect",
        subtypes: &[subtype::ACTIVATION, subtype::INHIBITION],
        directed: true,
    },
    DirectionRule {
        name: "molecular-event",
        subtypes: &[
            subtype::PHOSPHORYLATION,
            subtype::DEPHOSPHORYLATION,
            subtype::GLYCOSYLATION,
            subtype::UBIQUITINATION,
            subtype::METHYLATION,
        ],
        directed: true,
    },
    DirectionRule {
        name: "indirect-effect",
        subtypes: &[subtype::INDIRECT_EFFECT],
        directed: true,
    },
    DirectionRule {
        name: "compound",
        subtypes: &[subtype::COMPOUND],
        directed: true,
    },
    DirectionRule {
        name: "association",
        subtypes: &[subtype::BINDING, subtype::DISSOCIATION, subtype::GROUP],
        directed: false,
    },
];

/// Returns the first rule that matches, if any.
pub fn classify(relation: &Relation) -> Option<&'static DirectionRule> {
    DIRECTION_RULES.iter().find(|rule| rule.matches(relation))
}

/// Decides whether a relation becomes a directed edge.
///
/// Fails with [`PathwayError::UnclassifiableRelation`] when no rule matches.
pub fn is_directed(relation: &Relation) -> Result<bool, PathwayError> {
    classify(relation)
        .map(|rule| rule.directed)
        .ok_or_else(|| PathwayError::UnclassifiableRelation {
            entry1: relation.entry1.clone(),
            entry2: relation.entry2.clone(),
            subtypes: collapse(&relation.subtypes),
        })
}
