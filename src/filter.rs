use crate::domain::{Relation, RelationType, subtype};

/// Subtypes that denote vague or expression-mediated relationships.
pub const IGNORED_SUBTYPES: &[&str] = &[
    subtype::STATE_CHANGE,
    subtype::MISSING_INTERACTION,
    subtype::EXPRESSION,
];

/// Returns true when a relation carries no usable physical-interaction information.
///
/// Gene expression relations (transcription factor to target) are dropped regardless of
/// their subtypes, as are relations with no subtype at all.
pub fn should_ignore(relation: &Relation) -> bool {
    if relation.kind == RelationType::GeneExpression {
        return true;
    }
    if relation.subtypes.is_empty() {
        return true;
    }
    IGNORED_SUBTYPES
        .iter()
        .any(|label| relation.has_subtype(label))
}
