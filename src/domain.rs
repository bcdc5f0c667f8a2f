use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PathwayError;

/// Mapped external identifiers of one node. Ordered so that serialization is canonical.
pub type IdSet = BTreeSet<String>;

pub const DELIM: &str = "|";

/// Relation subtype labels as they appear in KGML.
pub mod subtype {
    pub const ACTIVATION: &str = "activation";
    pub const INHIBITION: &str = "inhibition";
    pub const PHOSPHORYLATION: &str = "phosphorylation";
    pub const DEPHOSPHORYLATION: &str = "dephosphorylation";
    pub const GLYCOSYLATION: &str = "glycosylation";
    pub const UBIQUITINATION: &str = "ubiquitination";
    pub const METHYLATION: &str = "methylation";
    pub const INDIRECT_EFFECT: &str = "indirect effect";
    pub const COMPOUND: &str = "compound";
    pub const BINDING: &str = "binding/association";
    pub const DISSOCIATION: &str = "dissociation";
    pub const STATE_CHANGE: &str = "state change";
    pub const MISSING_INTERACTION: &str = "missing interaction";
    pub const EXPRESSION: &str = "expression";
    /// Synthetic label for edges introduced by complex membership. Never present in KGML.
    pub const GROUP: &str = "group";
}

/// Joins identifiers in sorted order with `|`. Input order does not matter.
pub fn collapse<I, S>(ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut items = ids
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .collect::<Vec<_>>();
    items.sort();
    items.join(DELIM)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Gene,
    Group,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Gene => "gene",
            EntityKind::Group => "group",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entry kind of a parsed KGML entry. Compounds, orthologs and map links all land in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawEntryKind {
    Gene,
    Group,
    #[serde(other)]
    Other,
}

/// KGML relation type. Unrecognized tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationType {
    EnzymeEnzyme,
    ProteinProtein,
    /// Transcription factor to target gene.
    GeneExpression,
    ProteinCompound,
    MapLink,
    Other(String),
}

impl RelationType {
    pub fn as_str(&self) -> &str {
        match self {
            RelationType::EnzymeEnzyme => "ECrel",
            RelationType::ProteinProtein => "PPrel",
            RelationType::GeneExpression => "GErel",
            RelationType::ProteinCompound => "PCrel",
            RelationType::MapLink => "maplink",
            RelationType::Other(tag) => tag,
        }
    }
}

impl From<String> for RelationType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "ECrel" => RelationType::EnzymeEnzyme,
            "PPrel" => RelationType::ProteinProtein,
            "GErel" => RelationType::GeneExpression,
            "PCrel" => RelationType::ProteinCompound,
            "maplink" => RelationType::MapLink,
            _ => RelationType::Other(tag),
        }
    }
}

impl From<RelationType> for String {
    fn from(kind: RelationType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static PATHWAY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:path:)?([a-z]{2,4}\d{5})$").unwrap());

/// A KEGG pathway identifier such as `hsa04310`, with or without the `path:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathwayName(String);

impl PathwayName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathwayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PathwayName {
    type Err = PathwayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        let captures = PATHWAY_NAME
            .captures(&normalized)
            .ok_or_else(|| PathwayError::InvalidPathwayName(value.to_string()))?;
        Ok(Self(captures[1].to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntry {
    pub id: String,
    pub kind: RawEntryKind,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub components: Vec<String>,
}

impl RawEntry {
    /// KGML packs several records into one name (`"hsa:1 hsa:2"`); these are split apart.
    pub fn source_ids(&self) -> Vec<String> {
        self.names
            .iter()
            .flat_map(|name| name.split_whitespace())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRelation {
    pub entry1: String,
    pub entry2: String,
    #[serde(rename = "type")]
    pub kind: RelationType,
    #[serde(default)]
    pub subtypes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayRecord {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Vec<RawEntry>,
    #[serde(default)]
    pub relations: Vec<RawRelation>,
}

impl PathwayRecord {
    pub fn pathway_name(&self) -> Result<PathwayName, PathwayError> {
        self.name.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneEntry {
    pub id: String,
    pub source_ids: Vec<String>,
    pub mapped_ids: IdSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneGroup {
    pub id: String,
    pub components: Vec<String>,
    pub source_ids: Vec<String>,
    pub mapped_ids: IdSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub entry1: String,
    pub entry2: String,
    pub kind: RelationType,
    pub subtypes: BTreeSet<String>,
}

impl Relation {
    pub fn has_subtype(&self, label: &str) -> bool {
        self.subtypes.contains(label)
    }

    /// Canonical label of the whole subtype set, used in expansion provenance tags.
    pub fn subtype_label(&self) -> String {
        collapse(&self.subtypes)
    }
}

impl From<&RawRelation> for Relation {
    fn from(raw: &RawRelation) -> Self {
        Self {
            entry1: raw.entry1.clone(),
            entry2: raw.entry2.clone(),
            kind: raw.kind.clone(),
            subtypes: raw
                .subtypes
                .iter()
                .map(|label| label.trim().to_string())
                .filter(|label| !label.is_empty())
                .collect(),
        }
    }
}
