use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::str::FromStr;

use camino::Utf8Path;
use clap::ValueEnum;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::domain::IdSet;
use crate::error::PathwayError;

/// Maps pathway-local source identifiers to an external namespace.
///
/// An empty result means the identifiers are unmappable.
pub trait NamespaceMapper {
    fn map_to_external_ids(&self, source_ids: &[String]) -> IdSet;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Namespace {
    Uniprot,
    NcbiGeneid,
}

impl Namespace {
    /// Prefix KEGG puts in front of converted identifiers.
    pub fn kegg_prefix(&self) -> &'static str {
        match self {
            Namespace::Uniprot => "up",
            Namespace::NcbiGeneid => "ncbi-geneid",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Uniprot => write!(f, "uniprot"),
            Namespace::NcbiGeneid => write!(f, "ncbi-geneid"),
        }
    }
}

impl FromStr for Namespace {
    type Err = PathwayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "uniprot" | "up" => Ok(Namespace::Uniprot),
            "ncbi-geneid" => Ok(Namespace::NcbiGeneid),
            _ => Err(PathwayError::InvalidNamespace(value.to_string())),
        }
    }
}

/// KEGG id to external id table, as returned by the KEGG `conv` operation.
#[derive(Debug, Clone, Default)]
pub struct ConversionTable {
    forward: BTreeMap<String, IdSet>,
    skipped: usize,
}

impl ConversionTable {
    /// Parses `kegg_id<TAB>prefix:target` lines. The prefix must belong to `namespace`.
    /// When `allowed` is given and not empty, targets outside it are skipped.
    pub fn parse<R: BufRead>(
        reader: R,
        namespace: Namespace,
        allowed: Option<&BTreeSet<String>>,
    ) -> Result<Self, PathwayError> {
        let allowed = allowed.filter(|ids| !ids.is_empty());
        let mut table = Self::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| PathwayError::Filesystem(err.to_string()))?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut columns = trimmed.split_whitespace();
            let (Some(kegg), Some(converted)) = (columns.next(), columns.next()) else {
                return Err(PathwayError::ConversionParse {
                    line: index + 1,
                    content: line.clone(),
                });
            };
            let Some((prefix, target)) = converted.split_once(':') else {
                return Err(PathwayError::ConversionParse {
                    line: index + 1,
                    content: line.clone(),
                });
            };
            if prefix != namespace.kegg_prefix() {
                return Err(PathwayError::NamespaceMismatch {
                    line: index + 1,
                    expected: namespace.to_string(),
                    found: prefix.to_string(),
                });
            }
            if let Some(allowed) = allowed {
                if !allowed.contains(target) {
                    table.skipped += 1;
                    continue;
                }
            }
            table.insert(kegg, target);
        }
        Ok(table)
    }

    pub fn from_path(
        path: &Utf8Path,
        namespace: Namespace,
        allowed: Option<&BTreeSet<String>>,
    ) -> Result<Self, PathwayError> {
        Self::parse(open_text(path)?, namespace, allowed)
    }

    pub fn insert(&mut self, kegg: &str, target: &str) {
        self.forward
            .entry(kegg.to_string())
            .or_default()
            .insert(target.to_string());
    }

    pub fn targets(&self, kegg: &str) -> Option<&IdSet> {
        self.forward.get(kegg)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Pairs dropped by the allow-list.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl NamespaceMapper for ConversionTable {
    fn map_to_external_ids(&self, source_ids: &[String]) -> IdSet {
        source_ids
            .iter()
            .filter_map(|id| self.forward.get(id))
            .flatten()
            .cloned()
            .collect()
    }
}

/// Reads a single-column list of identifiers.
pub fn read_filter_ids<R: BufRead>(reader: R) -> Result<BTreeSet<String>, PathwayError> {
    let mut ids = BTreeSet::new();
    for line in reader.lines() {
        let line = line.map_err(|err| PathwayError::Filesystem(err.to_string()))?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            ids.insert(trimmed.to_string());
        }
    }
    Ok(ids)
}

/// Opens a text input, decompressing `.gz` files on the fly.
pub fn open_text(path: &Utf8Path) -> Result<Box<dyn BufRead>, PathwayError> {
    if !path.as_std_path().exists() {
        return Err(PathwayError::InputNotFound(path.to_string()));
    }
    let file = File::open(path.as_std_path())
        .map_err(|err| PathwayError::Filesystem(format!("open {path}: {err}")))?;
    let reader: Box<dyn Read> = if path.extension() == Some("gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(reader)))
}
