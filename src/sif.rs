//! PathwayCommons extended SIF splitter.
//!
//! The input holds an interaction section followed by a participant section. Only protein
//! participants with a UniProt reference are kept; their pairwise interactions are treated
//! as undirected and grouped by the pathway labels of each row.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, Write};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::error::PathwayError;
use crate::output::write_atomic;

pub const DEFAULT_THRESHOLD: usize = 10;

const INTERACTION_HEADER: &str = "INTERACTION_TYPE";
const PARTICIPANT_HEADER: &str = "PARTICIPANT_TYPE";
const PROTEIN_REFERENCE: &str = "ProteinReference";

/// Unordered protein pair, stored in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProteinPair(String, String);

impl ProteinPair {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SifStats {
    pub missed_participants: usize,
    pub missed_interactions: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SifNetwork {
    /// Participant name to UniProt accession.
    pub proteins: BTreeMap<String, String>,
    pub pathways: BTreeMap<String, BTreeSet<ProteinPair>>,
    pub stats: SifStats,
}

impl SifNetwork {
    /// Parses a full SIF file. Interaction rows are buffered until the participant section
    /// has been read, because proteins are only known from that trailing section.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, PathwayError> {
        let mut interactions = Vec::new();
        let mut participants = Vec::new();
        let mut in_participants = false;

        for line in reader.lines() {
            let line = line.map_err(|err| PathwayError::Filesystem(err.to_string()))?;
            if !in_participants {
                if line.contains(PARTICIPANT_HEADER) {
                    in_participants = true;
                } else if !line.contains(INTERACTION_HEADER) && !line.trim().is_empty() {
                    interactions.push(line);
                }
            } else if !line.trim().is_empty() {
                participants.push(line);
            }
        }

        if !in_participants {
            return Err(PathwayError::MissingParticipantSection);
        }

        let mut network = Self::default();
        for line in &participants {
            match parse_protein(line) {
                Some((name, accession)) => {
                    network.proteins.insert(name, accession);
                }
                None => network.stats.missed_participants += 1,
            }
        }
        for line in &interactions {
            network.add_interaction(line);
        }
        Ok(network)
    }

    fn add_interaction(&mut self, line: &str) {
        let row = line.trim().split('\t').collect::<Vec<_>>();
        let (Some(a), Some(b)) = (row.first(), row.get(2)) else {
            self.stats.missed_interactions += 1;
            return;
        };
        if !self.proteins.contains_key(*a) || !self.proteins.contains_key(*b) {
            self.stats.missed_interactions += 1;
            return;
        }
        let pair = ProteinPair::new(a, b);
        let labels = row.get(5).copied().unwrap_or_default();
        for label in labels.split(';').map(str::trim).filter(|l| !l.is_empty()) {
            self.pathways
                .entry(label.to_string())
                .or_default()
                .insert(pair.clone());
        }
    }

    pub fn accession(&self, name: &str) -> Option<&str> {
        self.proteins.get(name).map(String::as_str)
    }

    /// Writes one edge file per pathway with more than `threshold` edges. Returns the
    /// written files keyed by pathway label.
    pub fn write_pathways(
        &self,
        outdir: &Utf8Path,
        threshold: usize,
    ) -> Result<BTreeMap<String, Utf8PathBuf>, PathwayError> {
        let mut written = BTreeMap::new();
        for (pathway, edges) in &self.pathways {
            if edges.len() <= threshold {
                continue;
            }
            let path = outdir.join(format!("{}-edges.txt", sanitize_label(pathway)));
            write_atomic(&path, |out| self.write_edges(out, edges))?;
            written.insert(pathway.clone(), path);
        }
        Ok(written)
    }

    fn write_edges(
        &self,
        out: &mut dyn Write,
        edges: &BTreeSet<ProteinPair>,
    ) -> std::io::Result<()> {
        for edge in edges {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                edge.first(),
                edge.second(),
                self.accession(edge.first()).unwrap_or_default(),
                self.accession(edge.second()).unwrap_or_default()
            )?;
        }
        Ok(())
    }
}

fn parse_protein(line: &str) -> Option<(String, String)> {
    if !line.contains(PROTEIN_REFERENCE) {
        return None;
    }
    let row = line.trim().split('\t').collect::<Vec<_>>();
    let xref = row.get(3)?;
    if !xref.contains("uniprot") {
        return None;
    }
    let accession = xref.rsplit(':').next()?;
    Some((row[0].to_string(), accession.to_string()))
}

/// Turns a pathway label into a file-name stem.
pub fn sanitize_label(label: &str) -> String {
    label
        .replace(' ', "-")
        .replace('/', "-or-")
        .replace(['(', ')'], "")
}
