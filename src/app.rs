use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{PathwayRequest, ResolvedConfig};
use crate::domain::{PathwayName, PathwayRecord};
use crate::error::PathwayError;
use crate::graph::{GraphBuilder, RelationCounts, ResolutionStats, ResolvedPathway};
use crate::mapping::{ConversionTable, NamespaceMapper, open_text, read_filter_ids};
use crate::output::PathwayFiles;
use crate::sif::{DEFAULT_THRESHOLD, SifNetwork, SifStats};

#[derive(Debug, Clone, Serialize)]
pub struct GraphRunResult {
    pub generated_at: String,
    pub namespace: String,
    pub mapped_kegg_ids: usize,
    pub pathways: Vec<PathwayResult>,
}

impl GraphRunResult {
    pub fn totals(&self) -> RelationCounts {
        self.pathways
            .iter()
            .fold(RelationCounts::default(), |acc, item| RelationCounts {
                directed: acc.directed + item.counts.directed,
                undirected: acc.undirected + item.counts.undirected,
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PathwayResult {
    pub name: PathwayName,
    pub title: Option<String>,
    pub genes: usize,
    pub groups: usize,
    pub relations: usize,
    pub stats: ResolutionStats,
    pub counts: RelationCounts,
    pub collapsed_edges: usize,
    pub expanded_edges: usize,
    pub files: PathwayFiles,
}

#[derive(Debug, Clone)]
pub struct SifRequest {
    pub infile: Utf8PathBuf,
    pub outdir: Utf8PathBuf,
    pub threshold: usize,
}

impl SifRequest {
    pub fn new(infile: Utf8PathBuf, outdir: Utf8PathBuf) -> Self {
        Self {
            infile,
            outdir,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SifRunResult {
    pub generated_at: String,
    pub proteins: usize,
    pub stats: SifStats,
    pub pathways: Vec<SifPathwayResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SifPathwayResult {
    pub label: String,
    pub edges: usize,
    pub path: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Copy)]
pub enum ProgressSinkKind {
    Graph,
    Sif,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Clone)]
pub struct App {
    config: ResolvedConfig,
}

impl App {
    pub fn new(config: ResolvedConfig) -> Self {
        Self { config }
    }

    /// Loads the conversion table named by the configuration.
    pub fn load_conversion(
        &self,
        sink: &dyn ProgressSink,
    ) -> Result<ConversionTable, PathwayError> {
        let path = self
            .config
            .conversion
            .as_ref()
            .ok_or(PathwayError::MissingConversion)?;

        let allowed = match &self.config.filter {
            Some(filter) => {
                let ids = read_filter_ids(open_text(filter)?)?;
                if ids.is_empty() {
                    warn!(filter = %filter, "filter file is empty, keeping every converted id");
                } else {
                    info!(ids = ids.len(), "retaining only ids that are in the filter file");
                }
                Some(ids)
            }
            None => None,
        };

        sink.event(ProgressEvent {
            message: format!("phase=Resolve; loading conversion table {path}"),
            elapsed: None,
        });
        let start = Instant::now();
        let table = ConversionTable::from_path(path, self.config.namespace, allowed.as_ref())?;
        sink.event(ProgressEvent {
            message: format!(
                "conversion.loaded kegg_ids={} skipped={}",
                table.len(),
                table.skipped()
            ),
            elapsed: Some(start.elapsed()),
        });
        Ok(table)
    }

    /// Builds and writes the graph of every configured pathway.
    pub fn graph(&self, sink: &dyn ProgressSink) -> Result<GraphRunResult, PathwayError> {
        self.ensure_pathways()?;
        let table = self.load_conversion(sink)?;
        let mut result = self.graph_with_mapper(&table, sink)?;
        result.mapped_kegg_ids = table.len();
        Ok(result)
    }

    /// Same as [`App::graph`] with an already loaded mapper.
    ///
    /// An unclassifiable relation in any pathway aborts the whole run.
    pub fn graph_with_mapper<M: NamespaceMapper + ?Sized>(
        &self,
        mapper: &M,
        sink: &dyn ProgressSink,
    ) -> Result<GraphRunResult, PathwayError> {
        self.ensure_pathways()?;
        let mut pathways = Vec::with_capacity(self.config.pathways.len());
        for (index, request) in self.config.pathways.iter().enumerate() {
            sink.event(ProgressEvent {
                message: format!("phase=Build; pathway #{} {}", index + 1, request.path),
                elapsed: None,
            });
            let start = Instant::now();
            let item = self.process_pathway(request, mapper)?;
            sink.event(ProgressEvent {
                message: format!(
                    "pathway.done name={} collapsed={} expanded={}",
                    item.name, item.collapsed_edges, item.expanded_edges
                ),
                elapsed: Some(start.elapsed()),
            });
            pathways.push(item);
        }

        Ok(GraphRunResult {
            generated_at: chrono::Utc::now().to_rfc3339(),
            namespace: self.config.namespace.to_string(),
            mapped_kegg_ids: 0,
            pathways,
        })
    }

    fn ensure_pathways(&self) -> Result<(), PathwayError> {
        if self.config.pathways.is_empty() {
            return Err(PathwayError::NoPathways);
        }
        Ok(())
    }

    fn process_pathway<M: NamespaceMapper + ?Sized>(
        &self,
        request: &PathwayRequest,
        mapper: &M,
    ) -> Result<PathwayResult, PathwayError> {
        let record = load_pathway(&request.path)?;
        let name = match &request.name {
            Some(name) => name.clone(),
            None => record.pathway_name()?,
        };
        if !name.as_str().starts_with(&self.config.species) {
            warn!(
                pathway = %name,
                species = %self.config.species,
                "pathway does not belong to the configured species"
            );
        }
        info!(
            pathway = %name,
            entries = record.entries.len(),
            relations = record.relations.len(),
            "processing {}",
            record.title.as_deref().unwrap_or("untitled pathway")
        );

        let resolved = ResolvedPathway::resolve(&record, mapper);
        info!(
            pathway = %name,
            dropped_genes = resolved.stats.dropped_genes,
            dropped_groups = resolved.stats.dropped_groups,
            ignored = resolved.stats.ignored_relations,
            malformed = resolved.stats.malformed_relations,
            "{} entries, {} groups, {} relations after mapping and filtering",
            resolved.genes.len(),
            resolved.groups.len(),
            resolved.relations.len()
        );

        let graph = GraphBuilder::build(&resolved)?;
        info!(
            pathway = %name,
            "processed {} directed and {} undirected relations",
            graph.counts.directed,
            graph.counts.undirected
        );

        let files = PathwayFiles::new(&self.config.outdir, &name);
        files.write(&resolved, &graph)?;

        Ok(PathwayResult {
            name,
            title: record.title.clone(),
            genes: resolved.genes.len(),
            groups: resolved.groups.len(),
            relations: resolved.relations.len(),
            stats: resolved.stats,
            counts: graph.counts,
            collapsed_edges: graph.collapsed.len(),
            expanded_edges: graph.expanded.len(),
            files,
        })
    }

    /// Splits a PathwayCommons SIF file into per-pathway edge files.
    pub fn sif(
        &self,
        request: &SifRequest,
        sink: &dyn ProgressSink,
    ) -> Result<SifRunResult, PathwayError> {
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; reading {}", request.infile),
            elapsed: None,
        });
        let start = Instant::now();
        let network = SifNetwork::parse(open_text(&request.infile)?)?;
        info!(
            proteins = network.proteins.len(),
            missed = network.stats.missed_participants,
            pathways = network.pathways.len(),
            "parsed SIF network"
        );
        sink.event(ProgressEvent {
            message: format!("sif.parsed pathways={}", network.pathways.len()),
            elapsed: Some(start.elapsed()),
        });

        sink.event(ProgressEvent {
            message: "phase=Store; writing pathway edge files".to_string(),
            elapsed: None,
        });
        let written = network.write_pathways(&request.outdir, request.threshold)?;
        let pathways = network
            .pathways
            .iter()
            .map(|(label, edges)| {
                let path = written.get(label).cloned();
                if path.is_none() {
                    info!(pathway = %label, edges = edges.len(), "not enough edges, skipped");
                }
                SifPathwayResult {
                    label: label.clone(),
                    edges: edges.len(),
                    path,
                }
            })
            .collect();

        Ok(SifRunResult {
            generated_at: chrono::Utc::now().to_rfc3339(),
            proteins: network.proteins.len(),
            stats: network.stats,
            pathways,
        })
    }
}

pub fn load_pathway(path: &Utf8Path) -> Result<PathwayRecord, PathwayError> {
    let reader = open_text(path)?;
    serde_json::from_reader(reader).map_err(|err| PathwayError::PathwayParse {
        path: path.to_string(),
        message: err.to_string(),
    })
}
