use std::fs;
use std::io::{self, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::app::{GraphRunResult, ProgressSinkKind, SifRunResult};
use crate::domain::{DELIM, PathwayName, collapse};
use crate::error::PathwayError;
use crate::graph::{PathwayGraph, ResolvedPathway};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Interactive,
    NonInteractive,
}

pub fn write_entries<W: Write + ?Sized>(
    out: &mut W,
    pathway: &ResolvedPathway,
) -> io::Result<()> {
    writeln!(out, "#id\tmapped_name\tkegg_name")?;
    for (id, entry) in &pathway.genes {
        writeln!(
            out,
            "{id}\t{}\t{}",
            collapse(&entry.mapped_ids),
            entry.source_ids.join(DELIM)
        )?;
    }
    Ok(())
}

pub fn write_groups<W: Write + ?Sized>(
    out: &mut W,
    pathway: &ResolvedPathway,
) -> io::Result<()> {
    writeln!(out, "#id\tcomponent_ids\tmapped_names\tkegg_names")?;
    for (id, group) in &pathway.groups {
        writeln!(
            out,
            "{id}\t{}\t{}\t{}",
            collapse(&group.components),
            collapse(&group.mapped_ids),
            collapse(&group.source_ids)
        )?;
    }
    Ok(())
}

pub fn write_relations<W: Write + ?Sized>(
    out: &mut W,
    pathway: &ResolvedPathway,
) -> io::Result<()> {
    writeln!(out, "#id1\tid2\ttype\tsubtype")?;
    for relation in &pathway.relations {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            relation.entry1,
            relation.entry2,
            relation.kind,
            relation.subtype_label()
        )?;
    }
    Ok(())
}

pub fn write_collapsed<W: Write + ?Sized>(
    out: &mut W,
    graph: &PathwayGraph,
) -> io::Result<()> {
    writeln!(out, "#node1\tnode2\tnode1type\tnode2type\trelation_type")?;
    for row in graph.collapsed.rows() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            row.node1, row.node2, row.node1_kind, row.node2_kind, row.relation_types
        )?;
    }
    Ok(())
}

pub fn write_expanded<W: Write + ?Sized>(
    out: &mut W,
    graph: &PathwayGraph,
) -> io::Result<()> {
    writeln!(out, "#node1\tnode2\tedge_expansion:relation_type")?;
    for row in graph.expanded.rows() {
        writeln!(out, "{}\t{}\t{}", row.node1, row.node2, row.edge_types)?;
    }
    Ok(())
}

/// Paths of the five files written for one pathway.
#[derive(Debug, Clone, Serialize)]
pub struct PathwayFiles {
    pub entries: Utf8PathBuf,
    pub groups: Utf8PathBuf,
    pub relations: Utf8PathBuf,
    pub collapsed: Utf8PathBuf,
    pub expanded: Utf8PathBuf,
}

impl PathwayFiles {
    pub fn new(outdir: &Utf8Path, name: &PathwayName) -> Self {
        let file = |suffix: &str| outdir.join(format!("{name}-{suffix}.txt"));
        Self {
            entries: file("gene-entries"),
            groups: file("gene-groups"),
            relations: file("gene-relations"),
            collapsed: file("collapsed-edges"),
            expanded: file("expanded-edges"),
        }
    }

    pub fn write(
        &self,
        pathway: &ResolvedPathway,
        graph: &PathwayGraph,
    ) -> Result<(), PathwayError> {
        write_atomic(&self.entries, |out| write_entries(out, pathway))?;
        write_atomic(&self.groups, |out| write_groups(out, pathway))?;
        write_atomic(&self.relations, |out| write_relations(out, pathway))?;
        write_atomic(&self.collapsed, |out| write_collapsed(out, graph))?;
        write_atomic(&self.expanded, |out| write_expanded(out, graph))?;
        Ok(())
    }
}

/// Renders into a temporary file next to `path` and moves it into place once complete.
pub fn write_atomic<F>(path: &Utf8Path, render: F) -> Result<(), PathwayError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let parent = path
        .parent()
        .ok_or_else(|| PathwayError::Filesystem("invalid destination path".to_string()))?;
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| PathwayError::Filesystem(err.to_string()))?;
    let temp = tempfile::Builder::new()
        .prefix("kegg-graph")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| PathwayError::Filesystem(err.to_string()))?;
    {
        let mut out = BufWriter::new(temp.as_file());
        render(&mut out).map_err(|err| PathwayError::Filesystem(format!("{path}: {err}")))?;
        out.flush()
            .map_err(|err| PathwayError::Filesystem(format!("{path}: {err}")))?;
    }
    temp.persist(path.as_std_path())
        .map_err(|err| PathwayError::Filesystem(err.to_string()))?;
    Ok(())
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_graph(result: &GraphRunResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_sif(result: &SifRunResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl crate::app::ProgressSink for JsonOutput {
    fn event(&self, _event: crate::app::ProgressEvent) {}
}

/// Prints progress lines to stderr for interactive runs.
pub struct StderrProgress {
    kind: ProgressSinkKind,
}

impl StderrProgress {
    pub fn new(kind: ProgressSinkKind) -> Self {
        Self { kind }
    }
}

impl crate::app::ProgressSink for StderrProgress {
    fn event(&self, event: crate::app::ProgressEvent) {
        let label = match self.kind {
            ProgressSinkKind::Graph => "graph",
            ProgressSinkKind::Sif => "sif",
        };
        match event.elapsed {
            Some(elapsed) => eprintln!(
                "[{label}] {} ({} ms)",
                event.message,
                elapsed.as_millis()
            ),
            None => eprintln!("[{label}] {}", event.message),
        }
    }
}
