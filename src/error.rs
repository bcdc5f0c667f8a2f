use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PathwayError {
    #[error("edge direction cannot be established with subtypes {subtypes}")]
    #[diagnostic(
        code(kegg_graph::unclassifiable_relation),
        help("relation {entry1} -> {entry2} matched no direction rule")
    )]
    UnclassifiableRelation {
        entry1: String,
        entry2: String,
        subtypes: String,
    },

    #[error("invalid pathway name: {0}")]
    InvalidPathwayName(String),

    #[error("unknown namespace: {0}")]
    InvalidNamespace(String),

    #[error("invalid conversion line {line}: {content}")]
    ConversionParse { line: usize, content: String },

    #[error("conversion line {line} is in namespace `{found}`, expected {expected}")]
    NamespaceMismatch {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("no participant section found in SIF input")]
    MissingParticipantSection,

    #[error("missing config file kegg-graph.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("no conversion table given (set `conversion` in the config or pass --conversion)")]
    MissingConversion,

    #[error("no pathway files given (list them in the config or on the command line)")]
    NoPathways,

    #[error("input file not found: {0}")]
    InputNotFound(String),

    #[error("failed to parse pathway record {path}: {message}")]
    PathwayParse { path: String, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
