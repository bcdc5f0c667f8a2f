use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kegg_pathway_graph::app::{
    App, GraphRunResult, ProgressSink, ProgressSinkKind, SifRequest, SifRunResult,
};
use kegg_pathway_graph::config::{ConfigLoader, PathwayRequest, ResolvedConfig};
use kegg_pathway_graph::error::PathwayError;
use kegg_pathway_graph::mapping::Namespace;
use kegg_pathway_graph::output::{JsonOutput, OutputMode, StderrProgress};
use kegg_pathway_graph::sif::DEFAULT_THRESHOLD;

#[derive(Parser)]
#[command(name = "kegg-graph")]
#[command(about = "Build collapsed and expanded interaction graphs from parsed KEGG pathways")]
#[command(version, author)]
struct Cli {
    /// Print the run summary as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Build graphs for parsed KEGG pathway records")]
    Graph(GraphArgs),
    #[command(about = "Split a PathwayCommons SIF file into per-pathway edge lists")]
    Sif(SifArgs),
}

#[derive(Args)]
struct GraphArgs {
    /// Pathway record files (JSON). Added to the pathways listed in the config.
    pathways: Vec<String>,

    #[arg(long)]
    config: Option<String>,

    /// KEGG `conv` table for the target namespace.
    #[arg(short = 'C', long)]
    conversion: Option<String>,

    #[arg(short = 'c', long)]
    namespace: Option<Namespace>,

    /// Single-column file of allowed converted ids.
    #[arg(short, long)]
    filter: Option<String>,

    #[arg(short, long)]
    species: Option<String>,

    #[arg(short, long)]
    outdir: Option<String>,
}

#[derive(Args)]
struct SifArgs {
    #[arg(short, long)]
    infile: String,

    #[arg(short, long, default_value = "out")]
    outdir: String,

    /// Pathways with this many edges or fewer are not written.
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    thres: usize,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<PathwayError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &PathwayError) -> u8 {
    match error {
        PathwayError::MissingConfig
        | PathwayError::MissingConversion
        | PathwayError::NoPathways
        | PathwayError::InputNotFound(_) => 2,
        PathwayError::UnclassifiableRelation { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    match cli.command {
        Commands::Graph(args) => run_graph(args, output_mode),
        Commands::Sif(args) => run_sif(args, output_mode),
    }
}

fn run_graph(args: GraphArgs, output_mode: OutputMode) -> miette::Result<()> {
    let config = resolve_graph_config(args)?;
    let app = App::new(config);
    let sink = progress_sink(output_mode, ProgressSinkKind::Graph);
    let result = app.graph(sink.as_ref())?;
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_graph(&result).into_diagnostic()?,
        OutputMode::Interactive => print_graph_summary(&result),
    }
    Ok(())
}

fn resolve_graph_config(args: GraphArgs) -> Result<ResolvedConfig, PathwayError> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::resolve(Some(path.as_str()))?,
        None => match ConfigLoader::resolve(None) {
            Ok(config) => config,
            Err(PathwayError::MissingConfig) => ResolvedConfig::default(),
            Err(err) => return Err(err),
        },
    };

    if let Some(conversion) = args.conversion {
        config.conversion = Some(Utf8PathBuf::from(conversion));
    }
    if let Some(namespace) = args.namespace {
        config.namespace = namespace;
    }
    if let Some(filter) = args.filter {
        config.filter = Some(Utf8PathBuf::from(filter));
    }
    if let Some(species) = args.species {
        config.species = species;
    }
    if let Some(outdir) = args.outdir {
        config.outdir = Utf8PathBuf::from(outdir);
    }
    config
        .pathways
        .extend(args.pathways.into_iter().map(|path| PathwayRequest {
            path: Utf8PathBuf::from(path),
            name: None,
        }));
    Ok(config)
}

fn run_sif(args: SifArgs, output_mode: OutputMode) -> miette::Result<()> {
    let request = SifRequest {
        infile: Utf8PathBuf::from(args.infile),
        outdir: Utf8PathBuf::from(args.outdir),
        threshold: args.thres,
    };
    let app = App::new(ResolvedConfig::default());
    let sink = progress_sink(output_mode, ProgressSinkKind::Sif);
    let result = app.sif(&request, sink.as_ref())?;
    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_sif(&result).into_diagnostic()?,
        OutputMode::Interactive => print_sif_summary(&result),
    }
    Ok(())
}

fn progress_sink(output_mode: OutputMode, kind: ProgressSinkKind) -> Box<dyn ProgressSink> {
    match output_mode {
        OutputMode::NonInteractive => Box::new(JsonOutput),
        OutputMode::Interactive => Box::new(StderrProgress::new(kind)),
    }
}

fn print_graph_summary(result: &GraphRunResult) {
    let green = "\x1b[32m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    let totals = result.totals();
    println!("{cyan}kegg-graph summary ({}){reset}", result.namespace);
    println!(
        "{green}pathways: {}  directed: {}  undirected: {}{reset}",
        result.pathways.len(),
        totals.directed,
        totals.undirected
    );
    for item in &result.pathways {
        println!(
            "  {} {}: {} collapsed, {} expanded edges (dropped {} genes, {} groups)",
            item.name,
            item.title.as_deref().unwrap_or(""),
            item.collapsed_edges,
            item.expanded_edges,
            item.stats.dropped_genes,
            item.stats.dropped_groups
        );
        println!("    {}", item.files.collapsed);
        println!("    {}", item.files.expanded);
    }
}

fn print_sif_summary(result: &SifRunResult) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let reset = "\x1b[0m";

    println!(
        "{green}{} proteins, {} pathways{reset}",
        result.proteins,
        result.pathways.len()
    );
    for item in &result.pathways {
        match &item.path {
            Some(path) => println!("  {} ({} edges) -> {path}", item.label, item.edges),
            None => println!(
                "{yellow}  {} ({} edges) not written{reset}",
                item.label, item.edges
            ),
        }
    }
}
