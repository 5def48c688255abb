// Clippy allows
#![allow(clippy::too_many_arguments)]

//! fusion-overlap: multi-way overlap of gene-fusion prediction datasets
//!
//! Usage: fusion-overlap <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::process;

use fusion_overlap::annotation::GeneAnnotation;
use fusion_overlap::config::{OutputFormat, OverlapConfig};
use fusion_overlap::error::{FusionError, Result};
use fusion_overlap::output::OutputTarget;
use fusion_overlap::overlap::{OverlapComplex, MERGED_NAME_JOIN};
use fusion_overlap::pairwise::PairwiseNaming;
use fusion_overlap::reader::read_fusions;
use fusion_overlap::MatchOptions;

#[derive(Parser)]
#[command(name = "fusion-overlap")]
#[command(version)]
#[command(about = "Overlap gene-fusion predictions across datasets by spanning genes", long_about = None)]
struct Cli {
    /// Number of threads to use for fusion comparison (default: number of CPUs)
    #[arg(long, short = 't', global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every combination of datasets and report a list or summary table
    Overlay {
        /// Dataset as NAME:PATH (repeat for each dataset, in column order)
        #[arg(short = 'a', long = "add", value_name = "NAME:PATH", num_args = 1.., required = true)]
        datasets: Vec<String>,

        /// Gene annotation BED file used for breakpoints without genes
        #[arg(short = 'g', long)]
        genes: Option<PathBuf>,

        /// Output format: list|summary|extensive
        #[arg(short = 'f', long, default_value = "summary")]
        format: String,

        /// Output file (use - for stdout)
        #[arg(short = 'o', long, default_value = "-")]
        output: String,

        /// Keep only counts of finished combinations (summary output only)
        #[arg(long)]
        sparse: bool,

        /// Require identical gene sets instead of overlapping ones
        #[arg(long = "egm")]
        exact_gene_match: bool,

        /// Do not match fusions with swapped left/right partners
        #[arg(short = 's', long)]
        strand_specific: bool,

        /// Directory for per-combination junction files (extensive output)
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Print run statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Write matching fusions for every pair of datasets to separate files
    Pairwise {
        /// Dataset as NAME:PATH (repeat for each dataset)
        #[arg(short = 'a', long = "add", value_name = "NAME:PATH", num_args = 1.., required = true)]
        datasets: Vec<String>,

        /// Gene annotation BED file used for breakpoints without genes
        #[arg(short = 'g', long)]
        genes: Option<PathBuf>,

        /// Output directory
        #[arg(short = 'd', long, default_value = ".")]
        dir: PathBuf,

        /// Filename prefix
        #[arg(long, default_value = "")]
        prefix: String,

        /// Text between the two dataset names
        #[arg(long, default_value = MERGED_NAME_JOIN)]
        join: String,

        /// Filename suffix
        #[arg(long, default_value = ".txt")]
        suffix: String,

        /// Require identical gene sets instead of overlapping ones
        #[arg(long = "egm")]
        exact_gene_match: bool,

        /// Do not match fusions with swapped left/right partners
        #[arg(short = 's', long)]
        strand_specific: bool,
    },
}

fn main() {
    // Log level defaults to info unless RUST_LOG says otherwise
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Configure thread pool if --threads specified
    if let Some(n) = cli.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
        {
            eprintln!("Error: failed to initialize thread pool: {}", e);
            process::exit(1);
        }
    }

    let result = match cli.command {
        Commands::Overlay {
            datasets,
            genes,
            format,
            output,
            sparse,
            exact_gene_match,
            strand_specific,
            export_dir,
            stats,
        } => run_overlay(
            datasets,
            genes,
            format,
            output,
            sparse,
            exact_gene_match,
            strand_specific,
            export_dir,
            stats,
        ),

        Commands::Pairwise {
            datasets,
            genes,
            dir,
            prefix,
            join,
            suffix,
            exact_gene_match,
            strand_specific,
        } => run_pairwise(
            datasets,
            genes,
            dir,
            PairwiseNaming {
                prefix,
                join,
                suffix,
            },
            MatchOptions {
                exact_gene_match,
                strand_specific,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Split a `NAME:PATH` dataset argument.
fn parse_dataset_arg(arg: &str) -> Result<(String, PathBuf)> {
    match arg.split_once(':') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(FusionError::InvalidFormat(format!(
            "Invalid dataset '{}'. Use NAME:PATH",
            arg
        ))),
    }
}

fn load_complex(datasets: &[String], genes: Option<PathBuf>) -> Result<OverlapComplex> {
    let annotation = genes
        .map(|path| {
            info!("Loading gene annotation from {}", path.display());
            GeneAnnotation::from_path(path)
        })
        .transpose()?;

    let mut complex = OverlapComplex::new();
    for arg in datasets {
        let (name, path) = parse_dataset_arg(arg)?;
        let index = complex.len() + 1;
        let collection = read_fusions(&path, &name, index, annotation.as_ref())?;
        info!(
            "Dataset {} '{}': {} fusions from {}",
            index,
            name,
            collection.len(),
            path.display()
        );
        complex.add(collection);
    }

    Ok(complex)
}

fn run_overlay(
    datasets: Vec<String>,
    genes: Option<PathBuf>,
    format: String,
    output: String,
    sparse: bool,
    exact_gene_match: bool,
    strand_specific: bool,
    export_dir: Option<PathBuf>,
    stats: bool,
) -> Result<()> {
    let output_format: OutputFormat = format.parse()?;
    let target: OutputTarget = output.parse()?;

    let config = OverlapConfig::new(output_format)
        .with_sparse(sparse)
        .with_exact_gene_match(exact_gene_match)
        .with_strand_specific(strand_specific)
        .with_export_dir(export_dir);
    // Fail before reading any input
    config.validate()?;

    if let Some(dir) = &config.export_dir {
        fs::create_dir_all(dir)?;
    }

    let mut complex = load_complex(&datasets, genes)?;

    let run_stats = match output_format {
        OutputFormat::List => {
            let mut out = target.writer()?;
            complex.overlay_to_list(&config, &mut out)?
        }
        OutputFormat::Summary | OutputFormat::Extensive => {
            let run_stats = complex.overlay(&config)?;
            complex.export_summary(&target)?;
            run_stats
        }
    };

    if stats {
        eprintln!("Overlay stats: {}", run_stats);
    }

    Ok(())
}

fn run_pairwise(
    datasets: Vec<String>,
    genes: Option<PathBuf>,
    dir: PathBuf,
    naming: PairwiseNaming,
    options: MatchOptions,
) -> Result<()> {
    fs::create_dir_all(&dir)?;

    let mut complex = load_complex(&datasets, genes)?;
    complex.compute_pairwise_matches(options);
    let written = complex.export_pairwise(&dir, &naming)?;

    info!("Wrote {} pairwise match files to {}", written.len(), dir.display());
    Ok(())
}
