use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use rasti_rs::{compile_hits, CompileOptions, BLAST_OUTFMT};

/// Compile per-genome BLAST hit tables into cross-sample reports.
///
/// BLAST must have been run with
/// -outfmt "6 qseqid sseqid pident length mismatch gapopen qstart qend sstart send evalue bitscore qcovhsp sseq"
/// and one output file written per genome assembly.
#[derive(Debug, Parser)]
#[command(name = "rasti-rs", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Directory of BLAST outputs, one <sample><suffix> file per sample.
    #[arg(long, short = 'b', value_name = "DIR")]
    blast_dir: PathBuf,
    /// Multi-FASTA file of the query sequences searched for.
    #[arg(long, short = 'q', value_name = "FILE")]
    queries: Option<PathBuf>,
    /// Output directory.
    #[arg(long, short = 'o', default_value = "output")]
    outdir: PathBuf,
    /// Filename suffix of the BLAST outputs (a further .gz is accepted).
    #[arg(long, short = 's', default_value = ".tsv")]
    suffix: String,
    /// Assemblies that define the samples; by default every BLAST output is a sample.
    #[arg(long, short = 'a', num_args = 1.., value_name = "FILE")]
    assemblies: Vec<PathBuf>,
    /// Filename extension removed from assembly filenames to get sample names.
    #[arg(long, default_value = "fna")]
    assembly_suffix: String,
    /// Number of threads used to read BLAST outputs.
    #[arg(long, short = 't', default_value_t = 1)]
    threads: usize,
}

fn spinner(color: &str, msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template(&format!("{{spinner:.{color}}} {{msg}}"))
            .expect("Invalid spinner template"),
    );
    spinner.set_message(msg);
    spinner
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("Expected BLAST output format: {}", BLAST_OUTFMT);

    let opts = CompileOptions {
        blast_dir: cli.blast_dir,
        output_suffix: cli.suffix,
        assemblies: cli.assemblies,
        assembly_suffix: cli.assembly_suffix,
        queries: cli.queries,
        outdir: cli.outdir,
        threads: cli.threads,
    };

    // 1. Compile
    let sp = spinner("green", "Compiling hit tables...");
    let summary = compile_hits(&opts).with_context(|| {
        format!("cannot compile BLAST outputs in {}", opts.blast_dir.display())
    })?;
    sp.finish_with_message(format!(
        "Compiled {} hit(s) from {} sample(s).",
        summary.hits, summary.samples
    ));

    // 2. Summary
    let sp = spinner("yellow", "Summarising...");
    if !summary.samples_without_hits.is_empty() {
        log::warn!(
            "{} sample(s) without any hit: {}",
            summary.samples_without_hits.len(),
            summary.samples_without_hits.join(", ")
        );
    }
    sp.finish_with_message(format!(
        "Wrote {}, {} and {} sequence file(s) to {}.",
        summary.compiled_table.display(),
        summary.sample_list.display(),
        summary.extracts.len(),
        opts.outdir.display()
    ));

    Ok(())
}
