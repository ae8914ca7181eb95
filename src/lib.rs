// src/lib.rs
pub mod error;
pub mod hit;
pub mod hit_table;
pub mod hit_store;
pub mod blast_output;
pub mod fasta;
pub mod samples;

use std::fs;
use std::path::PathBuf;

use parking_lot::Mutex;
use rayon::prelude::*;

pub use crate::error::{HitError, Result};
pub use crate::hit::{Hit, BLAST_OUTFMT, HIT_ATTRS};
pub use crate::hit_store::{HitStore, COMPILED_HITS_FILE, SAMPLE_LIST_FILE};
pub use crate::hit_table::{HitTable, SampleHits};

use crate::blast_output::read_blast_rows;
use crate::fasta::read_fasta_ids;
use crate::samples::{discover_blast_outputs, samples_from_assemblies, SampleSource};

/// Settings of one compilation run over existing BLAST outputs.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Directory holding one BLAST output per sample.
    pub blast_dir: PathBuf,
    /// Suffix of the BLAST output files, e.g. ".tsv" (a further ".gz" is accepted).
    pub output_suffix: String,
    /// Assemblies defining the sample set. When empty, samples are whatever outputs
    /// `blast_dir` holds.
    pub assemblies: Vec<PathBuf>,
    /// Suffix removed from assembly file names to get sample names.
    pub assembly_suffix: String,
    /// Query FASTA. Without it, only queries hit in some sample get an extract.
    pub queries: Option<PathBuf>,
    pub outdir: PathBuf,
    pub threads: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            blast_dir: PathBuf::from("output/1_blast"),
            output_suffix: ".tsv".to_string(),
            assemblies: Vec::new(),
            assembly_suffix: "fna".to_string(),
            queries: None,
            outdir: PathBuf::from("output"),
            threads: 1,
        }
    }
}

/// What a compilation run produced.
#[derive(Debug, Clone)]
pub struct CompileSummary {
    pub samples: usize,
    /// Samples in which BLAST found nothing.
    pub samples_without_hits: Vec<String>,
    pub hits: usize,
    pub compiled_table: PathBuf,
    pub sample_list: PathBuf,
    pub extracts: Vec<PathBuf>,
}

/// Lists the samples of a run, from the assembly list if one is given, otherwise from
/// the contents of the BLAST output directory.
pub fn find_samples(opts: &CompileOptions) -> Result<Vec<SampleSource>> {
    let sources = if opts.assemblies.is_empty() {
        discover_blast_outputs(&opts.blast_dir, &opts.output_suffix)?
    } else {
        samples_from_assemblies(
            &opts.assemblies,
            &opts.assembly_suffix,
            &opts.blast_dir,
            &opts.output_suffix,
        )
    };
    if sources.is_empty() {
        return Err(HitError::NoSamples);
    }
    Ok(sources)
}

/// Reads and tabulates the BLAST output of every sample in parallel.
///
/// Each sample's table, identifiers included, is built independently; the finished
/// tables then go into the store one at a time.
pub fn load_hit_store(sources: &[SampleSource]) -> Result<HitStore> {
    let store = Mutex::new(HitStore::new());

    sources.par_iter().try_for_each(|source| -> Result<()> {
        let rows = match &source.blast_output {
            Some(path) => read_blast_rows(path)?,
            None => None,
        };
        let hits = SampleHits::build(&source.name, rows.as_deref())?;
        log::debug!("Loaded {} hit(s) of sample {}", hits.hit_count(), source.name);
        store.lock().insert(&source.name, hits)
    })?;

    let store = store.into_inner();
    log::info!(
        "Loaded {} hit(s) from {} sample(s)",
        store.hit_count(),
        store.sample_count()
    );
    Ok(store)
}

/// Unified function to compile BLAST outputs into the run's reports:
/// `compiled_hits.tsv`, `sample_list.txt` and one `<query>.fna` per query, all in
/// `opts.outdir`.
pub fn compile_hits(opts: &CompileOptions) -> Result<CompileSummary> {
    // 1. Samples and their BLAST outputs
    let sources = find_samples(opts)?;

    // 2. Hit tables
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.threads.max(1))
        .build()?;
    let store = pool.install(|| load_hit_store(&sources))?;

    // 3. Reports
    fs::create_dir_all(&opts.outdir).map_err(|e| HitError::io(&opts.outdir, e))?;
    let hits = store.compile(&opts.outdir)?;
    let sample_list = store.write_sample_list(&opts.outdir)?;

    let queries: Vec<String> = match &opts.queries {
        Some(path) => read_fasta_ids(path)?,
        None => store.queries().into_iter().map(String::from).collect(),
    };
    let extracts = store.extract_queries(queries.as_slice(), &opts.outdir)?;

    let samples_without_hits = store
        .sample_names()
        .into_iter()
        .filter(|s| store.get(s).is_some_and(SampleHits::is_absent))
        .map(String::from)
        .collect();

    Ok(CompileSummary {
        samples: store.sample_count(),
        samples_without_hits,
        hits,
        compiled_table: opts.outdir.join(COMPILED_HITS_FILE),
        sample_list,
        extracts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn row(query: &str, contig: &str, seq: &str) -> String {
        format!("{query}\t{contig}\t99.1\t12\t0\t0\t1\t12\t7\t18\t3e-12\t44.2\t100\t{seq}\n")
    }

    #[test]
    fn test_compile_hits_api() {
        let blast = tempdir().unwrap();
        let out = tempdir().unwrap();
        let outdir = out.path().join("report");

        fs::write(
            blast.path().join("S1.tsv"),
            row("geneA", "c1", "ACGTACGTACGT") + &row("geneA", "c2", "TTTTACGTACGT"),
        )
        .unwrap();
        fs::write(blast.path().join("S2.tsv"), "").unwrap();
        fs::write(blast.path().join("S3.tsv"), row("geneB", "c5", "GGGGACGTACGT")).unwrap();

        let queries = blast.path().join("queries.fasta");
        fs::write(&queries, ">geneA\nACGT\n>geneB\nACGT\n>geneC\nACGT\n").unwrap();

        let opts = CompileOptions {
            blast_dir: blast.path().to_path_buf(),
            queries: Some(queries),
            outdir: outdir.clone(),
            threads: 2,
            ..Default::default()
        };
        let summary = compile_hits(&opts).expect("compilation failed");

        assert_eq!(summary.samples, 3);
        assert_eq!(summary.samples_without_hits, vec!["S2"]);
        assert_eq!(summary.hits, 3);
        assert_eq!(summary.extracts.len(), 3);

        let table = fs::read_to_string(&summary.compiled_table).unwrap();
        assert_eq!(table.lines().count(), 1 + 3);
        assert!(table.contains("S1\tgeneA@S1:1\tgeneA\tc1\t"));
        assert!(table.contains("S1\tgeneA@S1:2\tgeneA\tc2\t"));
        assert!(table.contains("S3\tgeneB@S3\tgeneB\tc5\t"));

        assert_eq!(fs::read_to_string(&summary.sample_list).unwrap(), "S1\nS2\nS3\n");
        assert_eq!(
            fs::read_to_string(outdir.join("geneA.fna")).unwrap(),
            ">geneA@S1:1\nACGTACGTACGT\n>geneA@S1:2\nTTTTACGTACGT\n"
        );
        assert_eq!(fs::read_to_string(outdir.join("geneC.fna")).unwrap(), "");
    }

    #[test]
    fn test_compile_hits_from_assemblies() {
        let genomes = tempdir().unwrap();
        let blast = tempdir().unwrap();
        let out = tempdir().unwrap();

        let assemblies: Vec<PathBuf> = ["S1.fna", "S2.fna"]
            .iter()
            .map(|f| genomes.path().join(f))
            .collect();
        for a in &assemblies {
            fs::write(a, ">c\nACGT\n").unwrap();
        }
        fs::write(blast.path().join("S1.tsv"), row("geneA", "c1", "ACGT")).unwrap();

        let opts = CompileOptions {
            blast_dir: blast.path().to_path_buf(),
            assemblies,
            outdir: out.path().to_path_buf(),
            ..Default::default()
        };
        let summary = compile_hits(&opts).unwrap();
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.samples_without_hits, vec!["S2"]);
        assert_eq!(summary.extracts, vec![out.path().join("geneA.fna")]);
    }

    #[test]
    fn test_malformed_output_fails() {
        let blast = tempdir().unwrap();
        let out = tempdir().unwrap();
        fs::write(blast.path().join("S1.tsv"), "geneA\tc1\tnot-enough\n").unwrap();

        let opts = CompileOptions {
            blast_dir: blast.path().to_path_buf(),
            outdir: out.path().to_path_buf(),
            ..Default::default()
        };
        assert!(matches!(
            compile_hits(&opts),
            Err(HitError::MalformedRow { ref sample, row: 1, .. }) if sample == "S1"
        ));
    }

    #[test]
    fn test_no_samples() {
        let blast = tempdir().unwrap();
        let opts = CompileOptions {
            blast_dir: blast.path().to_path_buf(),
            ..Default::default()
        };
        assert!(matches!(compile_hits(&opts), Err(HitError::NoSamples)));
    }

    #[test]
    fn test_plain_and_gzipped_output_of_one_sample() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let blast = tempdir().unwrap();
        let out = tempdir().unwrap();
        let line = row("geneA", "c1", "ACGTACGTACGT");
        fs::write(blast.path().join("S1.tsv"), &line).unwrap();
        let mut encoder = GzEncoder::new(
            fs::File::create(blast.path().join("S1.tsv.gz")).unwrap(),
            Compression::default(),
        );
        encoder.write_all(line.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let opts = CompileOptions {
            blast_dir: blast.path().to_path_buf(),
            outdir: out.path().to_path_buf(),
            ..Default::default()
        };
        let summary = compile_hits(&opts).expect("one sample with two output files");
        assert_eq!(summary.samples, 1);
        assert_eq!(summary.hits, 1);
        let table = fs::read_to_string(&summary.compiled_table).unwrap();
        assert!(table.contains("S1\tgeneA@S1\tgeneA\tc1\t"));
    }
}
