//src/hit_store.rs

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{HitError, Result};
use crate::hit::HIT_ATTRS;
use crate::hit_table::SampleHits;

/// File name of the compiled cross-sample table.
pub const COMPILED_HITS_FILE: &str = "compiled_hits.tsv";

/// File name of the list of samples, one per line.
pub const SAMPLE_LIST_FILE: &str = "sample_list.txt";

/// Extension of the per-query FASTA extracts.
pub const EXTRACT_EXTENSION: &str = "fna";

/// Hit tables of every sample in a run.
///
/// Each sample is added exactly once. Samples are reported in name order, so the
/// outputs do not depend on the order in which tables were added.
#[derive(Debug, Default)]
pub struct HitStore {
    tables: BTreeMap<String, SampleHits>,
}

impl HitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the hit table of `sample` from raw BLAST rows and stores it.
    /// `None` records that BLAST found no hits in the sample.
    pub fn add_table<S: AsRef<str>>(&mut self, sample: &str, rows: Option<&[S]>) -> Result<()> {
        let hits = SampleHits::build(sample, rows)?;
        self.insert(sample, hits)
    }

    /// Stores a table built elsewhere. Fails if the sample is already present.
    pub fn insert(&mut self, sample: &str, hits: SampleHits) -> Result<()> {
        match self.tables.entry(sample.to_string()) {
            Entry::Occupied(_) => Err(HitError::DuplicateSample(sample.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(hits);
                Ok(())
            }
        }
    }

    pub fn sample_count(&self) -> usize {
        self.tables.len()
    }

    pub fn sample_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn get(&self, sample: &str) -> Option<&SampleHits> {
        self.tables.get(sample)
    }

    /// Total number of hits over all present tables.
    pub fn hit_count(&self) -> usize {
        self.tables.values().map(SampleHits::hit_count).sum()
    }

    /// Every query hit in at least one sample, sorted.
    pub fn queries(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self
            .tables
            .values()
            .filter_map(SampleHits::table)
            .flat_map(|t| t.queries())
            .collect();
        set.into_iter().collect()
    }

    /// Writes every hit of `query` across samples to `<output_dir>/<query>.fna`,
    /// replacing any existing file. The file is created even when no sample has the
    /// query. Returns the number of records written.
    ///
    /// The query identifier becomes the file name, so an empty identifier or one
    /// containing a path separator is rejected with [`HitError::InvalidQueryId`]
    /// before anything is written.
    pub fn extract_query<P: AsRef<Path>>(&self, query: &str, output_dir: P) -> Result<usize> {
        if query.is_empty() || query.contains(['/', '\\']) {
            return Err(HitError::InvalidQueryId(query.to_string()));
        }
        let path = output_dir
            .as_ref()
            .join(format!("{query}.{EXTRACT_EXTENSION}"));
        let file = File::create(&path).map_err(|e| HitError::io(&path, e))?;
        let mut fasta = BufWriter::new(file);

        let mut n = 0;
        for (sample, hits) in &self.tables {
            match hits {
                SampleHits::Present(table) => match table.get(query) {
                    Some(hits) => {
                        for hit in hits {
                            hit.write_sequence(&mut fasta)
                                .map_err(|e| HitError::io(&path, e))?;
                            n += 1;
                        }
                    }
                    None => log::warn!(
                        "extract_query: query sequence {} was not found in sample {}",
                        query,
                        sample
                    ),
                },
                SampleHits::Absent => log::warn!(
                    "extract_query: no query sequence was found in sample {}",
                    sample
                ),
            }
        }
        fasta.flush().map_err(|e| HitError::io(&path, e))?;
        Ok(n)
    }

    /// Runs [`HitStore::extract_query`] for each query. Returns the paths written.
    pub fn extract_queries<Q, P>(&self, queries: &[Q], output_dir: P) -> Result<Vec<PathBuf>>
    where
        Q: AsRef<str>,
        P: AsRef<Path>,
    {
        let output_dir = output_dir.as_ref();
        let mut written = Vec::with_capacity(queries.len());
        for query in queries {
            let query = query.as_ref();
            let n = self.extract_query(query, output_dir)?;
            log::debug!("Extracted {} sequence(s) of {}", n, query);
            written.push(output_dir.join(format!("{query}.{EXTRACT_EXTENSION}")));
        }
        Ok(written)
    }

    /// Writes `<output_dir>/compiled_hits.tsv`, one row per hit of every present
    /// table. The file is rewritten on every call. Returns the number of data rows.
    pub fn compile<P: AsRef<Path>>(&self, output_dir: P) -> Result<usize> {
        let path = output_dir.as_ref().join(COMPILED_HITS_FILE);
        let file = File::create(&path).map_err(|e| HitError::io(&path, e))?;
        let mut tsv = BufWriter::new(file);
        let n = self
            .write_compiled(&mut tsv)
            .map_err(|e| HitError::io(&path, e))?;
        tsv.flush().map_err(|e| HitError::io(&path, e))?;
        log::info!("Compiled {} hit(s) from {} sample(s) into {}", n, self.sample_count(), path.display());
        Ok(n)
    }

    fn write_compiled<W: Write>(&self, out: &mut W) -> std::io::Result<usize> {
        writeln!(out, "sample\thit\tqseqid\tsseqid\t{}", HIT_ATTRS.join("\t"))?;
        let mut n = 0;
        for (sample, hits) in &self.tables {
            let Some(table) = hits.table() else {
                log::warn!("compile: no query sequence was found in sample {}", sample);
                continue;
            };
            for hit in table.hits() {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    sample,
                    hit.hit_id(),
                    hit.query,
                    hit.subject,
                    hit.attr_values().join("\t")
                )?;
                n += 1;
            }
        }
        Ok(n)
    }

    /// Writes `<output_dir>/sample_list.txt` with every sample name, including samples
    /// without hits.
    pub fn write_sample_list<P: AsRef<Path>>(&self, output_dir: P) -> Result<PathBuf> {
        let path = output_dir.as_ref().join(SAMPLE_LIST_FILE);
        let file = File::create(&path).map_err(|e| HitError::io(&path, e))?;
        let mut out = BufWriter::new(file);
        for sample in self.tables.keys() {
            writeln!(out, "{sample}").map_err(|e| HitError::io(&path, e))?;
        }
        out.flush().map_err(|e| HitError::io(&path, e))?;
        Ok(path)
    }
}
