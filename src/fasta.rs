use std::io::BufRead;
use std::path::Path;

use ahash::AHashSet;

use crate::blast_output::open_text;
use crate::error::{HitError, Result};

/// Lists the sequence identifiers of a (optionally gzipped) multi-FASTA file.
///
/// The identifier is the first word of the header, which is what BLAST reports as
/// `qseqid`. Repeated identifiers are listed once, in first-seen order.
pub fn read_fasta_ids<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let reader = open_text(path)?;

    let mut ids = Vec::new();
    let mut seen = AHashSet::new();
    for line in reader.lines() {
        let line = line.map_err(|e| HitError::io(path, e))?;
        let Some(header) = line.strip_prefix('>') else {
            continue;
        };
        let Some(id) = header.split_whitespace().next() else {
            log::warn!("Skipping FASTA record with an empty header in {}", path.display());
            continue;
        };
        if seen.insert(id.to_string()) {
            ids.push(id.to_string());
        } else {
            log::warn!("Duplicate sequence identifier {} in {}", id, path.display());
        }
    }
    Ok(ids)
}
