//src/blast_output.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{HitError, Result};

/// Opens a text file, decompressing it on the fly when the name ends with ".gz".
pub(crate) fn open_text<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| HitError::io(path, e))?;

    let is_gz = path
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    Ok(if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(f)))
    } else {
        Box::new(BufReader::new(f))
    })
}

/// Reads the raw rows of one BLAST tabular output.
///
/// Blank lines and `#` comment lines (as written by `-outfmt 7`) are skipped.
/// Returns `None` when no row is left: BLAST found nothing in the sample.
pub fn read_blast_rows<P: AsRef<Path>>(path: P) -> Result<Option<Vec<String>>> {
    let path = path.as_ref();
    let reader = open_text(path)?;

    let mut rows = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| HitError::io(path, e))?;
        let trimmed = line.trim_end();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        rows.push(line);
    }

    if rows.is_empty() {
        Ok(None)
    } else {
        Ok(Some(rows))
    }
}
