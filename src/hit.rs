//src/hit.rs

use std::io::{self, Write};

use crate::error::{HitError, Result};

/// The `-outfmt` string BLAST must be run with so that its rows parse as [`Hit`]s:
/// the twelve standard tabular columns, then query coverage per HSP and the aligned
/// subject sequence.
pub const BLAST_OUTFMT: &str =
    "6 qseqid sseqid pident length mismatch gapopen qstart qend sstart send evalue bitscore qcovhsp sseq";

/// Number of tab-separated fields in one BLAST row.
pub const BLAST_FIELD_COUNT: usize = 2 + HIT_ATTRS.len();

/// Names of the alignment attributes, in BLAST column order (after qseqid and sseqid).
pub const HIT_ATTRS: [&str; 12] = [
    "pident", "length", "mismatch", "gapopen", "qstart", "qend", "sstart", "send", "evalue",
    "bitscore", "qcovhsp", "sseq",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Float,
    Count,
    Text,
}

const ATTR_KINDS: [ColumnKind; 12] = [
    ColumnKind::Float, // pident
    ColumnKind::Count, // length
    ColumnKind::Count, // mismatch
    ColumnKind::Count, // gapopen
    ColumnKind::Count, // qstart
    ColumnKind::Count, // qend
    ColumnKind::Count, // sstart
    ColumnKind::Count, // send
    ColumnKind::Float, // evalue
    ColumnKind::Float, // bitscore
    ColumnKind::Float, // qcovhsp
    ColumnKind::Text,  // sseq
];

const SSEQ_IDX: usize = 11;

/// Numeric metrics of an alignment, parsed once when the row is read.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HitMetrics {
    identity: f64,
    length: u64,
    evalue: f64,
    bit_score: f64,
    query_coverage: f64,
}

/// One BLAST alignment found in a sample, plus its hit identifier.
///
/// The attribute values keep the exact text BLAST printed, so compiled tables
/// reproduce e-values like `1e-50` unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub sample: String,
    pub query: String,
    pub subject: String,
    hit_id: String,
    attrs: Vec<String>,
    metrics: HitMetrics,
}

impl Hit {
    /// Parses one raw BLAST row for `sample`. `row` is the 1-based row number used in
    /// error reports.
    ///
    /// The initial hit identifier is `<query>@<sample>`.
    pub fn from_row(sample: &str, row: usize, line: &str) -> Result<Self> {
        let malformed = |reason: String| HitError::MalformedRow {
            sample: sample.to_string(),
            row,
            reason,
        };

        let line = line.trim_end_matches(['\n', '\r']);
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != BLAST_FIELD_COUNT {
            return Err(malformed(format!(
                "expected {} tab-separated fields, found {}",
                BLAST_FIELD_COUNT,
                fields.len()
            )));
        }

        let query = fields[0].trim();
        let subject = fields[1].trim();
        if query.is_empty() {
            return Err(malformed("empty qseqid".to_string()));
        }
        if subject.is_empty() {
            return Err(malformed("empty sseqid".to_string()));
        }

        let attrs: Vec<String> = fields[2..].iter().map(|f| f.trim().to_string()).collect();
        for ((name, kind), value) in HIT_ATTRS.iter().zip(ATTR_KINDS).zip(&attrs) {
            let ok = match kind {
                ColumnKind::Float => value.parse::<f64>().is_ok(),
                ColumnKind::Count => value.parse::<u64>().is_ok(),
                ColumnKind::Text => !value.is_empty(),
            };
            if !ok {
                return Err(malformed(format!("invalid {name} value '{value}'")));
            }
        }

        let float = |i: usize| attrs[i].parse::<f64>().unwrap_or_default();
        let metrics = HitMetrics {
            identity: float(0),
            length: attrs[1].parse().unwrap_or_default(),
            evalue: float(8),
            bit_score: float(9),
            query_coverage: float(10),
        };

        Ok(Self {
            sample: sample.to_string(),
            query: query.to_string(),
            subject: subject.to_string(),
            hit_id: format!("{query}@{sample}"),
            attrs,
            metrics,
        })
    }

    pub fn hit_id(&self) -> &str {
        &self.hit_id
    }

    /// Overwrites the hit identifier. Only the table's disambiguation pass calls this.
    pub fn set_hit_id(&mut self, new_id: String) {
        self.hit_id = new_id;
    }

    /// Looks up an attribute by its BLAST column name (see [`HIT_ATTRS`]).
    pub fn attr(&self, name: &str) -> Option<&str> {
        HIT_ATTRS
            .iter()
            .position(|&n| n == name)
            .map(|i| self.attrs[i].as_str())
    }

    /// Attribute values in [`HIT_ATTRS`] order.
    pub fn attr_values(&self) -> &[String] {
        &self.attrs
    }

    pub fn identity(&self) -> f64 {
        self.metrics.identity
    }

    pub fn alignment_length(&self) -> u64 {
        self.metrics.length
    }

    pub fn evalue(&self) -> f64 {
        self.metrics.evalue
    }

    pub fn bit_score(&self) -> f64 {
        self.metrics.bit_score
    }

    pub fn query_coverage(&self) -> f64 {
        self.metrics.query_coverage
    }

    /// The aligned subject sequence, as reported by BLAST.
    pub fn sequence(&self) -> &str {
        &self.attrs[SSEQ_IDX]
    }

    /// Writes the matched sequence as a single FASTA record headed by the hit identifier.
    pub fn write_sequence<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        writeln!(sink, ">{}\n{}", self.hit_id, self.sequence())
    }
}
