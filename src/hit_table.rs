//src/hit_table.rs

use ahash::AHashMap;

use crate::error::Result;
use crate::hit::Hit;

/// Hits of one sample, grouped by query.
///
/// Queries keep the order in which they were first seen in the BLAST output, and hits
/// under a query keep their row order.
#[derive(Debug, Clone, Default)]
pub struct HitTable {
    groups: Vec<(String, Vec<Hit>)>,
    index: AHashMap<String, usize>,
}

/// A sample's entry in the hit store.
///
/// `Absent` means BLAST found nothing at all in the sample. It is kept distinct from
/// an empty table so that reports can still name the sample.
#[derive(Debug, Clone)]
pub enum SampleHits {
    Present(HitTable),
    Absent,
}

impl HitTable {
    /// Builds the table of `sample` from raw BLAST rows, assigning hit identifiers.
    ///
    /// A query hit once keeps `<query>@<sample>`. A query hit n > 1 times gets
    /// `<query>@<sample>:1` .. `:n` in row order.
    pub fn from_rows<S: AsRef<str>>(sample: &str, rows: &[S]) -> Result<Self> {
        // Staging: group every hit under its query before any id is final.
        let mut table = HitTable::default();
        for (i, line) in rows.iter().enumerate() {
            let hit = Hit::from_row(sample, i + 1, line.as_ref())?;
            table.push(hit);
        }

        for (_, hits) in table.groups.iter_mut() {
            if hits.len() > 1 {
                for (n, hit) in hits.iter_mut().enumerate() {
                    let id = format!("{}:{}", hit.hit_id(), n + 1);
                    hit.set_hit_id(id);
                }
            }
        }

        log::debug!(
            "Sample {}: {} hit(s) of {} query sequence(s)",
            sample,
            table.hit_count(),
            table.query_count()
        );
        Ok(table)
    }

    fn push(&mut self, hit: Hit) {
        match self.index.get(&hit.query) {
            Some(&i) => self.groups[i].1.push(hit),
            None => {
                self.index.insert(hit.query.clone(), self.groups.len());
                self.groups.push((hit.query.clone(), vec![hit]));
            }
        }
    }

    /// Hits of `query`, or `None` if the query was not hit in this sample.
    pub fn get(&self, query: &str) -> Option<&[Hit]> {
        self.index.get(query).map(|&i| self.groups[i].1.as_slice())
    }

    /// Query identifiers in first-seen order.
    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(q, _)| q.as_str())
    }

    /// All hits, query by query.
    pub fn hits(&self) -> impl Iterator<Item = &Hit> {
        self.groups.iter().flat_map(|(_, hits)| hits.iter())
    }

    pub fn query_count(&self) -> usize {
        self.groups.len()
    }

    pub fn hit_count(&self) -> usize {
        self.groups.iter().map(|(_, hits)| hits.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl SampleHits {
    /// Builds a sample entry; `None` stands for "no hits found".
    pub fn build<S: AsRef<str>>(sample: &str, rows: Option<&[S]>) -> Result<Self> {
        match rows {
            Some(rows) => Ok(SampleHits::Present(HitTable::from_rows(sample, rows)?)),
            None => Ok(SampleHits::Absent),
        }
    }

    pub fn table(&self) -> Option<&HitTable> {
        match self {
            SampleHits::Present(table) => Some(table),
            SampleHits::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, SampleHits::Absent)
    }

    pub fn hit_count(&self) -> usize {
        self.table().map_or(0, HitTable::hit_count)
    }
}
