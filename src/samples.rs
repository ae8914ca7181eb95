//src/samples.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{HitError, Result};

/// A sample and the BLAST output holding its hits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSource {
    pub name: String,
    /// `None` when the expected output file does not exist.
    pub blast_output: Option<PathBuf>,
}

fn dotted(suffix: &str) -> String {
    if suffix.starts_with('.') {
        suffix.to_string()
    } else {
        format!(".{suffix}")
    }
}

/// Derives a sample name from a file path by removing `suffix` from its file name.
/// `suffix` may be given with or without the leading dot ("fna" or ".fna").
///
/// Returns `None` if the file name does not end with the suffix or nothing is left.
pub fn sample_name<P: AsRef<Path>>(path: P, suffix: &str) -> Option<String> {
    let file_name = path.as_ref().file_name()?.to_str()?;
    let name = file_name.strip_suffix(&dotted(suffix))?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Finds BLAST outputs named `<sample><suffix>` or `<sample><suffix>.gz` in `dir`,
/// sorted by sample name.
///
/// When a sample has both, the plain file is used, as in [`samples_from_assemblies`].
pub fn discover_blast_outputs<P: AsRef<Path>>(dir: P, suffix: &str) -> Result<Vec<SampleSource>> {
    let dir = dir.as_ref();
    let gz_suffix = format!("{}.gz", dotted(suffix));

    // (sample, gzipped, path)
    let mut found: Vec<(String, bool, PathBuf)> = fs::read_dir(dir)
        .map_err(|e| HitError::io(dir, e))?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_file() {
                return None;
            }
            match sample_name(&path, &gz_suffix) {
                Some(name) => Some((name, true, path)),
                None => sample_name(&path, suffix).map(|name| (name, false, path)),
            }
        })
        .collect();

    // Plain before gzipped within a sample.
    found.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut sources: Vec<SampleSource> = Vec::with_capacity(found.len());
    for (name, _, path) in found {
        if let Some(kept) = sources.last().filter(|s| s.name == name) {
            log::warn!(
                "Ignoring {} for sample {}: {} is used instead",
                path.display(),
                name,
                kept.blast_output.as_deref().unwrap_or(dir).display()
            );
            continue;
        }
        sources.push(SampleSource {
            name,
            blast_output: Some(path),
        });
    }
    Ok(sources)
}

/// Names samples after their assembly files and pairs each with its expected BLAST
/// output in `blast_dir`, plain or gzipped.
///
/// Assemblies that do not exist or whose names lack `assembly_suffix` are skipped with
/// a warning. A sample whose BLAST output is missing gets `blast_output: None`.
pub fn samples_from_assemblies<P: AsRef<Path>>(
    assemblies: &[PathBuf],
    assembly_suffix: &str,
    blast_dir: P,
    output_suffix: &str,
) -> Vec<SampleSource> {
    let blast_dir = blast_dir.as_ref();
    let output_suffix = dotted(output_suffix);

    let mut sources = Vec::with_capacity(assemblies.len());
    for assembly in assemblies {
        if !assembly.exists() {
            log::warn!("Assembly {} does not exist and is skipped", assembly.display());
            continue;
        }
        let Some(name) = sample_name(assembly, assembly_suffix) else {
            log::warn!(
                "Assembly {} does not end with {} and is skipped",
                assembly.display(),
                dotted(assembly_suffix)
            );
            continue;
        };

        let plain = blast_dir.join(format!("{name}{output_suffix}"));
        let gz = blast_dir.join(format!("{name}{output_suffix}.gz"));
        let blast_output = if plain.is_file() {
            Some(plain)
        } else if gz.is_file() {
            Some(gz)
        } else {
            log::warn!("No BLAST output found for sample {} in {}", name, blast_dir.display());
            None
        };
        sources.push(SampleSource { name, blast_output });
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_name() {
        assert_eq!(sample_name("data/ST131_1.fna", "fna"), Some("ST131_1".to_string()));
        assert_eq!(sample_name("data/ST131_1.fna", ".fna"), Some("ST131_1".to_string()));
        assert_eq!(sample_name("x/a.b.fasta", "fasta"), Some("a.b".to_string()));
        assert_eq!(sample_name("x/a.fasta", "fna"), None);
        assert_eq!(sample_name("x/.fna", "fna"), None);
    }

    #[test]
    fn test_discover_blast_outputs() {
        let dir = tempdir().unwrap();
        for f in ["S2.tsv", "S1.tsv.gz", "notes.txt"] {
            fs::write(dir.path().join(f), "").unwrap();
        }
        fs::create_dir(dir.path().join("S3.tsv")).unwrap();

        let sources = discover_blast_outputs(dir.path(), "tsv").unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["S1", "S2"]);
        assert_eq!(sources[0].blast_output, Some(dir.path().join("S1.tsv.gz")));
    }

    #[test]
    fn test_discover_prefers_plain_over_gzipped() {
        let dir = tempdir().unwrap();
        for f in ["S1.tsv.gz", "S1.tsv", "S2.tsv.gz"] {
            fs::write(dir.path().join(f), "").unwrap();
        }

        let sources = discover_blast_outputs(dir.path(), ".tsv").unwrap();
        assert_eq!(
            sources,
            vec![
                SampleSource {
                    name: "S1".to_string(),
                    blast_output: Some(dir.path().join("S1.tsv")),
                },
                SampleSource {
                    name: "S2".to_string(),
                    blast_output: Some(dir.path().join("S2.tsv.gz")),
                },
            ]
        );
    }

    #[test]
    fn test_samples_from_assemblies() {
        let genomes = tempdir().unwrap();
        let blast = tempdir().unwrap();
        let a1 = genomes.path().join("S1.fna");
        let a2 = genomes.path().join("S2.fna");
        let a3 = genomes.path().join("S3.fasta");
        for a in [&a1, &a2, &a3] {
            fs::write(a, ">c\nACGT\n").unwrap();
        }
        fs::write(blast.path().join("S1.tsv"), "").unwrap();

        let missing = genomes.path().join("S4.fna");
        let sources = samples_from_assemblies(&[a1, a2, a3, missing], "fna", blast.path(), "tsv");
        assert_eq!(
            sources,
            vec![
                SampleSource {
                    name: "S1".to_string(),
                    blast_output: Some(blast.path().join("S1.tsv")),
                },
                SampleSource {
                    name: "S2".to_string(),
                    blast_output: None,
                },
            ]
        );
    }
}
