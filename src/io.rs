//! Input source: streams FASTA or FASTQ records, transparently
//! gzip-decompressed, as a single `RecordSource` iterator (spec.md 4.7).
//! Mirrors `crass`'s `getFileHandle`, which always opens its input through
//! zlib regardless of whether the file is actually compressed.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use bio::io::{fasta, fastq};
use flate2::read::MultiGzDecoder;

use crate::error::CrisprError;

/// One input record, format-erased. `quality` is `None` for FASTA input.
#[derive(Debug, Clone)]
pub struct RawRead {
    pub header: String,
    pub comment: Option<String>,
    pub bases: Vec<u8>,
    pub quality: Option<Vec<u8>>,
}

enum Inner {
    Fasta(fasta::Records<Box<dyn BufRead>>),
    Fastq(fastq::Records<Box<dyn BufRead>>),
}

/// A lazy, finite sequence of `RawRead`s from one input path. Detects
/// FASTA vs FASTQ from the first non-empty line's leading sigil (`>` vs
/// `@`), the way `kseq` does, and transparently decompresses `.gz` paths.
pub struct RecordSource {
    path: PathBuf,
    inner: Inner,
}

fn open_reader(path: &Path) -> Result<Box<dyn BufRead>, CrisprError> {
    let file = File::open(path).map_err(|source| CrisprError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn sniff_format(path: &Path) -> Result<bool, CrisprError> {
    let mut reader = open_reader(path)?;
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).map_err(|source| CrisprError::Input {
            path: path.to_path_buf(),
            source,
        })?;
        if n == 0 {
            return Err(CrisprError::Input {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "empty input file"),
            });
        }
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        return Ok(trimmed.starts_with('@'));
    }
}

impl RecordSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CrisprError> {
        let path = path.as_ref().to_path_buf();
        let is_fastq = sniff_format(&path)?;
        let reader = open_reader(&path)?;
        let inner = if is_fastq {
            Inner::Fastq(fastq::Reader::from_bufread(reader).records())
        } else {
            Inner::Fasta(fasta::Reader::from_bufread(reader).records())
        };
        Ok(RecordSource { path, inner })
    }
}

impl Iterator for RecordSource {
    type Item = Result<RawRead, CrisprError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Fasta(records) => records.next().map(|r| {
                r.map(|rec| RawRead {
                    header: rec.id().to_string(),
                    comment: rec.desc().map(str::to_string),
                    bases: rec.seq().to_vec(),
                    quality: None,
                })
                .map_err(|source| CrisprError::Input {
                    path: self.path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::InvalidData, source.to_string()),
                })
            }),
            Inner::Fastq(records) => records.next().map(|r| {
                r.map(|rec| RawRead {
                    header: rec.id().to_string(),
                    comment: rec.desc().map(str::to_string),
                    bases: rec.seq().to_vec(),
                    quality: Some(rec.qual().to_vec()),
                })
                .map_err(|source| CrisprError::Input {
                    path: self.path.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::InvalidData, source.to_string()),
                })
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &[u8], suffix: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "crispr-finder-test-{}-{suffix}",
            std::process::id()
        ));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    #[test]
    fn reads_fasta_records() {
        let path = write_temp(b">r1 a comment\nACGTACGT\n>r2\nTTTT\n", "fa");
        let records: Vec<RawRead> = RecordSource::open(&path)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        std::fs::remove_file(&path).ok();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].header, "r1");
        assert_eq!(records[0].comment.as_deref(), Some("a comment"));
        assert_eq!(records[0].bases, b"ACGTACGT");
        assert!(records[0].quality.is_none());
    }

    #[test]
    fn reads_fastq_records_with_quality() {
        let path = write_temp(b"@r1\nACGT\n+\nIIII\n", "fq");
        let records: Vec<RawRead> = RecordSource::open(&path)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        std::fs::remove_file(&path).ok();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bases, b"ACGT");
        assert_eq!(records[0].quality.as_deref(), Some(&b"IIII"[..]));
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let result = RecordSource::open("/nonexistent/path/to/reads.fa");
        assert!(matches!(result, Err(CrisprError::Input { .. })));
    }
}
