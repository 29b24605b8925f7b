//! Base-level sequence utilities: canonical-form transform, reverse
//! complement, and the similarity score used throughout QC.
//!
//! The reverse-complement and canonicalization tables are lookup arrays built
//! once at compile time, in place of the hand-rolled switch statements the
//! original `crass` tool used in `SeqUtils.cpp`.

use distance::levenshtein;

/// Compile-time reverse-complement table, indexed by ASCII byte value.
/// A↔T, C↔G, M↔K, R↔Y, S↔S, W↔W, V↔B, H↔D, N↔N; unknown bytes map to `N`.
const REVCOMP_TABLE: [u8; 256] = build_revcomp_table();

const fn build_revcomp_table() -> [u8; 256] {
    let mut table = [b'N'; 256];
    let pairs: [(u8, u8); 16] = [
        (b'A', b'T'),
        (b'T', b'A'),
        (b'U', b'A'),
        (b'C', b'G'),
        (b'G', b'C'),
        (b'M', b'K'),
        (b'K', b'M'),
        (b'R', b'Y'),
        (b'Y', b'R'),
        (b'S', b'S'),
        (b'W', b'W'),
        (b'V', b'B'),
        (b'B', b'V'),
        (b'H', b'D'),
        (b'D', b'H'),
        (b'N', b'N'),
    ];
    let mut i = 0;
    while i < pairs.len() {
        let (from, to) = pairs[i];
        table[from as usize] = to;
        table[from.to_ascii_lowercase() as usize] = to;
        i += 1;
    }
    table
}

/// Compile-time canonical-base table: maps any byte to one of `{A,C,G,T,N}`.
/// Ambiguous IUPAC codes and gap characters collapse to `N`.
const CANONICAL_BASE_TABLE: [u8; 256] = build_canonical_table();

const fn build_canonical_table() -> [u8; 256] {
    let mut table = [b'N'; 256];
    let pairs: [(u8, u8); 4] = [(b'A', b'A'), (b'C', b'C'), (b'G', b'G'), (b'T', b'T')];
    let mut i = 0;
    while i < pairs.len() {
        let (from, to) = pairs[i];
        table[from as usize] = to;
        table[from.to_ascii_lowercase() as usize] = to;
        i += 1;
    }
    table
}

/// Return the reverse complement of a base string, honoring IUPAC
/// ambiguity codes.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| REVCOMP_TABLE[b as usize]).collect()
}

/// Collapse every character in `seq` to one of `{A,C,G,T,N}`, case-insensitive.
pub fn canonicalize_bases(seq: &[u8]) -> Vec<u8> {
    seq.iter().map(|&b| CANONICAL_BASE_TABLE[b as usize]).collect()
}

/// Return the lexicographically smaller of `seq` and its reverse complement,
/// uppercased. This is the "canonical DR" / "laurenize" transform (named
/// after `laurenize` in the original `crass` `SeqUtils.cpp`).
pub fn canonical_form(seq: &[u8]) -> Vec<u8> {
    let upper: Vec<u8> = seq.to_ascii_uppercase();
    let rc = reverse_complement(&upper);
    if upper <= rc {
        upper
    } else {
        rc
    }
}

/// Fractional character-level similarity between two strings, in `[0, 1]`.
///
/// Computed as `1 - levenshtein(a, b) / max(len_a, len_b)`, using the
/// `distance` crate's Levenshtein implementation. Used consistently across
/// every QC test in `finder::qc`.
pub fn similarity(a: &[u8], b: &[u8]) -> f64 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    let dist = levenshtein(
        std::str::from_utf8(a).unwrap_or_default(),
        std::str::from_utf8(b).unwrap_or_default(),
    );
    1.0 - (dist as f64 / max_len as f64)
}
