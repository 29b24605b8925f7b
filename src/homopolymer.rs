//! Homopolymer run-length encoding (RLE), used when `remove_homopolymers` is
//! active. Collapses maximal runs of identical bases to a single base and
//! remembers per-position multiplicities, so that interval coordinates found
//! in the collapsed sequence can be expanded back into original-read
//! coordinates once discovery has finished.

use std::ops::Range;

/// Collapse every maximal run of identical bytes in `bases` to a single byte.
/// Returns the collapsed sequence and, parallel to it, each run's length.
pub fn encode(bases: &[u8]) -> (Vec<u8>, Vec<usize>) {
    let mut encoded = Vec::new();
    let mut run_lengths = Vec::new();
    let mut i = 0;
    while i < bases.len() {
        let b = bases[i];
        let mut j = i + 1;
        while j < bases.len() && bases[j] == b {
            j += 1;
        }
        encoded.push(b);
        run_lengths.push(j - i);
        i = j;
    }
    (encoded, run_lengths)
}

/// Re-expand a collapsed sequence back to its original length.
pub fn decode(encoded: &[u8], run_lengths: &[usize]) -> Vec<u8> {
    let mut out = Vec::with_capacity(run_lengths.iter().sum());
    for (&b, &run) in encoded.iter().zip(run_lengths.iter()) {
        out.extend(std::iter::repeat(b).take(run));
    }
    out
}

fn run_start_offsets(run_lengths: &[usize]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(run_lengths.len());
    let mut acc = 0;
    for &run in run_lengths {
        offsets.push(acc);
        acc += run;
    }
    offsets
}

/// Map a half-open coordinate range in collapsed (encoded) space back to the
/// equivalent half-open range in the original (decoded) sequence.
pub fn expand_interval(range: Range<usize>, run_lengths: &[usize]) -> Range<usize> {
    let offsets = run_start_offsets(run_lengths);
    let total_len: usize = run_lengths.iter().sum();
    let start = offsets.get(range.start).copied().unwrap_or(total_len);
    let end = offsets.get(range.end).copied().unwrap_or(total_len);
    start..end
}
