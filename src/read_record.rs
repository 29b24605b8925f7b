//! Read Record: one sequencing read plus the list of DR occurrences found in
//! it. Corresponds to `ReadHolder` in the original `crass` tool, but modeled
//! as one `Range<usize>` per occurrence rather than a flat even-length list
//! of start/stop integers: the same invariants (non-overlapping, strictly
//! increasing, uniform length) fall out of `Vec<Range<usize>>` for free.

use std::ops::Range;

use crate::seq::canonical_form;

/// One occurrence of the DR in a read, as a half-open `[start, end)` range.
pub type Interval = Range<usize>;

/// A read, its metadata, and the DR intervals found within it so far.
///
/// Mutation protocol: `header`/`comment`/`quality` are set at
/// construction and never modified. `bases` is set at construction; the only
/// exception is transient homopolymer-collapsed search buffers, which are
/// handled out-of-band by `homopolymer` and never stored back onto a
/// `ReadRecord`. `intervals` is appended to during seeding, rewritten in
/// place during extension, and frozen at registration.
#[derive(Debug, Clone)]
pub struct ReadRecord {
    pub header: String,
    pub comment: Option<String>,
    pub bases: Vec<u8>,
    pub quality: Option<Vec<u8>>,
    intervals: Vec<Interval>,
}

impl ReadRecord {
    pub fn new(header: impl Into<String>, bases: Vec<u8>) -> Self {
        ReadRecord {
            header: header.into(),
            comment: None,
            bases,
            quality: None,
            intervals: Vec::new(),
        }
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_quality(mut self, quality: Option<Vec<u8>>) -> Self {
        self.quality = quality;
        self
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn num_repeats(&self) -> usize {
        self.intervals.len()
    }

    pub fn num_spacers(&self) -> usize {
        self.intervals.len().saturating_sub(1)
    }

    pub fn push_interval(&mut self, interval: Interval) {
        self.intervals.push(interval);
    }

    pub fn clear_intervals(&mut self) {
        self.intervals.clear();
    }

    pub fn set_intervals(&mut self, intervals: Vec<Interval>) {
        self.intervals = intervals;
    }

    pub fn first_repeat_start(&self) -> usize {
        self.intervals[0].start
    }

    pub fn last_repeat_start(&self) -> usize {
        self.intervals[self.intervals.len() - 1].start
    }

    /// Substring covered by the k-th DR occurrence.
    pub fn repeat_at(&self, k: usize) -> &[u8] {
        &self.bases[self.intervals[k].clone()]
    }

    /// Substring strictly between occurrences `k` and `k + 1`.
    pub fn spacer_at(&self, k: usize) -> &[u8] {
        &self.bases[self.intervals[k].end..self.intervals[k + 1].start]
    }

    pub fn all_spacers(&self) -> Vec<&[u8]> {
        (0..self.num_spacers()).map(|k| self.spacer_at(k)).collect()
    }

    /// The minimum spacing (start-to-start distance) between adjacent DR
    /// occurrences. Caps how far `extend_pre_repeat` may grow the repeat.
    pub fn shortest_spacing(&self) -> usize {
        self.intervals
            .windows(2)
            .map(|pair| pair[1].start - pair[0].start)
            .min()
            .expect("shortest_spacing requires at least two intervals")
    }

    /// The lexicographically smaller of the first DR occurrence and its
    /// reverse complement, uppercased.
    pub fn canonical_dr(&self) -> Vec<u8> {
        canonical_form(self.repeat_at(0))
    }

    /// True when every interval invariant holds: at least two intervals,
    /// non-overlapping, strictly increasing starts, uniform length, entirely
    /// inside the base string.
    pub fn intervals_well_formed(&self) -> bool {
        if self.intervals.len() < 2 {
            return false;
        }
        let len = self.intervals[0].end - self.intervals[0].start;
        for iv in &self.intervals {
            if iv.end < iv.start || iv.end - iv.start != len {
                return false;
            }
            if iv.end > self.bases.len() {
                return false;
            }
        }
        self.intervals.windows(2).all(|pair| pair[0].end <= pair[1].start)
    }

    /// Clip every interval to stay inside `[0, len)`, dropping degenerate
    /// (empty) intervals this may produce. Used when extension or singleton
    /// placement would otherwise run off a read edge.
    pub fn clip_intervals_to_bounds(&mut self) {
        let len = self.bases.len();
        for iv in &mut self.intervals {
            if iv.start > len {
                iv.start = len;
            }
            if iv.end > len {
                iv.end = len;
            }
        }
        self.intervals.retain(|iv| iv.start < iv.end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ReadRecord {
        // "AAAAA" + DR(24) + spacer(30) x3 + DR(24) + "TTTTT"
        let dr = "GTTTCAATCGATAGCTACGTATCG";
        let spacer = "CGATCGATCGATCGATCGATCGATCGATCG";
        let mut bases = String::from("AAAAA");
        let mut starts = Vec::new();
        for _ in 0..3 {
            starts.push(bases.len());
            bases.push_str(dr);
            bases.push_str(spacer);
        }
        starts.push(bases.len());
        bases.push_str(dr);
        bases.push_str("TTTTT");

        let mut rec = ReadRecord::new("read1", bases.into_bytes());
        for s in starts {
            rec.push_interval(s..s + dr.len());
        }
        rec
    }

    #[test]
    fn interval_well_formedness() {
        let rec = sample();
        assert!(rec.intervals_well_formed());
        assert_eq!(rec.num_repeats(), 4);
        assert_eq!(rec.num_spacers(), 3);
    }

    #[test]
    fn repeat_and_spacer_extraction() {
        let rec = sample();
        assert_eq!(rec.repeat_at(0), b"GTTTCAATCGATAGCTACGTATCG");
        assert_eq!(rec.repeat_at(0), rec.repeat_at(2));
        assert_eq!(rec.spacer_at(0).len(), 30);
    }

    #[test]
    fn canonical_dr_is_lexicographically_smaller() {
        let rec = sample();
        let canon = rec.canonical_dr();
        let rc = crate::seq::reverse_complement(rec.repeat_at(0));
        assert!(canon == rec.repeat_at(0).to_ascii_uppercase() || canon == rc);
    }

    #[test]
    fn too_few_intervals_is_not_well_formed() {
        let mut rec = ReadRecord::new("short", b"ACGTACGTACGT".to_vec());
        rec.push_interval(0..4);
        assert!(!rec.intervals_well_formed());
    }

    #[test]
    fn clip_intervals_drops_out_of_range() {
        let mut rec = ReadRecord::new("edge", b"ACGTACGT".to_vec());
        rec.push_interval(0..4);
        rec.push_interval(6..12);
        rec.clip_intervals_to_bounds();
        assert_eq!(rec.intervals(), &[0..4, 6..8]);
    }
}
