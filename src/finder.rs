//! Long-Read Finder: the windowed kmer seed-and-extend search at the core of
//! the engine. Operates on a plain base slice plus a `Vec` of
//! half-open intervals while searching: only once a candidate clears QC is
//! a `ReadRecord` built and registered, so the hot seed/extend loop never
//! juggles borrow conflicts against the registry or string table.

use std::ops::Range;

use crate::homopolymer;
use crate::pattern::bmp_search;
use crate::read_record::ReadRecord;
use crate::registry::Registry;
use crate::seq::similarity;
use crate::stats::RunStats;
use crate::string_table::StringTable;

const SCAN_RIGHT_RANGE: usize = 24;
const LOW_COMPLEXITY_THRESHOLD: f64 = 0.75;
const SPACER_OR_REPEAT_MAX_SIMILARITY: f64 = 0.82;
const SPACER_TO_SPACER_LENGTH_DIFF: f64 = 12.0;
const SPACER_TO_REPEAT_LENGTH_DIFF: f64 = 30.0;

/// Configuration for the seed/extend/QC pipeline, with the tool's default
/// thresholds.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub min_dr: usize,
    pub max_dr: usize,
    pub min_spacer: usize,
    pub max_spacer: usize,
    pub window: usize,
    pub min_repeats: usize,
    pub remove_homopolymers: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            min_dr: 23,
            max_dr: 47,
            min_spacer: 26,
            max_spacer: 50,
            window: 8,
            min_repeats: 2,
            remove_homopolymers: false,
        }
    }
}

fn repeat_at<'a>(bases: &'a [u8], intervals: &[Range<usize>], k: usize) -> &'a [u8] {
    &bases[intervals[k].clone()]
}

fn spacer_at<'a>(bases: &'a [u8], intervals: &[Range<usize>], k: usize) -> &'a [u8] {
    &bases[intervals[k].end..intervals[k + 1].start]
}

/// Greedily extend a seed pair with further tandem occurrences, predicting
/// each next position from the running repeat spacing.
fn scan_right(
    bases: &[u8],
    intervals: &mut Vec<Range<usize>>,
    pattern: &[u8],
    min_spacer: usize,
    scan_range: usize,
) {
    let len = bases.len();
    let window = pattern.len();
    loop {
        let n = intervals.len();
        let last = intervals[n - 1].start;
        let second_last = intervals[n - 2].start;
        let spacing = last - second_last;
        let candidate = last + spacing;

        let min_begin = last + window + min_spacer;
        let begin = candidate.saturating_sub(scan_range).max(min_begin);
        if begin > len.saturating_sub(1) {
            break;
        }
        let end = (candidate + window + scan_range).min(len);
        if begin >= end {
            break;
        }

        match bmp_search(&bases[begin..end], pattern) {
            Some(p) => {
                let new_start = begin + p;
                intervals.push(new_start..new_start + window);
                let new_spacing = new_start - last;
                if new_spacing < min_spacer + window {
                    break;
                }
            }
            None => break,
        }
    }
}

/// Infer the true repeat length by columnar base-agreement extension in
/// both directions, then rewrite every interval to the extended footprint.
/// Returns the final repeat length.
fn extend_pre_repeat(
    bases: &[u8],
    intervals: &mut [Range<usize>],
    window: usize,
    min_spacer: usize,
) -> usize {
    let len = bases.len();
    let n = intervals.len();
    let cutoff = ((0.5 * n as f64).ceil() as usize).max(2);
    let starts: Vec<usize> = intervals.iter().map(|iv| iv.start).collect();
    let shortest_spacing = starts
        .windows(2)
        .map(|w| w[1] - w[0])
        .min()
        .expect("extend_pre_repeat requires at least two intervals");

    let mut repeat_length = window;
    let mut right_ext = 0usize;
    loop {
        let budget = shortest_spacing as isize - min_spacer as isize - right_ext as isize;
        if budget <= 0 {
            break;
        }
        let mut tally = [0usize; 4];
        let mut any_in_bounds = false;
        for &start in &starts {
            let pos = start + repeat_length;
            if pos >= len {
                continue;
            }
            any_in_bounds = true;
            tally_base(&mut tally, bases[pos]);
        }
        if any_in_bounds && tally.iter().any(|&c| c >= cutoff) {
            repeat_length += 1;
            right_ext += 1;
        } else {
            break;
        }
    }

    let mut left_ext = 0usize;
    loop {
        let budget = shortest_spacing as isize - repeat_length as isize;
        if (left_ext as isize) >= budget {
            break;
        }
        let mut tally = [0usize; 4];
        let mut any_in_bounds = false;
        for &start in &starts {
            if start <= left_ext {
                continue;
            }
            any_in_bounds = true;
            tally_base(&mut tally, bases[start - left_ext - 1]);
        }
        if any_in_bounds && tally.iter().any(|&c| c >= cutoff) {
            repeat_length += 1;
            left_ext += 1;
        } else {
            break;
        }
    }

    for iv in intervals.iter_mut() {
        let new_start = iv.start.saturating_sub(left_ext);
        let new_end = (new_start + repeat_length).min(len);
        *iv = new_start..new_end;
    }

    repeat_length
}

fn tally_base(tally: &mut [usize; 4], base: u8) {
    match base.to_ascii_uppercase() {
        b'A' => tally[0] += 1,
        b'C' => tally[1] += 1,
        b'G' => tally[2] += 1,
        b'T' => tally[3] += 1,
        _ => {}
    }
}

fn is_low_complexity(repeat: &[u8]) -> bool {
    let mut tally = [0usize; 4];
    for &b in repeat {
        tally_base(&mut tally, b);
    }
    let max = tally.iter().copied().max().unwrap_or(0);
    max as f64 / repeat.len() as f64 > LOW_COMPLEXITY_THRESHOLD
}

/// The quality-control battery a candidate array must clear before
/// registration. `intervals` must already describe ≥2 same-length
/// occurrences in `bases`.
fn qc_found_repeats(
    bases: &[u8],
    intervals: &[Range<usize>],
    min_spacer: usize,
    max_spacer: usize,
) -> bool {
    let repeat = repeat_at(bases, intervals, 0);
    if is_low_complexity(repeat) {
        return false;
    }

    let num_spacers = intervals.len() - 1;
    let spacers: Vec<&[u8]> = (0..num_spacers).map(|k| spacer_at(bases, intervals, k)).collect();

    for s in &spacers {
        if s.len() < min_spacer || s.len() > max_spacer {
            return false;
        }
    }

    if num_spacers == 1 {
        let spacer = spacers[0];
        if similarity(repeat, spacer) > SPACER_OR_REPEAT_MAX_SIMILARITY {
            return false;
        }
        let len_diff = (repeat.len() as f64 - spacer.len() as f64).abs();
        return len_diff <= SPACER_TO_REPEAT_LENGTH_DIFF;
    }

    let pairs = spacers.len() - 1;
    let mut spacer_sim_sum = 0.0;
    let mut spacer_len_diff_sum = 0.0;
    for w in spacers.windows(2) {
        spacer_sim_sum += similarity(w[0], w[1]);
        spacer_len_diff_sum += (w[0].len() as f64 - w[1].len() as f64).abs();
    }
    let avg_spacer_sim = spacer_sim_sum / pairs as f64;
    let avg_spacer_len_diff = spacer_len_diff_sum / pairs as f64;
    if avg_spacer_sim > SPACER_OR_REPEAT_MAX_SIMILARITY {
        return false;
    }
    if avg_spacer_len_diff > SPACER_TO_SPACER_LENGTH_DIFF {
        return false;
    }

    let mut repeat_sim_sum = 0.0;
    let mut repeat_len_diff_sum = 0.0;
    for s in &spacers {
        repeat_sim_sum += similarity(repeat, s);
        repeat_len_diff_sum += (repeat.len() as f64 - s.len() as f64).abs();
    }
    let avg_repeat_sim = repeat_sim_sum / spacers.len() as f64;
    let avg_repeat_len_diff = repeat_len_diff_sum / spacers.len() as f64;
    if avg_repeat_sim > SPACER_OR_REPEAT_MAX_SIMILARITY {
        return false;
    }
    avg_repeat_len_diff <= SPACER_TO_REPEAT_LENGTH_DIFF
}

/// Run the full seed/scan/extend/QC/register pipeline for one read. Returns
/// `true` if the read was found to be CRISPR-bearing and registered.
#[allow(clippy::too_many_arguments)]
pub fn long_read_search(
    header: &str,
    comment: Option<&str>,
    raw_bases: &[u8],
    quality: Option<&[u8]>,
    opts: &SearchOptions,
    table: &mut StringTable,
    registry: &mut Registry,
    stats: &mut RunStats,
) -> bool {
    let (working, run_lengths): (Vec<u8>, Option<Vec<usize>>) = if opts.remove_homopolymers {
        let (encoded, runs) = homopolymer::encode(raw_bases);
        (encoded, Some(runs))
    } else {
        (raw_bases.to_vec(), None)
    };

    let len = working.len();
    let skip = (opts.min_dr as isize - 2 * opts.window as isize + 1).max(1) as usize;
    let search_end = len as isize
        - opts.min_dr as isize
        - opts.min_spacer as isize
        - opts.window as isize
        - 1;
    if search_end < 0 {
        return false;
    }
    let search_end = search_end as usize;

    let mut j = 0usize;
    while j <= search_end {
        let begin_search = j + opts.min_dr + opts.min_spacer;
        let end_search = (j + opts.max_dr + opts.max_spacer + opts.window).min(len.saturating_sub(1));
        if begin_search >= end_search || begin_search >= len || j + opts.window > len {
            j += skip;
            continue;
        }

        let pattern = working[j..j + opts.window].to_vec();
        let Some(p) = bmp_search(&working[begin_search..end_search], &pattern) else {
            j += skip;
            continue;
        };

        let mut intervals = vec![
            j..j + opts.window,
            begin_search + p..begin_search + p + opts.window,
        ];
        scan_right(&working, &mut intervals, &pattern, opts.min_spacer, SCAN_RIGHT_RANGE);

        if intervals.len() >= opts.min_repeats {
            let repeat_len = extend_pre_repeat(&working, &mut intervals, opts.window, opts.min_spacer);
            if repeat_len >= opts.min_dr
                && repeat_len <= opts.max_dr
                && qc_found_repeats(&working, &intervals, opts.min_spacer, opts.max_spacer)
            {
                register_candidate(
                    header,
                    comment,
                    raw_bases,
                    quality,
                    &intervals,
                    run_lengths.as_deref(),
                    table,
                    registry,
                    stats,
                );
                return true;
            }
        }

        let next = intervals.last().map(|iv| iv.end).unwrap_or(j + 1);
        let next_j = next.saturating_sub(1);
        j = if next_j > j { next_j } else { j + 1 };
    }
    false
}

#[allow(clippy::too_many_arguments)]
fn register_candidate(
    header: &str,
    comment: Option<&str>,
    raw_bases: &[u8],
    quality: Option<&[u8]>,
    working_intervals: &[Range<usize>],
    run_lengths: Option<&[usize]>,
    table: &mut StringTable,
    registry: &mut Registry,
    stats: &mut RunStats,
) {
    if registry.contains_header(header) {
        return;
    }

    let intervals: Vec<Range<usize>> = match run_lengths {
        Some(runs) => working_intervals
            .iter()
            .cloned()
            .map(|iv| homopolymer::expand_interval(iv, runs))
            .collect(),
        None => working_intervals.to_vec(),
    };

    let mut record = ReadRecord::new(header, raw_bases.to_vec())
        .with_comment(comment.map(str::to_string))
        .with_quality(quality.map(<[u8]>::to_vec));
    for iv in intervals {
        record.push_interval(iv);
    }
    record.clip_intervals_to_bounds();
    if !record.intervals_well_formed() {
        return;
    }

    let canon = record.canonical_dr();
    let is_new = table.get_token(&canon).is_none();
    let token = table.add_string(&canon);
    if is_new {
        stats.note_new_dr();
    }
    stats.note_crispr_read();
    registry.register(token, record);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(bases: &[u8], opts: &SearchOptions) -> (bool, StringTable, Registry, RunStats) {
        let mut table = StringTable::new();
        let mut registry = Registry::new();
        let mut stats = RunStats::new();
        let found = long_read_search("r1", None, bases, None, opts, &mut table, &mut registry, &mut stats);
        (found, table, registry, stats)
    }

    #[test]
    fn clean_crispr_read_is_registered_with_expected_structure() {
        // spec.md's literal scenario 1 repeats one 30-base spacer verbatim
        // three times, which is indistinguishable from scenario 4's
        // "identical spacers" rejection case under a consistent similarity
        // test (see DESIGN.md). A genuine CRISPR array has variable spacers
        // per the glossary, so this test uses three distinct 30-base
        // spacers to exercise the success path without self-contradiction.
        //
        // The flanking bases are chosen so every column immediately outside
        // the true DR footprint (the first base of each spacer/the trailer,
        // and the last base of the prefix/each spacer) carries four distinct
        // bases across the four repeat occurrences. `extend_pre_repeat`'s
        // agreement cutoff for four occurrences is 2-of-4, so a column where
        // only two occurrences coincidentally agree would pull the inferred
        // repeat length past the real DR boundary; four-way distinct flanks
        // rule that out and force extension to stop exactly at the boundary.
        let dr = "GTTTCAATCGATAGCTACGTATCG";
        let spacers = [
            "AGTCAGTCAGTCAGTCAGTCAGTCAGTCAC",
            "CTAGCTAGCTAGCTAGCTAGCTAGCTAGCG",
            "GACTGACTGACTGACTGACTGACTGACTGT",
        ];
        let mut bases = String::from("AAAAA");
        for spacer in spacers {
            bases.push_str(dr);
            bases.push_str(spacer);
        }
        bases.push_str(dr);
        bases.push_str("TGGGG");

        let (found, _table, registry, stats) = search(bases.as_bytes(), &SearchOptions::default());
        assert!(found, "expected the read to be registered");
        assert_eq!(registry.num_records(), 1);
        assert_eq!(stats.crispr_reads_found, 1);

        let token = registry.tokens().next().unwrap();
        let record = registry.get(registry.records_for(token)[0]);
        assert_eq!(record.num_repeats(), 4);
        assert_eq!(record.num_spacers(), 3);
        for k in 0..record.num_spacers() {
            assert_eq!(record.spacer_at(k).len(), 30);
        }
    }

    #[test]
    fn short_read_exits_early_without_registering() {
        let bases = b"ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT";
        let (found, _table, registry, _stats) = search(bases, &SearchOptions::default());
        assert!(!found);
        assert_eq!(registry.num_records(), 0);
    }

    #[test]
    fn low_complexity_repeat_is_rejected() {
        let dr = "AAAAAAAAAAAAAAAAAAAAAAAA";
        let spacer = "CGATCGATCGATCGATCGATCGATCGATCG";
        let mut bases = String::new();
        for _ in 0..3 {
            bases.push_str(dr);
            bases.push_str(spacer);
        }
        bases.push_str(dr);

        let (found, _table, registry, _stats) = search(bases.as_bytes(), &SearchOptions::default());
        assert!(!found);
        assert_eq!(registry.num_records(), 0);
    }

    #[test]
    fn identical_spacers_are_rejected_as_too_similar() {
        let dr = "GTTTCAATCGATAGCTACGTATCG";
        let spacer = "CGATCGATCGATCGATCGATCGATCGATCG";
        let mut bases = String::new();
        for _ in 0..3 {
            bases.push_str(dr);
            bases.push_str(spacer);
        }
        bases.push_str(dr);

        let (found, _table, registry, _stats) = search(bases.as_bytes(), &SearchOptions::default());
        assert!(!found, "identical spacers should fail the similarity QC test");
        assert_eq!(registry.num_records(), 0);
    }
}
