//! Aligner: banded affine-gap Smith–Waterman alignment of every slave DR to
//! a chosen master DR, producing an offsets map and a per-column
//! coverage/consensus/conservation profile for the group.

use std::collections::HashMap;

use crate::registry::Registry;
use crate::seq::reverse_complement;
use crate::string_table::{StringTable, Token};

pub const MIN_READ_DEPTH: u32 = 2;
pub const ZONE_CONSERVATION_CUTOFF: f64 = 0.55;
/// `CRASS_DEF_MIN_CONS_ARRAY_LEN`.
pub const MIN_CONSENSUS_WIDTH: usize = 1200;
/// `CRASS_DEF_CONS_ARRAY_RL_MULTIPLIER`.
pub const CONSENSUS_WIDTH_MULTIPLIER: usize = 4;

/// Scoring parameters for the banded alignment. `band` bounds how far off
/// the main diagonal the DP search looks, which is ample for DR-sized
/// (<100bp) sequences without degrading to a full quadratic scan on longer
/// input.
#[derive(Debug, Clone)]
pub struct AlignParams {
    pub match_score: i32,
    pub mismatch: i32,
    pub ambiguous: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
    pub min_score: i32,
    pub band: usize,
}

impl Default for AlignParams {
    fn default() -> Self {
        AlignParams {
            match_score: 1,
            mismatch: -3,
            ambiguous: 0,
            gap_open: 5,
            gap_extend: 2,
            min_score: 5,
            band: 32,
        }
    }
}

fn encode4bit(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .map(|&b| match b.to_ascii_uppercase() {
            b'A' => 0,
            b'C' => 1,
            b'G' => 2,
            b'T' => 3,
            _ => 4,
        })
        .collect()
}

struct AlignResult {
    score: i32,
    qstart: usize,
    tstart: usize,
}

/// Banded local alignment with affine gaps (Gotoh's algorithm): `query`
/// against `target`. Returns the best local score and the start positions
/// of the optimal alignment in each sequence.
fn banded_local_align(query: &[u8], target: &[u8], params: &AlignParams) -> AlignResult {
    let n = query.len();
    let m = target.len();
    const NEG_INF: i32 = i32::MIN / 4;

    let mut h = vec![vec![0i32; m + 1]; n + 1];
    let mut e = vec![vec![NEG_INF; m + 1]; n + 1];
    let mut f = vec![vec![NEG_INF; m + 1]; n + 1];

    let mut best_score = 0;
    let mut best_i = 0;
    let mut best_j = 0;

    for i in 1..=n {
        let jlo = 1.max(i.saturating_sub(params.band));
        let jhi = m.min(i + params.band);
        for j in jlo..=jhi {
            let qb = query[i - 1];
            let tb = target[j - 1];
            let sub = if qb == 4 || tb == 4 {
                params.ambiguous
            } else if qb == tb {
                params.match_score
            } else {
                params.mismatch
            };

            let diag = h[i - 1][j - 1] + sub;
            e[i][j] = (h[i][j - 1] - params.gap_open).max(e[i][j - 1] - params.gap_extend);
            f[i][j] = (h[i - 1][j] - params.gap_open).max(f[i - 1][j] - params.gap_extend);
            let score = diag.max(e[i][j]).max(f[i][j]).max(0);
            h[i][j] = score;

            if score > best_score {
                best_score = score;
                best_i = i;
                best_j = j;
            }
        }
    }

    let (mut i, mut j) = (best_i, best_j);
    while i > 0 && j > 0 && h[i][j] > 0 {
        let qb = query[i - 1];
        let tb = target[j - 1];
        let sub = if qb == 4 || tb == 4 {
            params.ambiguous
        } else if qb == tb {
            params.match_score
        } else {
            params.mismatch
        };
        if h[i][j] == h[i - 1][j - 1] + sub {
            i -= 1;
            j -= 1;
        } else if h[i][j] == f[i][j] {
            i -= 1;
        } else if h[i][j] == e[i][j] {
            j -= 1;
        } else {
            break;
        }
    }

    AlignResult {
        score: best_score,
        qstart: i,
        tstart: j,
    }
}

/// Outcome of aligning one slave DR against the group's master.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignOutcome {
    Forward { offset: i64 },
    Reversed { offset: i64 },
    ScoreEqual { offset: i64 },
    Failed,
}

/// Per-group alignment state: the master DR and every slave's resolved
/// offset (and orientation) relative to it.
pub struct Aligner {
    params: AlignParams,
    master_token: Option<Token>,
    master_encoded: Vec<u8>,
    offsets: HashMap<Token, (i64, bool)>,
}

impl Aligner {
    pub fn new(params: AlignParams) -> Self {
        Aligner {
            params,
            master_token: None,
            master_encoded: Vec::new(),
            offsets: HashMap::new(),
        }
    }

    pub fn set_master(&mut self, token: Token, table: &StringTable) {
        self.master_token = Some(token);
        self.master_encoded = encode4bit(table.string_of(token));
        self.offsets.clear();
    }

    pub fn master_token(&self) -> Option<Token> {
        self.master_token
    }

    /// Align `token`'s DR (both orientations) to the current master and
    /// record its offset on success.
    pub fn align_slave(&mut self, token: Token, table: &StringTable) -> AlignOutcome {
        let slave_fwd = table.string_of(token).to_vec();
        let slave_rc = reverse_complement(&slave_fwd);
        let fwd_encoded = encode4bit(&slave_fwd);
        let rc_encoded = encode4bit(&slave_rc);

        let fwd = banded_local_align(&fwd_encoded, &self.master_encoded, &self.params);
        let rc = banded_local_align(&rc_encoded, &self.master_encoded, &self.params);

        let outcome = if fwd.score < self.params.min_score && rc.score < self.params.min_score {
            AlignOutcome::Failed
        } else if fwd.score > rc.score {
            let offset = fwd.tstart as i64 - fwd.qstart as i64;
            self.offsets.insert(token, (offset, false));
            AlignOutcome::Forward { offset }
        } else if rc.score > fwd.score {
            let offset = rc.tstart as i64 - rc.qstart as i64;
            self.offsets.insert(token, (offset, true));
            AlignOutcome::Reversed { offset }
        } else {
            let offset = fwd.tstart as i64 - fwd.qstart as i64;
            self.offsets.insert(token, (offset, false));
            AlignOutcome::ScoreEqual { offset }
        };
        outcome
    }

    pub fn offset_of(&self, token: Token) -> Option<(i64, bool)> {
        self.offsets.get(&token).copied()
    }

    /// Tally coverage across every registered read of the master and every
    /// successfully aligned slave, then derive per-column consensus and
    /// conservation.
    pub fn generate_consensus(
        &self,
        registry: &Registry,
        max_read_length: usize,
    ) -> Consensus {
        let width = (CONSENSUS_WIDTH_MULTIPLIER * max_read_length).max(MIN_CONSENSUS_WIDTH);
        let start_col = width / 2;
        let mut coverage = vec![[0u32; 4]; width];

        if let Some(master_token) = self.master_token {
            tally_token(master_token, 0, false, start_col, &mut coverage, registry);
        }
        for (&token, &(offset, reversed)) in &self.offsets {
            tally_token(token, offset, reversed, start_col, &mut coverage, registry);
        }

        let mut consensus = vec![b'N'; width];
        let mut conservation = vec![0.0f64; width];
        for c in 0..width {
            let total: u32 = coverage[c].iter().sum();
            if total == 0 {
                continue;
            }
            let max_count = *coverage[c].iter().max().unwrap();
            let ties = coverage[c].iter().filter(|&&v| v == max_count).count();
            if ties == 1 {
                let idx = coverage[c].iter().position(|&v| v == max_count).unwrap();
                consensus[c] = [b'A', b'C', b'G', b'T'][idx];
            }
            conservation[c] = max_count as f64 / total as f64;
        }

        Consensus {
            width,
            start_col,
            coverage,
            consensus,
            conservation,
        }
    }
}

fn tally_token(
    token: Token,
    offset: i64,
    reversed: bool,
    start_col: usize,
    coverage: &mut [[u32; 4]],
    registry: &Registry,
) {
    for &id in registry.records_for(token) {
        let record = registry.get(id);
        if record.intervals().is_empty() {
            continue;
        }
        let bases = record.repeat_at(0);
        let oriented: Vec<u8> = if reversed {
            reverse_complement(bases)
        } else {
            bases.to_vec()
        };
        for (i, &b) in oriented.iter().enumerate() {
            let col = start_col as i64 + offset + i as i64;
            if col < 0 || col as usize >= coverage.len() {
                continue;
            }
            let idx = match b.to_ascii_uppercase() {
                b'A' => 0,
                b'C' => 1,
                b'G' => 2,
                b'T' => 3,
                _ => continue,
            };
            coverage[col as usize][idx] += 1;
        }
    }
}

/// Per-group consensus output: coverage, consensus base, and conservation
/// per column of the alignment frame.
pub struct Consensus {
    pub width: usize,
    pub start_col: usize,
    pub coverage: Vec<[u32; 4]>,
    pub consensus: Vec<u8>,
    pub conservation: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrZone {
    pub start: usize,
    pub end: usize,
}

/// Locate the longest contiguous run of columns meeting both the coverage
/// and conservation thresholds.
pub fn calculate_dr_zone(
    consensus: &Consensus,
    min_read_depth: u32,
    conservation_cutoff: f64,
) -> Option<DrZone> {
    let qualifies: Vec<bool> = (0..consensus.width)
        .map(|c| {
            let total: u32 = consensus.coverage[c].iter().sum();
            total >= min_read_depth && consensus.conservation[c] >= conservation_cutoff
        })
        .collect();

    let mut best: Option<(usize, usize)> = None;
    let mut run_start = None;
    for (c, &ok) in qualifies.iter().enumerate() {
        if ok {
            run_start.get_or_insert(c);
        } else if let Some(s) = run_start.take() {
            if best.map_or(true, |(bs, be)| (c - s) > (be - bs)) {
                best = Some((s, c));
            }
        }
    }
    if let Some(s) = run_start {
        let end = qualifies.len();
        if best.map_or(true, |(bs, be)| (end - s) > (be - bs)) {
            best = Some((s, end));
        }
    }
    best.map(|(start, end)| DrZone { start, end })
}
