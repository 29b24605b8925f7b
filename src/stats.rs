//! Progress/stats context (Design Note 2). Replaces the original tool's
//! static function-local counters and `time_t` bookkeeping with a struct
//! threaded through both passes by mutable reference.

use log::info;

/// How many reads between progress log lines, matching the original's
/// `CRASS_DEF_READ_COUNTER_LOGGER` cadence.
pub const READ_COUNTER_LOGGER: u64 = 100_000;

#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub reads_seen: u64,
    pub crispr_reads_found: u64,
    pub distinct_drs: u64,
    pub singletons_recruited: u64,
    pub max_read_length: usize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per read streamed through either pass. Logs a progress
    /// line every `READ_COUNTER_LOGGER` reads.
    pub fn note_read(&mut self, read_len: usize) {
        self.reads_seen += 1;
        self.max_read_length = self.max_read_length.max(read_len);
        if self.reads_seen % READ_COUNTER_LOGGER == 0 {
            info!(
                "processed {} reads ({} CRISPR-bearing so far)",
                self.reads_seen, self.crispr_reads_found
            );
        }
    }

    pub fn note_crispr_read(&mut self) {
        self.crispr_reads_found += 1;
    }

    pub fn note_new_dr(&mut self) {
        self.distinct_drs += 1;
    }

    pub fn note_singleton(&mut self) {
        self.singletons_recruited += 1;
    }
}
