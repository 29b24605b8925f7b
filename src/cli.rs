//! Option provider: the `clap`-derived command line, plus validation into a
//! `SearchOptions` + the ambient knobs spec.md 4.7 names but leaves to the
//! host (`remove_homopolymers`, `cov_cutoff`, `kmer_clust_size`).

use std::path::PathBuf;

use clap::Parser;

use crate::error::CrisprError;
use crate::finder::SearchOptions;

#[derive(Parser, Debug)]
#[command(author, version, about = "Find CRISPR direct-repeat arrays in long reads", long_about = None)]
pub struct Cli {
    /// Input reads, FASTA or FASTQ, optionally gzip-compressed
    pub input: PathBuf,

    /// Minimum direct repeat length
    #[arg(long, default_value_t = 23)]
    pub min_dr: usize,

    /// Maximum direct repeat length
    #[arg(long, default_value_t = 47)]
    pub max_dr: usize,

    /// Minimum spacer length
    #[arg(long, default_value_t = 26)]
    pub min_spacer: usize,

    /// Maximum spacer length
    #[arg(long, default_value_t = 50)]
    pub max_spacer: usize,

    /// Seed kmer length (valid range 6-9)
    #[arg(long, default_value_t = 8)]
    pub window: usize,

    /// Minimum number of tandem repeats required to accept a candidate
    #[arg(long, default_value_t = 2)]
    pub min_repeats: usize,

    /// Run-length encode homopolymers before searching
    #[arg(long, default_value_t = false)]
    pub remove_homopolymers: bool,

    /// Minimum reads per group required to emit a consensus
    #[arg(long, default_value_t = 3)]
    pub cov_cutoff: usize,

    /// Shared kmers required to cluster DR variants downstream
    #[arg(long, default_value_t = 6)]
    pub kmer_clust_size: usize,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,
}

/// Fully validated run configuration: the finder's `SearchOptions` plus the
/// ambient knobs the finder doesn't need directly.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub input: PathBuf,
    pub search: SearchOptions,
    pub cov_cutoff: usize,
    pub kmer_clust_size: usize,
}

impl Cli {
    /// Validate parameter combinations per spec.md section 7 (window
    /// outside [6,9], `min > max` for DR or spacer bounds) and produce a
    /// `RunOptions` the rest of the program can trust without re-checking.
    pub fn into_options(self) -> Result<RunOptions, CrisprError> {
        if !(6..=9).contains(&self.window) {
            return Err(CrisprError::Parameter {
                message: format!("--window must be in [6, 9], got {}", self.window),
            });
        }
        if self.min_dr > self.max_dr {
            return Err(CrisprError::Parameter {
                message: format!(
                    "--min-dr ({}) must not exceed --max-dr ({})",
                    self.min_dr, self.max_dr
                ),
            });
        }
        if self.min_spacer > self.max_spacer {
            return Err(CrisprError::Parameter {
                message: format!(
                    "--min-spacer ({}) must not exceed --max-spacer ({})",
                    self.min_spacer, self.max_spacer
                ),
            });
        }
        if self.min_repeats < 2 {
            return Err(CrisprError::Parameter {
                message: format!("--min-repeats must be at least 2, got {}", self.min_repeats),
            });
        }

        Ok(RunOptions {
            input: self.input,
            search: SearchOptions {
                min_dr: self.min_dr,
                max_dr: self.max_dr,
                min_spacer: self.min_spacer,
                max_spacer: self.max_spacer,
                window: self.window,
                min_repeats: self.min_repeats,
                remove_homopolymers: self.remove_homopolymers,
            },
            cov_cutoff: self.cov_cutoff,
            kmer_clust_size: self.kmer_clust_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            input: PathBuf::from("reads.fa"),
            min_dr: 23,
            max_dr: 47,
            min_spacer: 26,
            max_spacer: 50,
            window: 8,
            min_repeats: 2,
            remove_homopolymers: false,
            cov_cutoff: 3,
            kmer_clust_size: 6,
            verbose: 0,
            quiet: false,
        }
    }

    #[test]
    fn defaults_validate_successfully() {
        assert!(base_cli().into_options().is_ok());
    }

    #[test]
    fn window_out_of_range_is_rejected() {
        let mut cli = base_cli();
        cli.window = 12;
        assert!(matches!(cli.into_options(), Err(CrisprError::Parameter { .. })));
    }

    #[test]
    fn inverted_dr_bounds_are_rejected() {
        let mut cli = base_cli();
        cli.min_dr = 50;
        cli.max_dr = 20;
        assert!(matches!(cli.into_options(), Err(CrisprError::Parameter { .. })));
    }

    #[test]
    fn inverted_spacer_bounds_are_rejected() {
        let mut cli = base_cli();
        cli.min_spacer = 60;
        cli.max_spacer = 20;
        assert!(matches!(cli.into_options(), Err(CrisprError::Parameter { .. })));
    }

    #[test]
    fn verify_app() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
