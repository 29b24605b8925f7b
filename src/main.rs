use clap::Parser;
use log::info;

use crispr_finder::aligner::{self, AlignParams, Aligner};
use crispr_finder::cli::Cli;
use crispr_finder::error::CrisprError;
use crispr_finder::finder::long_read_search;
use crispr_finder::io::RecordSource;
use crispr_finder::recruiter::Recruiter;
use crispr_finder::registry::Registry;
use crispr_finder::stats::RunStats;
use crispr_finder::string_table::StringTable;

fn run() -> Result<(), CrisprError> {
    let opts = Cli::parse().into_options()?;

    let mut table = StringTable::new();
    let mut registry = Registry::new();
    let mut stats = RunStats::new();

    info!("pass 1: searching {} for tandem repeats", opts.input.display());
    for read in RecordSource::open(&opts.input)? {
        let read = read?;
        stats.note_read(read.bases.len());
        long_read_search(
            &read.header,
            read.comment.as_deref(),
            &read.bases,
            read.quality.as_deref(),
            &opts.search,
            &mut table,
            &mut registry,
            &mut stats,
        );
    }
    info!(
        "pass 1 complete: {} reads, {} CRISPR-bearing, {} distinct DRs",
        stats.reads_seen, stats.crispr_reads_found, stats.distinct_drs
    );

    if !table.is_empty() {
        let recruiter = Recruiter::build(&table);
        info!("pass 2: recruiting singletons from {}", opts.input.display());
        for read in RecordSource::open(&opts.input)? {
            let read = read?;
            recruiter.recruit(
                &read.header,
                read.comment.as_deref(),
                &read.bases,
                read.quality.as_deref(),
                &mut registry,
                &mut stats,
            );
        }
        info!("pass 2 complete: {} singletons recruited", stats.singletons_recruited);
    }

    println!(
        "reads processed: {}\ncrispr-bearing reads: {}\ndistinct DRs: {}\nsingletons recruited: {}",
        stats.reads_seen, stats.crispr_reads_found, stats.distinct_drs, stats.singletons_recruited
    );

    for token in registry.tokens() {
        let group_len = registry.group_len(token);
        if group_len < opts.cov_cutoff {
            continue;
        }
        let mut aligner = Aligner::new(AlignParams::default());
        aligner.set_master(token, &table);
        let consensus = aligner.generate_consensus(&registry, stats.max_read_length.max(1));
        let zone = aligner::calculate_dr_zone(&consensus, aligner::MIN_READ_DEPTH, aligner::ZONE_CONSERVATION_CUTOFF);

        println!("\n== group: {} reads ==", group_len);
        println!("master DR: {}", String::from_utf8_lossy(table.string_of(token)));
        if let Some(zone) = zone {
            let consensus_str = String::from_utf8_lossy(&consensus.consensus[zone.start..zone.end]);
            println!("consensus: {consensus_str}");
            let avg_conservation: f64 = consensus.conservation[zone.start..zone.end].iter().sum::<f64>()
                / (zone.end - zone.start) as f64;
            println!("mean conservation: {avg_conservation:.3}");
        } else {
            println!("no DR zone met the coverage/conservation thresholds");
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
#[ctor::ctor]
fn init() {
    env_logger::init();
}
