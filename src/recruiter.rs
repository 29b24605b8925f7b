//! Singleton Recruiter: pass 2. Builds a multi-pattern Aho–Corasick
//! automaton over every canonical DR confirmed in pass 1 and scans every
//! read again, attaching reads that carry exactly one occurrence of a known
//! DR but too few repeats to have self-identified in pass 1.

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use crate::read_record::ReadRecord;
use crate::registry::Registry;
use crate::stats::RunStats;
use crate::string_table::{StringTable, Token};

/// The automaton plus the token each pattern index maps back to. Built once
/// from the String Table after pass 1 completes.
pub struct Recruiter {
    automaton: AhoCorasick,
    tokens: Vec<Token>,
}

impl Recruiter {
    /// Build the automaton over every DR interned so far. `MatchKind::LeftmostFirst`
    /// gives the first (leftmost, then longest-at-that-position) match per
    /// scan position, which is enough to satisfy "first unseen pattern wins"
    /// since `reads_found` suppresses any subsequent match in the same read.
    pub fn build(table: &StringTable) -> Self {
        let tokens: Vec<Token> = table.tokens().collect();
        let patterns: Vec<&[u8]> = tokens.iter().map(|&t| table.string_of(t)).collect();
        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostFirst)
            .build(&patterns)
            .expect("DR patterns are always valid byte strings");
        Recruiter { automaton, tokens }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Scan one read for the first occurrence of any known DR. If the read's
    /// header hasn't already been registered, register it as a singleton
    /// under the matched pattern's token with a single interval covering the
    /// match.
    pub fn recruit(
        &self,
        header: &str,
        comment: Option<&str>,
        bases: &[u8],
        quality: Option<&[u8]>,
        registry: &mut Registry,
        stats: &mut RunStats,
    ) -> bool {
        if registry.contains_header(header) {
            return false;
        }
        let Some(m) = self.automaton.find(bases) else {
            return false;
        };
        let token = self.tokens[m.pattern().as_usize()];

        let start = m.start();
        let end = m.end().min(bases.len());

        let mut record = ReadRecord::new(header, bases.to_vec())
            .with_comment(comment.map(str::to_string))
            .with_quality(quality.map(<[u8]>::to_vec));
        record.push_interval(start..end);
        registry.register(token, record);
        stats.note_singleton();
        true
    }
}
