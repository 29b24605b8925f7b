//! Read Registry: maps a DR token to the ordered list of reads carrying it.
//! Records are owned in a contiguous arena (`Vec`) and referenced by index
//! rather than by raw pointer, so the registry alone owns every
//! `ReadRecord` and hands out only indices.

use std::collections::HashMap;

use crate::read_record::ReadRecord;
use crate::string_table::Token;

/// Index of a `ReadRecord` inside `Registry::records`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(usize);

/// Owns every registered read and the per-token grouping over them.
#[derive(Debug, Default)]
pub struct Registry {
    records: Vec<ReadRecord>,
    groups: HashMap<Token, Vec<RecordId>>,
    headers_found: std::collections::HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a read with this header has already been registered, under
    /// any token. Both the finder and the recruiter consult this before
    /// registering a read to avoid double-counting.
    pub fn contains_header(&self, header: &str) -> bool {
        self.headers_found.contains(header)
    }

    /// Insert `record` under `token`'s group, in insertion order. Returns
    /// the id the record was stored under.
    pub fn register(&mut self, token: Token, record: ReadRecord) -> RecordId {
        self.headers_found.insert(record.header.clone());
        let id = RecordId(self.records.len());
        self.records.push(record);
        self.groups.entry(token).or_default().push(id);
        id
    }

    pub fn get(&self, id: RecordId) -> &ReadRecord {
        &self.records[id.0]
    }

    pub fn get_mut(&mut self, id: RecordId) -> &mut ReadRecord {
        &mut self.records[id.0]
    }

    /// Ids of every record registered under `token`, in insertion order.
    pub fn records_for(&self, token: Token) -> &[RecordId] {
        self.groups.get(&token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.groups.keys().copied()
    }

    pub fn group_len(&self, token: Token) -> usize {
        self.groups.get(&token).map(Vec::len).unwrap_or(0)
    }

    pub fn num_records(&self) -> usize {
        self.records.len()
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }
}
