//! Error taxonomy (Design Note 3, spec.md section 7). Only conditions that
//! are fatal to the whole run get a variant here: everything else (a read
//! failing to seed, failing extension, failing QC, or an alignment scoring
//! below `min_score`) is local and handled by the caller as `None`/`bool`,
//! never surfaced as a `CrisprError`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrisprError {
    #[error("failed to read input file {path}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad parameter: {message}")]
    Parameter { message: String },

    #[error("{context}: index [{start}, {end}) out of bounds for length {len}")]
    Boundary {
        context: &'static str,
        start: usize,
        end: usize,
        len: usize,
    },
}

impl CrisprError {
    /// Construct a `Boundary` error. Takes `#[track_caller]` so the panic
    /// message in `expect`-free call sites can still point at the call site
    /// rather than at this constructor, matching Design Note 3's
    /// "file/line/function context" requirement without needing an exception
    /// mechanism.
    #[track_caller]
    pub fn boundary(context: &'static str, start: usize, end: usize, len: usize) -> Self {
        CrisprError::Boundary {
            context,
            start,
            end,
            len,
        }
    }
}

pub type CrisprResult<T> = Result<T, CrisprError>;
