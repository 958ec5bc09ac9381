use super::Format;
use thiserror::Error;

/// Failures while reading or writing structures and trajectories.

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read or write the underlying stream: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("{format} line {line}: {details}")]
    Parse {
        format: Format,
        line: usize,
        details: String,
    },

    #[error("corrupt {format} data at byte {offset}: {details}")]
    Corrupt {
        format: Format,
        offset: u64,
        details: String,
    },

    #[error("cannot write {0} without atom and residue names")]
    MissingMetadata(&'static str),

    #[error("frame has {found} atoms but the trajectory was opened for {expected}")]
    FrameSize { expected: usize, found: usize },

    #[error("trajectory records a unit cell but the frame has no box vectors")]
    MissingUnitCell,
}

impl Error {
    /// A malformed line in a text format. `line` is 1-based.
    pub fn parse(format: Format, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }

    /// Binary data that does not match the expected record layout.
    pub fn corrupt(format: Format, offset: u64, details: impl Into<String>) -> Self {
        Self::Corrupt {
            format,
            offset,
            details: details.into(),
        }
    }
}
