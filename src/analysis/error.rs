use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read trajectory")]
    Trajectory(#[from] crate::io::Error),

    #[error("trajectory has {found} atoms but the topology has {expected}")]
    AtomCountMismatch { expected: usize, found: usize },

    #[error("atom index {index} is out of range for {n_atoms} atoms")]
    AtomIndexOutOfRange { index: usize, n_atoms: usize },

    #[error("invalid selection '{query}': {detail}")]
    Selection { query: String, detail: String },

    #[error("no atom named '{0}'")]
    UnknownAtomName(String),

    #[error("atom name '{name}' matches {count} atoms; qualify it as RESNAME:NAME or RESID:NAME")]
    AmbiguousAtomName { name: String, count: usize },

    #[error("invalid histogram: {0}")]
    InvalidHistogram(String),
}

impl Error {
    pub(crate) fn selection(query: &str, detail: impl Into<String>) -> Self {
        Self::Selection {
            query: query.to_string(),
            detail: detail.into(),
        }
    }
}
