use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("nonbonded method {0} requires periodic box vectors")]
    MissingBox(&'static str),

    #[error("cutoff {cutoff} nm exceeds half the shortest box edge ({limit} nm)")]
    CutoffTooLarge { cutoff: f64, limit: f64 },

    #[error("atom {atom} has non-positive mass {mass}")]
    InvalidMass { atom: usize, mass: f64 },

    #[error("expected {expected} coordinates, found {found}")]
    AtomCountMismatch { expected: usize, found: usize },

    #[error("constraints failed to converge within {iterations} iterations")]
    ConstraintFailure { iterations: usize },

    #[error("{term} energy is not finite; the simulation has become unstable")]
    NonFiniteEnergy { term: &'static str },
}

impl Error {
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }
}
