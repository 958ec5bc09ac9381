use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] crate::engine::Error),

    #[error("failed to write trajectory frame")]
    Trajectory(#[source] crate::io::Error),

    #[error("failed to write state data report")]
    Report(#[source] std::io::Error),
}
