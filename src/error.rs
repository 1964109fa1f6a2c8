use crate::client::QueryError;
use crate::probes::Probe;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A probe could not finish, so the protected set would be incomplete.
    #[error("{probe} probe aborted: {source}")]
    Probe {
        probe: Probe,
        #[source]
        source: QueryError,
    },

    #[error("image inventory failed: {0}")]
    Inventory(#[source] QueryError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
