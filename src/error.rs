use crate::resolver::ResolveError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GateError>;

/// Top-level pipeline error. Anything surfacing here maps to the runtime
/// error exit code at the CLI boundary, never to a gate verdict.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
