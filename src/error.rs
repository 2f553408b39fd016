use thiserror::Error;

use crate::intersect::ObjectIndex;

/// Ways the tracer can fail.
///
/// Every operation in the core is a deterministic computation, so errors here
/// describe malformed input (a degenerate transform, a bad scene file) rather
/// than transient conditions.
#[derive(Error, Debug)]
pub enum TraceError {
    /// A matrix with a zero determinant was inverted.
    #[error("matrix is not invertible (determinant {determinant})")]
    NotInvertible { determinant: f64 },

    /// A vector with zero magnitude was normalized.
    #[error("cannot normalize a zero-magnitude vector")]
    ZeroMagnitude,

    /// An intersection referred to an object the world does not hold.
    #[error("no object at index {0:?}")]
    UnknownObject(ObjectIndex),

    /// A scene description was structurally invalid.
    #[error("invalid scene: {0}")]
    Scene(String),

    /// Render workers exited before every row was returned.
    #[error("render worker exited before the image was complete")]
    WorkerLost,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed scene json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TraceError>;
