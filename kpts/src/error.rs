use control::ControlError;
use symmetry::SymmetryError;
use thiserror::Error;

/// Errors raised by the k-point path and mesh tools.
#[derive(Debug, Error)]
pub enum KptsError {
    /// Input is not a list of 3-component vectors, or a mesh shift/division
    /// has the wrong shape.
    #[error("bad shape: {0}")]
    Shape(String),

    /// Too few points for a path, or a missing cell/symmetry driver.
    #[error("insufficient input: {0}")]
    InsufficientInput(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error(transparent)]
    Symmetry(#[from] SymmetryError),

    #[error(transparent)]
    Control(#[from] ControlError),
}

pub type KptsResult<T> = std::result::Result<T, KptsError>;
