use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum RadConvError {
    #[error("{0}")]
    Error(String),
    #[error("No energy conserving convective profile can be found after {iterations} iterations")]
    NoEnergyConservingProfile { iterations: usize },
    #[error("Invalid pressure grid: {0}")]
    InvalidGrid(String),
    #[error("Wrong number of levels for {name}. Expected {expected}, got {actual}")]
    ShapeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenience type for `Result<T, RadConvError>`.
pub type RadConvResult<T> = Result<T, RadConvError>;

/// Check that a per-level field has the expected number of levels.
pub fn ensure_levels(name: &str, expected: usize, actual: usize) -> RadConvResult<()> {
    if expected != actual {
        return Err(RadConvError::ShapeMismatch {
            name: name.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}
