//! Error types shared by the placement engine.

use thiserror::Error;

/// Errors produced while measuring, sweeping or placing geometry.
///
/// `DegenerateGeometry` and `NumericalInstability` are usually non-fatal: the
/// packer records them in [`SolveResult::warnings`](crate::SolveResult) and
/// keeps going. They are only returned as `Err` when a whole batch depends on
/// the failed computation (for example the target point).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A path yields no usable area or centroid.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// Malformed input such as an empty collection or a duplicate id.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The bisection search hit its iteration cap before converging.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns true if this error only affects a single shape.
    pub fn is_per_shape(&self) -> bool {
        matches!(
            self,
            Error::DegenerateGeometry(_) | Error::NumericalInstability(_)
        )
    }
}

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("no shapes".into());
        assert_eq!(err.to_string(), "Invalid input: no shapes");

        let err = Error::DegenerateGeometry("'TX' has no closed subpath".into());
        assert!(err.to_string().contains("'TX'"));
    }

    #[test]
    fn test_per_shape_classification() {
        assert!(Error::DegenerateGeometry(String::new()).is_per_shape());
        assert!(Error::NumericalInstability(String::new()).is_per_shape());
        assert!(!Error::InvalidInput(String::new()).is_per_shape());
        assert!(!Error::InvalidConfig(String::new()).is_per_shape());
    }
}
