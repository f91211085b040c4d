//! Error types for georegrid

use thiserror::Error;

/// Main error type for georegrid operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid coordinate ({longitude}, {latitude}): {reason}")]
    InvalidCoordinate {
        longitude: f64,
        latitude: f64,
        reason: String,
    },

    #[error("Inconsistent value sizes: point {index} has {found} values, expected {expected}")]
    InconsistentValues {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Parse error in {path} at line {line}: {reason}")]
    Parse {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Invalid headers: {0}")]
    InvalidHeaders(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),
}

/// Broad failure classes, used to decide whether a failure is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad parameters, raised before any data is touched
    Configuration,
    /// Malformed or inconsistent input data
    Validation,
    /// No source candidate could be found
    Lookup,
    /// Filesystem failure
    Io,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) | Error::InvalidParameter { .. } => ErrorKind::Configuration,
            Error::InvalidCoordinate { .. }
            | Error::InconsistentValues { .. }
            | Error::Parse { .. }
            | Error::InvalidHeaders(_)
            | Error::InvalidMapping(_) => ErrorKind::Validation,
            Error::Lookup(_) => ErrorKind::Lookup,
        }
    }

    pub(crate) fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for georegrid operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::invalid_parameter("radius", -1.0, "must be non-negative").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(Error::Lookup("empty".into()).kind(), ErrorKind::Lookup);
        assert_eq!(
            Error::InconsistentValues { index: 3, expected: 12, found: 11 }.kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_parameter_message() {
        let err = Error::invalid_parameter("power", 0.0, "must be positive");
        assert_eq!(err.to_string(), "Invalid parameter: power = 0 (must be positive)");
    }
}
