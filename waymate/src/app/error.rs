//! Application error types.

use std::fmt;

use crate::geofence::GeofenceError;

/// Errors that can occur during application bootstrap.
#[derive(Debug)]
pub enum AppError {
    /// Reference data failed validation.
    Reference(GeofenceError),

    /// Configuration error.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Reference(e) => {
                write!(f, "Invalid reference data: {}", e)
            }
            AppError::Config(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Reference(e) => Some(e),
            AppError::Config(_) => None,
        }
    }
}

impl From<GeofenceError> for AppError {
    fn from(e: GeofenceError) -> Self {
        AppError::Reference(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = AppError::Config("countdown must be at least one second".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("countdown"));
    }

    #[test]
    fn test_reference_error_from() {
        let err: AppError = GeofenceError::DuplicateZoneId(1).into();
        assert!(matches!(err, AppError::Reference(_)));
        assert!(err.to_string().contains("duplicate zone id"));
    }
}
