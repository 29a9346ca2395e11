//! Position source abstraction.
//!
//! Device geolocation is an external collaborator: the monitor and the
//! countdown runner only see the [`PositionSource`] trait. A source may
//! fail (permission denied, no fix); callers that must always have a
//! position wrap a source in [`FallbackPositionSource`], which substitutes
//! a configured default instead of blocking.

use thiserror::Error;
use tracing::warn;

use crate::coord::Position;

/// Fallback fix used when no reading is available.
///
/// Central London, matching the companion app's seed location.
pub const DEFAULT_POSITION: Position = Position {
    latitude: 51.505,
    longitude: -0.09,
};

/// Errors a position source can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    /// The user denied the location permission.
    #[error("location permission denied")]
    PermissionDenied,

    /// No reading is available right now.
    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the current position reading.
pub trait PositionSource: Send + Sync {
    /// Return the most recent position reading.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError`] when no reading can be produced.
    fn current_position(&self) -> Result<Position, PositionError>;
}

/// A source pinned to a fixed position.
///
/// Useful for simulations and as the inner source in tests.
#[derive(Debug, Clone)]
pub struct StaticPositionSource {
    position: Position,
}

impl StaticPositionSource {
    /// Create a source that always reports `position`.
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

impl PositionSource for StaticPositionSource {
    fn current_position(&self) -> Result<Position, PositionError> {
        Ok(self.position)
    }
}

/// Decorator that substitutes a default position when the inner source
/// fails.
///
/// The substitution is logged; it is never an error from the caller's
/// perspective.
#[derive(Debug, Clone)]
pub struct FallbackPositionSource<S> {
    inner: S,
    default_position: Position,
}

impl<S: PositionSource> FallbackPositionSource<S> {
    /// Wrap `inner`, falling back to `default_position` on failure.
    pub fn new(inner: S, default_position: Position) -> Self {
        Self {
            inner,
            default_position,
        }
    }
}

impl<S: PositionSource> PositionSource for FallbackPositionSource<S> {
    fn current_position(&self) -> Result<Position, PositionError> {
        match self.inner.current_position() {
            Ok(position) => Ok(position),
            Err(error) => {
                warn!(%error, default = %self.default_position, "Using default location");
                Ok(self.default_position)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl PositionSource for FailingSource {
        fn current_position(&self) -> Result<Position, PositionError> {
            Err(PositionError::PermissionDenied)
        }
    }

    fn london() -> Position {
        Position {
            latitude: 51.505,
            longitude: -0.09,
        }
    }

    #[test]
    fn test_static_source_reports_fix() {
        let source = StaticPositionSource::new(london());
        assert_eq!(source.current_position().unwrap(), london());
    }

    #[test]
    fn test_fallback_passes_through_success() {
        let fix = Position {
            latitude: 48.8566,
            longitude: 2.3522,
        };
        let source = FallbackPositionSource::new(StaticPositionSource::new(fix), london());
        assert_eq!(source.current_position().unwrap(), fix);
    }

    #[test]
    fn test_fallback_substitutes_default_on_failure() {
        let source = FallbackPositionSource::new(FailingSource, london());
        assert_eq!(source.current_position().unwrap(), london());
    }

    #[test]
    fn test_error_display() {
        let error = PositionError::Unavailable("no GPS fix".to_string());
        assert!(error.to_string().contains("no GPS fix"));
    }
}
