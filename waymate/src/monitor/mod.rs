//! Geosafety monitor.
//!
//! Classifies the current position against static geofence reference data
//! and owns the transient display state derived from it: the single
//! highest-priority risk warning, safe-zone containment, and the active
//! route selection.
//!
//! # Evaluation
//!
//! Re-evaluation happens on every position update and is idempotent: the
//! same position against the same reference data always produces the same
//! result. When several danger zones are in range the first one in
//! declaration order wins; reference data order is therefore part of the
//! contract.

mod track;

pub use track::{TrackConfig, TrackHistory, TrackSample};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::coord::{CoordError, Position};
use crate::geofence::{GeofenceZone, ReferenceData, RouteSegment, SegmentId, ZoneId};
use crate::position::{PositionSource, DEFAULT_POSITION};

/// Default distance below which a danger zone raises a warning, in meters.
///
/// Roughly the ground distance of the companion app's coarse 0.005-degree
/// check at London's latitude.
pub const DEFAULT_WARNING_RADIUS_M: f64 = 500.0;

/// Configuration for the geosafety monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Distance below which a danger zone raises a warning, in meters.
    pub warning_radius_m: f64,

    /// Position assumed before the first reading, and fallen back to when
    /// the position source fails.
    pub default_position: Position,

    /// Track history tuning.
    pub track: TrackConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            warning_radius_m: DEFAULT_WARNING_RADIUS_M,
            default_position: DEFAULT_POSITION,
            track: TrackConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Set the warning radius.
    pub fn with_warning_radius_m(mut self, warning_radius_m: f64) -> Self {
        self.warning_radius_m = warning_radius_m;
        self
    }

    /// Set the default position.
    pub fn with_default_position(mut self, default_position: Position) -> Self {
        self.default_position = default_position;
        self
    }
}

/// A transient advisory raised near a danger zone.
///
/// Recomputed on every position update; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskWarning {
    /// The zone that raised the warning.
    pub zone_id: ZoneId,
    /// Human-readable caution text.
    pub message: String,
}

/// Errors from monitor operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MonitorError {
    /// The position failed validation; no distance math was attempted.
    #[error("invalid position: {0}")]
    InvalidPosition(#[from] CoordError),

    /// Route selection referenced an unknown segment.
    #[error("unknown route segment {0}")]
    UnknownSegment(SegmentId),
}

/// Owner of the geosafety display state.
///
/// All mutation goes through [`GeosafetyMonitor::update_position`] and the
/// route-selection methods; the presentation layer only reads.
#[derive(Debug)]
pub struct GeosafetyMonitor {
    data: ReferenceData,
    config: MonitorConfig,
    current_position: Position,
    warning: Option<RiskWarning>,
    active_segment: Option<SegmentId>,
    track: TrackHistory,
}

impl GeosafetyMonitor {
    /// Create a monitor over validated reference data.
    ///
    /// The monitor starts at the configured default position with no
    /// warning and no active route.
    pub fn new(data: ReferenceData, config: MonitorConfig) -> Self {
        let track = TrackHistory::with_config(config.track.clone());
        Self {
            current_position: config.default_position,
            data,
            config,
            warning: None,
            active_segment: None,
            track,
        }
    }

    /// Classify a position against the danger zones.
    ///
    /// Pure: no monitor state is read other than reference data and
    /// configuration, and none is written. Returns the warning for the
    /// first danger zone (declaration order) within the warning radius,
    /// or None when clear. Safe zones and congested segments never warn.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidPosition`] for NaN or out-of-range
    /// coordinates.
    pub fn evaluate(&self, position: &Position) -> Result<Option<RiskWarning>, MonitorError> {
        position.validate()?;

        for zone in &self.data.zones {
            if let GeofenceZone::Danger {
                id,
                severity,
                reason,
                ..
            } = zone
            {
                if zone.distance_m(position) < self.config.warning_radius_m {
                    return Ok(Some(RiskWarning {
                        zone_id: *id,
                        message: format!(
                            "Caution: You are approaching a reported {severity} risk area ({reason})."
                        ),
                    }));
                }
            }
        }

        Ok(None)
    }

    /// Accept a new position reading.
    ///
    /// Stores the reading as current, records it in the track history, and
    /// re-evaluates the risk warning. Returns the warning now in effect.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidPosition`] for invalid readings; the
    /// previous position and warning stay in effect.
    pub fn update_position(
        &mut self,
        position: Position,
    ) -> Result<Option<RiskWarning>, MonitorError> {
        let warning = self.evaluate(&position)?;

        self.current_position = position;
        self.track.record(position);

        match (&self.warning, &warning) {
            (None, Some(raised)) => {
                warn!(zone = raised.zone_id, message = %raised.message, "Risk warning raised");
            }
            (Some(previous), Some(raised)) if previous.zone_id != raised.zone_id => {
                warn!(zone = raised.zone_id, message = %raised.message, "Risk warning raised");
            }
            (Some(_), None) => {
                info!(position = %position, "Risk warning cleared");
            }
            _ => {}
        }

        self.warning = warning.clone();
        Ok(warning)
    }

    /// Pull a reading from a position source.
    ///
    /// A failing source is not an error: the monitor falls back to the
    /// configured default position rather than blocking.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::InvalidPosition`] when the source produced
    /// an invalid reading.
    pub fn refresh_from(
        &mut self,
        source: &dyn PositionSource,
    ) -> Result<Option<RiskWarning>, MonitorError> {
        let position = match source.current_position() {
            Ok(position) => position,
            Err(error) => {
                warn!(%error, "Using default location");
                self.config.default_position
            }
        };
        self.update_position(position)
    }

    /// Mark a segment as the active route recommendation.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::UnknownSegment`] when no segment has the
    /// given id; the previous selection is kept.
    pub fn select_route(&mut self, id: SegmentId) -> Result<&RouteSegment, MonitorError> {
        let segment = self
            .data
            .segment(id)
            .ok_or(MonitorError::UnknownSegment(id))?;
        self.active_segment = Some(id);
        debug!(segment = id, label = %segment.label, "Route selected");
        Ok(segment)
    }

    /// Clear the active route selection.
    pub fn clear_route(&mut self) {
        if let Some(id) = self.active_segment.take() {
            debug!(segment = id, "Route deselected");
        }
    }

    /// The active route segment, if one is selected.
    pub fn active_route(&self) -> Option<&RouteSegment> {
        self.active_segment.and_then(|id| self.data.segment(id))
    }

    /// The first safe zone whose radius contains the position.
    pub fn safe_zone_containing(&self, position: &Position) -> Option<&GeofenceZone> {
        self.data.safe_zones().find(|zone| zone.contains(position))
    }

    /// The current position (default until the first reading).
    pub fn current_position(&self) -> Position {
        self.current_position
    }

    /// The warning currently in effect.
    pub fn current_warning(&self) -> Option<&RiskWarning> {
        self.warning.as_ref()
    }

    /// Recent movement history.
    pub fn track(&self) -> &TrackHistory {
        &self.track
    }

    /// The reference data the monitor evaluates against.
    pub fn reference(&self) -> &ReferenceData {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geofence::{RiskColor, Severity};
    use crate::position::PositionError;

    fn at(lat: f64, lon: f64) -> Position {
        Position {
            latitude: lat,
            longitude: lon,
        }
    }

    fn danger(id: ZoneId, lat: f64, lon: f64, severity: Severity, reason: &str) -> GeofenceZone {
        GeofenceZone::Danger {
            id,
            center: at(lat, lon),
            radius_m: 200.0,
            severity,
            reason: reason.to_string(),
        }
    }

    fn reference() -> ReferenceData {
        ReferenceData {
            zones: vec![
                danger(1, 51.508, -0.11, Severity::High, "Recent incident reported"),
                GeofenceZone::Safe {
                    id: 3,
                    center: at(51.505, -0.09),
                    radius_m: 300.0,
                    label: "University Campus - Patrolled".to_string(),
                },
            ],
            segments: vec![
                RouteSegment {
                    id: 1,
                    path: vec![at(51.505, -0.09), at(51.51, -0.1)],
                    risk: RiskColor::Congested,
                    label: "Heavy Traffic (15 min delay)".to_string(),
                },
                RouteSegment {
                    id: 2,
                    path: vec![at(51.51, -0.1), at(51.515, -0.12)],
                    risk: RiskColor::Safe,
                    label: "Clear Path (Fastest)".to_string(),
                },
            ],
        }
    }

    fn monitor() -> GeosafetyMonitor {
        GeosafetyMonitor::new(reference(), MonitorConfig::default())
    }

    #[test]
    fn test_warning_inside_threshold() {
        let monitor = monitor();
        // ~13m from the zone center.
        let warning = monitor.evaluate(&at(51.5081, -0.1101)).unwrap().unwrap();
        assert_eq!(warning.zone_id, 1);
        assert!(warning.message.contains("high risk area"));
        assert!(warning.message.contains("Recent incident reported"));
    }

    #[test]
    fn test_no_warning_outside_threshold() {
        let monitor = monitor();
        assert!(monitor.evaluate(&at(51.60, -0.20)).unwrap().is_none());
    }

    #[test]
    fn test_no_warning_just_outside_radius() {
        let monitor = monitor();
        // ~780m north of the zone center, beyond the 500m warning radius.
        assert!(monitor.evaluate(&at(51.515, -0.11)).unwrap().is_none());
    }

    #[test]
    fn test_safe_zones_never_warn() {
        let monitor = monitor();
        // Dead center of the safe zone, far from the danger zone.
        let position = at(51.505, -0.09);
        assert!(monitor.evaluate(&position).unwrap().is_none());
        assert!(monitor.safe_zone_containing(&position).is_some());
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let monitor = monitor();
        let position = at(51.5081, -0.1101);
        let first = monitor.evaluate(&position).unwrap();
        let second = monitor.evaluate(&position).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_overlapping_zones_tie_break_is_declaration_order() {
        let data = ReferenceData {
            zones: vec![
                danger(10, 51.508, -0.11, Severity::Medium, "Poor lighting reported"),
                danger(20, 51.5082, -0.1102, Severity::High, "Recent incident"),
            ],
            segments: Vec::new(),
        };
        let monitor = GeosafetyMonitor::new(data, MonitorConfig::default());

        // Both zones are within range; the first declared must win, every
        // time.
        let position = at(51.5081, -0.1101);
        for _ in 0..10 {
            let warning = monitor.evaluate(&position).unwrap().unwrap();
            assert_eq!(warning.zone_id, 10);
        }
    }

    #[test]
    fn test_invalid_position_rejected() {
        let monitor = monitor();
        let result = monitor.evaluate(&at(f64::NAN, -0.11));
        assert!(matches!(
            result,
            Err(MonitorError::InvalidPosition(CoordError::NotFinite))
        ));
    }

    #[test]
    fn test_update_position_stores_state() {
        let mut monitor = monitor();
        let position = at(51.5081, -0.1101);

        let warning = monitor.update_position(position).unwrap();
        assert!(warning.is_some());
        assert_eq!(monitor.current_position(), position);
        assert_eq!(monitor.current_warning(), warning.as_ref());
    }

    #[test]
    fn test_update_position_is_idempotent() {
        let mut monitor = monitor();
        let position = at(51.5081, -0.1101);

        let first = monitor.update_position(position).unwrap();
        let second = monitor.update_position(position).unwrap();
        assert_eq!(first, second);
        assert_eq!(monitor.current_position(), position);
    }

    #[test]
    fn test_update_with_invalid_position_keeps_previous_state() {
        let mut monitor = monitor();
        let good = at(51.5081, -0.1101);
        monitor.update_position(good).unwrap();

        let result = monitor.update_position(at(f64::NAN, 0.0));
        assert!(result.is_err());
        assert_eq!(monitor.current_position(), good);
        assert!(monitor.current_warning().is_some());
    }

    #[test]
    fn test_warning_clears_when_leaving_zone() {
        let mut monitor = monitor();
        monitor.update_position(at(51.5081, -0.1101)).unwrap();
        assert!(monitor.current_warning().is_some());

        monitor.update_position(at(51.60, -0.20)).unwrap();
        assert!(monitor.current_warning().is_none());
    }

    #[test]
    fn test_select_route() {
        let mut monitor = monitor();
        let segment = monitor.select_route(2).unwrap();
        assert_eq!(segment.label, "Clear Path (Fastest)");
        assert_eq!(monitor.active_route().unwrap().id, 2);

        monitor.clear_route();
        assert!(monitor.active_route().is_none());
    }

    #[test]
    fn test_select_unknown_route() {
        let mut monitor = monitor();
        monitor.select_route(1).unwrap();

        let result = monitor.select_route(42);
        assert!(matches!(result, Err(MonitorError::UnknownSegment(42))));
        // Previous selection stays in effect.
        assert_eq!(monitor.active_route().unwrap().id, 1);
    }

    #[test]
    fn test_refresh_from_failing_source_uses_default() {
        struct FailingSource;
        impl PositionSource for FailingSource {
            fn current_position(&self) -> Result<Position, PositionError> {
                Err(PositionError::PermissionDenied)
            }
        }

        let mut monitor = monitor();
        monitor.refresh_from(&FailingSource).unwrap();
        assert_eq!(monitor.current_position(), DEFAULT_POSITION);
    }

    #[test]
    fn test_starts_at_default_position() {
        let monitor = monitor();
        assert_eq!(monitor.current_position(), DEFAULT_POSITION);
        assert!(monitor.current_warning().is_none());
        assert!(monitor.active_route().is_none());
    }
}
