//! Geofence and route reference data.
//!
//! Zones and route segments are static reference data: loaded once at
//! startup (from JSON or built in code), validated, and never mutated at
//! runtime. Zones are a closed tagged union so classification code can
//! match exhaustively instead of duck-typing record shapes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::{CoordError, Position};

/// Identifier for a geofence zone.
pub type ZoneId = u32;

/// Identifier for a route segment.
pub type SegmentId = u32;

/// Default radius for danger zones, in meters.
///
/// Applied when a danger-zone record omits its radius; safe zones always
/// carry a per-record radius.
pub const DEFAULT_DANGER_RADIUS_M: f64 = 200.0;

/// Minimum number of points in a route segment path.
pub const MIN_PATH_POINTS: usize = 2;

/// Reported severity of a danger zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Elevated risk, e.g. poor lighting.
    Medium,
    /// Serious risk, e.g. a recent incident.
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// A named circular region with a safety classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GeofenceZone {
    /// A region with a reported risk. Produces warnings when approached.
    Danger {
        /// Zone identifier, unique among zones.
        id: ZoneId,
        /// Center of the circular region.
        center: Position,
        /// Radius in meters.
        #[serde(default = "default_danger_radius")]
        radius_m: f64,
        /// Reported severity.
        severity: Severity,
        /// Why the zone was reported.
        reason: String,
    },
    /// A patrolled or otherwise safe region. Display state only, never warns.
    Safe {
        /// Zone identifier, unique among zones.
        id: ZoneId,
        /// Center of the circular region.
        center: Position,
        /// Radius in meters.
        radius_m: f64,
        /// Human-readable label.
        label: String,
    },
}

fn default_danger_radius() -> f64 {
    DEFAULT_DANGER_RADIUS_M
}

impl GeofenceZone {
    /// Zone identifier.
    pub fn id(&self) -> ZoneId {
        match self {
            GeofenceZone::Danger { id, .. } | GeofenceZone::Safe { id, .. } => *id,
        }
    }

    /// Center of the zone.
    pub fn center(&self) -> &Position {
        match self {
            GeofenceZone::Danger { center, .. } | GeofenceZone::Safe { center, .. } => center,
        }
    }

    /// Radius of the zone in meters.
    pub fn radius_m(&self) -> f64 {
        match self {
            GeofenceZone::Danger { radius_m, .. } | GeofenceZone::Safe { radius_m, .. } => {
                *radius_m
            }
        }
    }

    /// Whether this is a danger zone.
    pub fn is_danger(&self) -> bool {
        matches!(self, GeofenceZone::Danger { .. })
    }

    /// Distance from a position to the zone center, in meters.
    pub fn distance_m(&self, position: &Position) -> f64 {
        position.distance_m(self.center())
    }

    /// Whether a position falls inside the zone radius.
    pub fn contains(&self, position: &Position) -> bool {
        self.distance_m(position) <= self.radius_m()
    }
}

/// Congestion classification of a route segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    /// Clear path.
    Safe,
    /// Congested or delayed path.
    Congested,
}

impl std::fmt::Display for RiskColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskColor::Safe => write!(f, "safe"),
            RiskColor::Congested => write!(f, "congested"),
        }
    }
}

/// An ordered polyline with a congestion classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    /// Segment identifier, unique among segments.
    pub id: SegmentId,
    /// Ordered path of at least [`MIN_PATH_POINTS`] positions.
    pub path: Vec<Position>,
    /// Congestion classification.
    pub risk: RiskColor,
    /// Human-readable label.
    pub label: String,
}

/// Errors from loading or validating reference data.
#[derive(Debug, Error)]
pub enum GeofenceError {
    /// Failed to read a reference data file.
    #[error("I/O error reading reference data: {0}")]
    Io(#[from] std::io::Error),

    /// Reference data is not valid JSON.
    #[error("malformed reference data: {0}")]
    Json(#[from] serde_json::Error),

    /// A zone or segment carries an invalid position.
    #[error("invalid position in record {id}: {source}")]
    InvalidPosition {
        /// Offending record id.
        id: u32,
        /// Underlying validation error.
        source: CoordError,
    },

    /// A zone radius is zero, negative, or non-finite.
    #[error("invalid radius {radius_m} in zone {id}")]
    InvalidRadius {
        /// Offending zone id.
        id: ZoneId,
        /// The rejected radius.
        radius_m: f64,
    },

    /// Two zones share an id.
    #[error("duplicate zone id {0}")]
    DuplicateZoneId(ZoneId),

    /// Two segments share an id.
    #[error("duplicate segment id {0}")]
    DuplicateSegmentId(SegmentId),

    /// A segment path has fewer than [`MIN_PATH_POINTS`] points.
    #[error("segment {id} path has {points} points (minimum 2)")]
    ShortPath {
        /// Offending segment id.
        id: SegmentId,
        /// Number of points found.
        points: usize,
    },
}

/// The full static reference set the monitor evaluates against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Geofence zones in declaration order. Order is significant: the
    /// monitor's tie-break picks the first matching danger zone.
    #[serde(default)]
    pub zones: Vec<GeofenceZone>,

    /// Route segments in declaration order.
    #[serde(default)]
    pub segments: Vec<RouteSegment>,
}

impl ReferenceData {
    /// Parse reference data from a JSON string and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError`] for malformed JSON or invalid records.
    pub fn from_json_str(json: &str) -> Result<Self, GeofenceError> {
        let data: Self = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Load reference data from a JSON file and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError`] for I/O failures, malformed JSON, or
    /// invalid records.
    pub fn from_file(path: &Path) -> Result<Self, GeofenceError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Validate every record.
    ///
    /// # Errors
    ///
    /// Returns the first [`GeofenceError`] found: invalid positions or
    /// radii, duplicate ids, or too-short segment paths.
    pub fn validate(&self) -> Result<(), GeofenceError> {
        let mut zone_ids = std::collections::HashSet::new();
        for zone in &self.zones {
            if !zone_ids.insert(zone.id()) {
                return Err(GeofenceError::DuplicateZoneId(zone.id()));
            }
            zone.center()
                .validate()
                .map_err(|source| GeofenceError::InvalidPosition {
                    id: zone.id(),
                    source,
                })?;
            let radius_m = zone.radius_m();
            if !radius_m.is_finite() || radius_m <= 0.0 {
                return Err(GeofenceError::InvalidRadius {
                    id: zone.id(),
                    radius_m,
                });
            }
        }

        let mut segment_ids = std::collections::HashSet::new();
        for segment in &self.segments {
            if !segment_ids.insert(segment.id) {
                return Err(GeofenceError::DuplicateSegmentId(segment.id));
            }
            if segment.path.len() < MIN_PATH_POINTS {
                return Err(GeofenceError::ShortPath {
                    id: segment.id,
                    points: segment.path.len(),
                });
            }
            for point in &segment.path {
                point
                    .validate()
                    .map_err(|source| GeofenceError::InvalidPosition {
                        id: segment.id,
                        source,
                    })?;
            }
        }

        Ok(())
    }

    /// Look up a segment by id.
    pub fn segment(&self, id: SegmentId) -> Option<&RouteSegment> {
        self.segments.iter().find(|segment| segment.id == id)
    }

    /// Danger zones in declaration order.
    pub fn danger_zones(&self) -> impl Iterator<Item = &GeofenceZone> {
        self.zones.iter().filter(|zone| zone.is_danger())
    }

    /// Safe zones in declaration order.
    pub fn safe_zones(&self) -> impl Iterator<Item = &GeofenceZone> {
        self.zones.iter().filter(|zone| !zone.is_danger())
    }
}
