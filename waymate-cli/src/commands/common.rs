//! Shared helpers for CLI commands.

use std::path::Path;

use waymate::coord::Position;
use waymate::geofence::{
    GeofenceError, GeofenceZone, ReferenceData, RiskColor, RouteSegment, Severity,
};
use waymate::notify::Recipient;

pub fn at(lat: f64, lon: f64) -> Position {
    Position {
        latitude: lat,
        longitude: lon,
    }
}

/// The demo reference set: two reported danger zones, a patrolled campus,
/// and two route segments around central London.
pub fn demo_reference() -> ReferenceData {
    ReferenceData {
        zones: vec![
            GeofenceZone::Danger {
                id: 1,
                center: at(51.508, -0.11),
                radius_m: 200.0,
                severity: Severity::Medium,
                reason: "Poor lighting reported".to_string(),
            },
            GeofenceZone::Danger {
                id: 2,
                center: at(51.503, -0.06),
                radius_m: 200.0,
                severity: Severity::High,
                reason: "Recent incident reported".to_string(),
            },
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

/// Load reference data from a file, or fall back to the demo set.
pub fn load_reference(path: Option<&Path>) -> Result<ReferenceData, GeofenceError> {
    match path {
        Some(path) => ReferenceData::from_file(path),
        None => {
            let reference = demo_reference();
            reference.validate()?;
            Ok(reference)
        }
    }
}

/// The demo recipient set: emergency services plus one trusted contact.
pub fn demo_recipients() -> Vec<Recipient> {
    vec![
        Recipient::Emergency,
        Recipient::Contact {
            name: "Sarah Johnson".to_string(),
            phone: "+44 7700 900123".to_string(),
        },
    ]
}
