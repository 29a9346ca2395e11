//! Waymate - personal-safety companion core
//!
//! This library implements the two collaborating behaviors at the heart of
//! the companion app:
//!
//! - **Geosafety monitoring** ([`monitor`]): classifies a stream of
//!   position readings against static geofence and route reference data,
//!   raising at most one risk warning at a time and tracking the active
//!   route recommendation.
//! - **Emergency alert** ([`alert`]): a time-boxed SOS state machine that
//!   arms, counts down, can be cancelled, and dispatches notifications to
//!   a fixed recipient set on expiry.
//!
//! Presentation, real geolocation, and real notification delivery are
//! external collaborators behind the [`position`] and [`notify`] seams and
//! the alert event stream. [`app::SafetyApp`] wires everything together.

pub mod alert;
pub mod app;
pub mod coord;
pub mod geofence;
pub mod logging;
pub mod monitor;
pub mod notify;
pub mod position;

pub use alert::{AlertController, AlertEvent, AlertHandle, AlertPhase, AlertSession};
pub use app::{AppConfig, SafetyApp};
pub use coord::Position;
pub use geofence::{GeofenceZone, ReferenceData, RouteSegment};
pub use monitor::{GeosafetyMonitor, RiskWarning};
pub use notify::{NotificationSink, Recipient};
pub use position::PositionSource;
