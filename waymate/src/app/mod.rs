//! Application bootstrap and lifecycle management.
//!
//! `SafetyApp` assembles the two collaborating components behind a single
//! startup call:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         SafetyApp                            │
//! │                                                              │
//! │  GeosafetyMonitor (owned, synchronous)                       │
//! │     position updates ──► warning / route / track state       │
//! │                                                              │
//! │  CountdownRunner (background task, CancellationToken)        │
//! │     AlertHandle ──commands──► runner ──events──► consumer    │
//! │                               runner ──dispatch──► sink      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use waymate::app::{AppConfig, SafetyApp};
//!
//! let mut app = SafetyApp::start(config, sink, source)?;
//!
//! app.monitor_mut().update_position(reading)?;
//! app.alert().arm().await?;
//!
//! app.shutdown().await;
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::SafetyApp;
pub use config::AppConfig;
pub use error::AppError;
