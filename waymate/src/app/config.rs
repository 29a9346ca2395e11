//! Application configuration for SafetyApp.
//!
//! `AppConfig` combines everything needed to bootstrap the companion core:
//! monitor tuning, countdown settings, the fixed recipient set, and the
//! geofence reference data.

use std::time::Duration;

use crate::alert::{CountdownRunnerConfig, DEFAULT_COUNTDOWN_SECS, DEFAULT_TICK_INTERVAL};
use crate::geofence::ReferenceData;
use crate::monitor::MonitorConfig;
use crate::notify::Recipient;

/// Top-level configuration passed to `SafetyApp::start()`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Geosafety monitor configuration.
    pub monitor: MonitorConfig,

    /// Countdown length in seconds.
    pub countdown_secs: u32,

    /// Wall-clock length of one countdown tick.
    pub tick_interval: Duration,

    /// Fixed recipient set for emergency dispatch.
    pub recipients: Vec<Recipient>,

    /// Geofence and route reference data.
    pub reference: ReferenceData,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            tick_interval: DEFAULT_TICK_INTERVAL,
            recipients: vec![Recipient::Emergency],
            reference: ReferenceData::default(),
        }
    }
}

impl AppConfig {
    /// Create a config over the given reference data.
    pub fn new(reference: ReferenceData) -> Self {
        Self {
            reference,
            ..Default::default()
        }
    }

    /// Set the recipient set.
    pub fn with_recipients(mut self, recipients: Vec<Recipient>) -> Self {
        self.recipients = recipients;
        self
    }

    /// Set the countdown length.
    pub fn with_countdown_secs(mut self, countdown_secs: u32) -> Self {
        self.countdown_secs = countdown_secs;
        self
    }

    /// Set the monitor configuration.
    pub fn with_monitor(mut self, monitor: MonitorConfig) -> Self {
        self.monitor = monitor;
        self
    }

    /// Set the tick interval (shortened in tests and simulations).
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Derive the countdown runner configuration.
    pub(crate) fn runner_config(&self) -> CountdownRunnerConfig {
        CountdownRunnerConfig {
            countdown_secs: self.countdown_secs,
            tick_interval: self.tick_interval,
            default_position: self.monitor.default_position,
            ..CountdownRunnerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.countdown_secs, DEFAULT_COUNTDOWN_SECS);
        assert_eq!(config.recipients, vec![Recipient::Emergency]);
    }

    #[test]
    fn test_builders() {
        let config = AppConfig::default()
            .with_countdown_secs(10)
            .with_recipients(vec![
                Recipient::Emergency,
                Recipient::Contact {
                    name: "Sarah Johnson".to_string(),
                    phone: "+44 7700 900123".to_string(),
                },
            ]);

        assert_eq!(config.countdown_secs, 10);
        assert_eq!(config.recipients.len(), 2);
    }

    #[test]
    fn test_runner_config_inherits_settings() {
        let config = AppConfig::default().with_countdown_secs(7);
        let runner_config = config.runner_config();
        assert_eq!(runner_config.countdown_secs, 7);
        assert_eq!(
            runner_config.default_position,
            config.monitor.default_position
        );
    }
}
