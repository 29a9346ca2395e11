//! SafetyApp startup and shutdown.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::alert::{AlertEvent, AlertHandle, CountdownRunner};
use crate::monitor::GeosafetyMonitor;
use crate::notify::NotificationSink;
use crate::position::{FallbackPositionSource, PositionSource};

/// The assembled companion core.
///
/// Owns the geosafety monitor directly (synchronous, single-owner) and the
/// countdown runner as a background task under a cancellation token.
pub struct SafetyApp {
    monitor: GeosafetyMonitor,
    alert: AlertHandle,
    events: Option<mpsc::UnboundedReceiver<AlertEvent>>,
    shutdown: CancellationToken,
    runner_task: JoinHandle<()>,
}

impl SafetyApp {
    /// Validate the configuration and start the application.
    ///
    /// The position source is wrapped in a default-position fallback before
    /// it reaches the runner, so dispatch always has a position to send.
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] for invalid reference data or configuration.
    pub fn start<S, P>(config: AppConfig, sink: Arc<S>, position_source: P) -> Result<Self, AppError>
    where
        S: NotificationSink,
        P: PositionSource + 'static,
    {
        config.reference.validate()?;
        if config.countdown_secs == 0 {
            return Err(AppError::Config(
                "countdown must be at least one second".to_string(),
            ));
        }
        if !(config.monitor.warning_radius_m > 0.0) {
            return Err(AppError::Config(format!(
                "warning radius must be positive, got {}",
                config.monitor.warning_radius_m
            )));
        }

        let runner_config = config.runner_config();
        let source =
            FallbackPositionSource::new(position_source, config.monitor.default_position);

        let monitor = GeosafetyMonitor::new(config.reference, config.monitor);
        let (runner, alert, events) =
            CountdownRunner::new(runner_config, sink, source, config.recipients);

        let shutdown = CancellationToken::new();
        let runner_task = tokio::spawn(runner.run(shutdown.clone()));

        info!(
            zones = monitor.reference().zones.len(),
            segments = monitor.reference().segments.len(),
            "Safety app started"
        );

        Ok(Self {
            monitor,
            alert,
            events: Some(events),
            shutdown,
            runner_task,
        })
    }

    /// The geosafety monitor.
    pub fn monitor(&self) -> &GeosafetyMonitor {
        &self.monitor
    }

    /// Mutable access for pushing position updates and route selections.
    pub fn monitor_mut(&mut self) -> &mut GeosafetyMonitor {
        &mut self.monitor
    }

    /// Handle for arming and cancelling the emergency alert.
    pub fn alert(&self) -> AlertHandle {
        self.alert.clone()
    }

    /// Take the alert event stream. Yields `None` after the first call.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<AlertEvent>> {
        self.events.take()
    }

    /// Stop the runner and wait for it to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let _ = self.runner_task.await;
        info!("Safety app stopped");
    }
}
