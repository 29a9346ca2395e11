//! Async driver for the alert countdown.
//!
//! The [`CountdownRunner`] owns the [`AlertController`], the notification
//! sink, and the one-second timer inside a single task:
//!
//! ```text
//! AlertHandle ──commands──► ┌─────────────────────────────┐
//!                           │       CountdownRunner        │
//!                           │                              │
//!            shutdown ────► │  select! { shutdown,         │──events──► consumer
//!                           │            command,          │
//!              timer ─────► │            tick }            │──dispatch──► sink
//!                           └─────────────────────────────┘
//! ```
//!
//! # Timer discipline
//!
//! At most one interval timer exists per live session. Arming (or
//! re-arming) replaces the timer; cancelling or dispatching drops it. All
//! three happen inside the same `select!` loop that delivers ticks, so a
//! stale tick can never observe a cancelled session and a tick fully
//! completes before the next can fire. This is the property a naive
//! re-scheduling timer implementation loses.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{AlertController, AlertPhase, AlertSession, DEFAULT_COUNTDOWN_SECS};
use crate::coord::Position;
use crate::notify::{DispatchError, DispatchReceipt, DispatchRequest, NotificationSink, Recipient};
use crate::position::{PositionSource, DEFAULT_POSITION};

/// Default wall-clock length of one countdown tick.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default command channel capacity.
const DEFAULT_COMMAND_CAPACITY: usize = 16;

/// Configuration for the countdown runner.
#[derive(Debug, Clone)]
pub struct CountdownRunnerConfig {
    /// Countdown length in seconds.
    pub countdown_secs: u32,

    /// Wall-clock length of one tick. Shortened in tests.
    pub tick_interval: Duration,

    /// Command channel capacity.
    pub command_capacity: usize,

    /// Position used when the source has no reading at dispatch time.
    pub default_position: Position,
}

impl Default for CountdownRunnerConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            tick_interval: DEFAULT_TICK_INTERVAL,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            default_position: DEFAULT_POSITION,
        }
    }
}

/// User intent delivered to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCommand {
    /// Arm the alert (or restart a live countdown).
    Arm,
    /// Cancel the live countdown.
    Cancel,
    /// Drop a terminal session so a new one can be armed.
    Reset,
}

/// State changes published by the runner for the presentation layer.
#[derive(Debug, Clone)]
pub enum AlertEvent {
    /// A session was armed (or re-armed) at the full countdown.
    Armed(AlertSession),
    /// The countdown advanced one second.
    Tick(AlertSession),
    /// The session was cancelled before dispatch.
    Cancelled(AlertSession),
    /// The countdown completed and the sink was invoked.
    Dispatched {
        /// Terminal session snapshot.
        session: AlertSession,
        /// Sink result. An `Err` is retryable by the consumer; it is
        /// published, never swallowed.
        outcome: Result<DispatchReceipt, DispatchError>,
    },
}

/// Errors from the runner handle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RunnerError {
    /// The runner task is no longer alive.
    #[error("countdown runner is not running")]
    NotRunning,
}

/// Cloneable handle for sending commands to a running [`CountdownRunner`].
#[derive(Debug, Clone)]
pub struct AlertHandle {
    command_tx: mpsc::Sender<AlertCommand>,
}

impl AlertHandle {
    /// Arm the alert, restarting the countdown if one is live.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::NotRunning`] when the runner task is gone.
    pub async fn arm(&self) -> Result<(), RunnerError> {
        self.send(AlertCommand::Arm).await
    }

    /// Cancel the live countdown.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::NotRunning`] when the runner task is gone.
    pub async fn cancel(&self) -> Result<(), RunnerError> {
        self.send(AlertCommand::Cancel).await
    }

    /// Drop a terminal session so the alert can be armed again.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::NotRunning`] when the runner task is gone.
    pub async fn reset(&self) -> Result<(), RunnerError> {
        self.send(AlertCommand::Reset).await
    }

    async fn send(&self, command: AlertCommand) -> Result<(), RunnerError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RunnerError::NotRunning)
    }
}

/// Single-task driver for the alert countdown.
///
/// # Type Parameters
///
/// * `S` - Notification sink invoked at dispatch
/// * `P` - Position source sampled at dispatch time
pub struct CountdownRunner<S, P>
where
    S: NotificationSink,
    P: PositionSource,
{
    controller: AlertController,
    sink: Arc<S>,
    position_source: P,
    recipients: Vec<Recipient>,
    default_position: Position,
    tick_interval: Duration,
    command_rx: mpsc::Receiver<AlertCommand>,
    event_tx: mpsc::UnboundedSender<AlertEvent>,
}

impl<S, P> CountdownRunner<S, P>
where
    S: NotificationSink,
    P: PositionSource,
{
    /// Create a runner with its command handle and event stream.
    pub fn new(
        config: CountdownRunnerConfig,
        sink: Arc<S>,
        position_source: P,
        recipients: Vec<Recipient>,
    ) -> (Self, AlertHandle, mpsc::UnboundedReceiver<AlertEvent>) {
        let (command_tx, command_rx) = mpsc::channel(config.command_capacity);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let runner = Self {
            controller: AlertController::new(config.countdown_secs),
            sink,
            position_source,
            recipients,
            default_position: config.default_position,
            tick_interval: config.tick_interval,
            command_rx,
            event_tx,
        };

        (runner, AlertHandle { command_tx }, event_rx)
    }

    /// Run the countdown loop until shutdown is signalled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Countdown runner starting");

        // The one outstanding timer for the live session, if any.
        let mut timer: Option<Interval> = None;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Countdown runner shutting down");
                    break;
                }

                Some(command) = self.command_rx.recv() => {
                    self.handle_command(command, &mut timer);
                }

                _ = next_tick(&mut timer) => {
                    self.handle_tick(&mut timer).await;
                }
            }
        }
    }

    fn handle_command(&mut self, command: AlertCommand, timer: &mut Option<Interval>) {
        match command {
            AlertCommand::Arm => match self.controller.arm() {
                Ok(session) => {
                    // Replacing the interval invalidates any tick already
                    // scheduled for the previous arming.
                    *timer = Some(new_timer(self.tick_interval));
                    self.publish(AlertEvent::Armed(session));
                }
                Err(error) => warn!(%error, "Arm ignored"),
            },
            AlertCommand::Cancel => match self.controller.cancel() {
                Ok(session) => {
                    *timer = None;
                    self.publish(AlertEvent::Cancelled(session));
                }
                Err(error) => debug!(%error, "Cancel ignored"),
            },
            AlertCommand::Reset => {
                self.controller.reset();
                *timer = None;
            }
        }
    }

    async fn handle_tick(&mut self, timer: &mut Option<Interval>) {
        match self.controller.tick() {
            Ok(session) if session.phase == AlertPhase::Dispatched => {
                *timer = None;
                let outcome = self.dispatch(session).await;
                self.publish(AlertEvent::Dispatched { session, outcome });
            }
            Ok(session) => self.publish(AlertEvent::Tick(session)),
            Err(error) => {
                // A timer with no live session violates the discipline
                // above; drop it rather than tick again.
                warn!(%error, "Stray countdown tick");
                *timer = None;
            }
        }
    }

    async fn dispatch(&self, session: AlertSession) -> Result<DispatchReceipt, DispatchError> {
        let position = match self.position_source.current_position() {
            Ok(position) => position,
            Err(error) => {
                warn!(%error, "No position reading at dispatch time, using default");
                self.default_position
            }
        };

        let request = DispatchRequest {
            session_id: session.id,
            position,
            recipients: self.recipients.clone(),
            requested_at: Utc::now(),
        };

        info!(
            session = %session.id,
            %position,
            recipients = request.recipients.len(),
            "Dispatching emergency alert"
        );

        let outcome = self.sink.dispatch(request).await;
        match &outcome {
            Ok(receipt) => {
                info!(session = %session.id, delivered = receipt.delivered, "Dispatch acknowledged");
            }
            Err(error) => {
                // Safety-critical: surface to the consumer for retry.
                error!(session = %session.id, %error, "Emergency dispatch failed");
            }
        }
        outcome
    }

    fn publish(&self, event: AlertEvent) {
        let _ = self.event_tx.send(event);
    }
}

/// Wait for the next tick, or forever when no timer is armed.
async fn next_tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn new_timer(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
