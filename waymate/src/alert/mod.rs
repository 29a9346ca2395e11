//! Emergency alert ("SOS") state machine.
//!
//! The alert lifecycle is a pure, synchronous state machine owned by
//! [`AlertController`]:
//!
//! ```text
//! Idle ──arm──► Armed ──tick──► CountingDown ──tick(1→0)──► Dispatched
//!                 │                   │
//!                 └──────cancel───────┴──► Cancelled ──► Idle
//! ```
//!
//! The controller never touches a timer or the notification sink. Timing
//! and dispatch live in [`CountdownRunner`], which drives the controller
//! from a single task so a tick always completes before the next one can
//! be scheduled.
//!
//! # Re-arming
//!
//! Arming while a session is live restarts the countdown at the fixed
//! total rather than rejecting. This matches the companion app's observed
//! behavior: pressing SOS again resets the count to five.

mod runner;

pub use runner::{
    AlertCommand, AlertEvent, AlertHandle, CountdownRunner, CountdownRunnerConfig, RunnerError,
    DEFAULT_TICK_INTERVAL,
};

use thiserror::Error;
use tracing::{debug, info};

/// Countdown length in seconds.
pub const DEFAULT_COUNTDOWN_SECS: u32 = 5;

/// Identifier of an alert session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Create a session id from a raw counter value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sos-{}", self.0)
    }
}

/// Phase of the alert lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertPhase {
    /// No live session.
    #[default]
    Idle,
    /// Session created, countdown at the full total.
    Armed,
    /// Countdown in progress.
    CountingDown,
    /// Session cancelled before reaching zero. Snapshot-only: the
    /// controller returns to `Idle` as soon as the cancel completes.
    Cancelled,
    /// Countdown reached zero; notification dispatch has been triggered.
    Dispatched,
}

impl std::fmt::Display for AlertPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertPhase::Idle => write!(f, "idle"),
            AlertPhase::Armed => write!(f, "armed"),
            AlertPhase::CountingDown => write!(f, "counting-down"),
            AlertPhase::Cancelled => write!(f, "cancelled"),
            AlertPhase::Dispatched => write!(f, "dispatched"),
        }
    }
}

/// Snapshot of the single live alert session.
///
/// Invariant: `remaining_secs <= total_secs`, and `Dispatched` is reached
/// exactly when `remaining_secs` goes from 1 to 0 without an intervening
/// cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertSession {
    /// Session identifier.
    pub id: SessionId,
    /// Current phase.
    pub phase: AlertPhase,
    /// Seconds left before dispatch.
    pub remaining_secs: u32,
    /// Countdown length this session started from.
    pub total_secs: u32,
}

impl AlertSession {
    /// Whether the session still accepts ticks and cancels.
    pub fn is_live(&self) -> bool {
        matches!(self.phase, AlertPhase::Armed | AlertPhase::CountingDown)
    }
}

/// State-machine misuse signals.
///
/// These are typed results, not failures: callers log and move on.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AlertError {
    /// `tick` or `cancel` was called with no live session.
    #[error("no live alert session")]
    NotArmed,

    /// The session already dispatched; it must be reset before reuse.
    #[error("alert already dispatched")]
    AlreadyDispatched,
}

/// Owner of the single live [`AlertSession`].
#[derive(Debug)]
pub struct AlertController {
    session: Option<AlertSession>,
    total_secs: u32,
    next_session: u64,
}

impl AlertController {
    /// Create a controller with the given countdown length.
    ///
    /// A zero length makes no sense for an arm-then-cancel flow; it is
    /// clamped to one second.
    pub fn new(total_secs: u32) -> Self {
        Self {
            session: None,
            total_secs: total_secs.max(1),
            next_session: 1,
        }
    }

    /// Current phase (`Idle` when no session is live).
    pub fn phase(&self) -> AlertPhase {
        self.session.map(|s| s.phase).unwrap_or_default()
    }

    /// Snapshot of the live session, if any.
    pub fn session(&self) -> Option<AlertSession> {
        self.session
    }

    /// Arm the alert, starting the countdown at the full total.
    ///
    /// Re-arming a live session restarts its countdown (same session id);
    /// arming after dispatch requires [`AlertController::reset`] first.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::AlreadyDispatched`] when the previous session
    /// dispatched and has not been reset.
    pub fn arm(&mut self) -> Result<AlertSession, AlertError> {
        match self.session {
            Some(session) if session.phase == AlertPhase::Dispatched => {
                Err(AlertError::AlreadyDispatched)
            }
            Some(mut session) => {
                // Restart, keeping the session identity.
                session.phase = AlertPhase::Armed;
                session.remaining_secs = session.total_secs;
                self.session = Some(session);
                info!(session = %session.id, total_secs = session.total_secs, "Alert re-armed");
                Ok(session)
            }
            None => {
                let session = AlertSession {
                    id: SessionId::new(self.next_session),
                    phase: AlertPhase::Armed,
                    remaining_secs: self.total_secs,
                    total_secs: self.total_secs,
                };
                self.next_session += 1;
                self.session = Some(session);
                info!(session = %session.id, total_secs = session.total_secs, "Alert armed");
                Ok(session)
            }
        }
    }

    /// Advance the countdown by exactly one second.
    ///
    /// The 1 → 0 transition moves the session to `Dispatched`; the caller
    /// observes that phase and performs the dispatch side effect exactly
    /// once.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NotArmed`] with no live session and
    /// [`AlertError::AlreadyDispatched`] after the terminal tick.
    pub fn tick(&mut self) -> Result<AlertSession, AlertError> {
        let mut session = self.session.ok_or(AlertError::NotArmed)?;
        if session.phase == AlertPhase::Dispatched {
            return Err(AlertError::AlreadyDispatched);
        }

        session.remaining_secs -= 1;
        session.phase = if session.remaining_secs == 0 {
            AlertPhase::Dispatched
        } else {
            AlertPhase::CountingDown
        };
        self.session = Some(session);

        if session.phase == AlertPhase::Dispatched {
            info!(session = %session.id, "Countdown complete, dispatching");
        } else {
            debug!(session = %session.id, remaining = session.remaining_secs, "Countdown tick");
        }

        Ok(session)
    }

    /// Cancel the live session and return to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NotArmed`] with no live session and
    /// [`AlertError::AlreadyDispatched`] once dispatch has fired (a no-op
    /// worth no more than a log line for the caller).
    pub fn cancel(&mut self) -> Result<AlertSession, AlertError> {
        let mut session = self.session.ok_or(AlertError::NotArmed)?;
        if session.phase == AlertPhase::Dispatched {
            return Err(AlertError::AlreadyDispatched);
        }

        session.phase = AlertPhase::Cancelled;
        self.session = None;
        info!(session = %session.id, remaining = session.remaining_secs, "Alert cancelled");
        Ok(session)
    }

    /// Drop any session, returning to `Idle`.
    ///
    /// Used after a dispatched session's terminal state has been shown.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            debug!(session = %session.id, phase = %session.phase, "Alert session reset");
        }
    }
}

impl Default for AlertController {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTDOWN_SECS)
    }
}
