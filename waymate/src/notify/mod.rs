//! Notification dispatch abstraction.
//!
//! Delivery mechanics (SMS, push, emergency-services integration) are
//! external collaborators behind the [`NotificationSink`] trait. The
//! countdown runner builds a [`DispatchRequest`] when an alert reaches its
//! terminal state and awaits the sink exactly once per session. A failed
//! dispatch is safety-critical: it is returned to the caller for retry or
//! escalation, never swallowed.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::alert::SessionId;
use crate::coord::Position;

/// A party notified when an alert dispatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Recipient {
    /// Local emergency services (police).
    Emergency,
    /// A personal emergency contact.
    Contact {
        /// Contact display name.
        name: String,
        /// Contact phone number.
        phone: String,
    },
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recipient::Emergency => write!(f, "emergency services"),
            Recipient::Contact { name, .. } => write!(f, "{name}"),
        }
    }
}

/// Everything a sink needs to deliver an alert.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    /// The alert session that reached dispatch.
    pub session_id: SessionId,
    /// Position captured at dispatch time.
    pub position: Position,
    /// Fixed recipient set for this user.
    pub recipients: Vec<Recipient>,
    /// When the dispatch was requested (UTC).
    pub requested_at: DateTime<Utc>,
}

/// Acknowledgement of a completed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// Number of recipients the sink accepted the alert for.
    pub delivered: usize,
}

/// Errors a notification sink can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The delivery channel could not be reached.
    #[error("notification channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// The channel rejected the dispatch.
    #[error("dispatch rejected: {0}")]
    Rejected(String),

    /// The channel did not acknowledge in time.
    #[error("dispatch timed out")]
    Timeout,
}

/// Delivers emergency alerts to recipients.
///
/// The boxed-future shape keeps the trait object-safe without an async
/// runtime dependency in the signature; implementations are typically
/// `Box::pin(async move { ... })`.
pub trait NotificationSink: Send + Sync + 'static {
    /// Deliver the alert described by `request`.
    fn dispatch(
        &self,
        request: DispatchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<DispatchReceipt, DispatchError>> + Send + '_>>;
}

/// Sink that records the dispatch in the log stream.
///
/// Stands in for real delivery, which is outside this crate's scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn dispatch(
        &self,
        request: DispatchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<DispatchReceipt, DispatchError>> + Send + '_>> {
        Box::pin(async move {
            for recipient in &request.recipients {
                info!(
                    session = %request.session_id,
                    position = %request.position,
                    recipient = %recipient,
                    "Emergency alert dispatched"
                );
            }
            Ok(DispatchReceipt {
                delivered: request.recipients.len(),
            })
        })
    }
}
