//! In-process wizard event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans [`WizardEvent`]s out to any number of subscribers (audit
//! logging, analytics, UI notifications). Share it via `Arc<EventBus>`.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

pub const STEP_ADVANCED: &str = "wizard.step_advanced";
pub const STEP_BLOCKED: &str = "wizard.step_blocked";
pub const STEP_RETREATED: &str = "wizard.step_retreated";
pub const WIZARD_CANCELLED: &str = "wizard.cancelled";
pub const SUBMISSION_DISPATCHED: &str = "submission.dispatched";
pub const SUBMISSION_COMPLETED: &str = "submission.completed";
pub const SUBMISSION_FAILED: &str = "submission.failed";

// ---------------------------------------------------------------------------
// WizardEvent
// ---------------------------------------------------------------------------

/// Something that happened in a wizard session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardEvent {
    /// Dot-separated event name, e.g. `"wizard.step_advanced"`.
    pub event_type: String,

    /// Set once a submission has been assembled.
    pub submission_id: Option<Uuid>,

    pub actor_user_id: Option<DbId>,

    /// Event-specific data.
    pub payload: serde_json::Value,

    pub timestamp: Timestamp,
}

impl WizardEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            submission_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_submission(mut self, submission_id: Uuid) -> Self {
        self.submission_id = Some(submission_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out bus for [`WizardEvent`]s.
pub struct EventBus {
    sender: broadcast::Sender<WizardEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity. Slow receivers that fall
    /// more than `capacity` events behind observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped if there are none.
    pub fn publish(&self, event: WizardEvent) {
        // A send error only means there are no receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
