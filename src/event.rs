//! Workflow event system.

use crate::orchestrator::Operation;
use tokio::sync::broadcast;

/// Events emitted by the workflow screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// A request was issued to the registration service.
    RequestStarted {
        /// Operation kind.
        operation: Operation,
    },

    /// A request settled.
    RequestSettled {
        /// Operation kind.
        operation: Operation,
        /// Whether it settled successfully.
        success: bool,
    },

    /// Input was rejected before any request was made.
    ValidationRejected {
        /// Operation kind.
        operation: Operation,
        /// Rendered validation message.
        reason: String,
    },

    /// A value was copied to the clipboard.
    Copied {
        /// Feedback key the copy was issued for.
        key: String,
    },

    /// A clipboard write failed.
    CopyFailed {
        /// Feedback key the copy was issued for.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Channel for receiving workflow events.
pub type WorkflowEventsChannel = broadcast::Receiver<WorkflowEvent>;

/// Sender for workflow events.
pub type WorkflowEventsSender = broadcast::Sender<WorkflowEvent>;

/// Create a new event channel pair.
#[must_use]
pub fn create_event_channel() -> (WorkflowEventsSender, WorkflowEventsChannel) {
    broadcast::channel(256)
}

/// Send an event, ignoring the case where nobody is listening.
pub(crate) fn emit(events: Option<&WorkflowEventsSender>, event: WorkflowEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}
