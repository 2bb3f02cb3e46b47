//! Single-flight request orchestration.
//!
//! An [`Orchestrator`] drives one call to the registration service at a
//! time and publishes its progress as a [`RequestState`]:
//!
//! ```text
//!          run()                 call resolves
//! Idle ───────────► Pending ─────────────────────► Settled(Ok | Err)
//!                      ▲                                │
//!                      └────────────── run() ───────────┘
//! ```
//!
//! `run` is refused while a call is pending, so results are always applied
//! in invocation order. After [`Orchestrator::teardown`] a late result is
//! dropped rather than published. A `run` future dropped before its call
//! resolves settles with the operation's generic failure text.

use crate::error::Error;
use crate::event::{emit, WorkflowEvent, WorkflowEventsSender};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// The kinds of request the workflows issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Register a file.
    Upload,
    /// Look up a hash.
    Verify,
    /// Fetch every registration.
    List,
    /// Fetch one author's registrations.
    AuthorFiles,
}

impl Operation {
    /// Generic failure text for this operation.
    #[must_use]
    pub fn default_message(self) -> &'static str {
        match self {
            Self::Upload => "Upload failed",
            Self::Verify => "Verification failed",
            Self::List | Self::AuthorFiles => "Failed to fetch files",
        }
    }

    /// Whether the service's own `error` text is shown for this operation.
    ///
    /// Only the upload endpoint returns a meaningful message; the read
    /// endpoints always show their generic text.
    #[must_use]
    pub fn surfaces_service_message(self) -> bool {
        matches!(self, Self::Upload)
    }

    /// Message displayed when a request for this operation fails.
    #[must_use]
    pub fn failure_message(self, error: &Error) -> String {
        match error {
            Error::Service {
                message: Some(message),
                ..
            } if self.surfaces_service_message() => message.clone(),
            Error::Transport(description) if !description.trim().is_empty() => description.clone(),
            _ => self.default_message().to_string(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Upload => "upload",
            Self::Verify => "verify",
            Self::List => "list",
            Self::AuthorFiles => "author-files",
        };
        f.write_str(name)
    }
}

/// Observable state of an orchestrated request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState<T> {
    /// Nothing has been requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Pending,
    /// The last request finished, with its result or a display message.
    Settled(Result<T, String>),
}

impl<T> RequestState<T> {
    /// Whether a request is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The successful result, if settled successfully.
    #[must_use]
    pub fn ok(&self) -> Option<&T> {
        match self {
            Self::Settled(Ok(value)) => Some(value),
            _ => None,
        }
    }

    /// The failure message, if settled with an error.
    #[must_use]
    pub fn err(&self) -> Option<&str> {
        match self {
            Self::Settled(Err(message)) => Some(message),
            _ => None,
        }
    }
}

/// Drives one request at a time and publishes its [`RequestState`].
///
/// Cloning yields another handle to the same state machine.
pub struct Orchestrator<T> {
    operation: Operation,
    state: Arc<watch::Sender<RequestState<T>>>,
    detached: Arc<AtomicBool>,
    events: Option<WorkflowEventsSender>,
}

impl<T> Clone for Orchestrator<T> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation,
            state: Arc::clone(&self.state),
            detached: Arc::clone(&self.detached),
            events: self.events.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Orchestrator<T> {
    /// Create an idle orchestrator for `operation`.
    #[must_use]
    pub fn new(operation: Operation) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self {
            operation,
            state: Arc::new(state),
            detached: Arc::new(AtomicBool::new(false)),
            events: None,
        }
    }

    /// Report request activity on an event channel.
    #[must_use]
    pub fn with_events(mut self, events: WorkflowEventsSender) -> Self {
        self.events = Some(events);
        self
    }

    /// The operation this orchestrator drives.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> RequestState<T> {
        self.state.borrow().clone()
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Watch state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RequestState<T>> {
        self.state.subscribe()
    }

    /// Run `call` and publish its outcome.
    ///
    /// Returns `false` without polling `call` if a request is already
    /// pending or the orchestrator has been torn down.
    pub async fn run<F>(&self, call: F) -> bool
    where
        F: Future<Output = crate::Result<T>>,
    {
        if !self.begin() {
            return false;
        }
        let mut guard = PendingGuard { orchestrator: Some(self) };
        let outcome = call.await;
        guard.orchestrator = None;
        self.settle(outcome);
        true
    }

    /// Stop publishing results; anything still in flight is dropped.
    pub fn teardown(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    /// Whether [`teardown`](Self::teardown) has been called.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    fn begin(&self) -> bool {
        if self.is_torn_down() {
            debug!("Refusing {} request after teardown", self.operation);
            return false;
        }

        let started = self.state.send_if_modified(|state| {
            if state.is_pending() {
                false
            } else {
                *state = RequestState::Pending;
                true
            }
        });

        if started {
            debug!("{} request started", self.operation);
            emit(
                self.events.as_ref(),
                WorkflowEvent::RequestStarted {
                    operation: self.operation,
                },
            );
        } else {
            debug!("{} request already pending, ignoring", self.operation);
        }
        started
    }

    fn settle(&self, outcome: crate::Result<T>) {
        if self.is_torn_down() {
            debug!("Dropping {} result after teardown", self.operation);
            return;
        }

        let settled = outcome.map_err(|e| {
            warn!("{} request failed: {e}", self.operation);
            self.operation.failure_message(&e)
        });
        self.publish(settled);
    }

    fn cancel(&self) {
        if self.is_torn_down() {
            return;
        }
        debug!("{} request cancelled before it resolved", self.operation);
        self.publish(Err(self.operation.default_message().to_string()));
    }

    fn publish(&self, settled: Result<T, String>) {
        let success = settled.is_ok();
        self.state.send_replace(RequestState::Settled(settled));

        debug!("{} request settled (success={success})", self.operation);
        emit(
            self.events.as_ref(),
            WorkflowEvent::RequestSettled {
                operation: self.operation,
                success,
            },
        );
    }
}

/// Settles a request whose `run` future was dropped mid-call.
struct PendingGuard<'a, T: Clone + Send + Sync + 'static> {
    orchestrator: Option<&'a Orchestrator<T>>,
}

impl<T: Clone + Send + Sync + 'static> Drop for PendingGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(orchestrator) = self.orchestrator.take() {
            orchestrator.cancel();
        }
    }
}
