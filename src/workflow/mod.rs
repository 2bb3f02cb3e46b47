//! Screen workflows composed from the validator, orchestrators, display
//! transforms and copy feedback.
//!
//! # Data flow
//!
//! ```text
//! input ──► validate ──► Orchestrator::run ──► RegistryService
//!   │          │                                     │
//!   │      Rejected (inline, nothing sent)           ▼
//!   │                                          RequestState
//!   │                                                │
//!   └──────────────► view() ◄── display ◄────────────┘
//! ```
//!
//! Every screen owns its own state. [`Workflow`] hands out fresh screens
//! that share only the service client, the clipboard and the event
//! channel. Screen actions take `&self`, so a screen can be rendered
//! while one of its requests is in flight.

mod list;
mod upload;
mod verify;

pub use list::{
    CopyKey, CopySlot, FieldView, FileCard, ListContent, ListScreen, ListSource, ListView,
};
pub use upload::{SelectedFile, UploadScreen, UploadSuccess, UploadView};
pub use verify::{VerifiedDetails, VerifyField, VerifyPanel, VerifyScreen, VerifyView};

use crate::client::{HttpRegistry, RegistryService};
use crate::config::ClientConfig;
use crate::error::{Result, ValidationError};
use crate::event::{
    create_event_channel, emit, WorkflowEvent, WorkflowEventsChannel, WorkflowEventsSender,
};
use crate::feedback::{Clipboard, Osc52Clipboard};
use crate::orchestrator::Operation;
use crate::validate::validate_address;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a submit, refresh or retry action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The request ran and settled; the screen state holds the result.
    Completed,
    /// Input failed validation; nothing was sent.
    Rejected(ValidationError),
    /// A request is already pending or the screen was torn down.
    Ignored,
}

/// Resources a screen borrows from the workflow.
pub(crate) struct ScreenContext<S> {
    pub(crate) service: Arc<S>,
    pub(crate) clipboard: Arc<dyn Clipboard>,
    pub(crate) events: WorkflowEventsSender,
}

impl<S> ScreenContext<S> {
    pub(crate) fn reject(&self, operation: Operation, error: &ValidationError) {
        debug!("{operation} input rejected: {error}");
        emit(
            Some(&self.events),
            WorkflowEvent::ValidationRejected {
                operation,
                reason: error.to_string(),
            },
        );
    }
}

/// Builder for constructing a [`Workflow`].
pub struct WorkflowBuilder {
    config: ClientConfig,
    clipboard: Option<Arc<dyn Clipboard>>,
}

impl WorkflowBuilder {
    /// Create a new builder with the given configuration.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            clipboard: None,
        }
    }

    /// Use `clipboard` for copy actions instead of the OSC 52 terminal
    /// clipboard.
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    /// Build a workflow talking to the configured endpoint over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid.
    pub fn build(self) -> Result<Workflow<HttpRegistry>> {
        let service = HttpRegistry::new(&self.config)?;
        Ok(self.build_with_service(service))
    }

    /// Build a workflow on top of any [`RegistryService`].
    #[must_use]
    pub fn build_with_service<S: RegistryService>(self, service: S) -> Workflow<S> {
        info!("Building workflow for {}", self.config.endpoint);
        let clipboard = self
            .clipboard
            .unwrap_or_else(|| Arc::new(Osc52Clipboard::stdout()));
        let (events, _) = create_event_channel();
        Workflow {
            config: self.config,
            service: Arc::new(service),
            clipboard,
            events,
        }
    }
}

/// Entry point handing out upload, verify and list screens.
pub struct Workflow<S> {
    config: ClientConfig,
    service: Arc<S>,
    clipboard: Arc<dyn Clipboard>,
    events: WorkflowEventsSender,
}

impl<S: RegistryService> Workflow<S> {
    /// The configuration the workflow was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying service client.
    #[must_use]
    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    /// Subscribe to workflow events from every screen.
    #[must_use]
    pub fn subscribe_events(&self) -> WorkflowEventsChannel {
        self.events.subscribe()
    }

    /// A fresh upload screen.
    #[must_use]
    pub fn upload_screen(&self) -> UploadScreen<S> {
        UploadScreen::new(self.context())
    }

    /// A fresh verify screen.
    #[must_use]
    pub fn verify_screen(&self) -> VerifyScreen<S> {
        VerifyScreen::new(self.context())
    }

    /// A fresh screen listing every registration.
    #[must_use]
    pub fn list_screen(&self) -> ListScreen<S> {
        ListScreen::new(self.context(), ListSource::All)
    }

    /// A fresh screen listing the registrations of one author.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAddress`] if the address is not
    /// `0x` followed by 64 characters.
    pub fn author_screen(&self, author_address: &str) -> std::result::Result<ListScreen<S>, ValidationError> {
        if let Err(e) = validate_address(author_address) {
            self.context().reject(Operation::AuthorFiles, &e);
            return Err(e);
        }
        Ok(ListScreen::new(
            self.context(),
            ListSource::Author(author_address.to_string()),
        ))
    }

    fn context(&self) -> ScreenContext<S> {
        ScreenContext {
            service: Arc::clone(&self.service),
            clipboard: Arc::clone(&self.clipboard),
            events: self.events.clone(),
        }
    }
}
