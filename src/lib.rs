//! # zkauth
//!
//! Client-side workflow engine for the ZK file authentication service.
//!
//! The service binds a content fingerprint (a Poseidon hash of the file
//! bytes) to the Starknet address of the author who first registered it.
//! This crate drives the three client workflows against that service:
//!
//! - **Upload**: validate a file and a claimed author address, then submit
//!   them for registration.
//! - **Verify**: look up whether a hash was registered, and by whom.
//! - **List**: browse every registration (optionally for one author).
//!
//! ## Architecture
//!
//! ```text
//! user input ──► validate ──► Orchestrator ──► RegistryService ──► service
//!                                  │
//!                                  ▼
//!                            RequestState ──► display ──► view model
//!                                                 ▲
//!                         CopyFeedback ───────────┘
//! ```
//!
//! Each screen owns its orchestrators, expand flags and copy-feedback
//! timers; nothing is shared between screens.
//!
//! ## Example
//!
//! ```rust,ignore
//! use zkauth::{ClientConfig, WorkflowBuilder};
//!
//! #[tokio::main]
//! async fn main() -> zkauth::Result<()> {
//!     let workflow = WorkflowBuilder::new(ClientConfig::default()).build()?;
//!
//!     let list = workflow.list_screen();
//!     list.activate().await;
//!     println!("{}", list.view());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod event;
pub mod feedback;
pub mod orchestrator;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod validate;
pub mod workflow;

pub use client::{FileRecord, HttpRegistry, RegistryService, UploadFile, UploadResult};
pub use config::ClientConfig;
pub use error::{Error, Result, ValidationError};
pub use event::{WorkflowEvent, WorkflowEventsChannel};
pub use feedback::{Clipboard, CopyFeedback, Osc52Clipboard};
pub use orchestrator::{Operation, Orchestrator, RequestState};
pub use workflow::{
    ListScreen, ListSource, Submission, UploadScreen, VerifyScreen, Workflow, WorkflowBuilder,
};
