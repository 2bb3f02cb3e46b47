//! Test harness wiring a workflow to the stub registry server.
//!
//! The `TestHarness` owns the stub server, an in-memory clipboard and a
//! workflow whose HTTP client targets the server.

use super::stub_server::StubServer;
use std::sync::Arc;
use tracing::info;
use zkauth::testing::{init_test_tracing, MemoryClipboard};
use zkauth::{ClientConfig, HttpRegistry, Workflow, WorkflowBuilder};

/// Error type for test harness operations.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The stub server could not start.
    #[error("Stub server error: {0}")]
    Server(#[from] std::io::Error),

    /// The workflow could not be built.
    #[error("Workflow error: {0}")]
    Workflow(#[from] zkauth::Error),
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Test harness that manages the complete test environment.
pub struct TestHarness {
    server: StubServer,
    clipboard: Arc<MemoryClipboard>,
    workflow: Workflow<HttpRegistry>,
}

impl TestHarness {
    /// Start a stub server and build a workflow against it.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or the workflow fails
    /// to build.
    pub async fn setup() -> Result<Self> {
        init_test_tracing();

        let server = StubServer::start().await?;
        let clipboard = Arc::new(MemoryClipboard::new());
        let config = ClientConfig {
            endpoint: server.endpoint(),
            request_timeout_secs: 5,
            ..ClientConfig::default()
        };
        let workflow = WorkflowBuilder::new(config)
            .with_clipboard(clipboard.clone())
            .build()?;

        info!("Test harness ready at {}", server.endpoint());
        Ok(Self {
            server,
            clipboard,
            workflow,
        })
    }

    /// Build a workflow against an endpoint where nothing is listening.
    ///
    /// # Errors
    ///
    /// Returns an error if no free port can be found or the workflow fails
    /// to build.
    pub async fn unreachable_workflow() -> Result<Workflow<HttpRegistry>> {
        init_test_tracing();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);

        let config = ClientConfig {
            endpoint: format!("http://{addr}/api/v1/files"),
            request_timeout_secs: 5,
            ..ClientConfig::default()
        };
        Ok(WorkflowBuilder::new(config)
            .with_clipboard(Arc::new(MemoryClipboard::new()))
            .build()?)
    }

    /// The stub server.
    pub fn server(&self) -> &StubServer {
        &self.server
    }

    /// The workflow under test.
    pub fn workflow(&self) -> &Workflow<HttpRegistry> {
        &self.workflow
    }

    /// The clipboard copy actions write to.
    pub fn clipboard(&self) -> &MemoryClipboard {
        &self.clipboard
    }
}
