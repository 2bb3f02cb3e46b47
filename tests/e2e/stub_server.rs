//! Scripted axum server standing in for the registration service.
//!
//! Replies are queued per method and path. The last reply of a queue is
//! repeated; an unscripted route answers 404. Every request is recorded.

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::debug;

/// Path prefix of the file API.
pub const API_PREFIX: &str = "/api/v1/files";

/// A scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with a status and a JSON body.
    Json {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// Send a 200 head, then fail the body so the connection is cut.
    Abort,
}

impl Reply {
    /// A 200 answer.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::Json {
            status: 200,
            body: body.into(),
        }
    }

    /// An answer with an arbitrary status.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Json {
            status,
            body: body.into(),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Self::Json { status, body } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                [(header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response(),
            Self::Abort => {
                let failing = futures::stream::once(async {
                    Err::<Bytes, std::io::Error>(std::io::Error::other("connection cut"))
                });
                (
                    [(header::CONTENT_TYPE, "application/json")],
                    Body::from_stream(failing),
                )
                    .into_response()
            }
        }
    }
}

/// A request received by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: String,
    /// Request path as sent, still percent-encoded.
    pub path: String,
    /// Header names (lowercase) and values.
    pub headers: Vec<(String, String)>,
    /// Raw body.
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Value of a header, by lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The body as lossy UTF-8.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Default)]
struct StubState {
    routes: HashMap<(String, String), VecDeque<Reply>>,
    requests: Vec<RecordedRequest>,
}

type SharedState = Arc<Mutex<StubState>>;

impl StubState {
    fn next_reply(&mut self, method: &str, path: &str) -> Reply {
        let unscripted = || Reply::status(404, r#"{"error":"no route"}"#);
        let Some(queue) = self.routes.get_mut(&(method.to_string(), path.to_string())) else {
            return unscripted();
        };
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(unscripted)
        } else {
            queue.front().cloned().unwrap_or_else(unscripted)
        }
    }
}

/// Record the request and answer with the next scripted reply.
async fn answer(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Reply {
    let request = RecordedRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        body: body.to_vec(),
    };
    debug!("Stub registry received {} {}", request.method, request.path);

    let mut state = state.lock();
    let reply = state.next_reply(&request.method, &request.path);
    state.requests.push(request);
    reply
}

/// Running stub server; stops when dropped.
pub struct StubServer {
    addr: SocketAddr,
    state: SharedState,
    task: JoinHandle<()>,
}

impl StubServer {
    /// Bind to an ephemeral localhost port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = SharedState::default();

        // Uploads reach the 10 MB limit, past axum's default body cap.
        let app = Router::new()
            .fallback(answer)
            .layer(DefaultBodyLimit::disable())
            .with_state(Arc::clone(&state));
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                debug!("Stub registry stopped: {e}");
            }
        });

        debug!("Stub registry listening on {addr}");
        Ok(Self { addr, state, task })
    }

    /// Base URL of the file API on this server.
    pub fn endpoint(&self) -> String {
        format!("http://{}{API_PREFIX}", self.addr)
    }

    /// Queue a reply for `method` on `API_PREFIX` + `path`.
    pub fn reply(&self, method: &str, path: &str, reply: Reply) {
        self.state
            .lock()
            .routes
            .entry((method.to_string(), format!("{API_PREFIX}{path}")))
            .or_default()
            .push_back(reply);
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
