//! Test doubles for the registration service and the clipboard.
//!
//! Available behind the `test-util` feature or in `#[cfg(test)]`.
//! [`FakeRegistry`] answers from scripted per-operation queues and records
//! every call; [`MemoryClipboard`] keeps copied text in memory.

use crate::client::{FileRecord, HealthStatus, RegistryService, UploadFile, UploadResult};
use crate::error::{Error, Result};
use crate::feedback::Clipboard;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Initialise a tracing subscriber for tests.
///
/// Respects `RUST_LOG`, defaults to `debug`. Repeated calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

/// An author address of `0x` followed by 64 copies of `digit`.
#[must_use]
pub fn address_of(digit: char) -> String {
    format!("0x{}", digit.to_string().repeat(64))
}

/// A registered record whose fields are derived from `id`.
///
/// The author is [`address_of`] the last decimal digit of `id`.
#[must_use]
pub fn sample_record(id: u64) -> FileRecord {
    let digit = char::from_digit(u32::try_from(id % 10).unwrap_or(0), 10).unwrap_or('0');
    FileRecord {
        id,
        filename: format!("file-{id}.txt"),
        file_type: "text/plain".to_string(),
        file_size: Some(2048),
        poseidon_hash: format!("0x{id:064x}"),
        author_address: Some(address_of(digit)),
        starknet_tx_hash: Some(format!("0x{id:062x}ff")),
        created_at: Some("2024-05-01T10:00:00".to_string()),
        is_registered: true,
        starknet_explorer_url: Some(format!("https://sepolia.starkscan.co/tx/0x{id:062x}ff")),
    }
}

/// A successful upload answer.
#[must_use]
pub fn sample_upload(poseidon_hash: &str, author_address: &str) -> UploadResult {
    UploadResult {
        id: 1,
        filename: "report.pdf".to_string(),
        file_type: "application/pdf".to_string(),
        file_size: 2 * 1024 * 1024,
        poseidon_hash: poseidon_hash.to_string(),
        author_address: author_address.to_string(),
        starknet_tx_hash: Some("0x5151".to_string()),
        created_at: Some("2024-05-01T10:00:00".to_string()),
        message: "ok".to_string(),
    }
}

/// A call received by [`FakeRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// `upload`.
    Upload {
        /// Name of the uploaded file.
        filename: String,
        /// Size of the uploaded file.
        size: u64,
        /// Claimed author.
        author_address: String,
    },
    /// `verify` with the queried hash.
    Verify(String),
    /// `list_files`.
    ListFiles,
    /// `files_by_author` with the queried address.
    FilesByAuthor(String),
    /// `health`.
    Health,
}

#[derive(Default)]
struct Script {
    uploads: VecDeque<Result<UploadResult>>,
    verifies: VecDeque<Result<FileRecord>>,
    lists: VecDeque<Result<Vec<FileRecord>>>,
    author_files: VecDeque<Result<Vec<FileRecord>>>,
    health: VecDeque<Result<HealthStatus>>,
}

/// In-memory [`RegistryService`] answering from scripted queues.
///
/// Each operation pops the next scripted response; an empty queue answers
/// with a transport error. While [`hold`](Self::hold) is in effect, calls
/// are recorded and then wait for [`release`](Self::release).
pub struct FakeRegistry {
    script: Mutex<Script>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: watch::Sender<bool>,
}

impl FakeRegistry {
    /// Create a registry with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            script: Mutex::new(Script::default()),
            calls: Mutex::new(Vec::new()),
            gate,
        }
    }

    /// Script the next `upload` answer.
    pub fn push_upload(&self, response: Result<UploadResult>) {
        self.script.lock().uploads.push_back(response);
    }

    /// Script the next `verify` answer.
    pub fn push_verify(&self, response: Result<FileRecord>) {
        self.script.lock().verifies.push_back(response);
    }

    /// Script the next `list_files` answer.
    pub fn push_list(&self, response: Result<Vec<FileRecord>>) {
        self.script.lock().lists.push_back(response);
    }

    /// Script the next `files_by_author` answer.
    pub fn push_author_files(&self, response: Result<Vec<FileRecord>>) {
        self.script.lock().author_files.push_back(response);
    }

    /// Script the next `health` answer.
    pub fn push_health(&self, response: Result<HealthStatus>) {
        self.script.lock().health.push_back(response);
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Keep subsequent calls pending until [`release`](Self::release).
    pub fn hold(&self) {
        self.gate.send_replace(true);
    }

    /// Let held calls answer.
    pub fn release(&self) {
        self.gate.send_replace(false);
    }

    async fn answer<T>(
        &self,
        call: RecordedCall,
        next: impl FnOnce(&mut Script) -> Option<Result<T>>,
    ) -> Result<T> {
        self.calls.lock().push(call);
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|held| !held).await;
        let scripted = next(&mut *self.script.lock());
        scripted.unwrap_or_else(|| Err(Error::Transport("no scripted response".to_string())))
    }
}

impl Default for FakeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryService for FakeRegistry {
    async fn upload(&self, file: UploadFile, author_address: String) -> Result<UploadResult> {
        let call = RecordedCall::Upload {
            filename: file.name.clone(),
            size: file.size(),
            author_address,
        };
        self.answer(call, |s| s.uploads.pop_front()).await
    }

    async fn verify(&self, poseidon_hash: String) -> Result<FileRecord> {
        self.answer(RecordedCall::Verify(poseidon_hash), |s| {
            s.verifies.pop_front()
        })
        .await
        .map(FileRecord::normalized)
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        self.answer(RecordedCall::ListFiles, |s| s.lists.pop_front())
            .await
    }

    async fn files_by_author(&self, author_address: String) -> Result<Vec<FileRecord>> {
        self.answer(RecordedCall::FilesByAuthor(author_address), |s| {
            s.author_files.pop_front()
        })
        .await
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.answer(RecordedCall::Health, |s| s.health.pop_front())
            .await
    }
}

/// Clipboard keeping every write in memory.
#[derive(Default)]
pub struct MemoryClipboard {
    contents: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// The most recent successful write.
    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.contents.lock().last().cloned()
    }

    /// Every successful write, oldest first.
    #[must_use]
    pub fn contents(&self) -> Vec<String> {
        self.contents.lock().clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Clipboard("clipboard unavailable".to_string()));
        }
        self.contents.lock().push(text.to_string());
        Ok(())
    }
}
