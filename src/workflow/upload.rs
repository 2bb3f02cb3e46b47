//! Upload screen: select a file, claim an author, register.

use super::{ScreenContext, Submission};
use crate::client::{RegistryService, UploadFile, UploadResult};
use crate::display::format_bytes;
use crate::error::ValidationError;
use crate::orchestrator::{Operation, Orchestrator, RequestState};
use crate::validate::{validate_file_size, validate_upload};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::info;

#[derive(Default)]
struct UploadForm {
    file: Option<UploadFile>,
    author_address: String,
    notice: Option<ValidationError>,
}

/// Upload form state plus its orchestrator.
///
/// Every action takes `&self`, so the screen can be rendered while an
/// upload is in flight.
pub struct UploadScreen<S> {
    context: ScreenContext<S>,
    orchestrator: Orchestrator<UploadResult>,
    form: Mutex<UploadForm>,
}

impl<S: RegistryService> UploadScreen<S> {
    pub(crate) fn new(context: ScreenContext<S>) -> Self {
        let orchestrator = Orchestrator::new(Operation::Upload).with_events(context.events.clone());
        Self {
            context,
            orchestrator,
            form: Mutex::new(UploadForm::default()),
        }
    }

    /// Select the file to upload.
    ///
    /// An oversized file is rejected immediately and the previous
    /// selection is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FileTooLarge`] for an oversized file.
    pub fn select_file(&self, file: UploadFile) -> Result<(), ValidationError> {
        if let Err(e) = validate_file_size(&file) {
            self.context.reject(Operation::Upload, &e);
            self.form.lock().notice = Some(e.clone());
            return Err(e);
        }
        let mut form = self.form.lock();
        form.file = Some(file);
        form.notice = None;
        Ok(())
    }

    /// Clear the file selection.
    pub fn clear_file(&self) {
        self.form.lock().file = None;
    }

    /// Set the claimed author address.
    pub fn set_author_address(&self, address: impl Into<String>) {
        self.form.lock().author_address = address.into();
    }

    /// The selected file, if any.
    #[must_use]
    pub fn selected_file(&self) -> Option<UploadFile> {
        self.form.lock().file.clone()
    }

    /// The author address as entered.
    #[must_use]
    pub fn author_address(&self) -> String {
        self.form.lock().author_address.clone()
    }

    /// Whether the submit control is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        let form = self.form.lock();
        !self.orchestrator.is_pending() && form.file.is_some() && !form.author_address.is_empty()
    }

    /// Validate the form and, if it passes, upload.
    ///
    /// On success the file selection and the address are cleared.
    pub async fn submit(&self) -> Submission {
        if self.orchestrator.is_pending() || self.orchestrator.is_torn_down() {
            return Submission::Ignored;
        }

        let (file, author_address) = {
            let mut form = self.form.lock();
            if let Err(e) = validate_upload(form.file.as_ref(), &form.author_address) {
                form.notice = Some(e.clone());
                drop(form);
                self.context.reject(Operation::Upload, &e);
                return Submission::Rejected(e);
            }
            form.notice = None;
            (form.file.clone(), form.author_address.clone())
        };
        let Some(file) = file else {
            return Submission::Ignored;
        };
        info!("Uploading {} ({} bytes) for {}", file.name, file.size(), author_address);

        let service = Arc::clone(&self.context.service);
        let ran = self
            .orchestrator
            .run(async move { service.upload(file, author_address).await })
            .await;
        if !ran {
            return Submission::Ignored;
        }

        if !self.orchestrator.is_torn_down() && self.orchestrator.state().ok().is_some() {
            let mut form = self.form.lock();
            form.file = None;
            form.author_address.clear();
        }
        Submission::Completed
    }

    /// Current request state.
    #[must_use]
    pub fn state(&self) -> RequestState<UploadResult> {
        self.orchestrator.state()
    }

    /// The orchestrator driving uploads, for watching state changes.
    #[must_use]
    pub fn orchestrator(&self) -> &Orchestrator<UploadResult> {
        &self.orchestrator
    }

    /// Render the screen.
    #[must_use]
    pub fn view(&self) -> UploadView {
        let state = self.orchestrator.state();
        let pending = state.is_pending();
        let form = self.form.lock();
        UploadView {
            selected_file: form.file.as_ref().map(SelectedFile::from),
            author_address: form.author_address.clone(),
            submit_enabled: !pending && form.file.is_some() && !form.author_address.is_empty(),
            submit_label: if pending {
                "Uploading..."
            } else {
                "Upload & Register"
            },
            error: form
                .notice
                .as_ref()
                .map(ToString::to_string)
                .or_else(|| state.err().map(str::to_string)),
            success: state.ok().map(UploadSuccess::from),
        }
    }

    /// Tear the screen down; an upload still in flight is ignored.
    pub fn teardown(&self) {
        self.orchestrator.teardown();
    }
}

/// Rendered upload screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    /// The selected file, if any.
    pub selected_file: Option<SelectedFile>,
    /// The author address input.
    pub author_address: String,
    /// Whether the submit control is enabled.
    pub submit_enabled: bool,
    /// Submit control label.
    pub submit_label: &'static str,
    /// Inline validation message or request failure.
    pub error: Option<String>,
    /// Result panel after a successful upload.
    pub success: Option<UploadSuccess>,
}

/// Summary of the selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name.
    pub name: String,
    /// Formatted size.
    pub size: String,
    /// MIME type or `Unknown`.
    pub file_type: String,
}

impl From<&UploadFile> for SelectedFile {
    fn from(file: &UploadFile) -> Self {
        Self {
            name: file.name.clone(),
            size: format_bytes(file.size()),
            file_type: file
                .content_type
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Success panel content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSuccess {
    /// Registered file name.
    pub filename: String,
    /// Content fingerprint.
    pub poseidon_hash: String,
    /// Registered author.
    pub author_address: String,
    /// Ledger transaction hash, if submitted.
    pub starknet_tx_hash: Option<String>,
    /// Service message.
    pub message: String,
}

impl From<&UploadResult> for UploadSuccess {
    fn from(result: &UploadResult) -> Self {
        Self {
            filename: result.filename.clone(),
            poseidon_hash: result.poseidon_hash.clone(),
            author_address: result.author_address.clone(),
            starknet_tx_hash: result.starknet_tx_hash.clone(),
            message: result.message.clone(),
        }
    }
}

impl fmt::Display for UploadView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Upload File")?;
        if let Some(file) = &self.selected_file {
            writeln!(f, "  File: {}", file.name)?;
            writeln!(f, "  Size: {}", file.size)?;
            writeln!(f, "  Type: {}", file.file_type)?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }
        if let Some(success) = &self.success {
            writeln!(f, "File Registered Successfully!")?;
            writeln!(f, "  Filename:      {}", success.filename)?;
            writeln!(f, "  Poseidon Hash: {}", success.poseidon_hash)?;
            writeln!(f, "  Author:        {}", success.author_address)?;
            if let Some(tx) = &success.starknet_tx_hash {
                writeln!(f, "  Starknet TX:   {tx}")?;
            }
            if !success.message.is_empty() {
                writeln!(f, "  {}", success.message)?;
            }
        }
        Ok(())
    }
}
