//! Verify screen: look up a hash and show who registered it.

use super::{ScreenContext, Submission};
use crate::client::{FileRecord, RegistryService};
use crate::display::{format_bytes, format_date};
use crate::error::ValidationError;
use crate::feedback::CopyFeedback;
use crate::orchestrator::{Operation, Orchestrator, RequestState};
use crate::validate::validate_verify_query;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::info;

const UNKNOWN: &str = "Unknown";

/// Copyable fields on the verify panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerifyField {
    /// Content fingerprint.
    Hash,
    /// Author address.
    Address,
    /// Ledger transaction hash.
    TxHash,
}

impl fmt::Display for VerifyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hash => "hash",
            Self::Address => "address",
            Self::TxHash => "tx",
        })
    }
}

#[derive(Default)]
struct VerifyForm {
    query: String,
    last_query: String,
    notice: Option<ValidationError>,
}

/// Hash lookup form plus its orchestrator and copy feedback.
///
/// Every action takes `&self`, so the screen can be rendered while a
/// lookup is in flight.
pub struct VerifyScreen<S> {
    context: ScreenContext<S>,
    orchestrator: Orchestrator<FileRecord>,
    feedback: CopyFeedback<VerifyField>,
    form: Mutex<VerifyForm>,
}

impl<S: RegistryService> VerifyScreen<S> {
    pub(crate) fn new(context: ScreenContext<S>) -> Self {
        let orchestrator = Orchestrator::new(Operation::Verify).with_events(context.events.clone());
        let feedback =
            CopyFeedback::new(Arc::clone(&context.clipboard)).with_events(context.events.clone());
        Self {
            context,
            orchestrator,
            feedback,
            form: Mutex::new(VerifyForm::default()),
        }
    }

    /// Set the hash to look up.
    pub fn set_query(&self, poseidon_hash: impl Into<String>) {
        self.form.lock().query = poseidon_hash.into();
    }

    /// The hash as entered.
    #[must_use]
    pub fn query(&self) -> String {
        self.form.lock().query.clone()
    }

    /// Whether the submit control is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.orchestrator.is_pending() && !self.form.lock().query.is_empty()
    }

    /// Validate the query and, if it passes, look it up.
    ///
    /// Starting a lookup lowers every "copied" flag of the previous result.
    pub async fn submit(&self) -> Submission {
        if self.orchestrator.is_pending() || self.orchestrator.is_torn_down() {
            return Submission::Ignored;
        }

        let poseidon_hash = {
            let mut form = self.form.lock();
            if let Err(e) = validate_verify_query(&form.query) {
                form.notice = Some(e.clone());
                drop(form);
                self.context.reject(Operation::Verify, &e);
                return Submission::Rejected(e);
            }
            form.notice = None;
            let query = form.query.clone();
            form.last_query.clone_from(&query);
            query
        };
        info!("Verifying {poseidon_hash}");
        self.feedback.clear();

        let service = Arc::clone(&self.context.service);
        if self
            .orchestrator
            .run(async move { service.verify(poseidon_hash).await })
            .await
        {
            Submission::Completed
        } else {
            Submission::Ignored
        }
    }

    /// Copy a field of the current result.
    ///
    /// Returns `false` if there is no such value to copy or the write
    /// failed.
    pub fn copy(&self, field: VerifyField) -> bool {
        let RequestState::Settled(Ok(record)) = self.orchestrator.state() else {
            return false;
        };
        let text = match field {
            VerifyField::Hash => Some(self.echoed_hash(&record)),
            VerifyField::Address => record.author_address.filter(|_| record.is_registered),
            VerifyField::TxHash => record.starknet_tx_hash.filter(|_| record.is_registered),
        };
        text.is_some_and(|text| self.feedback.copy(&text, field))
    }

    /// Whether the "copied" flag for `field` is raised.
    #[must_use]
    pub fn is_copied(&self, field: VerifyField) -> bool {
        self.feedback.is_copied(&field)
    }

    /// Current request state.
    #[must_use]
    pub fn state(&self) -> RequestState<FileRecord> {
        self.orchestrator.state()
    }

    /// The orchestrator driving lookups, for watching state changes.
    #[must_use]
    pub fn orchestrator(&self) -> &Orchestrator<FileRecord> {
        &self.orchestrator
    }

    /// Render the screen.
    #[must_use]
    pub fn view(&self) -> VerifyView {
        let state = self.orchestrator.state();
        let pending = state.is_pending();
        let (query, notice) = {
            let form = self.form.lock();
            (form.query.clone(), form.notice.clone())
        };
        VerifyView {
            submit_enabled: !pending && !query.is_empty(),
            query,
            submit_label: if pending {
                "Verifying..."
            } else {
                "Verify File"
            },
            error: notice
                .as_ref()
                .map(ToString::to_string)
                .or_else(|| state.err().map(str::to_string)),
            result: state.ok().map(|record| self.panel(record)),
        }
    }

    /// Tear the screen down: in-flight results are ignored and copy timers
    /// cancelled.
    pub fn teardown(&self) {
        self.orchestrator.teardown();
        self.feedback.teardown();
    }

    fn echoed_hash(&self, record: &FileRecord) -> String {
        if record.poseidon_hash.is_empty() {
            self.form.lock().last_query.clone()
        } else {
            record.poseidon_hash.clone()
        }
    }

    fn panel(&self, record: &FileRecord) -> VerifyPanel {
        let poseidon_hash = self.echoed_hash(record);
        if !record.is_registered {
            return VerifyPanel::NotFound {
                poseidon_hash,
                copied: self.is_copied(VerifyField::Hash),
            };
        }
        VerifyPanel::Verified(VerifiedDetails {
            filename: record.filename.clone(),
            file_type: non_empty_or_unknown(&record.file_type),
            file_size: record
                .file_size
                .map_or_else(|| UNKNOWN.to_string(), format_bytes),
            registered_at: record
                .created_at
                .as_deref()
                .map_or_else(|| UNKNOWN.to_string(), format_date),
            poseidon_hash,
            author_address: record.author_address.clone().unwrap_or_default(),
            starknet_tx_hash: record.starknet_tx_hash.clone(),
            explorer_url: record.starknet_explorer_url.clone(),
            hash_copied: self.is_copied(VerifyField::Hash),
            address_copied: self.is_copied(VerifyField::Address),
            tx_copied: self.is_copied(VerifyField::TxHash),
        })
    }
}

fn non_empty_or_unknown(value: &str) -> String {
    if value.is_empty() {
        UNKNOWN.to_string()
    } else {
        value.to_string()
    }
}

/// Rendered verify screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyView {
    /// The hash input.
    pub query: String,
    /// Whether the submit control is enabled.
    pub submit_enabled: bool,
    /// Submit control label.
    pub submit_label: &'static str,
    /// Inline validation message or request failure.
    pub error: Option<String>,
    /// Result panel once a lookup succeeded.
    pub result: Option<VerifyPanel>,
}

/// Outcome panel of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyPanel {
    /// The hash is registered.
    Verified(VerifiedDetails),
    /// No registration exists for the hash.
    NotFound {
        /// The hash that was looked up.
        poseidon_hash: String,
        /// Whether the hash was just copied.
        copied: bool,
    },
}

/// Details of a registered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedDetails {
    /// Original file name.
    pub filename: String,
    /// MIME type or `Unknown`.
    pub file_type: String,
    /// Formatted size or `Unknown`.
    pub file_size: String,
    /// Formatted registration date or `Unknown`.
    pub registered_at: String,
    /// Content fingerprint.
    pub poseidon_hash: String,
    /// Registered author.
    pub author_address: String,
    /// Ledger transaction hash, if any.
    pub starknet_tx_hash: Option<String>,
    /// Explorer link for the transaction, if any.
    pub explorer_url: Option<String>,
    /// Whether the hash was just copied.
    pub hash_copied: bool,
    /// Whether the address was just copied.
    pub address_copied: bool,
    /// Whether the transaction hash was just copied.
    pub tx_copied: bool,
}

fn copied_marker(copied: bool) -> &'static str {
    if copied {
        " (copied)"
    } else {
        ""
    }
}

impl fmt::Display for VerifyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Verify File")?;
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }
        match &self.result {
            None => Ok(()),
            Some(VerifyPanel::NotFound {
                poseidon_hash,
                copied,
            }) => {
                writeln!(f, "File Not Registered")?;
                writeln!(
                    f,
                    "  No registration found for hash: {poseidon_hash}{}",
                    copied_marker(*copied)
                )
            }
            Some(VerifyPanel::Verified(details)) => {
                writeln!(f, "File Verified")?;
                writeln!(f, "  Filename:      {}", details.filename)?;
                writeln!(f, "  Type:          {}", details.file_type)?;
                writeln!(f, "  Size:          {}", details.file_size)?;
                writeln!(f, "  Registered:    {}", details.registered_at)?;
                writeln!(
                    f,
                    "  Poseidon Hash: {}{}",
                    details.poseidon_hash,
                    copied_marker(details.hash_copied)
                )?;
                writeln!(
                    f,
                    "  Author:        {}{}",
                    details.author_address,
                    copied_marker(details.address_copied)
                )?;
                if let Some(tx) = &details.starknet_tx_hash {
                    writeln!(
                        f,
                        "  Starknet TX:   {tx}{}",
                        copied_marker(details.tx_copied)
                    )?;
                }
                if let Some(url) = &details.explorer_url {
                    writeln!(f, "  Explorer:      {url}")?;
                }
                Ok(())
            }
        }
    }
}
