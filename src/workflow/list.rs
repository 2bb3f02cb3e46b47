//! List screen: every registration, or one author's, as a card grid.

use super::{ScreenContext, Submission};
use crate::client::{FileRecord, RegistryService};
use crate::display::{
    display_text, format_bytes, format_date, shorten, ExpandState, FieldKey, FieldKind,
};
use crate::feedback::CopyFeedback;
use crate::orchestrator::{Operation, Orchestrator, RequestState};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Which registrations a list screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    /// Every registration.
    All,
    /// Registrations of one author.
    Author(String),
}

impl ListSource {
    fn operation(&self) -> Operation {
        match self {
            Self::All => Operation::List,
            Self::Author(_) => Operation::AuthorFiles,
        }
    }

    /// Heading shown above the cards.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::All => "All Registered Files".to_string(),
            Self::Author(address) => format!("Files by {}", shorten(address)),
        }
    }
}

/// Copy affordances on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopySlot {
    /// Inline copy next to the hash.
    Hash,
    /// Inline copy next to the author.
    Address,
    /// Inline copy next to the transaction hash.
    TxHash,
    /// The card's footer "Copy Hash" button.
    MainHash,
}

/// Feedback key of one copy affordance, e.g. `hash-4` or `main-hash-4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CopyKey {
    /// Record identity.
    pub record: u64,
    /// Which affordance.
    pub slot: CopySlot,
}

impl fmt::Display for CopyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.slot {
            CopySlot::Hash => "hash",
            CopySlot::Address => "address",
            CopySlot::TxHash => "tx",
            CopySlot::MainHash => "main-hash",
        };
        write!(f, "{prefix}-{}", self.record)
    }
}

/// Card grid of registrations plus its orchestrator, expand flags and
/// copy feedback.
///
/// Every action takes `&self`, so the loading state can be rendered while
/// a fetch is in flight.
pub struct ListScreen<S> {
    context: ScreenContext<S>,
    source: ListSource,
    orchestrator: Orchestrator<Vec<FileRecord>>,
    feedback: CopyFeedback<CopyKey>,
    expanded: Mutex<ExpandState<FieldKey>>,
    activated: AtomicBool,
}

impl<S: RegistryService> ListScreen<S> {
    pub(crate) fn new(context: ScreenContext<S>, source: ListSource) -> Self {
        let orchestrator =
            Orchestrator::new(source.operation()).with_events(context.events.clone());
        let feedback =
            CopyFeedback::new(Arc::clone(&context.clipboard)).with_events(context.events.clone());
        Self {
            context,
            source,
            orchestrator,
            feedback,
            expanded: Mutex::new(ExpandState::new()),
            activated: AtomicBool::new(false),
        }
    }

    /// Which registrations this screen shows.
    #[must_use]
    pub fn source(&self) -> &ListSource {
        &self.source
    }

    /// Load the list the first time the screen becomes active.
    ///
    /// Later activations do nothing; use [`refresh`](Self::refresh).
    pub async fn activate(&self) -> Submission {
        if self.activated.swap(true, Ordering::SeqCst) {
            debug!("{} screen already active", self.source.operation());
            return Submission::Ignored;
        }
        self.fetch().await
    }

    /// Re-issue the fetch.
    pub async fn refresh(&self) -> Submission {
        self.activated.store(true, Ordering::SeqCst);
        self.fetch().await
    }

    /// Re-issue the fetch after a failure.
    pub async fn retry(&self) -> Submission {
        self.refresh().await
    }

    /// Flip the expanded flag of one long field and return its new state.
    pub fn toggle(&self, record: u64, kind: FieldKind) -> bool {
        self.expanded.lock().toggle(FieldKey::new(record, kind))
    }

    /// Whether one long field is expanded.
    #[must_use]
    pub fn is_expanded(&self, record: u64, kind: FieldKind) -> bool {
        self.expanded.lock().is_expanded(&FieldKey::new(record, kind))
    }

    /// Copy a field of the record with identity `record`.
    ///
    /// Returns `false` if the record or field is absent or the write
    /// failed.
    pub fn copy(&self, record: u64, slot: CopySlot) -> bool {
        let RequestState::Settled(Ok(records)) = self.orchestrator.state() else {
            return false;
        };
        let Some(record) = records.into_iter().find(|r| r.id == record) else {
            return false;
        };
        let text = match slot {
            CopySlot::Hash | CopySlot::MainHash => Some(record.poseidon_hash),
            CopySlot::Address => record.author_address,
            CopySlot::TxHash => record.starknet_tx_hash,
        };
        text.is_some_and(|text| {
            self.feedback.copy(
                &text,
                CopyKey {
                    record: record.id,
                    slot,
                },
            )
        })
    }

    /// Whether the "copied" flag of one affordance is raised.
    #[must_use]
    pub fn is_copied(&self, record: u64, slot: CopySlot) -> bool {
        self.feedback.is_copied(&CopyKey { record, slot })
    }

    /// Current request state.
    #[must_use]
    pub fn state(&self) -> RequestState<Vec<FileRecord>> {
        self.orchestrator.state()
    }

    /// The orchestrator driving fetches, for watching state changes.
    #[must_use]
    pub fn orchestrator(&self) -> &Orchestrator<Vec<FileRecord>> {
        &self.orchestrator
    }

    /// Render the screen.
    #[must_use]
    pub fn view(&self) -> ListView {
        let content = match self.orchestrator.state() {
            RequestState::Idle => ListContent::NotLoaded,
            RequestState::Pending => ListContent::Loading,
            RequestState::Settled(Err(message)) => ListContent::Failed { message },
            RequestState::Settled(Ok(records)) if records.is_empty() => ListContent::Empty,
            RequestState::Settled(Ok(records)) => {
                ListContent::Cards(records.iter().map(|r| self.card(r)).collect())
            }
        };
        ListView {
            title: self.source.title(),
            content,
        }
    }

    /// Tear the screen down: in-flight results are ignored and copy timers
    /// cancelled.
    pub fn teardown(&self) {
        self.orchestrator.teardown();
        self.feedback.teardown();
    }

    async fn fetch(&self) -> Submission {
        if self.orchestrator.is_pending() || self.orchestrator.is_torn_down() {
            return Submission::Ignored;
        }

        let service = Arc::clone(&self.context.service);
        let source = self.source.clone();
        info!("Fetching {} registrations", self.source.operation());
        let ran = self
            .orchestrator
            .run(async move {
                match source {
                    ListSource::All => service.list_files().await,
                    ListSource::Author(address) => service.files_by_author(address).await,
                }
            })
            .await;

        if ran {
            if let Some(records) = self.orchestrator.state().ok() {
                debug!("Fetched {} registrations", records.len());
            }
            Submission::Completed
        } else {
            Submission::Ignored
        }
    }

    fn field(&self, record: u64, kind: FieldKind, slot: CopySlot, full: &str) -> FieldView {
        let expanded = self.is_expanded(record, kind);
        FieldView {
            text: display_text(full, expanded).into_owned(),
            full: full.to_string(),
            expanded,
            copied: self.is_copied(record, slot),
        }
    }

    fn card(&self, record: &FileRecord) -> FileCard {
        let id = record.id;
        FileCard {
            id,
            filename: record.filename.clone(),
            file_type: record.file_type.clone(),
            size: record
                .file_size
                .map_or_else(|| "Unknown".to_string(), format_bytes),
            registered_at: record.created_at.as_deref().map(format_date),
            hash: self.field(id, FieldKind::Hash, CopySlot::Hash, &record.poseidon_hash),
            author: self.field(
                id,
                FieldKind::Address,
                CopySlot::Address,
                record.author_address.as_deref().unwrap_or_default(),
            ),
            registered: record.is_registered,
            tx: record
                .starknet_tx_hash
                .as_deref()
                .map(|tx| self.field(id, FieldKind::TxHash, CopySlot::TxHash, tx)),
            explorer_url: record.starknet_explorer_url.clone(),
            main_hash_copied: self.is_copied(id, CopySlot::MainHash),
        }
    }
}

/// Rendered list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// Heading naming what is listed.
    pub title: String,
    /// Loading, failure, empty or card state.
    pub content: ListContent,
}

/// Body of the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListContent {
    /// The screen has not been activated.
    NotLoaded,
    /// A fetch is in flight.
    Loading,
    /// The last fetch failed; offer a retry.
    Failed {
        /// Display message.
        message: String,
    },
    /// The fetch succeeded with no records.
    Empty,
    /// One card per record, in service order.
    Cards(Vec<FileCard>),
}

/// One long field on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    /// Text as displayed, shortened unless expanded.
    pub text: String,
    /// Full value.
    pub full: String,
    /// Whether the field is expanded.
    pub expanded: bool,
    /// Whether the inline copy was just used.
    pub copied: bool,
}

/// One registration card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCard {
    /// Record identity.
    pub id: u64,
    /// Original file name.
    pub filename: String,
    /// MIME type; may be empty.
    pub file_type: String,
    /// Formatted size or `Unknown`.
    pub size: String,
    /// Formatted registration date.
    pub registered_at: Option<String>,
    /// Content fingerprint.
    pub hash: FieldView,
    /// Author address.
    pub author: FieldView,
    /// Whether the registration exists on the ledger.
    pub registered: bool,
    /// Transaction hash, if any.
    pub tx: Option<FieldView>,
    /// Explorer link, if any.
    pub explorer_url: Option<String>,
    /// Whether the footer "Copy Hash" button was just used.
    pub main_hash_copied: bool,
}

fn copied_marker(copied: bool) -> &'static str {
    if copied {
        " (copied)"
    } else {
        ""
    }
}

impl fmt::Display for ListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        match &self.content {
            ListContent::NotLoaded => Ok(()),
            ListContent::Loading => writeln!(f, "Loading files..."),
            ListContent::Failed { message } => {
                writeln!(f, "Error: {message}")?;
                writeln!(f, "[Retry]")
            }
            ListContent::Empty => writeln!(f, "No files have been registered yet."),
            ListContent::Cards(cards) => {
                writeln!(f, "{} file(s) [Refresh]", cards.len())?;
                for card in cards {
                    writeln!(f)?;
                    write!(f, "{card}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for FileCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.registered {
            "Registered"
        } else {
            "Pending"
        };
        writeln!(f, "#{} {} [{status}]", self.id, self.filename)?;
        if !self.file_type.is_empty() {
            writeln!(f, "  Type:    {}", self.file_type)?;
        }
        writeln!(f, "  Size:    {}", self.size)?;
        if let Some(date) = &self.registered_at {
            writeln!(f, "  Date:    {date}")?;
        }
        writeln!(f, "  Hash:    {}{}", self.hash.text, copied_marker(self.hash.copied))?;
        writeln!(
            f,
            "  Author:  {}{}",
            self.author.text,
            copied_marker(self.author.copied)
        )?;
        if let Some(tx) = &self.tx {
            writeln!(f, "  TX:      {}{}", tx.text, copied_marker(tx.copied))?;
        }
        if let Some(url) = &self.explorer_url {
            writeln!(f, "  View on Starkscan: {url}")?;
        }
        if self.main_hash_copied {
            writeln!(f, "  Hash copied")?;
        }
        Ok(())
    }
}
