//! Copy feedback: transient "copied" flags with auto-expiring timers.
//!
//! A successful copy raises the flag for its key and arms a reset timer.
//! Copying again under the same key re-arms a full window instead of
//! letting the earlier timer expire the flag early. Each key is
//! independent.
//!
//! ```text
//! copy(k) ──► clipboard ──ok──► flag[k] = true ──► timer(k) ──2s──► flag[k] = false
//!                 │                                   ▲
//!                 └─err──► warn + CopyFailed          └── abort + re-arm on repeat copy(k)
//! ```
//!
//! Tearing the coordinator down (or dropping it) cancels every pending
//! timer.

mod clipboard;

pub use clipboard::{Clipboard, Osc52Clipboard};

use crate::event::{emit, WorkflowEvent, WorkflowEventsSender};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How long a "copied" flag stays raised.
pub const COPY_FEEDBACK_WINDOW: Duration = Duration::from_millis(2000);

/// A raised flag and the timer that will lower it.
struct Slot {
    generation: u64,
    reset: JoinHandle<()>,
}

struct FeedbackState<K> {
    slots: HashMap<K, Slot>,
    next_generation: u64,
    torn_down: bool,
}

/// Keyed registry of copy-success flags and their reset timers.
pub struct CopyFeedback<K> {
    clipboard: Arc<dyn Clipboard>,
    window: Duration,
    state: Arc<Mutex<FeedbackState<K>>>,
    events: Option<WorkflowEventsSender>,
}

impl<K> CopyFeedback<K>
where
    K: Eq + Hash + Clone + Display + Send + 'static,
{
    /// Create a coordinator writing to `clipboard`.
    #[must_use]
    pub fn new(clipboard: Arc<dyn Clipboard>) -> Self {
        Self::with_window(clipboard, COPY_FEEDBACK_WINDOW)
    }

    /// Create a coordinator with a custom feedback window.
    #[must_use]
    pub fn with_window(clipboard: Arc<dyn Clipboard>, window: Duration) -> Self {
        Self {
            clipboard,
            window,
            state: Arc::new(Mutex::new(FeedbackState {
                slots: HashMap::new(),
                next_generation: 0,
                torn_down: false,
            })),
            events: None,
        }
    }

    /// Report copies and copy failures on an event channel.
    #[must_use]
    pub fn with_events(mut self, events: WorkflowEventsSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Copy `text` and raise the flag at `key` for one feedback window.
    ///
    /// Returns whether the clipboard write succeeded. A failure is logged
    /// and reported as [`WorkflowEvent::CopyFailed`]; it never propagates.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn copy(&self, text: &str, key: K) -> bool {
        if self.state.lock().torn_down {
            debug!("Ignoring copy for {key} after teardown");
            return false;
        }

        if let Err(e) = self.clipboard.write_text(text) {
            warn!("Failed to copy {key}: {e}");
            emit(
                self.events.as_ref(),
                WorkflowEvent::CopyFailed {
                    key: key.to_string(),
                    message: e.to_string(),
                },
            );
            return false;
        }

        let mut state = self.state.lock();
        let generation = state.next_generation;
        state.next_generation += 1;

        let reset = tokio::spawn(reset_at(
            Arc::clone(&self.state),
            key.clone(),
            generation,
            Instant::now() + self.window,
        ));

        if let Some(previous) = state.slots.insert(key.clone(), Slot { generation, reset }) {
            debug!("Re-arming copy feedback for {key}");
            previous.reset.abort();
        }
        drop(state);

        emit(
            self.events.as_ref(),
            WorkflowEvent::Copied {
                key: key.to_string(),
            },
        );
        true
    }

    /// Whether the "copied" flag at `key` is currently raised.
    #[must_use]
    pub fn is_copied(&self, key: &K) -> bool {
        self.state.lock().slots.contains_key(key)
    }

    /// Number of raised flags.
    #[must_use]
    pub fn active(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// Lower every flag now and cancel their resets.
    ///
    /// Later copies are still accepted.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        if !state.slots.is_empty() {
            debug!("Clearing {} copy flag(s)", state.slots.len());
        }
        abort_slots(&mut *state);
    }

    /// Cancel every pending reset and stop accepting copies.
    pub fn teardown(&self) {
        self.cancel_all();
    }
}

impl<K> CopyFeedback<K> {
    fn cancel_all(&self) {
        let mut state = self.state.lock();
        state.torn_down = true;
        abort_slots(&mut *state);
    }
}

fn abort_slots<K>(state: &mut FeedbackState<K>) {
    for (_, slot) in state.slots.drain() {
        slot.reset.abort();
    }
}

impl<K> Drop for CopyFeedback<K> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn reset_at<K: Eq + Hash>(
    state: Arc<Mutex<FeedbackState<K>>>,
    key: K,
    generation: u64,
    deadline: Instant,
) {
    tokio::time::sleep_until(deadline).await;
    let mut state = state.lock();
    // A repeat copy may have replaced this slot after the sleep finished
    // but before the abort landed.
    if state
        .slots
        .get(&key)
        .is_some_and(|slot| slot.generation == generation)
    {
        state.slots.remove(&key);
    }
}
