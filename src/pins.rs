//! Pinned context: user-curated copies of assistant answers
//!
//! Pins are copied out of the transcript at pin time and survive resets.
//! Changes are broadcast to subscribers so the presentation layer can react
//! (e.g. open the board panel) without the store knowing about UI state.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::ids::IdSequence;
use crate::variant::PinMode;
use crate::{Error, Result};

/// Channel capacity for pin-store change events
const CHANNEL_CAPACITY: usize = 64;

/// Optional tag on a pinned item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinCategory {
    /// How the user likes things done
    Preference,
    /// Health conditions, allergies, medication
    Medical,
    /// Targets the user is working towards
    Goal,
}

impl PinCategory {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Preference => "preference",
            Self::Medical => "medical",
            Self::Goal => "goal",
        }
    }
}

impl fmt::Display for PinCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PinCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "preference" | "pref" => Ok(Self::Preference),
            "medical" | "med" => Ok(Self::Medical),
            "goal" => Ok(Self::Goal),
            other => Err(Error::Config(format!("unknown pin category: {other}"))),
        }
    }
}

/// A durable copy of message content
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PinnedItem {
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<PinCategory>,
    /// When the item was pinned (not sent to the backend)
    #[serde(skip)]
    pub pinned_at: DateTime<Utc>,
}

/// Change notification from the pin store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinEvent {
    /// An item was added
    Pinned { id: String },
    /// An item was removed
    Unpinned { id: String },
}

/// Result of a pin request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinOutcome {
    /// A new item was stored under this id
    Pinned(String),
    /// Toggle mode found an existing pin and removed it
    Unpinned(String),
}

/// Ordered collection of pinned items
pub struct PinStore {
    mode: PinMode,
    items: Vec<PinnedItem>,
    ids: IdSequence,
    tx: broadcast::Sender<PinEvent>,
}

impl PinStore {
    /// Create an empty store
    #[must_use]
    pub fn new(mode: PinMode) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            mode,
            items: Vec::new(),
            ids: IdSequence::new("pin-"),
            tx,
        }
    }

    /// Subscribe to pin-store changes
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PinEvent> {
        self.tx.subscribe()
    }

    /// Pin `content` taken from the turn `origin_id`
    ///
    /// In toggle mode the turn id is reused as the pin id and a second call
    /// for the same turn unpins it. In additive mode every call stores a new
    /// item under a fresh id.
    pub fn pin(
        &mut self,
        origin_id: &str,
        content: &str,
        category: Option<PinCategory>,
    ) -> PinOutcome {
        let id = match self.mode {
            PinMode::Toggle => {
                if self.contains(origin_id) {
                    self.unpin(origin_id);
                    return PinOutcome::Unpinned(origin_id.to_string());
                }
                origin_id.to_string()
            }
            PinMode::Additive => self.ids.next_id(),
        };

        self.items.push(PinnedItem {
            id: id.clone(),
            content: content.to_string(),
            category,
            pinned_at: Utc::now(),
        });
        tracing::debug!(pin = %id, origin = %origin_id, ?category, "pinned item");

        // Broadcast to subscribers (ignore errors if no subscribers)
        let _ = self.tx.send(PinEvent::Pinned { id: id.clone() });

        PinOutcome::Pinned(id)
    }

    /// Remove the item with `id`
    ///
    /// Returns true if an item was removed.
    pub fn unpin(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return false;
        }

        tracing::debug!(pin = %id, "unpinned item");
        let _ = self.tx.send(PinEvent::Unpinned { id: id.to_string() });
        true
    }

    /// Whether an item with `id` exists
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Items in insertion order
    #[must_use]
    pub fn items(&self) -> &[PinnedItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Open/closed state of the side panel that lists pins
///
/// Feed it [`PinEvent`]s from [`PinStore::subscribe`]; it opens itself
/// whenever something is pinned while it is collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardPanel {
    open: bool,
}

impl BoardPanel {
    #[must_use]
    pub const fn new(open: bool) -> Self {
        Self { open }
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        self.open
    }

    /// Manual open/close
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// React to a pin-store change
    ///
    /// Returns true if the panel was opened by this event.
    pub fn apply(&mut self, event: &PinEvent) -> bool {
        match event {
            PinEvent::Pinned { .. } if !self.open => {
                self.open = true;
                true
            }
            _ => false,
        }
    }
}
