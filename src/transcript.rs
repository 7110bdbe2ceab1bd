//! Chat transcript and the per-turn lifecycle
//!
//! The transcript is append-only. The only ways to remove turns are
//! [`Transcript::reset`], which swaps the whole history for a single seed
//! turn, and starting a new engine.
//!
//! Every reset advances the transcript *epoch*. A request records the epoch it
//! was sent under and its result is applied only if the epoch still matches,
//! so a response that lands after a reset is dropped instead of leaking into
//! the fresh conversation.

use serde::{Deserialize, Serialize};

use crate::ids::IdSequence;

/// Reserved id of the synthetic greeting that seeds a transcript
pub const SEED_TURN_ID: &str = "intro";

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// What produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnKind {
    /// Ordinary user message or backend answer
    Message,
    /// UI-only greeting; never forwarded to the backend
    Seed,
    /// Engine-authored notice (profile changes)
    Notice,
    /// Stand-in for a failed backend call
    Error,
}

/// One message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Turn {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub kind: TurnKind,
}

impl Turn {
    /// Whether this is the synthetic seed turn
    #[must_use]
    pub fn is_seed(&self) -> bool {
        self.kind == TurnKind::Seed
    }
}

/// Lifecycle state of the most recent user turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Sent, waiting for the backend
    Pending,
    /// Assistant answer appended
    Resolved,
    /// Error turn appended in place of an answer
    Failed,
    /// Result arrived for an older epoch and was dropped
    Discarded,
}

/// Handle for an in-flight user turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    /// Id of the user turn awaiting a response
    pub turn_id: String,
    /// Transcript epoch the request was issued under
    pub epoch: u64,
}

/// Ordered sequence of turns exchanged with the assistant
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
    epoch: u64,
    pending: Option<PendingTurn>,
    ids: IdSequence,
}

impl Transcript {
    /// Create a transcript, optionally seeded with a greeting
    #[must_use]
    pub fn new(greeting: Option<&str>) -> Self {
        let mut transcript = Self {
            turns: Vec::new(),
            epoch: 0,
            pending: None,
            ids: IdSequence::new(""),
        };
        if let Some(text) = greeting {
            transcript.turns.push(seed_turn(text));
        }
        transcript
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Look up a turn by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Turn> {
        self.turns.iter().find(|t| t.id == id)
    }

    /// Current generation counter
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// In-flight turn, if any
    #[must_use]
    pub const fn pending(&self) -> Option<&PendingTurn> {
        self.pending.as_ref()
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Append a user turn and enter the pending state
    ///
    /// Returns `None` without touching the transcript if a turn is already
    /// pending.
    pub fn begin_user_turn(&mut self, content: &str) -> Option<PendingTurn> {
        if self.pending.is_some() {
            return None;
        }

        let id = self.push(Role::User, content.to_string(), TurnKind::Message);
        let pending = PendingTurn {
            turn_id: id,
            epoch: self.epoch,
        };
        self.pending = Some(pending.clone());
        Some(pending)
    }

    /// Settle a pending turn with the backend outcome
    ///
    /// `Ok` appends the answer, `Err` appends `error_message` as an error turn.
    /// If the transcript has been reset since `pending` was issued, or the
    /// handle does not match the in-flight turn, nothing is appended.
    pub fn settle<E>(
        &mut self,
        pending: &PendingTurn,
        outcome: std::result::Result<String, E>,
        error_message: &str,
    ) -> TurnState {
        if pending.epoch != self.epoch || self.pending.as_ref() != Some(pending) {
            return TurnState::Discarded;
        }

        self.pending = None;
        match outcome {
            Ok(answer) => {
                self.push(Role::Assistant, answer, TurnKind::Message);
                TurnState::Resolved
            }
            Err(_) => {
                self.push(Role::Assistant, error_message.to_string(), TurnKind::Error);
                TurnState::Failed
            }
        }
    }

    /// Append an engine-authored assistant notice
    pub fn push_notice(&mut self, content: &str) -> String {
        self.push(Role::Assistant, content.to_string(), TurnKind::Notice)
    }

    /// Seed an empty transcript with a greeting
    ///
    /// Does nothing if the transcript already has turns.
    pub fn seed(&mut self, greeting: &str) {
        if self.turns.is_empty() {
            self.turns.push(seed_turn(greeting));
        }
    }

    /// Replace the whole transcript with a single greeting turn
    ///
    /// Advances the epoch and clears any pending turn, so a response still in
    /// flight will be discarded when it arrives.
    pub fn reset(&mut self, greeting: &str) {
        self.turns.clear();
        self.turns.push(seed_turn(greeting));
        self.pending = None;
        self.epoch += 1;
    }

    fn push(&mut self, role: Role, content: String, kind: TurnKind) -> String {
        let id = self.ids.next_id();
        self.turns.push(Turn {
            id: id.clone(),
            role,
            content,
            kind,
        });
        id
    }
}

fn seed_turn(text: &str) -> Turn {
    Turn {
        id: SEED_TURN_ID.to_string(),
        role: Role::Assistant,
        content: text.to_string(),
        kind: TurnKind::Seed,
    }
}
