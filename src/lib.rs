//! Coachline - conversation context engine for coaching assistants
//!
//! This library keeps the client-side state of a chat with an LLM-backed
//! coaching service and shapes every request sent to it:
//! - Transcript with a single-pending-turn lifecycle and stale-result guard
//! - Pinned context curated from assistant answers
//! - Structured user profile, validated at the boundary
//! - Request assembly for the backend's `POST /chat` contract
//! - Plain-text export of pinned answers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Front-end (console / UI)               │
//! └────────────────────┬────────────────────────────────┘
//!                      │ send · pin · profile · reset · export
//! ┌────────────────────▼────────────────────────────────┐
//! │                 ContextEngine                       │
//! │  Transcript │ PinStore │ ProfileStore │ Assembler   │
//! └────────────────────┬────────────────────────────────┘
//!                      │ POST /chat
//! ┌────────────────────▼────────────────────────────────┐
//! │              Assistant backend                      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod assembler;
pub mod backend;
pub mod config;
pub mod console;
pub mod engine;
pub mod error;
pub mod export;
pub mod ids;
pub mod pins;
pub mod profile;
pub mod sanitize;
pub mod transcript;
pub mod variant;

pub use backend::{Backend, ChatRequest, HistoryEntry, HttpBackend, WireRole};
pub use config::Config;
pub use engine::{ContextEngine, ExportOutcome, OutboundTurn, dispatch};
pub use error::{Error, Result};
pub use export::ExportArtifact;
pub use pins::{BoardPanel, PinCategory, PinEvent, PinOutcome, PinStore, PinnedItem};
pub use profile::{ActivityLevel, Gender, Goal, Profile, ProfileChange, ProfileForm};
pub use sanitize::sanitize;
pub use transcript::{Role, SEED_TURN_ID, Transcript, Turn, TurnKind, TurnState};
pub use variant::{EngineConfig, PinMode, Variant};
