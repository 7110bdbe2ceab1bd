//! Assistant backend contract
//!
//! The backend is an opaque `POST /chat` endpoint. [`Backend`] is the seam the
//! engine talks to; [`HttpBackend`] is the production implementation.

mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpBackend;

use crate::Result;
use crate::pins::PinnedItem;
use crate::profile::Profile;

/// Role label in the backend's vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Model,
    Ai,
}

/// One prior turn as sent in `history`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub role: WireRole,
    pub content: String,
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Raw user input, whitespace preserved
    pub message: String,
    /// Prior turns, oldest first, seed turns excluded
    pub history: Vec<HistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_context: Option<Vec<PinnedItem>>,
}

/// Body of a successful `POST /chat` response
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Something that can answer a chat turn
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Send one turn and return the assistant's reply text
    async fn chat(&self, request: &ChatRequest) -> Result<String>;
}
