//! reqwest client for the assistant backend

use std::time::Duration;

use async_trait::async_trait;

use super::{Backend, ChatRequest, ChatResponse};
use crate::{Error, Result};

/// HTTP backend speaking the `POST /chat` JSON contract
#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for `base_url` (e.g. `http://localhost:8000`)
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Full URL of the chat endpoint
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let url = self.chat_url();
        tracing::debug!(
            url = %url,
            history = request.history.len(),
            profile = request.profile.is_some(),
            pins = request.pinned_context.as_ref().map_or(0, Vec::len),
            "posting chat turn"
        );

        let resp = self.client.post(&url).json(request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Backend(format!("{status}: {}", truncate(&body, 200))));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Backend(format!("malformed response body: {e}")))?;
        Ok(parsed.response)
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(idx, _)| &text[..idx])
}
