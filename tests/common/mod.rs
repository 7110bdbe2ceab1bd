//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use coachline::{Backend, ChatRequest, ContextEngine, EngineConfig, Error, ProfileForm};
use tokio::sync::Mutex;

/// Scripted backend that records every request it receives
///
/// Replies are consumed in order; once the script runs out it answers
/// `"ok"`.
#[derive(Clone, Default)]
pub struct MockBackend {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful answer
    pub async fn reply(&self, text: &str) {
        self.replies.lock().await.push_back(Ok(text.to_string()));
    }

    /// Queue a backend failure
    pub async fn fail(&self, reason: &str) {
        self.replies.lock().await.push_back(Err(reason.to_string()));
    }

    pub async fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn chat(&self, request: &ChatRequest) -> coachline::Result<String> {
        self.requests.lock().await.push(request.clone());
        match self.replies.lock().await.pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(Error::Backend(reason)),
            None => Ok("ok".to_string()),
        }
    }
}

/// Engine wired to a fresh mock backend
pub fn engine_with_mock(config: EngineConfig) -> (ContextEngine, MockBackend) {
    let backend = MockBackend::new();
    let engine = ContextEngine::new(config, Arc::new(backend.clone()), Duration::from_secs(5));
    (engine, backend)
}

/// A form that passes validation
pub fn valid_form(name: &str) -> ProfileForm {
    ProfileForm {
        name: name.to_string(),
        age: "34".to_string(),
        gender: "male".to_string(),
        height_cm: "180".to_string(),
        weight_kg: "82".to_string(),
        activity_level: "active".to_string(),
        goal: "gain muscle".to_string(),
        restrictions: Some("lactose".to_string()),
    }
}
