//! Context engine: coordinates transcript, pins and profile
//!
//! Every user action maps to one method here. The engine is driven by one
//! actor at a time; the only asynchronous step is the backend call, which is
//! split into [`ContextEngine::begin_send`] / [`dispatch`] /
//! [`ContextEngine::complete`] so a front-end can keep handling events (such
//! as a reset) while a request is in flight. [`ContextEngine::send`] runs the
//! three steps back to back.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::assembler::assemble;
use crate::backend::{Backend, ChatRequest};
use crate::export::{ExportArtifact, export};
use crate::pins::{PinCategory, PinEvent, PinOutcome, PinStore};
use crate::profile::{Profile, ProfileChange, ProfileForm, ProfileStore};
use crate::transcript::{PendingTurn, Role, Transcript, TurnState};
use crate::variant::{EngineConfig, QuickStart};
use crate::{Error, Result};

/// Templates are offered only while the transcript is shorter than this
const QUICK_START_MAX_TURNS: usize = 3;

/// A user turn that has been accepted and is waiting to be dispatched
#[derive(Debug, Clone)]
pub struct OutboundTurn {
    /// Lifecycle handle; pass back to [`ContextEngine::complete`]
    pub pending: PendingTurn,
    /// Payload for the backend
    pub request: ChatRequest,
}

/// Result of an export request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing pinned; show this notice instead
    Empty(&'static str),
    /// Artifact ready to hand to the download mechanism
    Ready(ExportArtifact),
}

/// Send `request` to `backend`, giving up after `timeout`
///
/// # Errors
///
/// Returns [`Error::Timeout`] if the backend does not answer in time, or the
/// backend's own error.
pub async fn dispatch(
    backend: &dyn Backend,
    request: &ChatRequest,
    timeout: Duration,
) -> Result<String> {
    tokio::time::timeout(timeout, backend.chat(request))
        .await
        .map_err(|_| Error::Timeout(timeout))?
}

/// Conversation state for one session
pub struct ContextEngine {
    config: EngineConfig,
    backend: Arc<dyn Backend>,
    request_timeout: Duration,
    transcript: Transcript,
    pins: PinStore,
    profile: ProfileStore,
    input: String,
}

impl ContextEngine {
    /// Create an engine for one product variant
    #[must_use]
    pub fn new(config: EngineConfig, backend: Arc<dyn Backend>, request_timeout: Duration) -> Self {
        tracing::debug!(
            variant = %config.variant,
            backend = backend.name(),
            timeout = ?request_timeout,
            "creating context engine"
        );
        Self {
            transcript: Transcript::new(config.greeting),
            pins: PinStore::new(config.pin_mode),
            profile: ProfileStore::new(),
            input: String::new(),
            config,
            backend,
            request_timeout,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub const fn pins(&self) -> &PinStore {
        &self.pins
    }

    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        self.profile.current()
    }

    /// Subscribe to pin-store changes
    #[must_use]
    pub fn subscribe_pins(&self) -> broadcast::Receiver<PinEvent> {
        self.pins.subscribe()
    }

    /// Backend handle, for callers driving [`dispatch`] themselves
    #[must_use]
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    // -- input buffer ---------------------------------------------------------

    /// Current composer text
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the composer text
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    // -- sending --------------------------------------------------------------

    /// Whether the variant's profile precondition is met
    #[must_use]
    pub const fn chat_enabled(&self) -> bool {
        !self.config.profile_required || self.profile.is_set()
    }

    /// Whether `text` would be accepted by [`Self::begin_send`] right now
    #[must_use]
    pub fn can_send(&self, text: &str) -> bool {
        !text.trim().is_empty() && self.chat_enabled() && !self.transcript.is_pending()
    }

    /// Accept a user message and enter the pending state
    ///
    /// Returns `None` and changes nothing if the text is blank, the profile
    /// precondition is unmet, or another turn is still pending. On success the
    /// user turn is appended, the input buffer is cleared, and the payload is
    /// built from the turns that preceded it.
    pub fn begin_send(&mut self, text: &str) -> Option<OutboundTurn> {
        if !self.can_send(text) {
            tracing::debug!(
                blank = text.trim().is_empty(),
                chat_enabled = self.chat_enabled(),
                pending = self.transcript.is_pending(),
                "send rejected"
            );
            return None;
        }

        let request = assemble(
            &self.config,
            text,
            self.transcript.turns(),
            self.profile.current(),
            self.pins.items(),
        );
        let pending = self.transcript.begin_user_turn(text)?;
        self.input.clear();

        tracing::info!(
            turn = %pending.turn_id,
            epoch = pending.epoch,
            history = request.history.len(),
            "user turn pending"
        );
        Some(OutboundTurn { pending, request })
    }

    /// Apply the backend outcome for `outbound`
    ///
    /// A failure is logged and replaced by the variant's fixed error turn; it
    /// never reaches the caller. Results for a transcript that has since been
    /// reset are discarded.
    pub fn complete(&mut self, outbound: &OutboundTurn, result: Result<String>) -> TurnState {
        if let Err(e) = &result {
            tracing::warn!(turn = %outbound.pending.turn_id, error = %e, "backend call failed");
        }

        let state = self
            .transcript
            .settle(&outbound.pending, result, self.config.error_message);

        if state == TurnState::Discarded {
            tracing::debug!(
                turn = %outbound.pending.turn_id,
                sent_epoch = outbound.pending.epoch,
                current_epoch = self.transcript.epoch(),
                "discarding stale response"
            );
        }
        state
    }

    /// Send `text` and wait for the outcome
    ///
    /// Returns `None` if the message was rejected (see [`Self::begin_send`]).
    pub async fn send(&mut self, text: &str) -> Option<TurnState> {
        let outbound = self.begin_send(text)?;
        let backend = self.backend();
        let result = dispatch(backend.as_ref(), &outbound.request, self.request_timeout).await;
        Some(self.complete(&outbound, result))
    }

    /// Send whatever is in the input buffer
    pub async fn submit_input(&mut self) -> Option<TurnState> {
        let text = self.input.clone();
        self.send(&text).await
    }

    /// Quick-start templates currently on offer
    #[must_use]
    pub fn quick_starts(&self) -> &[QuickStart] {
        if self.transcript.len() < QUICK_START_MAX_TURNS && !self.transcript.is_pending() {
            &self.config.quick_starts
        } else {
            &[]
        }
    }

    /// Send the prompt of the quick-start template at `index`
    pub async fn send_template(&mut self, index: usize) -> Option<TurnState> {
        let prompt = self.quick_starts().get(index)?.prompt;
        self.send(prompt).await
    }

    // -- pins -----------------------------------------------------------------

    /// Pin the assistant turn `turn_id`
    ///
    /// Returns `None` if the turn does not exist, is the seed greeting, or was
    /// written by the user. Without an explicit category the variant default
    /// is applied.
    pub fn pin(&mut self, turn_id: &str, category: Option<PinCategory>) -> Option<PinOutcome> {
        let turn = self.transcript.get(turn_id)?;
        if turn.is_seed() || turn.role != Role::Assistant {
            return None;
        }

        let content = turn.content.clone();
        let category = category.or(self.config.default_pin_category);
        Some(self.pins.pin(turn_id, &content, category))
    }

    /// Remove the pin `pin_id`; no-op if absent
    pub fn unpin(&mut self, pin_id: &str) -> bool {
        self.pins.unpin(pin_id)
    }

    // -- profile --------------------------------------------------------------

    /// Whether this variant has a profile at all
    #[must_use]
    pub const fn uses_profile(&self) -> bool {
        self.config.profile_required || self.config.payload.profile
    }

    /// Validate and store a profile
    ///
    /// An empty transcript is seeded with a ready turn naming the user; a
    /// transcript with history gets a notice summarising the change instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profile`] if the record breaks a profile rule, or
    /// [`Error::Config`] if this variant has no profile. Nothing is stored
    /// in either case.
    pub fn submit_profile(&mut self, profile: Profile) -> Result<ProfileChange> {
        if !self.uses_profile() {
            return Err(Error::Config(format!(
                "{} variant has no profile",
                self.config.variant
            )));
        }

        let profile = profile.normalized()?;
        let summary = profile.summary();
        let name = profile.name.clone();
        let change = self.profile.submit(profile);

        if self.transcript.is_empty() {
            self.transcript.seed(&format!(
                "Profile loaded for {name}. {summary} Ask me anything about meals, macros or your plan."
            ));
        } else {
            let verb = match change {
                ProfileChange::Created => "saved",
                ProfileChange::Replaced => "updated",
            };
            self.transcript
                .push_notice(&format!("Profile {verb} for {name}. {summary}"));
        }

        tracing::info!(?change, "profile submitted");
        Ok(change)
    }

    /// Decode raw form input and store the result
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profile`] if the form fails validation, or
    /// [`Error::Config`] if this variant has no profile.
    pub fn submit_profile_form(&mut self, form: &ProfileForm) -> Result<ProfileChange> {
        self.submit_profile(form.validate()?)
    }

    // -- reset / export -------------------------------------------------------

    /// Replace the transcript with a fresh greeting
    ///
    /// Requires `confirmed`; returns false and changes nothing otherwise. Pins
    /// and profile are kept. Any in-flight response will be discarded.
    pub fn reset(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            tracing::debug!("reset declined");
            return false;
        }

        self.transcript.reset(self.config.reset_greeting);
        self.input.clear();
        tracing::info!(epoch = self.transcript.epoch(), "transcript reset");
        true
    }

    /// Render the pin board as plain text
    ///
    /// Never clears the pin store.
    #[must_use]
    pub fn export(&self) -> ExportOutcome {
        export(&self.config, self.pins.items()).map_or(
            ExportOutcome::Empty(self.config.empty_export_notice),
            ExportOutcome::Ready,
        )
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct EchoBackend;

    #[async_trait]
    impl Backend for EchoBackend {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn chat(&self, request: &ChatRequest) -> Result<String> {
            Ok(format!("echo: {}", request.message))
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl Backend for SlowBackend {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("too late".to_string())
        }
    }

    fn engine(config: EngineConfig) -> ContextEngine {
        ContextEngine::new(config, Arc::new(EchoBackend), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn send_appends_user_and_assistant_turns() {
        let mut engine = engine(EngineConfig::strategy());
        let before = engine.transcript().len();

        let state = engine.send("hello").await;

        assert_eq!(state, Some(TurnState::Resolved));
        assert_eq!(engine.transcript().len(), before + 2);
        assert_eq!(engine.transcript().turns().last().unwrap().content, "echo: hello");
    }

    #[tokio::test]
    async fn blank_input_is_rejected_silently() {
        let mut engine = engine(EngineConfig::strategy());
        let before = engine.transcript().len();

        assert_eq!(engine.send("   \n\t").await, None);
        assert_eq!(engine.transcript().len(), before);
    }

    #[tokio::test]
    async fn timeout_becomes_error_turn() {
        let mut engine = ContextEngine::new(
            EngineConfig::strategy(),
            Arc::new(SlowBackend),
            Duration::from_millis(20),
        );

        let state = engine.send("hello").await;

        assert_eq!(state, Some(TurnState::Failed));
        let last = engine.transcript().turns().last().unwrap();
        assert_eq!(last.content, EngineConfig::strategy().error_message);
        assert!(!engine.transcript().is_pending());
    }

    #[tokio::test]
    async fn submit_input_clears_buffer() {
        let mut engine = engine(EngineConfig::strategy());
        engine.set_input("from the composer");

        assert_eq!(engine.submit_input().await, Some(TurnState::Resolved));
        assert_eq!(engine.input(), "");
    }

    #[test]
    fn seed_and_user_turns_cannot_be_pinned() {
        let mut engine = engine(EngineConfig::strategy());
        let seed_id = engine.transcript().turns()[0].id.clone();
        assert_eq!(engine.pin(&seed_id, None), None);

        let outbound = engine.begin_send("question").unwrap();
        assert_eq!(engine.pin(&outbound.pending.turn_id, None), None);
        assert_eq!(engine.pin("missing", None), None);
    }

    #[test]
    fn strategy_variant_ignores_profiles() {
        let mut engine = engine(EngineConfig::strategy());
        let form = ProfileForm {
            name: "Ana".to_string(),
            age: "30".to_string(),
            gender: "f".to_string(),
            height_cm: "160".to_string(),
            weight_kg: "55".to_string(),
            activity_level: "light".to_string(),
            goal: "maintain".to_string(),
            restrictions: None,
        };

        assert!(matches!(engine.submit_profile_form(&form), Err(Error::Config(_))));
        assert!(engine.profile().is_none());
    }

    #[test]
    fn unvalidated_profile_is_rejected() {
        let mut engine = engine(EngineConfig::nutrition());
        let mut profile = ProfileForm {
            name: "Ana".to_string(),
            age: "30".to_string(),
            gender: "f".to_string(),
            height_cm: "160".to_string(),
            weight_kg: "55".to_string(),
            activity_level: "light".to_string(),
            goal: "maintain".to_string(),
            restrictions: None,
        }
        .validate()
        .unwrap();
        profile.age = 0;
        profile.height_cm = -5.0;

        assert!(matches!(engine.submit_profile(profile), Err(Error::Profile(_))));
        assert!(engine.profile().is_none());
        assert!(engine.transcript().is_empty());
    }

    #[tokio::test]
    async fn quick_starts_disappear_once_conversation_grows() {
        let mut engine = engine(EngineConfig::strategy());
        assert_eq!(engine.quick_starts().len(), 3);

        assert_eq!(engine.send_template(1).await, Some(TurnState::Resolved));
        assert_eq!(
            engine.transcript().turns()[1].content,
            "Create a 7-day content calendar for beginners"
        );
        assert!(engine.quick_starts().is_empty());
        assert_eq!(engine.send_template(0).await, None);
    }
}
