//! Opaque id generation for turns and pins

use chrono::Utc;

/// Generates ids of the form `<prefix><unix-millis>-<seq>`
///
/// The sequence never restarts for the lifetime of the generator, so ids stay
/// unique even when two are minted within the same millisecond or across a
/// transcript reset. Lexical order is not meaningful; creation order is kept
/// by the owning collection.
#[derive(Debug, Clone)]
pub struct IdSequence {
    prefix: &'static str,
    next: u64,
}

impl IdSequence {
    #[must_use]
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 0 }
    }

    /// Mint the next id
    pub fn next_id(&mut self) -> String {
        let seq = self.next;
        self.next += 1;
        format!("{}{}-{seq}", self.prefix, Utc::now().timestamp_millis())
    }
}
