//! Chat transcript with optimistic user messages.
//!
//! A submitted message is shown at once as [`Delivery::Tentative`]. It
//! becomes `Confirmed` when the reply arrives, or `Unanswered` if the call
//! fails. Nothing is ever removed.

use serde::Serialize;
use uuid::Uuid;

use medicare_core::types::{Message, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    Tentative,
    Confirmed,
    Unanswered,
}

impl Delivery {
    pub fn can_transition_to(&self, next: &Delivery) -> bool {
        matches!(
            (self, next),
            (Delivery::Tentative, Delivery::Confirmed) | (Delivery::Tentative, Delivery::Unanswered)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub message: Message,
    pub delivery: Delivery,
}

#[derive(Debug, Default)]
pub struct ConversationSession {
    transcript: Vec<Entry>,
    input: String,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn transcript(&self) -> &[Entry] {
        &self.transcript
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.transcript.iter().map(|entry| &entry.message)
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    /// Append `text` as a tentative user message and clear the input.
    pub fn begin(&mut self, text: &str) -> &Message {
        self.input.clear();
        self.transcript.push(Entry {
            message: Message::user(text.trim()),
            delivery: Delivery::Tentative,
        });
        let entry = &self.transcript[self.transcript.len() - 1];
        &entry.message
    }

    /// The reply to `user_id` arrived.
    pub fn confirm(&mut self, user_id: Uuid, reply: Message) {
        self.settle(user_id, Delivery::Confirmed);
        self.transcript.push(Entry {
            message: reply,
            delivery: Delivery::Confirmed,
        });
    }

    /// The call for `user_id` failed.
    pub fn fail(&mut self, user_id: Uuid) {
        self.settle(user_id, Delivery::Unanswered);
    }

    fn settle(&mut self, user_id: Uuid, next: Delivery) {
        let entry = self
            .transcript
            .iter_mut()
            .rev()
            .find(|entry| entry.message.id == user_id && entry.message.role == Role::User);
        match entry {
            Some(entry) if entry.delivery.can_transition_to(&next) => entry.delivery = next,
            Some(entry) => tracing::warn!(
                message_id = %user_id,
                from = ?entry.delivery,
                to = ?next,
                "Ignoring invalid delivery transition"
            ),
            None => tracing::warn!(message_id = %user_id, "Unknown user message"),
        }
    }
}
