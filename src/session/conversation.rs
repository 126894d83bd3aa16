use std::sync::{ Mutex, MutexGuard, PoisonError };
use tokio::sync::broadcast;

use crate::models::chat::ChatMessage;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    Appended {
        index: usize,
        message: ChatMessage,
    },
    /// Everything was dropped and `message` is now the only entry.
    Reset {
        message: ChatMessage,
    },
}

/// Append-only message log shared by the submission path and the fun-fact
/// ticker. Every write happens under one lock and is announced in the same
/// order it was applied.
pub struct Conversation {
    messages: Mutex<Vec<ChatMessage>>,
    events: broadcast::Sender<ConversationEvent>,
}

impl Conversation {
    pub fn new(initial: Vec<ChatMessage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            messages: Mutex::new(initial),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, message: ChatMessage) -> usize {
        let mut messages = self.lock();
        messages.push(message.clone());
        let index = messages.len() - 1;
        let _ = self.events.send(ConversationEvent::Appended { index, message });
        index
    }

    /// Appends and returns the whole log as it stands right after the write.
    pub fn append_and_snapshot(&self, message: ChatMessage) -> Vec<ChatMessage> {
        let mut messages = self.lock();
        messages.push(message.clone());
        let index = messages.len() - 1;
        let _ = self.events.send(ConversationEvent::Appended { index, message });
        messages.clone()
    }

    pub fn reset_to(&self, message: ChatMessage) {
        let mut messages = self.lock();
        messages.clear();
        messages.push(message.clone());
        let _ = self.events.send(ConversationEvent::Reset { message });
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.lock().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.events.subscribe()
    }
}
