pub mod conversation;
pub mod reply;
pub mod ticker;
pub mod transport;

use log::{ debug, info, warn };
use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::{ Arc, Mutex, MutexGuard, PoisonError };
use tokio::sync::broadcast;
use uuid::Uuid;

use self::conversation::{ Conversation, ConversationEvent };
use self::reply::extract_reply;
use self::transport::RelayTransport;
use crate::error::TransportError;
use crate::models::chat::{ ChatMessage, RelayRequest };

pub const GREETING: &str =
    "Hi — I’m DeforestBot 🌱 Ask me anything about forests, or type \"help\".";
pub const SERVER_ERROR_REPLY: &str = "❌ Something went wrong. Try again.";
pub const NETWORK_ERROR_REPLY: &str = "⚠️ Error contacting server.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, nothing happened.
    Empty,
    /// Another submission is still in flight, nothing happened.
    Busy,
    Replied,
    /// The relay answered with an error envelope.
    ServerError,
    /// The relay could not be reached or answered with something unreadable.
    NetworkError,
}

/// Clears the in-flight flag when the submission finishes, however it ends.
struct SendingGuard<'a>(&'a AtomicBool);

impl<'a> SendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SendingGuard(flag))
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One chat session: the conversation plus the request/response cycle that
/// feeds it. At most one submission is in flight at a time.
pub struct ChatSession {
    id: String,
    conversation: Conversation,
    transport: Arc<dyn RelayTransport>,
    model: Option<String>,
    sending: AtomicBool,
    draft: Mutex<String>,
    last_error: Mutex<Option<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ChatSession {
    pub fn new(transport: Arc<dyn RelayTransport>, model: Option<String>) -> Self {
        Self::with_history(transport, model, vec![ChatMessage::assistant(GREETING)])
    }

    pub fn with_history(
        transport: Arc<dyn RelayTransport>,
        model: Option<String>,
        history: Vec<ChatMessage>
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        info!("Started chat session {}", id);
        Self {
            id,
            conversation: Conversation::new(history),
            transport,
            model,
            sending: AtomicBool::new(false),
            draft: Mutex::new(String::new()),
            last_error: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.conversation.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.conversation.subscribe()
    }

    pub fn sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    pub fn last_error(&self) -> Option<String> {
        lock(&self.last_error).clone()
    }

    pub fn draft(&self) -> String {
        lock(&self.draft).clone()
    }

    pub fn set_draft(&self, text: &str) {
        *lock(&self.draft) = text.to_string();
    }

    fn record_error(&self, error: Option<String>) {
        *lock(&self.last_error) = error;
    }

    /// Sends `text` as the next user turn and appends whatever comes back.
    /// Blank text and submissions made while another is in flight are
    /// ignored without touching the conversation.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Empty;
        }
        let Some(_sending) = SendingGuard::acquire(&self.sending) else {
            debug!("Session {}: submission ignored, request already in flight", self.id);
            return SubmitOutcome::Busy;
        };

        self.record_error(None);
        let messages = self.conversation.append_and_snapshot(ChatMessage::user(text));
        lock(&self.draft).clear();

        let request = RelayRequest {
            messages,
            model: self.model.clone(),
        };
        debug!("Session {}: sending {} message(s)", self.id, request.messages.len());

        match self.transport.send(&request).await {
            Ok(payload) => {
                self.conversation.append(ChatMessage::assistant(extract_reply(&payload)));
                SubmitOutcome::Replied
            }
            Err(TransportError::Status { status, message }) => {
                warn!("Session {}: relay returned {}: {}", self.id, status, message);
                self.record_error(Some(message));
                self.conversation.append(ChatMessage::assistant(SERVER_ERROR_REPLY));
                SubmitOutcome::ServerError
            }
            Err(e) => {
                warn!("Session {}: relay call failed: {}", self.id, e);
                self.record_error(Some(e.to_string()));
                self.conversation.append(ChatMessage::assistant(NETWORK_ERROR_REPLY));
                SubmitOutcome::NetworkError
            }
        }
    }

    /// Drops every message and starts over from the greeting.
    pub fn reset(&self) {
        info!("Session {}: conversation reset", self.id);
        self.conversation.reset_to(ChatMessage::assistant(GREETING));
    }
}
