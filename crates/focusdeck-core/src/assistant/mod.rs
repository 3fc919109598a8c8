//! Conversation threads with the productivity assistant.

pub mod client;

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
pub use client::{AssistantClient, WireMessage, DEFAULT_ENDPOINT};

pub const GREETING: &str = "Hi there! I'm your productivity assistant. How can I help you today?";
pub const ERROR_REPLY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";
const NEW_TITLE: &str = "New Conversation";
const TITLE_LIMIT: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
}

impl Conversation {
    fn new() -> Self {
        let now = Local::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: NEW_TITLE.to_string(),
            messages: vec![ChatMessage::new(ChatRole::Assistant, GREETING)],
            created_at: now,
            updated_at: now,
        }
    }

    fn push(&mut self, message: ChatMessage) {
        self.updated_at = message.timestamp.max(self.updated_at);
        self.messages.push(message);
    }
}

/// An in-flight request, produced by [`AssistantStore::begin_send`]
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    pub conversation_id: String,
    /// Full history including the new user message
    pub history: Vec<WireMessage>,
    /// Title to apply if the reply succeeds
    rename_to: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AssistantStore {
    conversations: Vec<Conversation>,
    current_id: Option<String>,
    loading: bool,
}

impl AssistantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_data() -> Self {
        let started = Local
            .with_ymd_and_hms(2025, 6, 6, 9, 30, 0)
            .earliest()
            .unwrap_or_else(Local::now);
        let conversation = Conversation {
            id: "1".to_string(),
            title: "Getting Started".to_string(),
            messages: vec![ChatMessage {
                id: "1".to_string(),
                role: ChatRole::Assistant,
                content: GREETING.to_string(),
                timestamp: started,
            }],
            created_at: started,
            updated_at: started,
        };
        Self {
            current_id: Some(conversation.id.clone()),
            conversations: vec![conversation],
            loading: false,
        }
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn current(&self) -> Option<&Conversation> {
        let id = self.current_id.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Start a fresh thread with the greeting and make it current
    pub fn create_conversation(&mut self) -> String {
        let conversation = Conversation::new();
        let id = conversation.id.clone();
        tracing::info!(id = %id, "conversation created");
        self.conversations.push(conversation);
        self.current_id = Some(id.clone());
        id
    }

    /// Make sure there is something to talk into
    pub fn ensure_conversation(&mut self) {
        if self.conversations.is_empty() {
            self.create_conversation();
        }
    }

    pub fn select_conversation(&mut self, id: &str) -> bool {
        if self.conversations.iter().any(|c| c.id == id) {
            self.current_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Remove a thread. If it was current, selection falls back to the first
    /// remaining thread, or to none.
    pub fn delete_conversation(&mut self, id: &str) -> bool {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.conversations.len() == before {
            return false;
        }

        if self.current_id.as_deref() == Some(id) {
            self.current_id = self.conversations.first().map(|c| c.id.clone());
        }
        tracing::info!(id, remaining = self.conversations.len(), "conversation deleted");
        true
    }

    /// Append the user's message to the current thread and describe the request
    /// to make. Returns `None` if there is nothing to send, no current thread,
    /// or a reply is still pending.
    pub fn begin_send(&mut self, content: &str) -> Option<PendingSend> {
        let content = content.trim();
        if content.is_empty() || self.loading {
            return None;
        }
        let id = self.current_id.clone()?;
        let conversation = self.conversations.iter_mut().find(|c| c.id == id)?;

        conversation.push(ChatMessage::new(ChatRole::User, content));
        let rename_to = (conversation.messages.len() <= 2).then(|| derive_title(content));
        let history = conversation
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect();

        self.loading = true;
        tracing::debug!(conversation = %id, "assistant request started");
        Some(PendingSend {
            conversation_id: id,
            history,
            rename_to,
        })
    }

    /// Record the outcome of a request started with [`begin_send`](Self::begin_send)
    pub fn finish_send(&mut self, pending: PendingSend, result: Result<String>) {
        self.loading = false;

        let Some(conversation) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == pending.conversation_id)
        else {
            tracing::debug!(conversation = %pending.conversation_id, "reply dropped, conversation gone");
            return;
        };

        match result {
            Ok(reply) => {
                conversation.push(ChatMessage::new(ChatRole::Assistant, reply));
                if let Some(title) = pending.rename_to {
                    conversation.title = title;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "assistant request failed");
                conversation.push(ChatMessage::new(ChatRole::Assistant, ERROR_REPLY));
            }
        }
    }

    pub async fn send_message(&mut self, client: &AssistantClient, content: &str) -> bool {
        let Some(pending) = self.begin_send(content) else {
            return false;
        };
        let result = client.complete(&pending.history).await;
        self.finish_send(pending, result);
        true
    }
}

/// First 30 characters of the first question, with an ellipsis if cut
fn derive_title(content: &str) -> String {
    let mut title: String = content.chars().take(TITLE_LIMIT).collect();
    if content.chars().count() > TITLE_LIMIT {
        title.push_str("...");
    }
    title
}
