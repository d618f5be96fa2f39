//! Session Management
//!
//! A session owns one conversation for the lifetime of the process. Nothing
//! is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::message::{Conversation, Message, Role};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A complete agent session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// Conversation history
    pub conversation: Conversation,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            conversation: Conversation::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create with system prompt
    pub fn with_system_prompt(system_prompt: impl Into<String>) -> Self {
        let mut session = Self::new();
        session.conversation = Conversation::with_system_prompt(system_prompt);
        session
    }

    /// Append a user turn
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.conversation.push(Message::user(content));
        self.touch();
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Number of user turns so far
    pub fn turns(&self) -> usize {
        self.conversation
            .messages()
            .iter()
            .filter(|m| m.role == Role::User)
            .count()
    }

    /// Message count
    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    /// Duration since creation
    pub fn duration(&self) -> chrono::Duration {
        self.updated_at - self.created_at
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
