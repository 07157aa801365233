use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::{CallSession, Chat, ChatId, Message, TypingIndicator, User};

/// Toast-style notice raised for the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Full copy of the engine state, sent once when the engine starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub viewer: User,
    pub chats: Vec<Chat>,
    pub messages: HashMap<ChatId, Vec<Message>>,
    pub active_call: Option<CallSession>,
    pub typing: Vec<TypingIndicator>,
}

impl ChatSnapshot {
    pub fn total_unread(&self) -> u32 {
        self.chats.iter().map(|chat| chat.unread_count).sum()
    }
}

/// State changes the engine pushes to front ends.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Ready(ChatSnapshot),
    MessageAppended(Message),
    MessageUpdated(Message),
    ChatUpdated(Chat),
    /// `None` once the call screen should close.
    CallChanged(Option<CallSession>),
    TypingChanged(Vec<TypingIndicator>),
    Notification(Notification),
}
