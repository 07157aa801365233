use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

pub type UserId = String;
pub type ChatId = String;
pub type MessageId = String;
pub type CallId = String;

/// A marketplace user taking part in chats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub avatar: String,
    pub is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    File,
    System,
    Booking,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::File => "file",
            MessageKind::System => "system",
            MessageKind::Booking => "booking",
        }
    }
}

impl FromStr for MessageKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            "file" => Ok(MessageKind::File),
            "system" => Ok(MessageKind::System),
            "booking" => Ok(MessageKind::Booking),
            other => Err(ChatError::InvalidInput(format!("unknown message type `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: String,
    pub name: String,
    /// Size in bytes.
    pub size: u64,
}

/// One entry of a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: UserId,
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    /// Users who have seen this message. Always holds the sender.
    pub read_by: BTreeSet<UserId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
}

impl Message {
    /// Builds a message whose read-set starts with its sender.
    pub fn new(
        id: MessageId,
        chat_id: &str,
        sender_id: &str,
        content: impl Into<String>,
        kind: MessageKind,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            chat_id: chat_id.to_string(),
            sender_id: sender_id.to_string(),
            content: content.into(),
            kind,
            timestamp,
            read_by: BTreeSet::from([sender_id.to_string()]),
            attachments: Vec::new(),
            reply_to: None,
        }
    }

    pub fn is_read_by(&self, user_id: &str) -> bool {
        self.read_by.contains(user_id)
    }

    /// Returns `true` when the read-set changed.
    pub fn mark_read_by(&mut self, user_id: &str) -> bool {
        self.read_by.insert(user_id.to_string())
    }
}

/// Snapshot of the marketplace listing a chat is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub author: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_price: Option<f64>,
    pub image: String,
    pub seller: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatTheme {
    #[default]
    Default,
    Blue,
    Green,
    Purple,
}

impl ChatTheme {
    pub const ALL: [ChatTheme; 4] = [
        ChatTheme::Default,
        ChatTheme::Blue,
        ChatTheme::Green,
        ChatTheme::Purple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatTheme::Default => "default",
            ChatTheme::Blue => "blue",
            ChatTheme::Green => "green",
            ChatTheme::Purple => "purple",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChatTheme::Default => "Default",
            ChatTheme::Blue => "Ocean Blue",
            ChatTheme::Green => "Forest Green",
            ChatTheme::Purple => "Royal Purple",
        }
    }
}

impl fmt::Display for ChatTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatTheme {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ChatTheme::ALL
            .into_iter()
            .find(|theme| theme.as_str() == wanted)
            .ok_or_else(|| ChatError::InvalidInput(format!("unknown theme `{wanted}`")))
    }
}

/// A two-party conversation anchored to one listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: ChatId,
    pub participants: [User; 2],
    pub listing: Listing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    #[serde(default)]
    pub unread_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub theme: ChatTheme,
}

impl Chat {
    /// The participant on the other side of `viewer_id`, if any.
    pub fn counterpart(&self, viewer_id: &str) -> Option<&User> {
        self.participants.iter().find(|user| user.id != viewer_id)
    }

    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participants.iter().any(|user| user.id == user_id)
    }

    /// Case-insensitive substring match over the listing title and participant names.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.listing.title.to_lowercase().contains(&query)
            || self
                .participants
                .iter()
                .any(|user| user.name.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Ringing,
    Connected,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Voice,
    Video,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Voice => "voice",
            CallKind::Video => "video",
        }
    }
}

impl FromStr for CallKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "voice" => Ok(CallKind::Voice),
            "video" => Ok(CallKind::Video),
            other => Err(ChatError::InvalidInput(format!("unknown call type `{other}`"))),
        }
    }
}

/// Simulated call, not backed by any media transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSession {
    pub id: CallId,
    pub chat_id: ChatId,
    pub participants: Vec<User>,
    pub status: CallStatus,
    #[serde(rename = "type")]
    pub kind: CallKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl CallSession {
    pub fn is_ended(&self) -> bool {
        self.status == CallStatus::Ended
    }

    /// Time spent connected, measured up to `now` or to the end of the call.
    pub fn duration(&self, now: DateTime<Utc>) -> Option<Duration> {
        let start = self.start_time?;
        let until = self.end_time.unwrap_or(now);
        Some((until - start).max(Duration::zero()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingIndicator {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub is_typing: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyCategory {
    Greeting,
    Question,
    Meeting,
    Booking,
}

impl ReplyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyCategory::Greeting => "greeting",
            ReplyCategory::Question => "question",
            ReplyCategory::Meeting => "meeting",
            ReplyCategory::Booking => "booking",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub id: String,
    pub text: String,
    pub category: ReplyCategory,
}
