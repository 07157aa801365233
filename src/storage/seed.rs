use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::common::types::{Chat, ChatId, ChatTheme, Listing, Message, MessageKind, User};
use crate::error::{ChatError, Result};

const AVATAR: &str = "/placeholder.svg?height=40&width=40";
const COVER: &str = "/placeholder.svg?height=80&width=60";

/// Initial users, chats and histories the engine starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    pub users: Vec<User>,
    pub chats: Vec<Chat>,
    #[serde(default)]
    pub messages: HashMap<ChatId, Vec<Message>>,
}

impl SeedData {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let seed: SeedData = serde_json::from_str(json)?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }

    /// Checks that every history belongs to a known chat and that each
    /// message was read by its own sender.
    pub fn validate(&self) -> Result<()> {
        for (chat_id, history) in &self.messages {
            if !self.chats.iter().any(|chat| &chat.id == chat_id) {
                return Err(ChatError::InvalidSeed(format!(
                    "history for unknown chat {chat_id}"
                )));
            }
            for message in history {
                if &message.chat_id != chat_id {
                    return Err(ChatError::InvalidSeed(format!(
                        "message {} filed under {chat_id} but belongs to {}",
                        message.id, message.chat_id
                    )));
                }
                if !message.is_read_by(&message.sender_id) {
                    return Err(ChatError::InvalidSeed(format!(
                        "message {} is missing its sender in read_by",
                        message.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Built-in marketplace data: three book listings, each discussed with the viewer.
    pub fn mock() -> Self {
        let sarah = user("user-1", "Sarah Johnson", true, None);
        let mike = user("user-2", "Mike Chen", false, Some(at(2024, 1, 15, 10, 30)));
        let emma = user("user-3", "Emma Davis", true, None);
        let me = user("current-user", "You", true, None);

        let mut messages = HashMap::new();
        messages.insert(
            "chat-1".to_string(),
            vec![
                msg(
                    "msg-1-1",
                    "chat-1",
                    "user-1",
                    "Hi! Is this book still available?",
                    at(2024, 1, 15, 14, 30),
                    &[],
                ),
                msg(
                    "msg-1-2",
                    "chat-1",
                    "current-user",
                    "Yes, it is! Are you interested in buying or renting?",
                    at(2024, 1, 15, 14, 32),
                    &[],
                ),
                msg(
                    "msg-1-3",
                    "chat-1",
                    "user-1",
                    "I'd like to rent it for 2 weeks. Is that possible?",
                    at(2024, 1, 15, 14, 35),
                    &[],
                ),
            ],
        );
        messages.insert(
            "chat-2".to_string(),
            vec![
                msg(
                    "msg-2-1",
                    "chat-2",
                    "user-2",
                    "Hello! I saw your listing for Atomic Habits.",
                    at(2024, 1, 15, 10, 0),
                    &["current-user"],
                ),
                msg(
                    "msg-2-2",
                    "chat-2",
                    "current-user",
                    "Hi Mike! Yes, it's available. Would you like to buy it?",
                    at(2024, 1, 15, 10, 5),
                    &["user-2"],
                ),
                msg(
                    "msg-2-3",
                    "chat-2",
                    "user-2",
                    "Perfect! I'm interested in purchasing it.",
                    at(2024, 1, 15, 10, 10),
                    &["current-user"],
                ),
                msg(
                    "msg-2-4",
                    "chat-2",
                    "current-user",
                    "Great! When can we meet?",
                    at(2024, 1, 15, 12, 15),
                    &["user-2"],
                ),
            ],
        );
        messages.insert(
            "chat-3".to_string(),
            vec![
                msg(
                    "msg-3-1",
                    "chat-3",
                    "current-user",
                    "Hi Emma! I'm interested in Dune. What condition is it in?",
                    at(2024, 1, 14, 16, 0),
                    &["user-3"],
                ),
                msg(
                    "msg-3-2",
                    "chat-3",
                    "user-3",
                    "The book is in excellent condition! 📚",
                    at(2024, 1, 14, 16, 45),
                    &["current-user"],
                ),
            ],
        );

        let chats = vec![
            Chat {
                id: "chat-1".to_string(),
                participants: [sarah.clone(), me.clone()],
                listing: listing(
                    "1",
                    "The Midnight Library",
                    "Matt Haig",
                    15.99,
                    3.99,
                    "Sarah Johnson",
                ),
                last_message: last_of(&messages, "chat-1"),
                unread_count: 1,
                created_at: at(2024, 1, 15, 14, 30),
                updated_at: at(2024, 1, 15, 14, 35),
                is_blocked: false,
                theme: ChatTheme::Default,
            },
            Chat {
                id: "chat-2".to_string(),
                participants: [mike.clone(), me.clone()],
                listing: listing("2", "Atomic Habits", "James Clear", 18.99, 4.99, "Mike Chen"),
                last_message: last_of(&messages, "chat-2"),
                unread_count: 0,
                created_at: at(2024, 1, 15, 10, 0),
                updated_at: at(2024, 1, 15, 12, 15),
                is_blocked: false,
                theme: ChatTheme::Blue,
            },
            Chat {
                id: "chat-3".to_string(),
                participants: [emma.clone(), me.clone()],
                listing: listing("3", "Dune", "Frank Herbert", 22.99, 5.99, "Emma Davis"),
                last_message: last_of(&messages, "chat-3"),
                unread_count: 0,
                created_at: at(2024, 1, 14, 16, 0),
                updated_at: at(2024, 1, 14, 16, 45),
                is_blocked: false,
                theme: ChatTheme::Green,
            },
        ];

        Self {
            users: vec![sarah, mike, emma, me],
            chats,
            messages,
        }
    }
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

fn user(id: &str, name: &str, is_online: bool, last_seen: Option<DateTime<Utc>>) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        avatar: AVATAR.to_string(),
        is_online,
        last_seen,
    }
}

fn listing(
    id: &str,
    title: &str,
    author: &str,
    price: f64,
    rent_price: f64,
    seller: &str,
) -> Listing {
    Listing {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        price,
        rent_price: Some(rent_price),
        image: COVER.to_string(),
        seller: seller.to_string(),
    }
}

fn msg(
    id: &str,
    chat_id: &str,
    sender_id: &str,
    content: &str,
    timestamp: DateTime<Utc>,
    also_read_by: &[&str],
) -> Message {
    let mut message = Message::new(
        id.to_string(),
        chat_id,
        sender_id,
        content,
        MessageKind::Text,
        timestamp,
    );
    for reader in also_read_by {
        message.mark_read_by(reader);
    }
    message
}

fn last_of(messages: &HashMap<ChatId, Vec<Message>>, chat_id: &str) -> Option<Message> {
    messages.get(chat_id).and_then(|history| history.last().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_seed_is_valid() {
        let seed = SeedData::mock();
        seed.validate().expect("mock seed must validate");
        assert_eq!(seed.users.len(), 4);
        assert_eq!(seed.chats.len(), 3);
        assert_eq!(seed.messages["chat-2"].len(), 4);
    }

    #[test]
    fn every_mock_chat_includes_the_viewer() {
        let seed = SeedData::mock();
        assert!(seed.chats.iter().all(|chat| chat.has_participant("current-user")));
    }

    #[test]
    fn last_message_matches_history_tail() {
        let seed = SeedData::mock();
        let chat = &seed.chats[1];
        assert_eq!(
            chat.last_message.as_ref().map(|m| m.content.as_str()),
            Some("Great! When can we meet?")
        );
    }

    #[test]
    fn json_round_trip_keeps_seed_shape() {
        let seed = SeedData::mock();
        let json = serde_json::to_string(&seed).expect("serialize");
        assert!(json.contains("\"unreadCount\":1"));
        assert_eq!(SeedData::from_json_str(&json).expect("parse"), seed);
    }

    #[test]
    fn rejects_message_without_sender_in_read_set() {
        let mut seed = SeedData::mock();
        if let Some(history) = seed.messages.get_mut("chat-3") {
            history[0].read_by.clear();
        }
        assert!(matches!(seed.validate(), Err(ChatError::InvalidSeed(_))));
    }

    #[test]
    fn rejects_history_for_unknown_chat() {
        let mut seed = SeedData::mock();
        seed.messages.insert("chat-404".to_string(), Vec::new());
        assert!(matches!(seed.validate(), Err(ChatError::InvalidSeed(_))));
    }
}
