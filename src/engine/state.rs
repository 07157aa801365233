//! The chat state container.
//!
//! Every operation mutates the state in place and returns the [`Effect`]s the
//! runtime must carry out: events to publish and timers to schedule. Timers
//! come back through [`ChatState::fire`], which drops them when the state they
//! were scheduled against has moved on.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::common::events::{ChatEvent, ChatSnapshot, Notification};
use crate::common::types::{
    CallId, CallKind, CallSession, CallStatus, Chat, ChatId, ChatTheme, Message, MessageKind,
    TypingIndicator, User, UserId,
};
use crate::common::ChatCommand;
use crate::config::{AppConfig, ChatTimings};
use crate::error::{ChatError, Result};
use crate::storage::catalog;
use crate::storage::SeedData;

/// Deferred work the state asks the runtime to run later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timer {
    CounterpartReply { chat_id: ChatId },
    ConnectCall { call_id: CallId },
    ClearCall { call_id: CallId },
    ExpireTyping {
        chat_id: ChatId,
        user_id: UserId,
        token: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Emit(ChatEvent),
    Schedule { delay: Duration, timer: Timer },
}

#[derive(Debug, Clone)]
struct TypingEntry {
    indicator: TypingIndicator,
    /// Bumped on every refresh so older expiry timers miss.
    token: u64,
}

pub struct ChatState {
    viewer: User,
    users: Vec<User>,
    chats: Vec<Chat>,
    messages: HashMap<ChatId, Vec<Message>>,
    active_call: Option<CallSession>,
    typing: Vec<TypingEntry>,
    typing_token: u64,
    timings: ChatTimings,
    rng: StdRng,
}

impl ChatState {
    pub fn new(seed: SeedData, viewer_id: &str, timings: ChatTimings, rng: StdRng) -> Result<Self> {
        seed.validate()?;
        if timings.reply_delay_min_ms > timings.reply_delay_max_ms {
            return Err(ChatError::Config(
                "reply delay window is inverted".to_string(),
            ));
        }
        let viewer = seed
            .user(viewer_id)
            .cloned()
            .ok_or_else(|| ChatError::UnknownUser(viewer_id.to_string()))?;

        let SeedData {
            users,
            chats,
            mut messages,
        } = seed;
        for chat in &chats {
            messages.entry(chat.id.clone()).or_default();
        }

        Ok(Self {
            viewer,
            users,
            chats,
            messages,
            active_call: None,
            typing: Vec::new(),
            typing_token: 0,
            timings,
            rng,
        })
    }

    pub fn from_config(config: &AppConfig, seed: SeedData) -> Result<Self> {
        let rng = match config.rng_seed {
            Some(value) => StdRng::seed_from_u64(value),
            None => StdRng::from_os_rng(),
        };
        Self::new(seed, &config.viewer_id, config.timings.clone(), rng)
    }

    pub fn viewer(&self) -> &User {
        &self.viewer
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn chat(&self, chat_id: &str) -> Option<&Chat> {
        self.chats.iter().find(|chat| chat.id == chat_id)
    }

    pub fn messages(&self, chat_id: &str) -> &[Message] {
        self.messages
            .get(chat_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn active_call(&self) -> Option<&CallSession> {
        self.active_call.as_ref()
    }

    pub fn typing_indicators(&self) -> Vec<TypingIndicator> {
        self.typing
            .iter()
            .map(|entry| entry.indicator.clone())
            .collect()
    }

    pub fn total_unread(&self) -> u32 {
        self.chats.iter().map(|chat| chat.unread_count).sum()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            viewer: self.viewer.clone(),
            chats: self.chats.clone(),
            messages: self.messages.clone(),
            active_call: self.active_call.clone(),
            typing: self.typing_indicators(),
        }
    }

    /// Runs one command against the state.
    pub fn apply(&mut self, command: ChatCommand, now: DateTime<Utc>) -> Result<Vec<Effect>> {
        match command {
            ChatCommand::SendMessage {
                chat_id,
                content,
                kind,
            } => self.send_message(&chat_id, &content, kind, now),
            ChatCommand::MarkAsRead {
                chat_id,
                message_id,
            } => self.mark_as_read(&chat_id, &message_id),
            ChatCommand::MarkChatRead { chat_id } => self.mark_chat_read(&chat_id),
            ChatCommand::StartCall { chat_id, kind } => self.start_call(&chat_id, kind),
            ChatCommand::EndCall => self.end_call(now),
            ChatCommand::SetTyping { chat_id, is_typing } => {
                self.set_typing(&chat_id, is_typing, now)
            }
            ChatCommand::BlockUser { chat_id } => self.block_user(&chat_id),
            ChatCommand::ReportUser { chat_id, reason } => self.report_user(&chat_id, &reason),
            ChatCommand::UpdateChatTheme { chat_id, theme } => {
                self.update_chat_theme(&chat_id, theme)
            }
            ChatCommand::Shutdown => Ok(Vec::new()),
        }
    }

    pub fn send_message(
        &mut self,
        chat_id: &str,
        content: &str,
        kind: MessageKind,
        now: DateTime<Utc>,
    ) -> Result<Vec<Effect>> {
        if content.trim().is_empty() {
            return Err(ChatError::InvalidInput("message content is empty".to_string()));
        }
        let index = self.chat_index(chat_id)?;

        let message = Message::new(new_message_id(), chat_id, &self.viewer.id, content, kind, now);
        self.messages
            .entry(chat_id.to_string())
            .or_default()
            .push(message.clone());

        let chat = &mut self.chats[index];
        chat.last_message = Some(message.clone());
        chat.updated_at = now;
        let chat = chat.clone();

        let delay = Duration::from_millis(self.rng.random_range(self.timings.reply_delay_ms()));
        Ok(vec![
            Effect::Emit(ChatEvent::MessageAppended(message)),
            Effect::Emit(ChatEvent::ChatUpdated(chat)),
            Effect::Schedule {
                delay,
                timer: Timer::CounterpartReply {
                    chat_id: chat_id.to_string(),
                },
            },
        ])
    }

    pub fn mark_as_read(&mut self, chat_id: &str, message_id: &str) -> Result<Vec<Effect>> {
        let index = self.chat_index(chat_id)?;
        let viewer_id = self.viewer.id.clone();

        let message = self
            .messages
            .get_mut(chat_id)
            .and_then(|history| history.iter_mut().find(|message| message.id == message_id))
            .ok_or_else(|| ChatError::UnknownMessage {
                chat_id: chat_id.to_string(),
                message_id: message_id.to_string(),
            })?;

        let mut effects = Vec::new();
        if message.mark_read_by(&viewer_id) {
            effects.push(Effect::Emit(ChatEvent::MessageUpdated(message.clone())));
        }

        let chat = &mut self.chats[index];
        let mut changed = chat.unread_count != 0;
        chat.unread_count = 0;
        if let Some(last) = chat.last_message.as_mut().filter(|last| last.id == message_id) {
            changed |= last.mark_read_by(&viewer_id);
        }
        if changed {
            effects.push(Effect::Emit(ChatEvent::ChatUpdated(chat.clone())));
        }
        Ok(effects)
    }

    pub fn mark_chat_read(&mut self, chat_id: &str) -> Result<Vec<Effect>> {
        let index = self.chat_index(chat_id)?;
        let viewer_id = self.viewer.id.clone();

        let mut effects = Vec::new();
        if let Some(history) = self.messages.get_mut(chat_id) {
            for message in history.iter_mut() {
                if message.mark_read_by(&viewer_id) {
                    effects.push(Effect::Emit(ChatEvent::MessageUpdated(message.clone())));
                }
            }
        }

        let chat = &mut self.chats[index];
        let mut changed = chat.unread_count != 0;
        chat.unread_count = 0;
        if let Some(last) = chat.last_message.as_mut() {
            changed |= last.mark_read_by(&viewer_id);
        }
        if changed {
            effects.push(Effect::Emit(ChatEvent::ChatUpdated(chat.clone())));
        }
        Ok(effects)
    }

    pub fn start_call(&mut self, chat_id: &str, kind: CallKind) -> Result<Vec<Effect>> {
        let index = self.chat_index(chat_id)?;
        let chat = &self.chats[index];
        let Some(counterpart) = chat.counterpart(&self.viewer.id) else {
            return Err(ChatError::NoCounterpart(chat_id.to_string()));
        };
        if let Some(call) = self.active_call.as_ref().filter(|call| !call.is_ended()) {
            return Err(ChatError::CallInProgress(call.id.clone()));
        }

        log::info!("Calling {} ({} call)", counterpart.name, kind.as_str());
        let call = CallSession {
            id: format!("call-{}", Uuid::new_v4()),
            chat_id: chat_id.to_string(),
            participants: chat.participants.to_vec(),
            status: CallStatus::Ringing,
            kind,
            start_time: None,
            end_time: None,
        };
        self.active_call = Some(call.clone());

        let call_id = call.id.clone();
        Ok(vec![
            Effect::Emit(ChatEvent::CallChanged(Some(call))),
            Effect::Schedule {
                delay: self.timings.call_connect_delay(),
                timer: Timer::ConnectCall { call_id },
            },
        ])
    }

    pub fn end_call(&mut self, now: DateTime<Utc>) -> Result<Vec<Effect>> {
        let call = match self.active_call.as_mut() {
            Some(call) if !call.is_ended() => call,
            _ => return Err(ChatError::NoActiveCall),
        };
        call.status = CallStatus::Ended;
        call.end_time = Some(now);

        Ok(vec![
            Effect::Emit(ChatEvent::CallChanged(Some(call.clone()))),
            Effect::Schedule {
                delay: self.timings.call_end_grace(),
                timer: Timer::ClearCall {
                    call_id: call.id.clone(),
                },
            },
        ])
    }

    pub fn set_typing(
        &mut self,
        chat_id: &str,
        is_typing: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Effect>> {
        self.chat_index(chat_id)?;
        let viewer_id = self.viewer.id.clone();

        let before = self.typing.len();
        self.typing.retain(|entry| {
            !(entry.indicator.chat_id == chat_id && entry.indicator.user_id == viewer_id)
        });
        let removed = self.typing.len() != before;

        if !is_typing {
            return Ok(if removed {
                vec![Effect::Emit(ChatEvent::TypingChanged(
                    self.typing_indicators(),
                ))]
            } else {
                Vec::new()
            });
        }

        self.typing_token += 1;
        let token = self.typing_token;
        self.typing.push(TypingEntry {
            indicator: TypingIndicator {
                chat_id: chat_id.to_string(),
                user_id: viewer_id.clone(),
                is_typing: true,
                timestamp: now,
            },
            token,
        });

        Ok(vec![
            Effect::Emit(ChatEvent::TypingChanged(self.typing_indicators())),
            Effect::Schedule {
                delay: self.timings.typing_timeout(),
                timer: Timer::ExpireTyping {
                    chat_id: chat_id.to_string(),
                    user_id: viewer_id,
                    token,
                },
            },
        ])
    }

    pub fn block_user(&mut self, chat_id: &str) -> Result<Vec<Effect>> {
        let index = self.chat_index(chat_id)?;
        let chat = &mut self.chats[index];
        chat.is_blocked = true;

        Ok(vec![
            Effect::Emit(ChatEvent::ChatUpdated(chat.clone())),
            Effect::Emit(ChatEvent::Notification(Notification::new(
                "User Blocked",
                "You will no longer receive messages from this user.",
            ))),
        ])
    }

    /// Accepts a report for the counterpart. Nothing leaves the process.
    pub fn report_user(&mut self, chat_id: &str, reason: &str) -> Result<Vec<Effect>> {
        let index = self.chat_index(chat_id)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ChatError::InvalidInput("report reason is empty".to_string()));
        }

        let reported = self.chats[index]
            .counterpart(&self.viewer.id)
            .map(|user| user.name.as_str())
            .unwrap_or("unknown user");
        log::info!("Report filed against {reported} in {chat_id}: {reason}");

        Ok(vec![Effect::Emit(ChatEvent::Notification(Notification::new(
            "User Reported",
            "Thank you for your report. We will review it shortly.",
        )))])
    }

    pub fn update_chat_theme(&mut self, chat_id: &str, theme: ChatTheme) -> Result<Vec<Effect>> {
        let index = self.chat_index(chat_id)?;
        let chat = &mut self.chats[index];
        chat.theme = theme;
        Ok(vec![Effect::Emit(ChatEvent::ChatUpdated(chat.clone()))])
    }

    /// Resolves a timer that came due. Stale timers yield no effects.
    pub fn fire(&mut self, timer: Timer, now: DateTime<Utc>) -> Vec<Effect> {
        match timer {
            Timer::CounterpartReply { chat_id } => self.deliver_reply(&chat_id, now),
            Timer::ConnectCall { call_id } => match self.active_call.as_mut() {
                Some(call) if call.id == call_id && call.status == CallStatus::Ringing => {
                    call.status = CallStatus::Connected;
                    call.start_time = Some(now);
                    vec![Effect::Emit(ChatEvent::CallChanged(Some(call.clone())))]
                }
                _ => {
                    log::debug!("Dropping connect for stale call {call_id}");
                    Vec::new()
                }
            },
            Timer::ClearCall { call_id } => {
                let current = self
                    .active_call
                    .as_ref()
                    .is_some_and(|call| call.id == call_id && call.is_ended());
                if current {
                    self.active_call = None;
                    vec![Effect::Emit(ChatEvent::CallChanged(None))]
                } else {
                    log::debug!("Dropping clear for stale call {call_id}");
                    Vec::new()
                }
            }
            Timer::ExpireTyping {
                chat_id,
                user_id,
                token,
            } => {
                let position = self.typing.iter().position(|entry| {
                    entry.token == token
                        && entry.indicator.chat_id == chat_id
                        && entry.indicator.user_id == user_id
                });
                match position {
                    Some(position) => {
                        self.typing.remove(position);
                        vec![Effect::Emit(ChatEvent::TypingChanged(
                            self.typing_indicators(),
                        ))]
                    }
                    None => Vec::new(),
                }
            }
        }
    }

    fn deliver_reply(&mut self, chat_id: &str, now: DateTime<Utc>) -> Vec<Effect> {
        let Some(index) = self.chats.iter().position(|chat| chat.id == chat_id) else {
            log::debug!("Dropping reply for vanished chat {chat_id}");
            return Vec::new();
        };
        if self.chats[index].is_blocked {
            log::debug!("Dropping reply for blocked chat {chat_id}");
            return Vec::new();
        }
        let Some(sender) = self.chats[index].counterpart(&self.viewer.id).cloned() else {
            return Vec::new();
        };

        let responses = catalog::canned_responses();
        let content = responses[self.rng.random_range(0..responses.len())];
        let reply = Message::new(
            new_message_id(),
            chat_id,
            &sender.id,
            content,
            MessageKind::Text,
            now,
        );
        self.messages
            .entry(chat_id.to_string())
            .or_default()
            .push(reply.clone());

        let chat = &mut self.chats[index];
        chat.last_message = Some(reply.clone());
        chat.updated_at = now;
        chat.unread_count += 1;
        let chat = chat.clone();

        vec![
            Effect::Emit(ChatEvent::MessageAppended(reply)),
            Effect::Emit(ChatEvent::ChatUpdated(chat)),
            Effect::Emit(ChatEvent::Notification(Notification::new(
                format!("New message from {}", sender.name),
                content,
            ))),
        ]
    }

    fn chat_index(&self, chat_id: &str) -> Result<usize> {
        self.chats
            .iter()
            .position(|chat| chat.id == chat_id)
            .ok_or_else(|| ChatError::UnknownChat(chat_id.to_string()))
    }
}

fn new_message_id() -> String {
    format!("msg-{}", Uuid::new_v4())
}
