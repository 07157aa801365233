use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Duration, Utc};

use crate::common::types::{CallSession, Chat, ChatId, Message, MessageId, TypingIndicator, User};
use crate::common::{ChatEvent, Notification};

/// Keep at most this many toasts on screen.
const MAX_TOASTS: usize = 5;
const TOAST_TTL_SECS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Inbox,
    Conversation(ChatId),
    /// A chat id that no longer resolves; shown until the viewer goes back.
    NotFound(ChatId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Emoji,
    QuickReplies,
    MeetingSuggestions,
    ThemeSelector,
    Report,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: DateTime<Utc>,
}

/// Local call-screen toggles; they have no effect on the simulated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallControls {
    pub muted: bool,
    pub video_on: bool,
}

/// Front-end mirror of the engine state plus view-only state.
pub struct AppState {
    pub viewer: Option<User>,
    pub chats: Vec<Chat>,
    pub messages: HashMap<ChatId, Vec<Message>>,
    pub active_call: Option<CallSession>,
    pub typing: Vec<TypingIndicator>,
    pub route: Route,
    pub search_query: String,
    pub input_text: String,
    pub overlay: Option<Overlay>,
    pub report_reason: String,
    pub toasts: VecDeque<Toast>,
    pub call_controls: CallControls,
    is_typing: bool,
    /// Messages of the open chat already covered by a read request.
    requested_reads: HashSet<MessageId>,
    counter_read_requested: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            viewer: None,
            chats: Vec::new(),
            messages: HashMap::new(),
            active_call: None,
            typing: Vec::new(),
            route: Route::Inbox,
            search_query: String::new(),
            input_text: String::new(),
            overlay: None,
            report_reason: String::new(),
            toasts: VecDeque::new(),
            call_controls: CallControls {
                muted: false,
                video_on: false,
            },
            is_typing: false,
            requested_reads: HashSet::new(),
            counter_read_requested: false,
        }
    }

    pub fn apply_event(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::Ready(snapshot) => {
                self.viewer = Some(snapshot.viewer);
                self.chats = snapshot.chats;
                self.messages = snapshot.messages;
                self.typing = snapshot.typing;
                self.set_call(snapshot.active_call);
            }
            ChatEvent::MessageAppended(message) => {
                let history = self.messages.entry(message.chat_id.clone()).or_default();
                if !history.iter().any(|existing| existing.id == message.id) {
                    history.push(message);
                }
            }
            ChatEvent::MessageUpdated(message) => {
                if let Some(existing) = self
                    .messages
                    .get_mut(&message.chat_id)
                    .and_then(|history| history.iter_mut().find(|m| m.id == message.id))
                {
                    *existing = message;
                }
            }
            ChatEvent::ChatUpdated(chat) => {
                match self.chats.iter_mut().find(|existing| existing.id == chat.id) {
                    Some(existing) => *existing = chat,
                    None => self.chats.push(chat),
                }
            }
            ChatEvent::CallChanged(call) => self.set_call(call),
            ChatEvent::TypingChanged(typing) => self.typing = typing,
            ChatEvent::Notification(notification) => self.push_toast(notification, Utc::now()),
        }
    }

    fn set_call(&mut self, call: Option<CallSession>) {
        let is_new = match (&self.active_call, &call) {
            (Some(current), Some(next)) => current.id != next.id,
            (None, Some(_)) => true,
            _ => false,
        };
        if let (true, Some(next)) = (is_new, &call) {
            self.call_controls = CallControls {
                muted: false,
                video_on: next.kind == crate::common::CallKind::Video,
            };
        }
        self.active_call = call;
    }

    pub fn is_ready(&self) -> bool {
        self.viewer.is_some()
    }

    pub fn viewer_id(&self) -> &str {
        self.viewer.as_ref().map(|user| user.id.as_str()).unwrap_or_default()
    }

    pub fn chat(&self, chat_id: &str) -> Option<&Chat> {
        self.chats.iter().find(|chat| chat.id == chat_id)
    }

    pub fn chat_messages(&self, chat_id: &str) -> &[Message] {
        self.messages
            .get(chat_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Chats whose listing title or participant names contain the search query.
    pub fn filtered_chats(&self) -> Vec<&Chat> {
        self.chats
            .iter()
            .filter(|chat| chat.matches_query(&self.search_query))
            .collect()
    }

    pub fn total_unread(&self) -> u32 {
        self.chats.iter().map(|chat| chat.unread_count).sum()
    }

    /// Routes to the conversation, or to the not-found view for a stale id.
    pub fn open_chat(&mut self, chat_id: &str) -> bool {
        self.overlay = None;
        self.input_text.clear();
        self.report_reason.clear();
        self.is_typing = false;
        self.requested_reads.clear();
        self.counter_read_requested = false;
        if self.chat(chat_id).is_some() {
            self.route = Route::Conversation(chat_id.to_string());
            true
        } else {
            self.route = Route::NotFound(chat_id.to_string());
            false
        }
    }

    pub fn back_to_inbox(&mut self) {
        self.route = Route::Inbox;
        self.overlay = None;
    }

    pub fn active_chat_id(&self) -> Option<&str> {
        match &self.route {
            Route::Conversation(chat_id) => Some(chat_id.as_str()),
            _ => None,
        }
    }

    pub fn active_chat(&self) -> Option<&Chat> {
        self.active_chat_id().and_then(|chat_id| self.chat(chat_id))
    }

    /// Returns the open chat once per batch of messages the viewer has not read yet.
    pub fn take_read_request(&mut self) -> Option<ChatId> {
        let chat_id = self.active_chat_id()?.to_string();
        let viewer_id = self.viewer_id().to_string();
        let unread: Vec<MessageId> = self
            .chat_messages(&chat_id)
            .iter()
            .filter(|message| !message.is_read_by(&viewer_id))
            .map(|message| message.id.clone())
            .filter(|id| !self.requested_reads.contains(id))
            .collect();
        let counter_pending = !self.counter_read_requested
            && self.chat(&chat_id).is_some_and(|chat| chat.unread_count > 0);

        if unread.is_empty() && !counter_pending {
            return None;
        }
        self.requested_reads.extend(unread);
        self.counter_read_requested = true;
        Some(chat_id)
    }

    /// Typing transition caused by the latest input edit, if any.
    pub fn on_input_changed(&mut self) -> Option<bool> {
        let has_text = !self.input_text.trim().is_empty();
        if has_text != self.is_typing {
            self.is_typing = has_text;
            Some(has_text)
        } else {
            None
        }
    }

    /// Clears the local typing flag, returning whether it was set.
    pub fn stop_typing(&mut self) -> bool {
        std::mem::take(&mut self.is_typing)
    }

    /// Trimmed outgoing text; clears the input.
    pub fn take_message(&mut self) -> Option<String> {
        let content = self.input_text.trim().to_string();
        if content.is_empty() {
            return None;
        }
        self.input_text.clear();
        self.is_typing = false;
        Some(content)
    }

    pub fn insert_emoji(&mut self, emoji: &str) {
        self.input_text.push_str(emoji);
        self.overlay = None;
    }

    pub fn apply_quick_reply(&mut self, text: &str) {
        self.input_text = text.to_string();
        self.overlay = None;
    }

    pub fn toggle_overlay(&mut self, overlay: Overlay) {
        self.overlay = if self.overlay == Some(overlay) {
            None
        } else {
            Some(overlay)
        };
    }

    pub fn take_report_reason(&mut self) -> Option<String> {
        let reason = self.report_reason.trim().to_string();
        if reason.is_empty() {
            return None;
        }
        self.report_reason.clear();
        self.overlay = None;
        Some(reason)
    }

    /// Indicators in `chat_id`, with the display name of whoever is typing.
    pub fn typing_in(&self, chat_id: &str) -> Vec<(String, bool)> {
        let viewer_id = self.viewer_id();
        let chat = self.chat(chat_id);
        self.typing
            .iter()
            .filter(|indicator| indicator.chat_id == chat_id && indicator.is_typing)
            .map(|indicator| {
                let is_viewer = indicator.user_id == viewer_id;
                let name = chat
                    .and_then(|chat| chat.participants.iter().find(|u| u.id == indicator.user_id))
                    .map(|user| user.name.clone())
                    .unwrap_or_else(|| indicator.user_id.clone());
                (name, is_viewer)
            })
            .collect()
    }

    pub fn push_toast(&mut self, notification: Notification, now: DateTime<Utc>) {
        self.toasts.push_back(Toast {
            notification,
            shown_at: now,
        });
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.pop_front();
        }
    }

    pub fn expire_toasts(&mut self, now: DateTime<Utc>) {
        let ttl = Duration::seconds(TOAST_TTL_SECS);
        self.toasts.retain(|toast| now - toast.shown_at < ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ChatState;
    use crate::config::ChatTimings;
    use crate::storage::SeedData;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn ready_state() -> AppState {
        let engine_state = ChatState::new(
            SeedData::mock(),
            "current-user",
            ChatTimings::default(),
            StdRng::seed_from_u64(3),
        )
        .expect("state");
        let mut state = AppState::new();
        state.apply_event(ChatEvent::Ready(engine_state.snapshot()));
        state
    }

    #[test]
    fn ready_snapshot_populates_mirror() {
        let state = ready_state();
        assert!(state.is_ready());
        assert_eq!(state.viewer_id(), "current-user");
        assert_eq!(state.chats.len(), 3);
        assert_eq!(state.total_unread(), 1);
    }

    #[test]
    fn search_filters_case_insensitively() {
        let mut state = ready_state();
        state.search_query = "DUNE".to_string();
        let ids: Vec<&str> = state.filtered_chats().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["chat-3"]);

        state.search_query = "sarah".to_string();
        let ids: Vec<&str> = state.filtered_chats().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["chat-1"]);

        // "You" takes part in every chat.
        state.search_query = "you".to_string();
        assert_eq!(state.filtered_chats().len(), 3);
    }

    #[test]
    fn stale_chat_id_routes_to_not_found() {
        let mut state = ready_state();
        assert!(!state.open_chat("chat-99"));
        assert_eq!(state.route, Route::NotFound("chat-99".to_string()));
        state.back_to_inbox();
        assert_eq!(state.route, Route::Inbox);

        assert!(state.open_chat("chat-2"));
        assert_eq!(state.active_chat().map(|c| c.id.as_str()), Some("chat-2"));
    }

    #[test]
    fn read_request_fires_once_per_batch() {
        let mut state = ready_state();
        state.open_chat("chat-1");
        assert_eq!(state.take_read_request(), Some("chat-1".to_string()));
        assert_eq!(state.take_read_request(), None);

        state.open_chat("chat-2");
        assert_eq!(state.take_read_request(), None);
    }

    #[test]
    fn read_tracking_is_scoped_to_the_open_chat() {
        let mut state = ready_state();
        state.open_chat("chat-1");
        assert_eq!(state.take_read_request(), Some("chat-1".to_string()));
        assert!(!state.requested_reads.is_empty());

        state.open_chat("chat-2");
        assert!(state.requested_reads.is_empty());
        assert!(!state.counter_read_requested);

        // Still unread in the mirror, so reopening asks again.
        state.open_chat("chat-1");
        assert_eq!(state.take_read_request(), Some("chat-1".to_string()));
        assert_eq!(state.take_read_request(), None);
    }

    #[test]
    fn typing_transitions_follow_input() {
        let mut state = ready_state();
        state.input_text = "h".to_string();
        assert_eq!(state.on_input_changed(), Some(true));
        state.input_text = "hi".to_string();
        assert_eq!(state.on_input_changed(), None);
        state.input_text = "  ".to_string();
        assert_eq!(state.on_input_changed(), Some(false));

        state.input_text = "again".to_string();
        state.on_input_changed();
        assert!(state.stop_typing());
        assert!(!state.stop_typing());
    }

    #[test]
    fn take_message_trims_and_clears() {
        let mut state = ready_state();
        state.input_text = "  hello  ".to_string();
        assert_eq!(state.take_message(), Some("hello".to_string()));
        assert!(state.input_text.is_empty());
        assert_eq!(state.take_message(), None);
    }

    #[test]
    fn pickers_fill_input_and_close() {
        let mut state = ready_state();
        state.toggle_overlay(Overlay::Emoji);
        state.input_text = "Nice ".to_string();
        state.insert_emoji("📚");
        assert_eq!(state.input_text, "Nice 📚");
        assert_eq!(state.overlay, None);

        state.toggle_overlay(Overlay::QuickReplies);
        state.apply_quick_reply("Is pickup available?");
        assert_eq!(state.input_text, "Is pickup available?");
        assert_eq!(state.overlay, None);
    }

    #[test]
    fn appended_and_updated_messages_merge() {
        let mut state = ready_state();
        let mut message = state.chat_messages("chat-1")[0].clone();
        message.mark_read_by("current-user");
        state.apply_event(ChatEvent::MessageUpdated(message.clone()));
        assert!(state.chat_messages("chat-1")[0].is_read_by("current-user"));

        state.apply_event(ChatEvent::MessageAppended(message));
        assert_eq!(state.chat_messages("chat-1").len(), 3);
    }

    #[test]
    fn toasts_are_capped_and_expire() {
        let mut state = AppState::new();
        let now = Utc::now();
        for i in 0..7 {
            state.push_toast(Notification::new(format!("t{i}"), ""), now);
        }
        assert_eq!(state.toasts.len(), MAX_TOASTS);
        assert_eq!(state.toasts[0].notification.title, "t2");

        state.expire_toasts(now + Duration::seconds(TOAST_TTL_SECS + 1));
        assert!(state.toasts.is_empty());
    }

    #[test]
    fn video_call_starts_with_camera_on() {
        let mut state = ready_state();
        let call = CallSession {
            id: "call-1".to_string(),
            chat_id: "chat-1".to_string(),
            participants: Vec::new(),
            status: crate::common::CallStatus::Ringing,
            kind: crate::common::CallKind::Video,
            start_time: None,
            end_time: None,
        };
        state.apply_event(ChatEvent::CallChanged(Some(call)));
        assert!(state.call_controls.video_on);
        state.apply_event(ChatEvent::CallChanged(None));
        assert!(state.active_call.is_none());
    }
}
