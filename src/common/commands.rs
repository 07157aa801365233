use super::types::{CallKind, ChatId, ChatTheme, MessageId, MessageKind};

/// Operations dispatched from a front end into the chat engine.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    SendMessage {
        chat_id: ChatId,
        content: String,
        kind: MessageKind,
    },
    MarkAsRead {
        chat_id: ChatId,
        message_id: MessageId,
    },
    /// Marks every message of the chat as seen by the viewer.
    MarkChatRead {
        chat_id: ChatId,
    },
    StartCall {
        chat_id: ChatId,
        kind: CallKind,
    },
    EndCall,
    SetTyping {
        chat_id: ChatId,
        is_typing: bool,
    },
    BlockUser {
        chat_id: ChatId,
    },
    ReportUser {
        chat_id: ChatId,
        reason: String,
    },
    UpdateChatTheme {
        chat_id: ChatId,
        theme: ChatTheme,
    },
    /// Stops the engine and cancels every pending timer.
    Shutdown,
}

impl ChatCommand {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            ChatCommand::SendMessage { .. } => "send_message",
            ChatCommand::MarkAsRead { .. } => "mark_as_read",
            ChatCommand::MarkChatRead { .. } => "mark_chat_read",
            ChatCommand::StartCall { .. } => "start_call",
            ChatCommand::EndCall => "end_call",
            ChatCommand::SetTyping { .. } => "set_typing",
            ChatCommand::BlockUser { .. } => "block_user",
            ChatCommand::ReportUser { .. } => "report_user",
            ChatCommand::UpdateChatTheme { .. } => "update_chat_theme",
            ChatCommand::Shutdown => "shutdown",
        }
    }
}
