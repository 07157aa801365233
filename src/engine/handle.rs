use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::common::types::{CallKind, ChatTheme, MessageKind};
use crate::common::{ChatCommand, ChatEvent};
use crate::error::{ChatError, Result};

use super::runtime::ChatEngine;
use super::state::ChatState;

/// Cloneable front-end side of a running engine.
#[derive(Debug, Clone)]
pub struct ChatHandle {
    commands: mpsc::Sender<ChatCommand>,
}

/// Everything a front end needs after starting the engine.
pub struct EngineHandles {
    pub handle: ChatHandle,
    pub events: mpsc::Receiver<ChatEvent>,
    pub task: JoinHandle<()>,
}

/// Starts the engine on the current tokio runtime.
///
/// The engine stops on [`ChatHandle::shutdown`] or once every handle is
/// dropped; pending timers are cancelled either way.
pub fn spawn_engine(state: ChatState, buffer: usize) -> EngineHandles {
    let (command_sender, command_receiver) = mpsc::channel(buffer);
    let (event_sender, events) = mpsc::channel(buffer);

    let engine = ChatEngine::new(state, event_sender, command_receiver);
    let task = tokio::spawn(engine.run());

    EngineHandles {
        handle: ChatHandle {
            commands: command_sender,
        },
        events,
        task,
    }
}

impl ChatHandle {
    pub async fn dispatch(&self, command: ChatCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ChatError::EngineClosed)
    }

    /// Waits for room in the command queue; the permit sends without blocking.
    ///
    /// Callers that also consume engine events should race this against
    /// their event receiver so neither side waits on the other.
    pub async fn reserve(&self) -> Result<mpsc::Permit<'_, ChatCommand>> {
        self.commands
            .reserve()
            .await
            .map_err(|_| ChatError::EngineClosed)
    }

    /// Non-blocking variant for callers outside async code, such as a UI frame.
    pub fn try_dispatch(&self, command: ChatCommand) -> Result<()> {
        self.commands.try_send(command).map_err(|err| {
            log::warn!("Failed to send command to chat engine: {err}");
            ChatError::EngineClosed
        })
    }

    pub async fn send_message(&self, chat_id: &str, content: &str) -> Result<()> {
        self.send_message_of_kind(chat_id, content, MessageKind::Text)
            .await
    }

    pub async fn send_message_of_kind(
        &self,
        chat_id: &str,
        content: &str,
        kind: MessageKind,
    ) -> Result<()> {
        self.dispatch(ChatCommand::SendMessage {
            chat_id: chat_id.to_string(),
            content: content.to_string(),
            kind,
        })
        .await
    }

    pub async fn mark_as_read(&self, chat_id: &str, message_id: &str) -> Result<()> {
        self.dispatch(ChatCommand::MarkAsRead {
            chat_id: chat_id.to_string(),
            message_id: message_id.to_string(),
        })
        .await
    }

    pub async fn mark_chat_read(&self, chat_id: &str) -> Result<()> {
        self.dispatch(ChatCommand::MarkChatRead {
            chat_id: chat_id.to_string(),
        })
        .await
    }

    pub async fn start_call(&self, chat_id: &str, kind: CallKind) -> Result<()> {
        self.dispatch(ChatCommand::StartCall {
            chat_id: chat_id.to_string(),
            kind,
        })
        .await
    }

    pub async fn end_call(&self) -> Result<()> {
        self.dispatch(ChatCommand::EndCall).await
    }

    pub async fn set_typing(&self, chat_id: &str, is_typing: bool) -> Result<()> {
        self.dispatch(ChatCommand::SetTyping {
            chat_id: chat_id.to_string(),
            is_typing,
        })
        .await
    }

    pub async fn block_user(&self, chat_id: &str) -> Result<()> {
        self.dispatch(ChatCommand::BlockUser {
            chat_id: chat_id.to_string(),
        })
        .await
    }

    pub async fn report_user(&self, chat_id: &str, reason: &str) -> Result<()> {
        self.dispatch(ChatCommand::ReportUser {
            chat_id: chat_id.to_string(),
            reason: reason.to_string(),
        })
        .await
    }

    pub async fn update_chat_theme(&self, chat_id: &str, theme: ChatTheme) -> Result<()> {
        self.dispatch(ChatCommand::UpdateChatTheme {
            chat_id: chat_id.to_string(),
            theme,
        })
        .await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.dispatch(ChatCommand::Shutdown).await
    }
}
