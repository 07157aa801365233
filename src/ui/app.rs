use std::time::Duration;

use chrono::Utc;
use eframe::egui;
use tokio::sync::mpsc;

use crate::common::types::QuickReply;
use crate::common::{ChatCommand, ChatEvent, MessageKind};
use crate::engine::ChatHandle;
use crate::storage::catalog;

use super::components::pickers::{self, PickerAction};
use super::components::{call_screen, conversation, inbox, input_bar};
use super::state::{AppState, Overlay, Route};

const REPAINT_INTERVAL: Duration = Duration::from_millis(250);

pub struct ChatApp {
    state: AppState,
    handle: ChatHandle,
    event_receiver: mpsc::Receiver<ChatEvent>,
    quick_replies: Vec<QuickReply>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        handle: ChatHandle,
        event_receiver: mpsc::Receiver<ChatEvent>,
    ) -> Self {
        Self {
            state: AppState::new(),
            handle,
            event_receiver,
            quick_replies: catalog::quick_replies(),
        }
    }

    fn handle_engine_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.state.apply_event(event);
        }
    }

    fn send_command(&self, command: ChatCommand) {
        if let Err(err) = self.handle.try_dispatch(command) {
            log::debug!("Command not delivered: {err}");
        }
    }

    fn send_text(&mut self, chat_id: &str, content: String) {
        self.send_command(ChatCommand::SendMessage {
            chat_id: chat_id.to_string(),
            content,
            kind: MessageKind::Text,
        });
        self.send_command(ChatCommand::SetTyping {
            chat_id: chat_id.to_string(),
            is_typing: false,
        });
    }

    /// Withdraws the viewer's typing indicator before leaving a conversation.
    fn leave_conversation(&mut self) {
        if let Some(previous) = self.state.active_chat_id().map(str::to_string) {
            if self.state.stop_typing() {
                self.send_command(ChatCommand::SetTyping {
                    chat_id: previous,
                    is_typing: false,
                });
            }
        }
    }

    fn open_chat(&mut self, chat_id: &str) {
        self.leave_conversation();
        if !self.state.open_chat(chat_id) {
            log::debug!("Chat {chat_id} not found");
        }
    }

    fn render_overlay(&mut self, ctx: &egui::Context, chat_id: &str) {
        let Some(overlay) = self.state.overlay else {
            return;
        };
        match overlay {
            Overlay::Emoji => match pickers::emoji(ctx) {
                PickerAction::Select(emoji) => {
                    self.state.insert_emoji(emoji);
                    self.sync_typing(chat_id);
                }
                PickerAction::Close => self.state.overlay = None,
                PickerAction::Idle => {}
            },
            Overlay::QuickReplies => match pickers::quick_replies(ctx, &self.quick_replies) {
                PickerAction::Select(text) => {
                    self.state.apply_quick_reply(&text);
                    self.sync_typing(chat_id);
                }
                PickerAction::Close => self.state.overlay = None,
                PickerAction::Idle => {}
            },
            Overlay::MeetingSuggestions => match pickers::meeting_suggestions(ctx) {
                PickerAction::Select(location) => {
                    self.state.overlay = None;
                    self.send_text(chat_id, catalog::meeting_suggestion(&location));
                }
                PickerAction::Close => self.state.overlay = None,
                PickerAction::Idle => {}
            },
            Overlay::ThemeSelector => {
                let current = self
                    .state
                    .chat(chat_id)
                    .map(|chat| chat.theme)
                    .unwrap_or_default();
                match pickers::theme_selector(ctx, current) {
                    PickerAction::Select(theme) => {
                        self.state.overlay = None;
                        self.send_command(ChatCommand::UpdateChatTheme {
                            chat_id: chat_id.to_string(),
                            theme,
                        });
                    }
                    PickerAction::Close => self.state.overlay = None,
                    PickerAction::Idle => {}
                }
            }
            Overlay::Report => match pickers::report(ctx, &mut self.state.report_reason) {
                PickerAction::Select(()) => {
                    if let Some(reason) = self.state.take_report_reason() {
                        self.send_command(ChatCommand::ReportUser {
                            chat_id: chat_id.to_string(),
                            reason,
                        });
                    }
                }
                PickerAction::Close => {
                    self.state.report_reason.clear();
                    self.state.overlay = None;
                }
                PickerAction::Idle => {}
            },
        }
    }

    fn sync_typing(&mut self, chat_id: &str) {
        if let Some(is_typing) = self.state.on_input_changed() {
            self.send_command(ChatCommand::SetTyping {
                chat_id: chat_id.to_string(),
                is_typing,
            });
        }
    }

    fn render_conversation(&mut self, ctx: &egui::Context, chat_id: &str) {
        let Some(chat) = self.state.chat(chat_id).cloned() else {
            self.state.open_chat(chat_id);
            return;
        };
        let now = Utc::now();

        let input = egui::TopBottomPanel::bottom("input_bar")
            .show(ctx, |ui| {
                if chat.is_blocked {
                    ui.label("You blocked this user. Messages can no longer be sent.");
                }
                input_bar::render(ui, &mut self.state.input_text, !chat.is_blocked)
            })
            .inner;

        let header = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let header = conversation::render_header(ui, &mut self.state, &chat, now);
                ui.separator();
                conversation::render_transcript(ui, &self.state, &chat);
                header
            })
            .inner;

        if let Some(overlay) = input.overlay {
            self.state.toggle_overlay(overlay);
        }
        if input.changed {
            self.sync_typing(chat_id);
        }
        if input.send {
            if let Some(content) = self.state.take_message() {
                self.send_text(chat_id, content);
            }
        }

        if header.back {
            self.leave_conversation();
            self.state.back_to_inbox();
        }
        if header.block {
            self.send_command(ChatCommand::BlockUser {
                chat_id: chat_id.to_string(),
            });
        }
        if let Some(kind) = header.call {
            self.send_command(ChatCommand::StartCall {
                chat_id: chat_id.to_string(),
                kind,
            });
        }

        self.render_overlay(ctx, chat_id);
    }

    fn render_not_found(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.heading("Chat not found");
                if ui.button("Back to Messages").clicked() {
                    self.state.back_to_inbox();
                }
            });
        });
    }

    fn render_toasts(&self, ctx: &egui::Context) {
        if self.state.toasts.is_empty() {
            return;
        }
        egui::Window::new("Notifications")
            .title_bar(false)
            .resizable(false)
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .show(ctx, |ui| {
                for toast in &self.state.toasts {
                    ui.label(egui::RichText::new(&toast.notification.title).strong());
                    if !toast.notification.description.is_empty() {
                        ui.label(&toast.notification.description);
                    }
                    ui.separator();
                }
            });
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_engine_events();
        let now = Utc::now();
        self.state.expire_toasts(now);

        if !self.state.is_ready() {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| ui.spinner());
            });
            ctx.request_repaint_after(REPAINT_INTERVAL);
            return;
        }

        if let Some(call) = self.state.active_call.clone() {
            let viewer_id = self.state.viewer_id().to_string();
            let actions = egui::CentralPanel::default()
                .show(ctx, |ui| {
                    call_screen::render(ui, &call, &mut self.state.call_controls, &viewer_id, now)
                })
                .inner;
            if actions.hang_up {
                self.send_command(ChatCommand::EndCall);
            }
            self.render_toasts(ctx);
            ctx.request_repaint_after(REPAINT_INTERVAL);
            return;
        }

        let opened = egui::SidePanel::left("inbox")
            .default_width(300.0)
            .show(ctx, |ui| inbox::render(ui, &mut self.state))
            .inner;
        if let Some(chat_id) = opened {
            self.open_chat(&chat_id);
        }

        match self.state.route.clone() {
            Route::Inbox => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.label("Select a conversation to start chatting");
                    });
                });
            }
            Route::Conversation(chat_id) => self.render_conversation(ctx, &chat_id),
            Route::NotFound(_) => self.render_not_found(ctx),
        }

        if let Some(chat_id) = self.state.take_read_request() {
            self.send_command(ChatCommand::MarkChatRead { chat_id });
        }

        self.render_toasts(ctx);
        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}
