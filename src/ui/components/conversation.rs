use chrono::{DateTime, Utc};
use eframe::egui;

use crate::common::{CallKind, Chat};
use crate::ui::format::{self, Receipt};
use crate::ui::state::{AppState, Overlay};
use crate::ui::theme;

#[derive(Default)]
pub struct HeaderActions {
    pub back: bool,
    pub call: Option<CallKind>,
    pub block: bool,
}

pub fn render_header(
    ui: &mut egui::Ui,
    state: &mut AppState,
    chat: &Chat,
    now: DateTime<Utc>,
) -> HeaderActions {
    let mut actions = HeaderActions::default();
    let counterpart = chat.counterpart(state.viewer_id()).cloned();

    ui.horizontal(|ui| {
        if ui.button("←").on_hover_text("Back to Messages").clicked() {
            actions.back = true;
        }
        ui.vertical(|ui| {
            match &counterpart {
                Some(user) => {
                    ui.heading(&user.name);
                    ui.label(egui::RichText::new(format::presence_line(user, now)).weak());
                }
                None => {
                    ui.heading("Unknown user");
                }
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("⚠").on_hover_text("Report user").clicked() {
                state.toggle_overlay(Overlay::Report);
            }
            if !chat.is_blocked && ui.button("🚫").on_hover_text("Block user").clicked() {
                actions.block = true;
            }
            if ui.button("🎨").on_hover_text("Chat theme").clicked() {
                state.toggle_overlay(Overlay::ThemeSelector);
            }
            if ui.button("📹").on_hover_text("Video call").clicked() {
                actions.call = Some(CallKind::Video);
            }
            if ui.button("📞").on_hover_text("Voice call").clicked() {
                actions.call = Some(CallKind::Voice);
            }
        });
    });

    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(&chat.listing.title).strong());
        ui.label(egui::RichText::new(format!("by {}", chat.listing.author)).weak());
        ui.label(format::price_line(&chat.listing));
    });

    actions
}

pub fn render_transcript(ui: &mut egui::Ui, state: &AppState, chat: &Chat) {
    let palette = theme::palette(chat.theme);
    let viewer_id = state.viewer_id();

    if chat.is_blocked {
        ui.colored_label(
            theme::DANGER,
            "You blocked this user. You will no longer receive their messages.",
        );
    }

    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for message in state.chat_messages(&chat.id) {
                let own = message.sender_id == viewer_id;
                let (layout, fill, text) = if own {
                    (
                        egui::Layout::right_to_left(egui::Align::TOP),
                        palette.sent,
                        palette.sent_text,
                    )
                } else {
                    (
                        egui::Layout::left_to_right(egui::Align::TOP),
                        palette.received,
                        palette.received_text,
                    )
                };

                ui.with_layout(layout, |ui| {
                    egui::Frame::new().fill(fill).show(ui, |ui| {
                        ui.vertical(|ui| {
                            ui.label(egui::RichText::new(&message.content).color(text));
                            let mut meta = format::clock_time(message.timestamp);
                            let receipt = format::receipt(message, viewer_id);
                            if receipt != Receipt::None {
                                meta.push(' ');
                                meta.push_str(receipt.symbol());
                            }
                            ui.label(egui::RichText::new(meta).small().color(text));
                        });
                    });
                });
                ui.add_space(4.0);
            }

            for (name, is_viewer) in state.typing_in(&chat.id) {
                let line = if is_viewer {
                    "You are typing...".to_string()
                } else {
                    format!("{name} is typing...")
                };
                ui.label(egui::RichText::new(line).italics().weak());
            }
        });
}
