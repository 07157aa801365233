use chrono::Utc;
use eframe::egui;

use crate::common::ChatId;
use crate::ui::format;
use crate::ui::state::AppState;
use crate::ui::theme;

/// Chat list with search. Returns the chat the viewer clicked, if any.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) -> Option<ChatId> {
    let mut opened = None;

    ui.horizontal(|ui| {
        ui.heading("Messages");
        let unread = state.total_unread();
        if unread > 0 {
            ui.colored_label(theme::UNREAD_BADGE, format!("{unread} unread"));
        }
    });
    ui.add(
        egui::TextEdit::singleline(&mut state.search_query)
            .hint_text("Search conversations..."),
    );
    ui.separator();

    let now = Utc::now();
    let viewer_id = state.viewer_id().to_string();
    let selected = state.active_chat_id().map(str::to_string);
    let chats = state.filtered_chats();

    if chats.is_empty() {
        if state.search_query.trim().is_empty() {
            ui.label("No conversations yet");
        } else {
            ui.label("No conversations found");
        }
        return None;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for chat in chats {
            let counterpart = chat.counterpart(&viewer_id);
            let name = counterpart.map(|user| user.name.as_str()).unwrap_or("Unknown");
            let is_selected = selected.as_deref() == Some(chat.id.as_str());

            ui.horizontal(|ui| {
                let online = counterpart.is_some_and(|user| user.is_online);
                ui.colored_label(if online { theme::ONLINE } else { theme::OFFLINE }, "●");
                if ui
                    .selectable_label(is_selected, egui::RichText::new(name).strong())
                    .clicked()
                {
                    opened = Some(chat.id.clone());
                }
                if chat.unread_count > 0 {
                    ui.colored_label(theme::UNREAD_BADGE, format!("({})", chat.unread_count));
                }
                if chat.is_blocked {
                    ui.label(egui::RichText::new("blocked").weak().small());
                }
            });
            ui.label(egui::RichText::new(&chat.listing.title).small());

            if let Some(last) = &chat.last_message {
                let preview = if last.sender_id == viewer_id {
                    format!("You: {}", last.content)
                } else {
                    last.content.clone()
                };
                ui.label(egui::RichText::new(preview).weak());
                ui.label(
                    egui::RichText::new(format::relative_time(last.timestamp, now))
                        .weak()
                        .small(),
                );
            }
            ui.separator();
        }
    });

    opened
}
