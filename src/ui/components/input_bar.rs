use eframe::egui;

use crate::ui::state::Overlay;

#[derive(Default)]
pub struct InputActions {
    pub send: bool,
    pub changed: bool,
    pub overlay: Option<Overlay>,
}

pub fn render(ui: &mut egui::Ui, input_text: &mut String, enabled: bool) -> InputActions {
    let mut actions = InputActions::default();
    ui.horizontal(|ui| {
        if ui.button("😊").on_hover_text("Emoji").clicked() {
            actions.overlay = Some(Overlay::Emoji);
        }
        if ui.button("⚡").on_hover_text("Quick replies").clicked() {
            actions.overlay = Some(Overlay::QuickReplies);
        }
        if ui.button("📍").on_hover_text("Suggest meeting").clicked() {
            actions.overlay = Some(Overlay::MeetingSuggestions);
        }

        let response = ui.add_enabled(
            enabled,
            egui::TextEdit::singleline(input_text).hint_text("Type a message..."),
        );
        actions.changed = response.changed();

        if ui.add_enabled(enabled, egui::Button::new("Send")).clicked() {
            actions.send = true;
        }
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            actions.send = true;
        }
    });
    actions
}
