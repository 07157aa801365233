use eframe::egui;

use crate::common::ChatTheme;
use crate::common::types::QuickReply;
use crate::storage::catalog;
use crate::ui::theme;

/// Outcome of one frame of a picker window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction<T> {
    Idle,
    Close,
    Select(T),
}

fn picker_window(title: &str) -> egui::Window<'static> {
    egui::Window::new(title.to_string())
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -60.0])
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn emoji(ctx: &egui::Context) -> PickerAction<&'static str> {
    let mut action = PickerAction::Idle;
    picker_window("Choose an emoji").show(ctx, |ui| {
        egui::ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
            for (category, emojis) in catalog::emoji_categories() {
                ui.label(egui::RichText::new(*category).weak());
                ui.horizontal_wrapped(|ui| {
                    for emoji in emojis.iter() {
                        if ui.button(*emoji).clicked() {
                            action = PickerAction::Select(*emoji);
                        }
                    }
                });
            }
        });
        if ui.button("Close").clicked() {
            action = PickerAction::Close;
        }
    });
    action
}

pub fn quick_replies(ctx: &egui::Context, replies: &[QuickReply]) -> PickerAction<String> {
    let mut action = PickerAction::Idle;
    picker_window("Quick Replies").show(ctx, |ui| {
        for category in catalog::quick_reply_categories(replies) {
            ui.label(egui::RichText::new(capitalize(category.as_str())).weak());
            for reply in replies.iter().filter(|reply| reply.category == category) {
                if ui.button(reply.text.as_str()).clicked() {
                    action = PickerAction::Select(reply.text.clone());
                }
            }
        }
        if ui.button("Close").clicked() {
            action = PickerAction::Close;
        }
    });
    action
}

/// Returns the chosen location name.
pub fn meeting_suggestions(ctx: &egui::Context) -> PickerAction<String> {
    let mut action = PickerAction::Idle;
    picker_window("Suggest Meeting Location").show(ctx, |ui| {
        for location in catalog::meeting_locations() {
            if ui.button(format!("📍 {location}")).clicked() {
                action = PickerAction::Select(location.to_string());
            }
        }
        ui.separator();
        if ui.button("📍 Other location...").clicked() {
            action = PickerAction::Select(catalog::CUSTOM_LOCATION.to_string());
        }
        if ui.button("Close").clicked() {
            action = PickerAction::Close;
        }
    });
    action
}

pub fn theme_selector(ctx: &egui::Context, current: ChatTheme) -> PickerAction<ChatTheme> {
    let mut action = PickerAction::Idle;
    picker_window("Chat Theme").show(ctx, |ui| {
        for option in ChatTheme::ALL {
            ui.horizontal(|ui| {
                ui.colored_label(theme::swatch(option), "●");
                if ui.button(option.display_name()).clicked() {
                    action = PickerAction::Select(option);
                }
                if option == current {
                    ui.label("✓");
                }
            });
        }
        if ui.button("Close").clicked() {
            action = PickerAction::Close;
        }
    });
    action
}

/// Report dialog; `Select` means the reason was submitted.
pub fn report(ctx: &egui::Context, reason: &mut String) -> PickerAction<()> {
    let mut action = PickerAction::Idle;
    picker_window("Report User").show(ctx, |ui| {
        ui.label("Tell us what happened:");
        ui.text_edit_multiline(reason);
        ui.horizontal(|ui| {
            let can_submit = !reason.trim().is_empty();
            if ui
                .add_enabled(can_submit, egui::Button::new("Submit report"))
                .clicked()
            {
                action = PickerAction::Select(());
            }
            if ui.button("Cancel").clicked() {
                action = PickerAction::Close;
            }
        });
    });
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_first_letter_only() {
        assert_eq!(capitalize("greeting"), "Greeting");
        assert_eq!(capitalize(""), "");
    }
}
