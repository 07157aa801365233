use chrono::{DateTime, Utc};
use eframe::egui;

use crate::common::{CallKind, CallSession};
use crate::ui::format;
use crate::ui::state::CallControls;
use crate::ui::theme;

#[derive(Default)]
pub struct CallActions {
    pub hang_up: bool,
}

pub fn render(
    ui: &mut egui::Ui,
    call: &CallSession,
    controls: &mut CallControls,
    viewer_id: &str,
    now: DateTime<Utc>,
) -> CallActions {
    let mut actions = CallActions::default();
    let other = call
        .participants
        .iter()
        .find(|user| user.id != viewer_id)
        .map(|user| user.name.as_str())
        .unwrap_or("Unknown");

    ui.vertical_centered(|ui| {
        ui.add_space(60.0);
        ui.heading(other);
        ui.label(match call.kind {
            CallKind::Voice => "Voice call",
            CallKind::Video => "Video call",
        });
        ui.label(egui::RichText::new(format::call_status_text(call, now)).size(24.0));
        ui.add_space(30.0);

        let mute_label = if controls.muted { "🔇 Unmute" } else { "🎤 Mute" };
        if ui.button(mute_label).clicked() {
            controls.muted = !controls.muted;
        }
        if call.kind == CallKind::Video {
            let video_label = if controls.video_on {
                "📷 Camera off"
            } else {
                "📷 Camera on"
            };
            if ui.button(video_label).clicked() {
                controls.video_on = !controls.video_on;
            }
        }
        let end = egui::Button::new(egui::RichText::new("End call").color(theme::DANGER));
        if ui.add_enabled(!call.is_ended(), end).clicked() {
            actions.hang_up = true;
        }
    });

    actions
}
