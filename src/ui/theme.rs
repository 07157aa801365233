use eframe::egui::Color32;

use crate::common::ChatTheme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BubblePalette {
    pub sent: Color32,
    pub received: Color32,
    pub sent_text: Color32,
    pub received_text: Color32,
}

pub fn palette(theme: ChatTheme) -> BubblePalette {
    let (sent, received) = match theme {
        ChatTheme::Default => (Color32::from_rgb(245, 158, 11), Color32::from_rgb(31, 41, 55)),
        ChatTheme::Blue => (Color32::from_rgb(59, 130, 246), Color32::from_rgb(30, 58, 138)),
        ChatTheme::Green => (Color32::from_rgb(34, 197, 94), Color32::from_rgb(20, 83, 45)),
        ChatTheme::Purple => (Color32::from_rgb(168, 85, 247), Color32::from_rgb(88, 28, 135)),
    };
    BubblePalette {
        sent,
        received,
        sent_text: Color32::WHITE,
        received_text: Color32::from_rgb(229, 231, 235),
    }
}

/// Colour dot shown next to each option in the theme selector.
pub fn swatch(theme: ChatTheme) -> Color32 {
    palette(theme).sent
}

pub const ONLINE: Color32 = Color32::from_rgb(34, 197, 94);
pub const OFFLINE: Color32 = Color32::GRAY;
pub const UNREAD_BADGE: Color32 = Color32::from_rgb(245, 158, 11);
pub const DANGER: Color32 = Color32::from_rgb(239, 68, 68);
